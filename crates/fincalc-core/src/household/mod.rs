pub mod budget;
pub mod currency;
pub mod debt_to_income;
pub mod net_worth;
