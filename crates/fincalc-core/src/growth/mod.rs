pub mod cd;
pub mod compound_interest;
pub mod dividend_income;
pub mod investment_return;
pub mod retirement;
pub mod rule_of_72;
pub mod savings_goal;
