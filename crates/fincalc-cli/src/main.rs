mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::{InputArgs, MarketArgs};

/// Personal and market finance calculators
#[derive(Parser)]
#[command(
    name = "fincalc",
    version,
    about = "Personal and market finance calculators",
    long_about = "A CLI for everyday financial calculations with decimal precision. \
                  Covers bonds, loans and mortgages, savings growth, household budgeting, \
                  break-even analysis, and market-data backed stock and portfolio analysis. \
                  Input is read from --input <file.json|file.yaml> or piped stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a fixed-rate bond from its yield
    BondPrice(InputArgs),
    /// Approximate yield to maturity from a bond's price
    BondYtm(InputArgs),
    /// Macaulay and modified duration of a bond
    ModifiedDuration(InputArgs),
    /// Loan payment and amortization schedule
    Loan(InputArgs),
    /// Mortgage payment including tax and insurance
    Mortgage(InputArgs),
    /// Months and interest to pay off a credit card
    CreditPayoff(InputArgs),
    /// Compound interest with optional monthly contributions
    CompoundInterest(InputArgs),
    /// Certificate of deposit maturity value and APY
    Cd(InputArgs),
    /// Retirement savings projection
    Retirement(InputArgs),
    /// Monthly saving needed to reach a goal
    SavingsGoal(InputArgs),
    /// Years to double money at a fixed rate
    RuleOf72(InputArgs),
    /// Total and annualized return on an investment
    InvestmentReturn(InputArgs),
    /// Dividend income with optional reinvestment
    DividendIncome(InputArgs),
    /// Split monthly income into needs, wants and savings
    Budget(InputArgs),
    /// Debt-to-income ratio and lending category
    DebtToIncome(InputArgs),
    /// Net worth from assets and liabilities
    NetWorth(InputArgs),
    /// Convert an amount between currencies
    CurrencyConversion(InputArgs),
    /// Units needed to cover fixed costs
    BreakEven(InputArgs),
    /// Long or short term recommendation for a stock
    StockAnalysis(MarketArgs),
    /// Minimum-volatility allocation for a target return
    PortfolioOptimization(MarketArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::BondPrice(args) => commands::fixed_income::run_bond_price(args),
        Commands::BondYtm(args) => commands::fixed_income::run_bond_ytm(args),
        Commands::ModifiedDuration(args) => commands::fixed_income::run_modified_duration(args),
        Commands::Loan(args) => commands::lending::run_loan(args),
        Commands::Mortgage(args) => commands::lending::run_mortgage(args),
        Commands::CreditPayoff(args) => commands::lending::run_credit_payoff(args),
        Commands::CompoundInterest(args) => commands::growth::run_compound_interest(args),
        Commands::Cd(args) => commands::growth::run_cd(args),
        Commands::Retirement(args) => commands::growth::run_retirement(args),
        Commands::SavingsGoal(args) => commands::growth::run_savings_goal(args),
        Commands::RuleOf72(args) => commands::growth::run_rule_of_72(args),
        Commands::InvestmentReturn(args) => commands::growth::run_investment_return(args),
        Commands::DividendIncome(args) => commands::growth::run_dividend_income(args),
        Commands::Budget(args) => commands::household::run_budget(args),
        Commands::DebtToIncome(args) => commands::household::run_debt_to_income(args),
        Commands::NetWorth(args) => commands::household::run_net_worth(args),
        Commands::CurrencyConversion(args) => commands::household::run_currency_conversion(args),
        Commands::BreakEven(args) => commands::business::run_break_even(args),
        Commands::StockAnalysis(args) => commands::market::run_stock_analysis(args),
        Commands::PortfolioOptimization(args) => commands::market::run_portfolio_optimization(args),
        Commands::Version => {
            println!("fincalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
