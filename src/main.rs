//! Wealth Projection CLI
//!
//! Loads a portfolio definition and prints its day-by-day evolution

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::Parser;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use wealth_projection::portfolio::{write_csv, DailySnapshot, HoldingSeries};
use wealth_projection::{load_portfolio, EvolutionSummary, ImpossibleFlow, PortfolioEvolution};

/// Days projected after the portfolio date when no end is given
const DEFAULT_HORIZON_DAYS: i64 = 30;

/// Number of days printed to the console
const CONSOLE_ROWS: usize = 31;

#[derive(Debug, Parser)]
#[command(name = "wealth_projection", version, about = "Project a portfolio day by day")]
struct Args {
    /// Portfolio definition (JSON)
    #[arg(short, long)]
    portfolio: PathBuf,

    /// First day of the evolution (defaults to the portfolio date)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day of the evolution (defaults to 30 days after the start)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Name of the evolution
    #[arg(long, default_value = "evolution")]
    name: String,

    /// Write the full daily table to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the evolution as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct EvolutionOutput<'a> {
    name: &'a str,
    portfolio: &'a str,
    owner: &'a str,
    start: NaiveDate,
    end: NaiveDate,
    summary: EvolutionSummary,
    daily: Vec<&'a DailySnapshot>,
    holdings: &'a [HoldingSeries],
    impossible_flows: &'a [ImpossibleFlow],
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let portfolio = load_portfolio(&args.portfolio)
        .with_context(|| format!("Unable to load portfolio {}", args.portfolio.display()))?;

    let start = args.start.unwrap_or(portfolio.date());
    let end = args.end.unwrap_or(start + Duration::days(DEFAULT_HORIZON_DAYS));
    let evolution = PortfolioEvolution::new(args.name.clone(), portfolio, start, end)
        .context("Unable to build the evolution")?;

    if let Some(path) = &args.csv {
        let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
        write_csv(&evolution, BufWriter::new(file)).context("Unable to write CSV output")?;
        log::info!("Daily table written to {}", path.display());
    }

    if args.json {
        print_json(&evolution)
    } else {
        print_table(&evolution);
        Ok(())
    }
}

fn print_json(evolution: &PortfolioEvolution) -> Result<()> {
    let portfolio = evolution.portfolio();
    let output = EvolutionOutput {
        name: evolution.name(),
        portfolio: portfolio.name(),
        owner: &portfolio.owner().name,
        start: evolution.start(),
        end: evolution.end(),
        summary: evolution.summary(),
        daily: evolution.daily().values().collect(),
        holdings: evolution.holding_series(),
        impossible_flows: evolution.impossible_flows(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_table(evolution: &PortfolioEvolution) {
    let portfolio = evolution.portfolio();
    println!("Portfolio: {} ({})", portfolio.name(), portfolio.owner().name);
    println!("Evolution: {} from {} to {}", evolution.name(), evolution.start(), evolution.end());
    println!();

    print!("{:>10} {:>14}", "Date", "Total");
    for series in evolution.holding_series() {
        print!(" {:>14}", truncate(&series.name, 14));
    }
    println!();
    println!("{}", "-".repeat(25 + 15 * evolution.holding_series().len()));

    for snapshot in evolution.daily().values().take(CONSOLE_ROWS) {
        print!("{:>10} {:>14}", snapshot.date, snapshot.total);
        for holding in &snapshot.holdings {
            print!(" {:>14}", holding.value);
        }
        println!();
    }
    if evolution.daily().len() > CONSOLE_ROWS {
        println!("... ({} more days)", evolution.daily().len() - CONSOLE_ROWS);
    }

    let summary = evolution.summary();
    println!("\nSummary:");
    println!("  Days: {}", summary.total_days);
    println!("  Opening value: {}", summary.opening_value);
    println!("  Closing value: {}", summary.closing_value);
    println!("  Lowest value: {} on {}", summary.min_value, summary.min_date);
    println!("  Highest value: {} on {}", summary.max_value, summary.max_date);

    if !evolution.impossible_flows().is_empty() {
        println!("\nImpossible flows:");
        for flow in evolution.impossible_flows() {
            println!(
                "  {} {} ({}) leaves {} at {}",
                flow.date, flow.flow_name, flow.amount, flow.target_name, flow.resulting_balance
            );
        }
    }
}

fn truncate(name: &str, width: usize) -> String {
    name.chars().take(width).collect()
}
