//! Load portfolios from JSON definitions
//!
//! ```json
//! {
//!   "name": "Ilo at 2024-05-13",
//!   "owner": "Ilo",
//!   "date": "2024-05-13",
//!   "currency": "MGA",
//!   "holdings": [
//!     { "kind": "cash", "name": "Cash", "value": 600000 },
//!     { "kind": "flow", "name": "Living costs", "target": "Cash",
//!       "start": "2024-02-03", "end": "2024-08-20", "amount": -100000, "day_of_month": 15 },
//!     { "kind": "asset", "name": "Laptop", "value": 2000000,
//!       "acquisition_date": "2021-10-24", "annual_rate": -0.1, "law": "linear" }
//!   ]
//! }
//! ```
//!
//! Reference dates default to the portfolio date, opening dates to the
//! reference date and currencies to the portfolio currency.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

use crate::holding::{Amount, CashBalance, Currency, DepreciatingAsset, Holding, ScheduledFlow, ValuationLaw};
use crate::portfolio::{Person, Portfolio};
use crate::ProjectionError;

/// Errors raised while loading a portfolio definition
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read portfolio file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed portfolio definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Flow '{flow}' targets unknown cash balance '{target}'")]
    UnknownTarget { flow: String, target: String },

    #[error("Cash balance name '{0}' is used more than once")]
    DuplicateCash(String),

    #[error(transparent)]
    Holding(#[from] ProjectionError),
}

/// Raw portfolio definition
#[derive(Debug, Deserialize)]
struct PortfolioFile {
    name: String,
    owner: String,
    date: NaiveDate,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    holdings: Vec<HoldingEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum HoldingEntry {
    Cash {
        name: String,
        value: Amount,
        #[serde(default)]
        t: Option<NaiveDate>,
        #[serde(default)]
        opening_date: Option<NaiveDate>,
        #[serde(default)]
        currency: Option<String>,
    },
    Flow {
        name: String,
        target: String,
        start: NaiveDate,
        end: NaiveDate,
        amount: Amount,
        day_of_month: u32,
    },
    Asset {
        name: String,
        value: Amount,
        acquisition_date: NaiveDate,
        annual_rate: f64,
        #[serde(default)]
        t: Option<NaiveDate>,
        #[serde(default)]
        law: ValuationLaw,
        #[serde(default)]
        currency: Option<String>,
    },
}

impl PortfolioFile {
    fn to_portfolio(self) -> Result<Portfolio, LoadError> {
        let default_currency = self.currency.map(Currency::new).unwrap_or_else(Currency::unnamed);
        let currency_or_default =
            |code: Option<String>| code.map(Currency::new).unwrap_or_else(|| default_currency.clone());

        // Balances first so flows can reference any of them regardless of order
        let mut balances: HashMap<String, CashBalance> = HashMap::new();
        for entry in &self.holdings {
            if let HoldingEntry::Cash { name, value, t, opening_date, currency } = entry {
                let t = (*t).unwrap_or(self.date);
                let cash = CashBalance::opened(
                    name.clone(),
                    (*opening_date).unwrap_or(t),
                    t,
                    *value,
                    currency_or_default(currency.clone()),
                )?;
                if balances.insert(name.clone(), cash).is_some() {
                    return Err(LoadError::DuplicateCash(name.clone()));
                }
            }
        }

        let mut holdings: Vec<Holding> = Vec::with_capacity(self.holdings.len());
        for entry in self.holdings {
            let holding = match entry {
                HoldingEntry::Cash { name, .. } => match balances.get(&name) {
                    Some(cash) => Holding::Cash(cash.clone()),
                    None => continue,
                },
                HoldingEntry::Flow { name, target, start, end, amount, day_of_month } => {
                    let cash = balances.get(&target).ok_or_else(|| LoadError::UnknownTarget {
                        flow: name.clone(),
                        target: target.clone(),
                    })?;
                    Holding::Flow(ScheduledFlow::new(name, cash, start, end, amount, day_of_month)?)
                }
                HoldingEntry::Asset { name, value, acquisition_date, annual_rate, t, law, currency } => {
                    Holding::Asset(DepreciatingAsset::with_law(
                        name,
                        t.unwrap_or(self.date),
                        value,
                        acquisition_date,
                        annual_rate,
                        law,
                        currency_or_default(currency),
                    )?)
                }
            };
            holdings.push(holding);
        }

        log::debug!("Loaded portfolio '{}' with {} holdings", self.name, holdings.len());
        Ok(Portfolio::new(self.name, Person::new(self.owner), self.date, holdings))
    }
}

/// Load a portfolio from a JSON file
pub fn load_portfolio<P: AsRef<Path>>(path: P) -> Result<Portfolio, LoadError> {
    let file = File::open(path)?;
    load_portfolio_from_reader(BufReader::new(file))
}

/// Load a portfolio from any reader (e.g., string buffer, network stream)
pub fn load_portfolio_from_reader<R: Read>(reader: R) -> Result<Portfolio, LoadError> {
    let file: PortfolioFile = serde_json::from_reader(reader)?;
    file.to_portfolio()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holding::HoldingKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const DEFINITION: &str = r#"{
        "name": "Ilo at 2024-05-13",
        "owner": "Ilo",
        "date": "2024-05-13",
        "currency": "MGA",
        "holdings": [
            { "kind": "flow", "name": "Living costs", "target": "Cash",
              "start": "2024-02-03", "end": "2024-08-20", "amount": -100000, "day_of_month": 15 },
            { "kind": "cash", "name": "Cash", "value": 600000 },
            { "kind": "asset", "name": "Laptop", "value": 2000000, "t": "2021-10-26",
              "acquisition_date": "2021-10-24", "annual_rate": -0.1, "law": "linear", "currency": "EUR" }
        ]
    }"#;

    #[test]
    fn test_load_definition() {
        let portfolio = load_portfolio_from_reader(DEFINITION.as_bytes()).unwrap();

        assert_eq!(portfolio.name(), "Ilo at 2024-05-13");
        assert_eq!(portfolio.owner(), &Person::new("Ilo"));
        assert_eq!(portfolio.date(), date(2024, 5, 13));

        let kinds: Vec<_> = portfolio.holdings().iter().map(Holding::kind).collect();
        assert_eq!(kinds, vec![HoldingKind::Flow, HoldingKind::Cash, HoldingKind::Asset]);

        let cash = portfolio.cash_balances().next().unwrap();
        assert_eq!(cash.currency(), &Currency::new("MGA"));
        assert_eq!(cash.value_at(date(2024, 5, 15)), 500_000);

        let laptop = portfolio.holdings()[2].as_asset().unwrap();
        assert_eq!(laptop.law(), ValuationLaw::Linear);
        assert_eq!(laptop.currency(), &Currency::new("EUR"));
        assert_eq!(laptop.value_at(date(2024, 6, 26)), 1_466_301);
    }

    #[test]
    fn test_unknown_target() {
        let definition = r#"{
            "name": "P", "owner": "Ilo", "date": "2024-05-13",
            "holdings": [
                { "kind": "flow", "name": "Rent", "target": "Nowhere",
                  "start": "2024-01-01", "end": "2024-12-31", "amount": -10, "day_of_month": 1 }
            ]
        }"#;
        let result = load_portfolio_from_reader(definition.as_bytes());
        assert!(matches!(result, Err(LoadError::UnknownTarget { .. })));
    }

    #[test]
    fn test_duplicate_cash_name() {
        let definition = r#"{
            "name": "P", "owner": "Ilo", "date": "2024-05-13",
            "holdings": [
                { "kind": "cash", "name": "Cash", "value": 1 },
                { "kind": "cash", "name": "Cash", "value": 2 }
            ]
        }"#;
        let result = load_portfolio_from_reader(definition.as_bytes());
        assert!(matches!(result, Err(LoadError::DuplicateCash(name)) if name == "Cash"));
    }

    #[test]
    fn test_invalid_holding_surfaces() {
        let definition = r#"{
            "name": "P", "owner": "Ilo", "date": "2024-05-13",
            "holdings": [
                { "kind": "cash", "name": "Cash", "value": 1 },
                { "kind": "flow", "name": "Rent", "target": "Cash",
                  "start": "2024-01-01", "end": "2024-12-31", "amount": -10, "day_of_month": 40 }
            ]
        }"#;
        let result = load_portfolio_from_reader(definition.as_bytes());
        assert!(matches!(result, Err(LoadError::Holding(ProjectionError::InvalidHolding { .. }))));
    }

    #[test]
    fn test_malformed_json() {
        let result = load_portfolio_from_reader("{ \"name\": ".as_bytes());
        assert!(matches!(result, Err(LoadError::Json(_))));
    }

    #[test]
    fn test_defaults() {
        let definition = r#"{ "name": "P", "owner": "Ilo", "date": "2024-05-13",
            "holdings": [ { "kind": "cash", "name": "Cash", "value": 5 } ] }"#;
        let portfolio = load_portfolio_from_reader(definition.as_bytes()).unwrap();
        let cash = portfolio.cash_balances().next().unwrap();

        assert!(cash.currency().is_unnamed());
        assert_eq!(cash.t(), date(2024, 5, 13));
        assert_eq!(cash.opening_date(), date(2024, 5, 13));
    }
}
