//! Portfolios and their day-by-day evolution

mod evolution;
mod report;

pub use evolution::{DailySnapshot, HoldingSeries, HoldingValue, ImpossibleFlow, PortfolioEvolution};
pub use report::{write_csv, EvolutionSummary};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::holding::{Amount, CashBalance, Holding, HoldingId};

/// Owner of a portfolio. Display only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A named set of holdings owned by one person, anchored at one date
#[derive(Debug, Clone)]
pub struct Portfolio {
    name: String,
    owner: Person,
    date: NaiveDate,
    holdings: Vec<Holding>,
}

impl Portfolio {
    /// Holdings are unique by identity: later duplicates are dropped,
    /// insertion order is kept.
    pub fn new(
        name: impl Into<String>,
        owner: Person,
        date: NaiveDate,
        holdings: impl IntoIterator<Item = Holding>,
    ) -> Self {
        let mut seen = HashSet::new();
        let holdings = holdings
            .into_iter()
            .filter(|holding| seen.insert(holding.id()))
            .collect();

        Self {
            name: name.into(),
            owner,
            date,
            holdings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &Person {
        &self.owner
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn holding(&self, id: HoldingId) -> Option<&Holding> {
        self.holdings.iter().find(|holding| holding.id() == id)
    }

    pub fn contains(&self, id: HoldingId) -> bool {
        self.holding(id).is_some()
    }

    pub fn cash_balances(&self) -> impl Iterator<Item = &CashBalance> {
        self.holdings.iter().filter_map(Holding::as_cash)
    }

    /// Total value on `date`, each holding valued from its own snapshot
    pub fn value_at(&self, date: NaiveDate) -> Amount {
        self.holdings
            .iter()
            .map(|holding| holding.contribution_at(date))
            .fold(0, Amount::saturating_add)
    }

    /// Total value at the portfolio date
    pub fn book_value(&self) -> Amount {
        self.value_at(self.date)
    }

    /// Snapshot of the portfolio with every holding projected to `date`
    pub fn project_to(&self, date: NaiveDate) -> Portfolio {
        Portfolio {
            name: self.name.clone(),
            owner: self.owner.clone(),
            date,
            holdings: self.holdings.iter().map(|holding| holding.project_to(date)).collect(),
        }
    }
}
