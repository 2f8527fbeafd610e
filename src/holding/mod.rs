//! Holdings: cash balances, scheduled flows and depreciating assets
//!
//! Every holding answers the same two questions:
//! - `value_at(date)`: its value on an arbitrary date
//! - `project_to(date)`: a copy whose reference date is `date`
//!
//! Values are always derived from the holding's original reference snapshot,
//! so projections can be chained without drift.

pub mod calendar;
mod cash;
mod flow;
mod asset;

pub use cash::{CashBalance, RegisteredFlow, Settlement};
pub use flow::{FlowTerms, ScheduledFlow};
pub use asset::{DepreciatingAsset, ValuationLaw};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Monetary amount in the currency's smallest unit
pub type Amount = i64;

/// Identity of a holding, preserved across projections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HoldingId(Uuid);

impl HoldingId {
    pub(crate) fn new() -> Self {
        HoldingId(Uuid::new_v4())
    }
}

impl fmt::Display for HoldingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Opaque currency tag. Never converted or combined arithmetically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    const UNNAMED: &'static str = "unnamed";

    pub fn new(code: impl Into<String>) -> Self {
        Currency(code.into())
    }

    /// Sentinel for holdings whose currency was never named
    pub fn unnamed() -> Self {
        Currency(Self::UNNAMED.to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn is_unnamed(&self) -> bool {
        self.0 == Self::UNNAMED
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An amount that is authoritative on a given date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    pub date: NaiveDate,
    pub amount: Amount,
}

impl Valuation {
    pub fn new(date: NaiveDate, amount: Amount) -> Self {
        Self { date, amount }
    }
}

/// Variant tag of a holding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingKind {
    Cash,
    Flow,
    Asset,
}

/// Any item of value tracked in a portfolio
#[derive(Debug, Clone)]
pub enum Holding {
    Cash(CashBalance),
    Flow(ScheduledFlow),
    Asset(DepreciatingAsset),
}

impl Holding {
    pub fn id(&self) -> HoldingId {
        match self {
            Holding::Cash(cash) => cash.id(),
            Holding::Flow(flow) => flow.id(),
            Holding::Asset(asset) => asset.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Holding::Cash(cash) => cash.name(),
            Holding::Flow(flow) => flow.name(),
            Holding::Asset(asset) => asset.name(),
        }
    }

    pub fn kind(&self) -> HoldingKind {
        match self {
            Holding::Cash(_) => HoldingKind::Cash,
            Holding::Flow(_) => HoldingKind::Flow,
            Holding::Asset(_) => HoldingKind::Asset,
        }
    }

    pub fn currency(&self) -> &Currency {
        match self {
            Holding::Cash(cash) => cash.currency(),
            Holding::Flow(flow) => flow.currency(),
            Holding::Asset(asset) => asset.currency(),
        }
    }

    /// Reference date of the held snapshot
    pub fn t(&self) -> NaiveDate {
        match self {
            Holding::Cash(cash) => cash.t(),
            Holding::Flow(flow) => flow.t(),
            Holding::Asset(asset) => asset.t(),
        }
    }

    /// Value at the reference date
    pub fn book_value(&self) -> Amount {
        match self {
            Holding::Cash(cash) => cash.book_value(),
            Holding::Flow(flow) => flow.book_value(),
            Holding::Asset(asset) => asset.book_value(),
        }
    }

    pub fn value_at(&self, date: NaiveDate) -> Amount {
        match self {
            Holding::Cash(cash) => cash.value_at(date),
            Holding::Flow(flow) => flow.value_at(date),
            Holding::Asset(asset) => asset.value_at(date),
        }
    }

    pub fn project_to(&self, date: NaiveDate) -> Holding {
        match self {
            Holding::Cash(cash) => Holding::Cash(cash.project_to(date)),
            Holding::Flow(flow) => Holding::Flow(flow.project_to(date)),
            Holding::Asset(asset) => Holding::Asset(asset.project_to(date)),
        }
    }

    /// What this holding adds to a portfolio total on `date`.
    /// A flow holds no balance of its own; its effect is counted by its target.
    pub fn contribution_at(&self, date: NaiveDate) -> Amount {
        match self {
            Holding::Flow(_) => 0,
            other => other.value_at(date),
        }
    }

    pub fn as_cash(&self) -> Option<&CashBalance> {
        match self {
            Holding::Cash(cash) => Some(cash),
            _ => None,
        }
    }

    pub fn as_flow(&self) -> Option<&ScheduledFlow> {
        match self {
            Holding::Flow(flow) => Some(flow),
            _ => None,
        }
    }

    pub fn as_asset(&self) -> Option<&DepreciatingAsset> {
        match self {
            Holding::Asset(asset) => Some(asset),
            _ => None,
        }
    }
}

impl From<CashBalance> for Holding {
    fn from(cash: CashBalance) -> Self {
        Holding::Cash(cash)
    }
}

impl From<ScheduledFlow> for Holding {
    fn from(flow: ScheduledFlow) -> Self {
        Holding::Flow(flow)
    }
}

impl From<DepreciatingAsset> for Holding {
    fn from(asset: DepreciatingAsset) -> Self {
        Holding::Asset(asset)
    }
}

pub(crate) fn check_name(name: &str) -> crate::ProjectionResult<()> {
    if name.trim().is_empty() {
        return Err(crate::ProjectionError::invalid_holding(name, "name must not be empty"));
    }
    Ok(())
}
