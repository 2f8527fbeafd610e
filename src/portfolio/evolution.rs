//! Day-by-day evolution of a portfolio over a date range
//!
//! Every day is valued independently from the holdings' original snapshots,
//! never from the previous day, so days run in parallel and rounding never
//! accumulates.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use super::report::EvolutionSummary;
use super::Portfolio;
use crate::holding::{calendar, Amount, HoldingId, HoldingKind};
use crate::{ProjectionError, ProjectionResult};

/// Value of one holding on one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingValue {
    pub id: HoldingId,
    pub name: String,
    pub value: Amount,
}

/// Projected portfolio on one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    /// Sum of holding contributions (flows are counted through their target)
    pub total: Amount,
    /// One entry per holding, in portfolio order
    pub holdings: Vec<HoldingValue>,
}

/// Daily values of one holding across the range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingSeries {
    pub id: HoldingId,
    pub name: String,
    pub kind: HoldingKind,
    pub values: Vec<Amount>,
}

/// A flow occurrence that leaves its target balance negative
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpossibleFlow {
    pub flow_id: HoldingId,
    pub flow_name: String,
    pub target_id: HoldingId,
    pub target_name: String,
    pub date: NaiveDate,
    pub amount: Amount,
    pub resulting_balance: Amount,
}

/// Evolution of a portfolio over `[start, end]`, computed once at construction
#[derive(Debug, Clone)]
pub struct PortfolioEvolution {
    name: String,
    portfolio: Portfolio,
    start: NaiveDate,
    end: NaiveDate,
    daily: BTreeMap<NaiveDate, DailySnapshot>,
    series: Vec<HoldingSeries>,
    impossible_flows: Vec<ImpossibleFlow>,
}

impl PortfolioEvolution {
    /// Build the evolution. Fails when `start > end`.
    pub fn new(
        name: impl Into<String>,
        portfolio: Portfolio,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ProjectionResult<Self> {
        if start > end {
            return Err(ProjectionError::InvalidRange { start, end });
        }
        let name = name.into();

        let days = calendar::days_between(start, end);
        log::debug!(
            "Building evolution '{}' of '{}': {} holdings over {} days",
            name,
            portfolio.name(),
            portfolio.holdings().len(),
            days.len()
        );

        let snapshots: Vec<DailySnapshot> = days
            .par_iter()
            .map(|&date| snapshot_on(&portfolio, date))
            .collect();

        let series = holding_series(&portfolio, &snapshots);
        let impossible_flows = impossible_flows(&portfolio, start, end);
        for impossible in &impossible_flows {
            log::warn!(
                "Flow '{}' leaves '{}' at {} on {}",
                impossible.flow_name,
                impossible.target_name,
                impossible.resulting_balance,
                impossible.date
            );
        }

        let daily = snapshots
            .into_iter()
            .map(|snapshot| (snapshot.date, snapshot))
            .collect();

        let evolution = Self {
            name,
            portfolio,
            start,
            end,
            daily,
            series,
            impossible_flows,
        };
        log::info!(
            "Evolution '{}' built: {} days, {} impossible flow occurrences",
            evolution.name,
            evolution.daily.len(),
            evolution.impossible_flows.len()
        );
        Ok(evolution)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Every day of the range, in order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.daily.keys().copied()
    }

    /// Full per-day snapshot table
    pub fn daily(&self) -> &BTreeMap<NaiveDate, DailySnapshot> {
        &self.daily
    }

    pub fn snapshot_on(&self, date: NaiveDate) -> Option<&DailySnapshot> {
        self.daily.get(&date)
    }

    /// Portfolio totals, one per day in date order
    pub fn aggregate_series(&self) -> Vec<Amount> {
        self.daily.values().map(|snapshot| snapshot.total).collect()
    }

    /// Per-holding daily values, in portfolio order
    pub fn holding_series(&self) -> &[HoldingSeries] {
        &self.series
    }

    pub fn series_for(&self, id: HoldingId) -> Option<&[Amount]> {
        self.series
            .iter()
            .find(|series| series.id == id)
            .map(|series| series.values.as_slice())
    }

    /// Holding identity to its daily values
    pub fn series_by_holding(&self) -> BTreeMap<HoldingId, &[Amount]> {
        self.series
            .iter()
            .map(|series| (series.id, series.values.as_slice()))
            .collect()
    }

    pub fn impossible_flows(&self) -> &[ImpossibleFlow] {
        &self.impossible_flows
    }

    pub fn summary(&self) -> EvolutionSummary {
        EvolutionSummary::from_evolution(self)
    }
}

fn snapshot_on(portfolio: &Portfolio, date: NaiveDate) -> DailySnapshot {
    let holdings: Vec<HoldingValue> = portfolio
        .holdings()
        .iter()
        .map(|holding| HoldingValue {
            id: holding.id(),
            name: holding.name().to_string(),
            value: holding.value_at(date),
        })
        .collect();
    let total = portfolio
        .holdings()
        .iter()
        .map(|holding| holding.contribution_at(date))
        .fold(0, Amount::saturating_add);

    DailySnapshot { date, total, holdings }
}

fn holding_series(portfolio: &Portfolio, snapshots: &[DailySnapshot]) -> Vec<HoldingSeries> {
    portfolio
        .holdings()
        .iter()
        .enumerate()
        .map(|(index, holding)| HoldingSeries {
            id: holding.id(),
            name: holding.name().to_string(),
            kind: holding.kind(),
            values: snapshots.iter().map(|snapshot| snapshot.holdings[index].value).collect(),
        })
        .collect()
}

/// Occurrences of flows registered on the portfolio's cash balances that
/// leave the balance below zero, in date order
fn impossible_flows(portfolio: &Portfolio, start: NaiveDate, end: NaiveDate) -> Vec<ImpossibleFlow> {
    let mut impossible: Vec<ImpossibleFlow> = portfolio
        .cash_balances()
        .flat_map(|cash| {
            cash.settlements_between(start, end)
                .into_iter()
                .filter(|settlement| settlement.balance_after < 0)
                .map(move |settlement| ImpossibleFlow {
                    flow_id: settlement.flow_id,
                    flow_name: settlement.flow_name,
                    target_id: cash.id(),
                    target_name: cash.name().to_string(),
                    date: settlement.date,
                    amount: settlement.amount,
                    resulting_balance: settlement.balance_after,
                })
        })
        .collect();
    impossible.sort_by_key(|flow| flow.date);
    impossible
}
