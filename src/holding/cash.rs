//! Cash balance valuation

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use super::flow::{FlowTerms, ScheduledFlow};
use super::{check_name, Amount, Currency, HoldingId, Valuation};
use crate::{ProjectionError, ProjectionResult};

/// A flow as seen from the balance it targets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredFlow {
    pub id: HoldingId,
    pub name: String,
    pub terms: FlowTerms,
}

/// One applied flow occurrence and the balance right after it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    pub flow_id: HoldingId,
    pub flow_name: String,
    pub date: NaiveDate,
    pub amount: Amount,
    pub balance_after: Amount,
}

/// A cash balance, known exactly at its reference date.
///
/// Flows targeting the balance are registered into a list shared by the
/// balance and all its projections. The list holds flow terms only, never the
/// flows themselves.
#[derive(Debug, Clone)]
pub struct CashBalance {
    id: HoldingId,
    name: String,
    currency: Currency,
    opening_date: NaiveDate,
    /// Authoritative snapshot every valuation starts from
    origin: Valuation,
    /// Snapshot reported as `t` / `book_value`
    as_of: Valuation,
    flows: Arc<RwLock<Vec<RegisteredFlow>>>,
}

impl CashBalance {
    /// Balance opened on its reference date
    pub fn new(
        name: impl Into<String>,
        t: NaiveDate,
        book_value: Amount,
        currency: Currency,
    ) -> ProjectionResult<Self> {
        Self::opened(name, t, t, book_value, currency)
    }

    /// Balance with an opening date distinct from its reference date
    pub fn opened(
        name: impl Into<String>,
        opening_date: NaiveDate,
        t: NaiveDate,
        book_value: Amount,
        currency: Currency,
    ) -> ProjectionResult<Self> {
        let name = name.into();
        check_name(&name)?;

        let origin = Valuation::new(t, book_value);
        Ok(Self {
            id: HoldingId::new(),
            name,
            currency,
            opening_date,
            origin,
            as_of: origin,
            flows: Arc::new(RwLock::new(Vec::new())),
        })
    }

    pub fn id(&self) -> HoldingId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn opening_date(&self) -> NaiveDate {
        self.opening_date
    }

    pub fn t(&self) -> NaiveDate {
        self.as_of.date
    }

    pub fn book_value(&self) -> Amount {
        self.as_of.amount
    }

    /// Snapshot all valuations are computed from
    pub fn origin(&self) -> Valuation {
        self.origin
    }

    /// Value on `date`.
    ///
    /// Zero before the opening date. On the origin date the recorded amount is
    /// returned as is; movements dated that day show from any later date on.
    pub fn value_at(&self, date: NaiveDate) -> Amount {
        if date < self.opening_date {
            return 0;
        }
        if date == self.origin.date {
            return self.origin.amount;
        }
        self.settled_value_at(date)
    }

    /// Balance after every movement dated on or before `date`
    pub fn settled_value_at(&self, date: NaiveDate) -> Amount {
        if date < self.opening_date {
            return 0;
        }
        self.running_balance(date)
    }

    pub fn project_to(&self, date: NaiveDate) -> CashBalance {
        CashBalance {
            as_of: Valuation::new(date, self.value_at(date)),
            ..self.clone()
        }
    }

    /// Register a flow against this balance. Registering twice is a no-op.
    pub fn register_flow(&self, flow: &ScheduledFlow) -> ProjectionResult<()> {
        if flow.target().id() != self.id {
            return Err(ProjectionError::FlowTargetMismatch {
                flow: flow.name().to_string(),
                balance: self.name.clone(),
            });
        }
        self.register_terms(flow.id(), flow.name(), flow.terms());
        Ok(())
    }

    pub(crate) fn register_terms(&self, id: HoldingId, name: &str, terms: &FlowTerms) {
        let mut flows = self.flows.write().unwrap_or_else(PoisonError::into_inner);
        if flows.iter().any(|flow| flow.id == id) {
            return;
        }
        log::debug!("Registering flow '{}' on cash balance '{}'", name, self.name);
        flows.push(RegisteredFlow {
            id,
            name: name.to_string(),
            terms: terms.clone(),
        });
    }

    /// Flows registered so far, in registration order
    pub fn registered_flows(&self) -> Vec<RegisteredFlow> {
        self.read_flows().clone()
    }

    /// Applied flow occurrences in `[from, to]`, each with the balance at the
    /// end of its day. Occurrences before the origin never apply and are
    /// skipped. Occurrences before the opening date still move the balance
    /// carried into the opening, so they are listed with that running balance.
    pub fn settlements_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<Settlement> {
        let lower = from.max(self.origin.date);
        let flows = self.registered_flows();

        let mut settlements: Vec<Settlement> = flows
            .iter()
            .flat_map(|flow| {
                flow.terms.occurrences(lower, to).map(move |date| (flow, date))
            })
            .map(|(flow, date)| Settlement {
                flow_id: flow.id,
                flow_name: flow.name.clone(),
                date,
                amount: flow.terms.amount,
                balance_after: self.running_balance(date),
            })
            .collect();
        settlements.sort_by_key(|settlement| settlement.date);
        settlements
    }

    /// Origin amount plus every occurrence in `[origin, date]`, saturating at
    /// the bounds of `Amount`
    fn running_balance(&self, date: NaiveDate) -> Amount {
        self.read_flows()
            .iter()
            .map(|flow| {
                let count = flow.terms.occurrence_count(self.origin.date, date);
                flow.terms.amount.saturating_mul(count)
            })
            .fold(self.origin.amount, Amount::saturating_add)
    }

    fn read_flows(&self) -> RwLockReadGuard<'_, Vec<RegisteredFlow>> {
        self.flows.read().unwrap_or_else(PoisonError::into_inner)
    }
}
