//! Scheduled monthly money flows

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar;
use super::cash::CashBalance;
use super::{check_name, Amount, Currency, HoldingId};
use crate::{ProjectionError, ProjectionResult};

/// Schedule and amount of a monthly flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowTerms {
    /// First day of the active window (inclusive)
    pub start: NaiveDate,
    /// Last day of the active window (inclusive)
    pub end: NaiveDate,
    /// Signed amount applied on each occurrence
    pub amount: Amount,
    /// Day of month, 1..=31, clamped to the month's last day
    pub day_of_month: u32,
}

impl FlowTerms {
    /// Occurrences within both `[from, to]` and the active window
    pub fn occurrences(&self, from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        calendar::monthly_occurrences(self.day_of_month, from.max(self.start), to.min(self.end))
    }

    pub fn occurrence_count(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        self.occurrences(from, to).count() as i64
    }

    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.occurrences(date, date).next().is_some()
    }

    /// A window starting after it ends never produces an occurrence
    pub fn is_degenerate(&self) -> bool {
        self.start > self.end
    }
}

/// A recurring transfer into or out of a cash balance.
///
/// The flow holds no balance of its own: its value on any date is the value
/// of the balance it targets.
#[derive(Debug, Clone)]
pub struct ScheduledFlow {
    id: HoldingId,
    name: String,
    target: CashBalance,
    terms: FlowTerms,
}

impl ScheduledFlow {
    /// Create a flow and register it on `target`
    pub fn new(
        name: impl Into<String>,
        target: &CashBalance,
        start: NaiveDate,
        end: NaiveDate,
        amount: Amount,
        day_of_month: u32,
    ) -> ProjectionResult<Self> {
        let name = name.into();
        check_name(&name)?;
        if !(1..=31).contains(&day_of_month) {
            return Err(ProjectionError::invalid_holding(
                &name,
                format!("day of month {} is outside 1..=31", day_of_month),
            ));
        }

        let terms = FlowTerms { start, end, amount, day_of_month };
        if terms.is_degenerate() {
            log::debug!("Flow '{}' has an empty window ({} > {})", name, start, end);
        }

        let flow = Self {
            id: HoldingId::new(),
            name,
            target: target.clone(),
            terms,
        };
        target.register_terms(flow.id, &flow.name, &flow.terms);
        Ok(flow)
    }

    pub fn id(&self) -> HoldingId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flows move money in their target's currency
    pub fn currency(&self) -> &Currency {
        self.target.currency()
    }

    pub fn target(&self) -> &CashBalance {
        &self.target
    }

    pub fn terms(&self) -> &FlowTerms {
        &self.terms
    }

    pub fn t(&self) -> NaiveDate {
        self.target.t()
    }

    pub fn book_value(&self) -> Amount {
        self.target.book_value()
    }

    pub fn value_at(&self, date: NaiveDate) -> Amount {
        self.target.value_at(date)
    }

    pub fn project_to(&self, date: NaiveDate) -> ScheduledFlow {
        ScheduledFlow {
            target: self.target.project_to(date),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_projection_moves_target() {
        let start = date(2024, 5, 1);
        let balance = CashBalance::new("Cash", start, 1000, Currency::unnamed()).unwrap();
        let flow = ScheduledFlow::new("Flow", &balance, start, date(2024, 5, 31), 100, 1).unwrap();

        let projected = flow.project_to(date(2024, 6, 1));

        assert_eq!(projected.target().book_value(), 1100);
        assert_eq!(projected.terms(), flow.terms());
        assert_eq!(projected.id(), flow.id());
    }

    #[test]
    fn test_two_weeks_after_reference() {
        // Occurrence on the reference day counts for every later date
        for t0 in [date(2024, 5, 1), date(2024, 1, 31), date(2024, 2, 20), date(2023, 12, 25)] {
            let balance = CashBalance::new("Cash", t0, 1000, Currency::unnamed()).unwrap();
            let end = t0 + Duration::days(14);
            let flow = ScheduledFlow::new("Flow", &balance, t0, end, 100, t0.day()).unwrap();

            assert_eq!(balance.value_at(end), 1100, "reference {}", t0);
            assert_eq!(flow.value_at(end), 1100, "reference {}", t0);
            assert_eq!(balance.value_at(t0), 1000, "reference {}", t0);
        }
    }

    #[test]
    fn test_month_end_anchor_reduces_balance() {
        let t = date(2024, 5, 13);
        let balance = CashBalance::new("Cash", t, 600_000, Currency::unnamed()).unwrap();
        let flow = ScheduledFlow::new(
            "Month end",
            &balance,
            t - Duration::days(30),
            t + Duration::days(30),
            -50_000,
            31,
        )
        .unwrap();

        let projected = flow.project_to(date(2024, 6, 13));
        assert_eq!(projected.target().book_value(), 550_000);
    }

    #[test]
    fn test_anchor_out_of_range() {
        let t = date(2024, 5, 13);
        let balance = CashBalance::new("Cash", t, 0, Currency::unnamed()).unwrap();

        for day in [0, 32] {
            let result = ScheduledFlow::new("Flow", &balance, t, t, 10, day);
            assert!(matches!(result, Err(ProjectionError::InvalidHolding { .. })));
        }
        assert!(balance.registered_flows().is_empty());
    }

    #[test]
    fn test_degenerate_window_never_occurs() {
        let terms = FlowTerms {
            start: date(2024, 12, 26),
            end: date(2024, 9, 17),
            amount: 400_000,
            day_of_month: 30,
        };
        assert!(terms.is_degenerate());
        assert_eq!(terms.occurrence_count(date(2020, 1, 1), date(2030, 1, 1)), 0);
    }

    #[test]
    fn test_occurs_on() {
        let terms = FlowTerms {
            start: date(2024, 2, 3),
            end: date(2024, 8, 20),
            amount: -100_000,
            day_of_month: 31,
        };
        assert!(terms.occurs_on(date(2024, 2, 29)));
        assert!(terms.occurs_on(date(2024, 4, 30)));
        assert!(!terms.occurs_on(date(2024, 4, 29)));
        assert!(!terms.occurs_on(date(2024, 8, 31)));
    }

    #[test]
    fn test_currency_follows_target() {
        let t = date(2024, 5, 13);
        let balance = CashBalance::new("Cash", t, 0, Currency::new("MGA")).unwrap();
        let flow = ScheduledFlow::new("Flow", &balance, t, t, 10, 1).unwrap();
        assert_eq!(flow.currency(), &Currency::new("MGA"));
    }
}
