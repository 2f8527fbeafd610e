//! Summary statistics and tabular export of an evolution

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;

use super::PortfolioEvolution;
use crate::holding::Amount;

/// Summary statistics for an evolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionSummary {
    pub total_days: usize,
    pub holding_count: usize,
    pub opening_value: Amount,
    pub closing_value: Amount,
    pub min_value: Amount,
    pub min_date: NaiveDate,
    pub max_value: Amount,
    pub max_date: NaiveDate,
    pub impossible_flow_count: usize,
}

impl EvolutionSummary {
    pub fn from_evolution(evolution: &PortfolioEvolution) -> Self {
        let totals: Vec<(NaiveDate, Amount)> = evolution
            .daily()
            .values()
            .map(|snapshot| (snapshot.date, snapshot.total))
            .collect();

        let start = (evolution.start(), 0);
        let first = totals.first().copied().unwrap_or(start);
        let last = totals.last().copied().unwrap_or(start);
        // Earliest date wins ties
        let min = totals.iter().copied().min_by_key(|(date, value)| (*value, *date)).unwrap_or(start);
        let max = totals
            .iter()
            .copied()
            .max_by_key(|(date, value)| (*value, std::cmp::Reverse(*date)))
            .unwrap_or(start);

        Self {
            total_days: totals.len(),
            holding_count: evolution.portfolio().holdings().len(),
            opening_value: first.1,
            closing_value: last.1,
            min_value: min.1,
            min_date: min.0,
            max_value: max.1,
            max_date: max.0,
            impossible_flow_count: evolution.impossible_flows().len(),
        }
    }
}

/// Write one row per day: date, total, then one column per holding
pub fn write_csv<W: Write>(evolution: &PortfolioEvolution, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["Date".to_string(), "Total".to_string()];
    header.extend(evolution.holding_series().iter().map(|series| series.name.clone()));
    csv_writer.write_record(&header)?;

    for snapshot in evolution.daily().values() {
        let mut record = vec![snapshot.date.to_string(), snapshot.total.to_string()];
        record.extend(snapshot.holdings.iter().map(|holding| holding.value.to_string()));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}
