//! Depreciating and appreciating physical assets

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::year_fraction;
use super::{check_name, Amount, Currency, HoldingId, Valuation};
use crate::{ProjectionError, ProjectionResult};

/// How the annual rate applies over a fraction of years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationLaw {
    /// value × (1 + rate)^years
    #[default]
    Compound,
    /// value × (1 + rate × years), floored at zero
    Linear,
}

impl ValuationLaw {
    /// Growth factor over `years` (negative years run the law backwards)
    pub fn factor(&self, annual_rate: f64, years: f64) -> f64 {
        match self {
            ValuationLaw::Compound => (1.0 + annual_rate).powf(years),
            ValuationLaw::Linear => (1.0 + annual_rate * years).max(0.0),
        }
    }
}

/// A physical good valued from its reference snapshot at a constant annual rate
#[derive(Debug, Clone)]
pub struct DepreciatingAsset {
    id: HoldingId,
    name: String,
    currency: Currency,
    acquisition_date: NaiveDate,
    annual_rate: f64,
    law: ValuationLaw,
    origin: Valuation,
    as_of: Valuation,
}

impl DepreciatingAsset {
    /// Asset valued with the compound law
    pub fn new(
        name: impl Into<String>,
        t: NaiveDate,
        book_value: Amount,
        acquisition_date: NaiveDate,
        annual_rate: f64,
        currency: Currency,
    ) -> ProjectionResult<Self> {
        Self::with_law(name, t, book_value, acquisition_date, annual_rate, ValuationLaw::Compound, currency)
    }

    pub fn with_law(
        name: impl Into<String>,
        t: NaiveDate,
        book_value: Amount,
        acquisition_date: NaiveDate,
        annual_rate: f64,
        law: ValuationLaw,
        currency: Currency,
    ) -> ProjectionResult<Self> {
        let name = name.into();
        check_name(&name)?;
        if !annual_rate.is_finite() {
            return Err(ProjectionError::invalid_holding(&name, "annual rate must be finite"));
        }
        if law == ValuationLaw::Compound && annual_rate <= -1.0 {
            return Err(ProjectionError::invalid_holding(
                &name,
                format!("compound rate {} would wipe out the value", annual_rate),
            ));
        }

        let origin = Valuation::new(t, book_value);
        Ok(Self {
            id: HoldingId::new(),
            name,
            currency,
            acquisition_date,
            annual_rate,
            law,
            origin,
            as_of: origin,
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

    pub fn acquisition_date(&self) -> NaiveDate {
        self.acquisition_date
    }

    pub fn annual_rate(&self) -> f64 {
        self.annual_rate
    }

    pub fn law(&self) -> ValuationLaw {
        self.law
    }

    pub fn t(&self) -> NaiveDate {
        self.as_of.date
    }

    pub fn book_value(&self) -> Amount {
        self.as_of.amount
    }

    /// Value on `date`, zero before acquisition.
    /// Rounded half away from zero to the smallest currency unit.
    pub fn value_at(&self, date: NaiveDate) -> Amount {
        if date < self.acquisition_date {
            return 0;
        }
        if date == self.origin.date {
            return self.origin.amount;
        }
        let years = year_fraction(self.origin.date, date);
        let value = self.origin.amount as f64 * self.law.factor(self.annual_rate, years);
        value.round() as Amount
    }

    pub fn project_to(&self, date: NaiveDate) -> DepreciatingAsset {
        DepreciatingAsset {
            as_of: Valuation::new(date, self.value_at(date)),
            ..self.clone()
        }
    }
}
