//! Wealth Projection - day-by-day valuation of personal holdings
//!
//! This library provides:
//! - Cash balances moved by scheduled monthly flows
//! - Depreciating and appreciating assets at a constant annual rate
//! - Portfolio evolutions over a date range, with per-holding series
//! - Detection of flow occurrences that leave a balance negative
//! - JSON portfolio definitions and CSV export

pub mod error;
pub mod holding;
pub mod portfolio;
pub mod loader;

// Re-export commonly used types
pub use error::{ProjectionError, ProjectionResult};
pub use holding::{Amount, CashBalance, Currency, DepreciatingAsset, Holding, HoldingId, ScheduledFlow, ValuationLaw};
pub use portfolio::{EvolutionSummary, ImpossibleFlow, Person, Portfolio, PortfolioEvolution};
pub use loader::{load_portfolio, load_portfolio_from_reader, LoadError};
