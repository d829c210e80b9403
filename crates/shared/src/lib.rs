pub mod amount;
pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result, UpstreamError, UpstreamService};
pub use models::{ClaimStat, ClaimStatsEntry, ClaimStatsMap, PortfolioTotals, TokenEntry};
