use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::amount::{deserialize_amount, deserialize_opt_amount, serialize_amount};

// Upstream envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub response: Option<T>,
}

// Token models
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenEntry {
    #[serde(rename = "token")]
    pub token_address: String,
    #[serde(default)]
    pub token_info: Option<TokenInfo>,
    #[serde(
        default,
        deserialize_with = "deserialize_amount",
        serialize_with = "serialize_amount"
    )]
    pub lifetime_fees: u128,
    #[serde(default)]
    pub creators: Vec<CreatorRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub name: Option<String>,
    pub symbol: Option<String>,
    #[serde(rename = "icon")]
    pub icon_url: Option<String>,
    pub usd_price: Option<f64>,
    #[serde(rename = "fdv")]
    pub fully_diluted_value: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorRecord {
    pub wallet: Option<String>,
    pub username: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_amount")]
    pub total_claimed: Option<u128>,
}

impl TokenEntry {
    /// Fully diluted value in USD; tokens without metadata count as zero.
    pub fn fully_diluted_value(&self) -> f64 {
        self.token_info
            .as_ref()
            .and_then(|info| info.fully_diluted_value)
            .unwrap_or(0.0)
    }

    pub fn usd_price(&self) -> f64 {
        self.token_info
            .as_ref()
            .and_then(|info| info.usd_price)
            .unwrap_or(0.0)
    }

    pub fn name(&self) -> &str {
        self.token_info
            .as_ref()
            .and_then(|info| info.name.as_deref())
            .unwrap_or("Unknown")
    }

    pub fn symbol(&self) -> &str {
        self.token_info
            .as_ref()
            .and_then(|info| info.symbol.as_deref())
            .unwrap_or("???")
    }

    pub fn icon_url(&self) -> Option<&str> {
        self.token_info.as_ref().and_then(|info| info.icon_url.as_deref())
    }

    /// Lowercased name used for ordering; missing names sort as empty.
    pub fn sort_name(&self) -> String {
        self.token_info
            .as_ref()
            .and_then(|info| info.name.as_deref())
            .map(str::to_lowercase)
            .unwrap_or_default()
    }

    /// Sum of the per-creator claimed totals carried on the listing itself.
    pub fn creator_claimed_total(&self) -> Option<u128> {
        let mut claimed = self
            .creators
            .iter()
            .filter_map(|creator| creator.total_claimed)
            .peekable();
        claimed.peek()?;
        Some(claimed.fold(0u128, u128::saturating_add))
    }
}

// Claim stat models
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStat {
    pub wallet: Option<String>,
    pub username: Option<String>,
    pub is_creator: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_amount",
        serialize_with = "serialize_amount"
    )]
    pub total_claimed: u128,
}

/// Outcome of one claim-stats lookup.
#[derive(Debug, Clone)]
pub enum ClaimStatsEntry {
    Fetched(Vec<ClaimStat>),
    Unavailable,
}

/// Claim stats keyed by token address, built fresh on every reload.
#[derive(Debug, Clone, Default)]
pub struct ClaimStatsMap {
    entries: HashMap<String, ClaimStatsEntry>,
}

impl ClaimStatsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_fetched(&mut self, token_address: impl Into<String>, stats: Vec<ClaimStat>) {
        self.entries
            .insert(token_address.into(), ClaimStatsEntry::Fetched(stats));
    }

    pub fn mark_unavailable(&mut self, token_address: impl Into<String>) {
        self.entries
            .insert(token_address.into(), ClaimStatsEntry::Unavailable);
    }

    /// Records for a token, or `None` when the lookup failed or never ran.
    pub fn fetched(&self, token_address: &str) -> Option<&[ClaimStat]> {
        match self.entries.get(token_address) {
            Some(ClaimStatsEntry::Fetched(stats)) => Some(stats),
            _ => None,
        }
    }

    pub fn is_unavailable(&self, token_address: &str) -> bool {
        self.fetched(token_address).is_none()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unavailable_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, ClaimStatsEntry::Unavailable))
            .count()
    }
}

// Aggregate models
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    #[serde(serialize_with = "serialize_amount")]
    pub total_lifetime_fees: u128,
    #[serde(serialize_with = "serialize_amount")]
    pub total_claimed: u128,
    #[serde(serialize_with = "serialize_amount")]
    pub total_unclaimed: u128,
    pub token_count: usize,
}
