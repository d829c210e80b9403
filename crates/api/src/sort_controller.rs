use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use shared::amount::{format_amount, format_currency_usd, serialize_amount, shorten_identifier, FEE_DECIMALS};
use shared::{ClaimStatsMap, PortfolioTotals, TokenEntry};
use std::cmp::Ordering;

use crate::fee_aggregator::{claimed_amount, claimed_percent, unclaimed_amount, FeeSnapshot};

const TOKEN_PAGE_BASE: &str = "https://bags.fm";

/// Column the dashboard is ordered by. Unrecognised keys are kept as
/// `Unknown` and leave the order untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Price,
    Fdv,
    LifetimeFees,
    Claimed,
    ClaimedPct,
    Unclaimed,
    Unknown(String),
}

impl SortKey {
    pub fn as_str(&self) -> &str {
        match self {
            SortKey::Name => "name",
            SortKey::Price => "price",
            SortKey::Fdv => "fdv",
            SortKey::LifetimeFees => "lifetimeFees",
            SortKey::Claimed => "claimed",
            SortKey::ClaimedPct => "claimedPct",
            SortKey::Unclaimed => "unclaimed",
            SortKey::Unknown(key) => key,
        }
    }
}

impl From<&str> for SortKey {
    fn from(key: &str) -> Self {
        match key {
            "name" => SortKey::Name,
            "price" => SortKey::Price,
            "fdv" => SortKey::Fdv,
            "lifetimeFees" => SortKey::LifetimeFees,
            "claimed" => SortKey::Claimed,
            "claimedPct" => SortKey::ClaimedPct,
            "unclaimed" => SortKey::Unclaimed,
            other => SortKey::Unknown(other.to_string()),
        }
    }
}

impl Serialize for SortKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(SortKey::from(key.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: SortKey::LifetimeFees,
            direction: SortDirection::Descending,
        }
    }
}

/// Clicking the active column flips its direction; a new column starts
/// descending.
pub fn toggle_sort(current: &SortSpec, key: SortKey) -> SortSpec {
    if current.key == key {
        SortSpec {
            key,
            direction: current.direction.flip(),
        }
    } else {
        SortSpec {
            key,
            direction: SortDirection::Descending,
        }
    }
}

// f64 ordering for price/FDV columns
#[derive(PartialEq)]
struct UsdValue(f64);

impl Eq for UsdValue {}

impl PartialOrd for UsdValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UsdValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Tokens ordered by `spec`. Returns a new ordering; the input slice is left
/// as is. The sort is stable, so ties keep their listing order.
pub fn sorted_view<'a>(
    tokens: &'a [TokenEntry],
    claim_stats: &ClaimStatsMap,
    spec: &SortSpec,
) -> Vec<&'a TokenEntry> {
    let direction = spec.direction;
    match &spec.key {
        SortKey::Name => order_by(tokens, direction, |token| token.sort_name()),
        SortKey::Price => order_by(tokens, direction, |token| UsdValue(token.usd_price())),
        SortKey::Fdv => order_by(tokens, direction, |token| {
            UsdValue(token.fully_diluted_value())
        }),
        SortKey::LifetimeFees => order_by(tokens, direction, |token| token.lifetime_fees),
        SortKey::Claimed | SortKey::ClaimedPct => order_by(tokens, direction, |token| {
            claimed_percent(token, claim_stats)
        }),
        SortKey::Unclaimed => order_by(tokens, direction, |token| {
            Decimal::ONE_HUNDRED - claimed_percent(token, claim_stats)
        }),
        SortKey::Unknown(_) => tokens.iter().collect(),
    }
}

fn order_by<'a, K, F>(tokens: &'a [TokenEntry], direction: SortDirection, key: F) -> Vec<&'a TokenEntry>
where
    K: Ord,
    F: Fn(&TokenEntry) -> K,
{
    let mut keyed: Vec<(K, &TokenEntry)> = tokens.iter().map(|token| (key(token), token)).collect();
    keyed.sort_by(|(a, _), (b, _)| match direction {
        SortDirection::Ascending => a.cmp(b),
        SortDirection::Descending => b.cmp(a),
    });
    keyed.into_iter().map(|(_, token)| token).collect()
}

/// One dashboard row: the token plus everything derived from its claim stats.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedViewEntry {
    pub token_address: String,
    pub short_address: String,
    pub token_url: String,
    pub name: String,
    pub symbol: String,
    pub icon_url: Option<String>,
    pub usd_price: f64,
    pub fully_diluted_value: f64,
    pub fully_diluted_value_display: String,
    #[serde(serialize_with = "serialize_amount")]
    pub lifetime_fees: u128,
    pub lifetime_fees_display: String,
    #[serde(serialize_with = "serialize_amount")]
    pub claimed_amount: u128,
    pub claimed_display: String,
    #[serde(serialize_with = "serialize_amount")]
    pub unclaimed_amount: u128,
    pub unclaimed_display: String,
    pub claimed_percent: Decimal,
    pub unclaimed_percent: Decimal,
    /// False when the claim-stats lookup failed and creator totals were used
    pub claim_stats_available: bool,
}

impl DerivedViewEntry {
    pub fn from_token(token: &TokenEntry, claim_stats: &ClaimStatsMap) -> Self {
        let claimed = claimed_amount(token, claim_stats);
        let unclaimed = unclaimed_amount(token, claim_stats);
        let claimed_pct = claimed_percent(token, claim_stats);

        Self {
            token_address: token.token_address.clone(),
            short_address: shorten_identifier(&token.token_address),
            token_url: format!("{}/{}", TOKEN_PAGE_BASE, token.token_address),
            name: token.name().to_string(),
            symbol: token.symbol().to_string(),
            icon_url: token.icon_url().map(str::to_string),
            usd_price: token.usd_price(),
            fully_diluted_value: token.fully_diluted_value(),
            fully_diluted_value_display: format_currency_usd(token.fully_diluted_value()),
            lifetime_fees: token.lifetime_fees,
            lifetime_fees_display: format_amount(Some(token.lifetime_fees), FEE_DECIMALS),
            claimed_amount: claimed,
            claimed_display: format_amount(Some(claimed), FEE_DECIMALS),
            unclaimed_amount: unclaimed,
            unclaimed_display: format_amount(Some(unclaimed), FEE_DECIMALS),
            claimed_percent: claimed_pct,
            unclaimed_percent: Decimal::ONE_HUNDRED - claimed_pct,
            claim_stats_available: !claim_stats.is_unavailable(&token.token_address),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    #[serde(flatten)]
    pub amounts: PortfolioTotals,
    pub total_lifetime_fees_display: String,
    pub total_claimed_display: String,
    pub total_unclaimed_display: String,
}

impl From<PortfolioTotals> for DashboardTotals {
    fn from(amounts: PortfolioTotals) -> Self {
        Self {
            total_lifetime_fees_display: format_amount(Some(amounts.total_lifetime_fees), FEE_DECIMALS),
            total_claimed_display: format_amount(Some(amounts.total_claimed), FEE_DECIMALS),
            total_unclaimed_display: format_amount(Some(amounts.total_unclaimed), FEE_DECIMALS),
            amounts,
        }
    }
}

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeDashboard {
    pub totals: DashboardTotals,
    pub tokens: Vec<DerivedViewEntry>,
    pub sort: SortSpec,
    pub value_ceiling: f64,
    pub value_ceiling_display: String,
    pub claim_stats_unavailable: usize,
    pub fetched_at: DateTime<Utc>,
}

pub fn build_dashboard(snapshot: &FeeSnapshot, spec: &SortSpec) -> FeeDashboard {
    let tokens = sorted_view(&snapshot.tokens, &snapshot.claim_stats, spec)
        .into_iter()
        .map(|token| DerivedViewEntry::from_token(token, &snapshot.claim_stats))
        .collect();

    FeeDashboard {
        totals: snapshot.totals().into(),
        tokens,
        sort: spec.clone(),
        value_ceiling: snapshot.value_ceiling,
        value_ceiling_display: format_currency_usd(snapshot.value_ceiling),
        claim_stats_unavailable: snapshot.claim_stats.unavailable_count(),
        fetched_at: snapshot.fetched_at,
    }
}
