use chrono::{DateTime, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use shared::amount::percentage;
use shared::{ClaimStatsMap, PortfolioTotals, TokenEntry, UpstreamError};
use std::sync::Arc;
use tracing::{info, warn};

use crate::bags_client::BagsClient;

/// Result of one reload cycle. Never mutated after construction; the next
/// reload builds a new one.
#[derive(Debug, Clone)]
pub struct FeeSnapshot {
    pub tokens: Vec<TokenEntry>,
    pub claim_stats: ClaimStatsMap,
    pub value_ceiling: f64,
    pub fetched_at: DateTime<Utc>,
}

impl FeeSnapshot {
    pub fn totals(&self) -> PortfolioTotals {
        portfolio_totals(&self.tokens, &self.claim_stats)
    }
}

/// Runs fetch-and-aggregate cycles against the upstream APIs.
pub struct FeeAggregator {
    client: Arc<BagsClient>,
}

impl FeeAggregator {
    pub fn new(client: Arc<BagsClient>) -> Self {
        Self { client }
    }

    /// Fetch the token list, drop tokens above the value ceiling and collect
    /// claim stats for the rest.
    ///
    /// Only a failed token-list fetch fails the cycle.
    pub async fn reload(&self, value_ceiling: f64) -> Result<FeeSnapshot, UpstreamError> {
        let listed = self.client.fetch_top_tokens().await?;
        let listed_count = listed.len();

        let tokens = filter_by_value_ceiling(listed, value_ceiling);
        info!(
            "Tracking {} of {} listed tokens (FDV <= {})",
            tokens.len(),
            listed_count,
            value_ceiling
        );

        let claim_stats = self.fetch_all_claim_stats(&tokens).await;

        Ok(FeeSnapshot {
            tokens,
            claim_stats,
            value_ceiling,
            fetched_at: Utc::now(),
        })
    }

    /// One claim-stats lookup per token, all in flight at once. Waits for
    /// every lookup to settle; a failed lookup is recorded as unavailable and
    /// never fails the batch.
    pub async fn fetch_all_claim_stats(&self, tokens: &[TokenEntry]) -> ClaimStatsMap {
        let lookups = tokens.iter().map(|token| async move {
            let result = self.client.fetch_claim_stats(&token.token_address).await;
            (token, result)
        });

        let mut claim_stats = ClaimStatsMap::new();
        for (token, result) in join_all(lookups).await {
            match result {
                Ok(stats) => claim_stats.insert_fetched(token.token_address.clone(), stats),
                Err(e) => {
                    warn!(
                        "Claim stats unavailable for {}: {}",
                        token.token_address, e
                    );
                    claim_stats.mark_unavailable(token.token_address.clone());
                }
            }
        }

        let unavailable = claim_stats.unavailable_count();
        if unavailable > 0 {
            warn!(
                "Claim stats unavailable for {} of {} tokens",
                unavailable,
                tokens.len()
            );
        }

        claim_stats
    }
}

/// Claimed amount for a token.
///
/// Fetched claim records are authoritative, even when empty. The creator
/// totals on the listing are only consulted when the lookup failed.
pub fn claimed_amount(token: &TokenEntry, claim_stats: &ClaimStatsMap) -> u128 {
    match claim_stats.fetched(&token.token_address) {
        Some(records) => records
            .iter()
            .map(|record| record.total_claimed)
            .fold(0, u128::saturating_add),
        None => token.creator_claimed_total().unwrap_or(0),
    }
}

/// Lifetime fees minus claimed, clamped at zero.
pub fn unclaimed_amount(token: &TokenEntry, claim_stats: &ClaimStatsMap) -> u128 {
    token
        .lifetime_fees
        .saturating_sub(claimed_amount(token, claim_stats))
}

/// Claimed share of lifetime fees, in [0, 100] at basis-point precision.
pub fn claimed_percent(token: &TokenEntry, claim_stats: &ClaimStatsMap) -> Decimal {
    percentage(claimed_amount(token, claim_stats), token.lifetime_fees).min(Decimal::ONE_HUNDRED)
}

pub fn portfolio_totals(tokens: &[TokenEntry], claim_stats: &ClaimStatsMap) -> PortfolioTotals {
    let (total_lifetime_fees, total_claimed) =
        tokens
            .iter()
            .fold((0u128, 0u128), |(fees, claimed), token| {
                (
                    fees.saturating_add(token.lifetime_fees),
                    claimed.saturating_add(claimed_amount(token, claim_stats)),
                )
            });

    PortfolioTotals {
        total_lifetime_fees,
        total_claimed,
        total_unclaimed: total_lifetime_fees.saturating_sub(total_claimed),
        token_count: tokens.len(),
    }
}

/// Keep tokens whose fully diluted value is at most `ceiling` (USD).
/// Tokens without value metadata count as zero and are kept.
pub fn filter_by_value_ceiling(tokens: Vec<TokenEntry>, ceiling: f64) -> Vec<TokenEntry> {
    tokens
        .into_iter()
        .filter(|token| token.fully_diluted_value() <= ceiling)
        .collect()
}
