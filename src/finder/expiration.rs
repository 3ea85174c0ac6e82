use serde::{Deserialize, Serialize};

/// One entry of a provider's expiration chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationEntry {
    /// "YYYY-MM-DD"
    pub expiration_date: String,
    pub days_to_expiration: i64,
}

/// Picks the nearest expiration with at least `min_days` to go.
///
/// Entries are stably sorted by days-to-expiration, so ties keep the
/// provider's order. When nothing reaches `min_days` the furthest-out entry
/// is returned instead of failing. `None` only for an empty chain.
pub fn select_expiration(entries: &[ExpirationEntry], min_days: i64) -> Option<&ExpirationEntry> {
    let mut sorted: Vec<&ExpirationEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.days_to_expiration);

    sorted
        .iter()
        .find(|e| e.days_to_expiration >= min_days)
        .or_else(|| sorted.last())
        .copied()
}
