//! Endpoint candidate resolution
//!
//! Builds the ordered candidate list for a chain from its URL tiers:
//! interface > default > public > fallback.

use crate::config::EndpointTiers;
use std::collections::HashSet;

/// Flatten the tiers of `tiers` into a prioritized list of unique URLs.
///
/// Empty and whitespace-only entries are dropped. Kept entries are not
/// rewritten, and only exact duplicates collapse to their first occurrence,
/// so a URL listed in several tiers keeps the position of its highest-priority
/// tier.
pub fn resolve_endpoints(tiers: &EndpointTiers) -> Vec<String> {
    let ordered = [
        tiers.interface.as_deref(),
        tiers.default.as_deref(),
        tiers.public.as_deref(),
        tiers.fallback.as_deref(),
    ];

    let mut seen = HashSet::new();
    ordered
        .into_iter()
        .flatten()
        .flatten()
        .filter(|url| !url.trim().is_empty())
        .filter(|url| seen.insert(*url))
        .cloned()
        .collect()
}
