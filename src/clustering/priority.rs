/// Tier thresholds as (tier, min articles, min sources); first match wins.
const TIERS: &[(u8, usize, usize)] = &[(1, 20, 5), (2, 10, 4), (3, 5, 3)];

/// Lowest-urgency tier, for everything below the thresholds.
const DEFAULT_TIER: u8 = 4;

/// Maps a validated cluster's size to a priority tier, 1 being the most urgent.
pub fn priority_tier(articles: usize, sources: usize) -> u8 {
    TIERS
        .iter()
        .find(|(_, min_articles, min_sources)| articles >= *min_articles || sources >= *min_sources)
        .map(|(tier, _, _)| *tier)
        .unwrap_or(DEFAULT_TIER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_tiers() {
        assert_eq!(priority_tier(20, 1), 1);
        assert_eq!(priority_tier(2, 5), 1);
        assert_eq!(priority_tier(10, 1), 2);
        assert_eq!(priority_tier(3, 4), 2);
        assert_eq!(priority_tier(5, 1), 3);
        assert_eq!(priority_tier(2, 3), 3);
        assert_eq!(priority_tier(4, 2), 4);
        assert_eq!(priority_tier(3, 1), 4);
    }
}
