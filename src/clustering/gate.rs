use super::builder::Cluster;

/// Whether a cluster is corroborated enough to become a topic: two outlets
/// agreeing on two articles, or one outlet insisting with three.
pub fn is_corroborated(cluster: &Cluster) -> bool {
    passes(cluster.source_count(), cluster.article_count())
}

fn passes(sources: usize, articles: usize) -> bool {
    (sources >= 2 && articles >= 2) || (sources >= 1 && articles >= 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corroboration_rule() {
        assert!(passes(2, 2));
        assert!(passes(1, 3));
        assert!(passes(5, 20));
        assert!(!passes(1, 2));
        assert!(!passes(1, 1));
        assert!(!passes(0, 0));
    }
}
