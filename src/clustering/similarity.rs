use std::collections::BTreeSet;

/// Shared tags needed by the strong rule.
const STRONG_MIN_SHARED: usize = 3;
const STRONG_MIN_RATIO: f64 = 0.15;

/// Fewer shared tags are accepted only with a higher overlap ratio.
const WEAK_MIN_SHARED: usize = 2;
const WEAK_MIN_RATIO: f64 = 0.25;

/// Tag overlap between an incoming article and a candidate cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub shared: usize,
    pub ratio: f64,
}

impl Overlap {
    pub fn between(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Self {
        // Calculate Jaccard similarity: |A ∩ B| / |A ∪ B|
        let shared = a.intersection(b).count();
        let union = a.len() + b.len() - shared;
        let ratio = if union > 0 && shared > 0 {
            shared as f64 / union as f64
        } else {
            0.0
        };

        Overlap { shared, ratio }
    }

    /// Whether the overlap is enough to merge the article into the cluster.
    pub fn is_admissible(&self) -> bool {
        (self.shared >= STRONG_MIN_SHARED && self.ratio >= STRONG_MIN_RATIO)
            || (self.shared >= WEAK_MIN_SHARED && self.ratio >= WEAK_MIN_RATIO)
    }
}

/// Jaccard similarity of two tag sets; 0 when either is empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    Overlap::between(a, b).ratio
}
