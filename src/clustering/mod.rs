// Module declarations
pub mod builder;
pub mod gate;
pub mod partition;
pub mod priority;
pub mod scoring;
pub mod similarity;
pub mod summary;
pub mod tags;

pub use builder::{build_clusters, Cluster, ClusterBuilder};
pub use gate::is_corroborated;
pub use partition::{Locality, PartitionKey, UNKNOWN_COUNTRY};
pub use priority::priority_tier;
pub use scoring::{score_members, MISSING_MEMBER_SCORE};
pub use similarity::{jaccard, Overlap};
pub use summary::{
    article_links, main_image_url, synthesize_summary, synthesize_title, title_probe,
};
pub use tags::format_tags;

/// Articles with fewer tags than this never take part in clustering.
pub const MIN_TAGS_PER_ARTICLE: usize = 2;
