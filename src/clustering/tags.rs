use std::collections::BTreeSet;

use super::partition::PartitionKey;

/// Number of cluster tags shown in the formatted string.
const MAX_FORMATTED_TAGS: usize = 10;

/// Hashtag string stored with a topic, e.g. `#dinaboluarte,#congreso,#Perú,#2025-03-14`.
pub fn format_tags(tags: &BTreeSet<String>, key: &PartitionKey) -> String {
    let mut formatted: Vec<String> = tags
        .iter()
        .take(MAX_FORMATTED_TAGS)
        .map(|tag| format!("#{}", tag.replace('_', "")))
        .collect();

    if let Some(country) = key.known_country() {
        formatted.push(format!("#{}", country));
    }
    if let Some(date) = key.event_date() {
        formatted.push(format!("#{}", date.format("%Y-%m-%d")));
    }

    formatted.join(",")
}
