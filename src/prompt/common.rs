use chrono::Local;

/// Shared preamble for every enrichment prompt.
pub fn global_context(pub_date: Option<&str>) -> String {
    let today = Local::now().format("%Y-%m-%d").to_string();
    let published = pub_date.unwrap_or("unknown");

    format!(
        r#"You are a news desk editor working on Spanish-language news, mostly from Peru.
Today is {today}. The article below was published on {published}.
Answer with a single JSON object and nothing else: no prose, no code fences, no explanations."#
    )
}
