use crate::prompt::common::global_context;

/// Prompt asking for the named entities used as clustering tags.
pub fn entity_extraction_prompt(title: &str, description: &str, pub_date: Option<&str>) -> String {
    let description: String = description.chars().take(500).collect();

    format!(
        r#"
{context}

ARTICLE (FOR ENTITY EXTRACTION):
----------
TITLE: {title}
DESCRIPTION: {description}
----------

TASK: Extract the most important named entities of this article so that articles about
the same real-world event can be matched together.

GUIDELINES:
- Include people, institutions, organizations, places and named events
- Use the most complete form of each name found in the text
- Do not include the same entity twice
- Do not include generic words ("government", "police", "today")
- Return between 3 and 15 entities, most central first

RETURN FORMAT (JSON):
{{
  "entities": ["Entity one", "Entity two"]
}}

Example:
{{
  "entities": ["Dina Boluarte", "Congreso de la República", "Lima"]
}}

Now, extract entities from the provided article:
"#,
        context = global_context(pub_date),
    )
}
