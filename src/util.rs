use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::TARGET_ENRICHMENT;

lazy_static! {
    static ref IMG_SRC: Regex =
        Regex::new(r#"(?i)<img[^>]+src\s*=\s*["']([^"']+)["']"#).expect("valid image regex");
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Truncates `text` to at most `max_chars` characters, replacing the tail with
/// `"..."` when anything had to be cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

/// Shortens `text` on a word boundary so it fits in `max_chars`, appending `"..."`.
pub fn shorten_on_word_boundary(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut shortened = String::new();
    for word in text.split_whitespace() {
        let extra = if shortened.is_empty() { 0 } else { 1 };
        if shortened.chars().count() + word.chars().count() + extra > max_chars {
            break;
        }
        if extra == 1 {
            shortened.push(' ');
        }
        shortened.push_str(word);
    }

    // A single overlong word: fall back to a hard cut
    if shortened.is_empty() {
        shortened = truncate_chars(text, max_chars);
    }
    shortened.push_str("...");
    shortened
}

/// URL of the first `<img>` found in an HTML fragment.
pub fn extract_main_image_url(html: &str) -> Option<String> {
    IMG_SRC
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
}

/// Runs `operation` up to `retries + 1` times, sleeping `backoff` (doubled on
/// every attempt) in between.
pub async fn retry_with_backoff<T, E, F, Fut>(
    label: &str,
    retries: u32,
    backoff: Duration,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = backoff;
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < retries => {
                attempt += 1;
                debug!(target: TARGET_ENRICHMENT, "{} failed ({}), retry {}/{}", label, e, attempt, retries);
                if !delay.is_zero() {
                    sleep(delay).await;
                    delay *= 2;
                }
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("corto", 10), "corto");
        assert_eq!(truncate_with_ellipsis("abcdefghij", 10), "abcdefghij");
        assert_eq!(truncate_with_ellipsis("abcdefghijk", 10), "abcdefg...");
        // Multi-byte characters are counted, not bytes
        assert_eq!(truncate_with_ellipsis("ñññññ", 4), "ñ...");
    }

    #[test]
    fn test_shorten_on_word_boundary() {
        assert_eq!(shorten_on_word_boundary("Hola mundo", 20), "Hola mundo");
        assert_eq!(
            shorten_on_word_boundary("El Congreso aprueba la reforma", 15),
            "El Congreso..."
        );
        assert_eq!(shorten_on_word_boundary("Supercalifragilistico", 5), "Super...");
    }

    #[test]
    fn test_extract_main_image_url() {
        let html = r#"<p>texto</p><IMG class="x" src="https://cdn.example.pe/a.jpg"><img src='b.jpg'>"#;
        assert_eq!(
            extract_main_image_url(html),
            Some("https://cdn.example.pe/a.jpg".to_string())
        );
        assert_eq!(extract_main_image_url("<p>sin imagen</p>"), None);
    }

    #[tokio::test]
    async fn test_retry_with_backoff_stops_after_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retry_with_backoff("op", 3, Duration::ZERO, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("boom".to_string())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_with_backoff_is_bounded() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = retry_with_backoff("op", 2, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("always".to_string()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
