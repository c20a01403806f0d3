//! Outbound link and image reference extraction.
//!
//! Both passes run over the full document text, code fences included.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use mdexamples_shared::Reference;

/// Collect every inline `[text](http…)` link in document order.
///
/// Duplicates are kept. Image syntax (`![alt](…)`) is not a link. Link text
/// may hold one level of nested brackets, so a linked badge
/// `[![alt](img)](href)` yields `href`.
pub fn extract_links(text: &str) -> Vec<Reference> {
    static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\[((?:[^\[\]]|\[[^\]]*\])*)\]\((https?://[^\s)]+)\)")
            .expect("valid regex")
    });

    LINK_RE
        .captures_iter(text)
        .filter(|caps| {
            let start = caps.get(0).map_or(0, |m| m.start());
            start == 0 || text.as_bytes()[start - 1] != b'!'
        })
        .filter_map(|caps| {
            let target = &caps[2];
            match Url::parse(target) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {
                    Some(Reference::link(target))
                }
                _ => {
                    tracing::debug!(link = target, "skipping malformed link target");
                    None
                }
            }
        })
        .collect()
}

/// Collect every inline `![alt](target)` image reference in document order.
///
/// Targets are returned as written; an optional `"title"` is dropped.
pub fn extract_images(text: &str) -> Vec<Reference> {
    static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"!\[([^\]]*)\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)"#)
            .expect("valid regex")
    });

    IMAGE_RE
        .captures_iter(text)
        .map(|caps| Reference::image(&caps[2], &caps[1]))
        .collect()
}
