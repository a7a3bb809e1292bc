use std::sync::LazyLock;

use regex::Regex;

/// Text of the first `limit` `<span>` elements in document order.
///
/// This is a plain pattern match, not an HTML parser: nested spans end at the
/// first closing tag and the text carries no guarantee of relevance.
pub fn extract_span_texts(html: &str, limit: usize) -> Vec<String> {
    REGEX_SPAN
        .captures_iter(html)
        .take(limit)
        .map(|caps| {
            let inner = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            decode_entities(&REGEX_TAG.replace_all(inner, ""))
                .trim()
                .to_string()
        })
        .collect()
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

static REGEX_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<span\b[^>]*>(.*?)</span\s*>").expect("SPAN regex is invalid")
});
static REGEX_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("TAG regex is invalid"));
