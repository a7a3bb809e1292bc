use std::sync::LazyLock;

use regex::Regex;

/// Content of the first fenced code block, or the whole text when there is
/// none. Reasoning blocks such as `<think>...</think>` are dropped first.
pub fn extract_code_block(s: &str) -> String {
    let s = REGEX_THINK_BLOCK.replace_all(s, "");

    match REGEX_CODE_BLOCK.captures(&s) {
        Some(caps) => caps
            .get(1)
            .map(|m| m.as_str())
            .unwrap_or_default()
            .trim()
            .to_string(),
        None => s.trim().to_string(),
    }
}

static REGEX_CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[^\n]*\n(.*?)```").expect("CODE_BLOCK regex is invalid"));
static REGEX_THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("THINK_BLOCK regex is invalid"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_code_block() {
        assert_eq!(
            extract_code_block("  Market Opportunity: Large  "),
            "Market Opportunity: Large"
        );

        assert_eq!(
            extract_code_block(
                r#"
```
{"Team Strength": "Serial founders"}
```
"#
            ),
            r#"{"Team Strength": "Serial founders"}"#
        );

        assert_eq!(
            extract_code_block(
                r#"
<think>
Let me look at ```the market``` first...
</think>

Here is the evaluation:

```json
{"Exit Potential": "Acquisition"}
```

Anything else?
"#
            ),
            r#"{"Exit Potential": "Acquisition"}"#
        );
    }
}
