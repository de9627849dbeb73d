//! Cleanup helpers for LLM-produced report markup.
//!
//! Models routinely wrap HTML or JSON payloads in Markdown code fences and
//! leave escape artifacts behind; every composed report passes through these
//! helpers before persistence.

/// Presentational stylesheet prepended to every composed report.
pub const REPORT_STYLE: &str = r#"<style>
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; color: #1f2328; line-height: 1.5; }
h1, h2, h3 { margin: 0.8em 0 0.4em; }
table { border-collapse: collapse; width: 100%; margin: 1em 0; }
th, td { border: 1px solid #d0d7de; padding: 6px 10px; text-align: left; vertical-align: top; }
th { background: #f6f8fa; }
ul, ol { margin: 0.5em 0 0.5em 1.5em; }
.source { color: #57606a; font-size: 0.9em; }
</style>
"#;

/// Removes Markdown code-fence markers (```html, ```json, bare ```) from an
/// LLM response and trims surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    let stripped = text
        .trim()
        .replace("```html", "")
        .replace("```json", "")
        .replace("```", "");
    stripped.trim().to_string()
}

/// Collapses escape artifacts models leave inside HTML payloads.
pub fn normalize_markup(text: &str) -> String {
    text.replace("\\n", "\n")
        .replace("\\\"", "\"")
        .replace("\\/", "/")
        .replace('\u{00a0}', " ")
}

/// Prepends the fixed report stylesheet, unless the body already carries one.
pub fn with_stylesheet(body: &str) -> String {
    if body.trim_start().starts_with("<style>") {
        return body.to_string();
    }
    format!("{REPORT_STYLE}{body}")
}

/// Best-effort extraction of the first JSON object embedded in a response
/// that may carry leading or trailing prose.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end >= start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("```html\n<p>hi</p>\n```", "<p>hi</p>")]
    #[case("```json\n{\"a\":1}\n```", "{\"a\":1}")]
    #[case("  <p>plain</p>  ", "<p>plain</p>")]
    #[case("```\ncode\n```", "code")]
    fn strips_code_fences(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_code_fences(input), expected);
    }

    #[test]
    fn normalizes_escape_artifacts() {
        assert_eq!(
            normalize_markup("line\\nbreak \\\"quoted\\\" a\\/b"),
            "line\nbreak \"quoted\" a/b"
        );
    }

    #[test]
    fn stylesheet_is_prepended_once() {
        let styled = with_stylesheet("<p>report</p>");
        assert!(styled.starts_with("<style>"));
        assert!(styled.ends_with("<p>report</p>"));

        let again = with_stylesheet(&styled);
        assert_eq!(again.matches("<style>").count(), 1);
    }

    #[rstest]
    #[case("prefix {\"query\": \"x\"} suffix", Some("{\"query\": \"x\"}"))]
    #[case("no json here", None)]
    #[case("{\"a\": {\"b\": 1}}", Some("{\"a\": {\"b\": 1}}"))]
    fn extracts_embedded_json(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_json_object(input), expected);
    }
}
