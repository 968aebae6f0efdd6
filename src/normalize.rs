use std::sync::LazyLock;

use regex::Regex;

// [Music], [Applause], [Música] ...
static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Strip non-speech annotations and markup, collapse whitespace.
///
/// Annotations are removed before tags so `[<i>Music</i>]` goes in one pass.
/// Neither removal can create a new match for the other, which keeps the
/// function idempotent.
pub fn normalize(raw: &str) -> String {
    let text = ANNOTATION.replace_all(raw, " ");
    let text = TAG.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_annotations() {
        assert_eq!(normalize("Hello [Music] world"), "Hello world");
        assert_eq!(normalize("[Applause] thank you [Risos]"), "thank you");
        assert_eq!(normalize("[Música]"), "");
    }

    #[test]
    fn test_strips_tags() {
        assert_eq!(normalize("<font color=\"#E5E5E5\">so</font> we begin"), "so we begin");
        assert_eq!(normalize("a <c.colorE5E5E5>b</c> c"), "a b c");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  one\n\ntwo\t three   "), "one two three");
    }

    #[test]
    fn test_annotation_wrapping_tags() {
        assert_eq!(normalize("before [<i>Music</i>] after"), "before after");
    }

    #[test]
    fn test_unbalanced_brackets_kept() {
        assert_eq!(normalize("5 > 3 and [note"), "5 > 3 and [note");
        assert_eq!(normalize("a ] b"), "a ] b");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "   ",
            "Hello [Music] world",
            "[[nested]] text ]",
            "<b>[x</b>]y",
            "a <[b]c> d",
            "tab\tand\nnewline\r\nmixed",
            "<unclosed tag and [unclosed bracket",
            "[<]>x]",
            "plain words only",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_output_has_no_annotations_or_runs() {
        let out = normalize("x [a]\n\n[b]  y [c] z");
        assert_eq!(out, "x y z");
        assert!(!out.contains("  "));
        assert!(!out.contains('['));
    }
}
