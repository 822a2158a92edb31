//! Comment text normalization: markup, links and decorative symbols are removed.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

static LINE_BREAK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("line break pattern"));

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("url pattern"));

// Emoticons, pictographs (incl. supplemental), transport & map, regional indicator flags,
// dingbats, enclosed alphanumerics and their supplements, plus emoji presentation selector.
static SYMBOL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        "[",
        r"\x{1F600}-\x{1F64F}",
        r"\x{1F300}-\x{1F5FF}",
        r"\x{1F900}-\x{1F9FF}",
        r"\x{1F680}-\x{1F6FF}",
        r"\x{1F1E0}-\x{1F1FF}",
        r"\x{2700}-\x{27BF}",
        r"\x{2460}-\x{24FF}",
        r"\x{1F100}-\x{1F1FF}",
        r"\x{1F200}-\x{1F251}",
        r"\x{FE0F}",
        "]+"
    ))
    .expect("symbol pattern")
});

/// Escaped markup decodes into live markup, so stripping repeats until the text settles.
const MAX_MARKUP_PASSES: usize = 4;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Reduces embedded HTML to its visible text, decoding entities along the way.
pub fn remove_html_tags(text: &str) -> String {
    let text = LINE_BREAK_TAG.replace_all(text, " ");
    Html::parse_fragment(&text)
        .root_element()
        .text()
        .collect::<String>()
}

fn strip_markup(mut text: String) -> String {
    for _ in 0..MAX_MARKUP_PASSES {
        let stripped = remove_html_tags(&text);
        if stripped == text {
            break;
        }
        text = stripped;
    }
    text
}

pub fn remove_urls(text: &str) -> String {
    URL_PATTERN.replace_all(text, "").into_owned()
}

/// Drops decorative symbols outright. Words on either side of a symbol may end up joined.
pub fn remove_symbols(text: &str) -> String {
    SYMBOL_PATTERN.replace_all(text, "").into_owned()
}

/// Full cleanup applied to every comment before translation and scoring.
///
/// Output is lowercased with whitespace runs collapsed; an empty result means the
/// comment carried nothing classifiable.
pub fn clean_comment(text: &str) -> String {
    let text = text.trim().to_lowercase();
    let text = strip_markup(text);
    let text = remove_urls(&text);
    let text = remove_symbols(&text);
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_markup_and_decodes_entities() {
        assert_eq!(
            clean_comment("<b>Great</b> video, it&#39;s <i>awesome</i>"),
            "great video, it's awesome"
        );
        assert_eq!(clean_comment("first line<br>second line"), "first line second line");
    }

    #[test]
    fn test_escaped_markup_does_not_survive() {
        assert_eq!(clean_comment("use &lt;div&gt; tags here"), "use tags here");
        assert_eq!(clean_comment("&lt;b&gt;bold&lt;/b&gt; claim"), "bold claim");
        assert_eq!(clean_comment("&amp;lt;i&amp;gt;twice escaped"), "twice escaped");
        assert_eq!(clean_comment("5 &lt; 7 and 9 &gt; 2"), "5 < 7 and 9 > 2");
    }

    #[test]
    fn test_strips_links() {
        assert_eq!(
            clean_comment("watch this https://example.com/x?y=1 and http://foo.bar too"),
            "watch this and too"
        );
        assert_eq!(
            clean_comment(r#"see <a href="https://www.youtube.com/watch?v=abc">https://www.youtube.com/watch?v=abc</a>"#),
            "see"
        );
    }

    #[test]
    fn test_strips_symbols_without_replacement() {
        assert_eq!(clean_comment("love😍it"), "loveit");
        assert_eq!(clean_comment("🚀 to the moon ✨"), "to the moon");
        assert_eq!(clean_comment("🇺🇸 ① great"), "great");
    }

    #[test]
    fn test_keeps_non_latin_text() {
        assert_eq!(clean_comment("Очень круто"), "очень круто");
        assert_eq!(clean_comment("すごい"), "すごい");
    }

    #[test]
    fn test_blank_after_cleaning() {
        assert_eq!(clean_comment("   "), "");
        assert_eq!(clean_comment("😂😂😂"), "");
        assert_eq!(clean_comment("<br>https://t.co/x"), "");
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "<p>Nice   VIDEO</p> https://a.b/c 😀 done",
            "Hello<br/>World ✔ see http://x.y",
            "plain text",
            "use &lt;div&gt; tags here",
            "&lt;b&gt;bold&lt;/b&gt; &amp;amp; more",
            "",
        ] {
            let once = clean_comment(input);
            assert_eq!(clean_comment(&once), once, "{input:?}");
        }
    }
}
