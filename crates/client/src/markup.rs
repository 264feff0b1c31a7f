//! Wiki markup to Markdown conversion.
//!
//! A fixed sequence of regex rewrites, most specific first. Conversion is
//! total: anything a rule does not recognise passes through untouched.
//!
//! | wiki markup            | Markdown            |
//! |------------------------|---------------------|
//! | `==== T ====`          | `#### T`            |
//! | `=== T ===`            | `### T`             |
//! | `== T ==`              | `## T`              |
//! | `* item`, `** nested`  | `* item`, `  * nested` |
//! | `# item`               | `1. item`           |
//! | `'''b'''`, `''i''`     | `**b**`, `*i*`      |
//! | `[[T\|label]]`, `[[T]]` | `[label](T)`, `[T](T)` |
//! | `[url label]`, `[url]` | `[label](url)`, `[url](url)` |

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// URL-shaped link target: `scheme://...` or protocol-relative `//...`.
const URL: &str = r"(?:[a-zA-Z][a-zA-Z0-9+.-]*:)?//[^\s\]]+";

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self { pattern: Regex::new(pattern).expect("valid markup pattern"), replacement }
    }

    fn apply(&self, text: &str) -> String {
        self.pattern.replace_all(text, self.replacement).into_owned()
    }
}

static HEADERS: LazyLock<[Rule; 3]> = LazyLock::new(|| {
    [
        Rule::new(r"====[ \t]*([^=\n]+?)[ \t]*====", "#### ${1}"),
        Rule::new(r"===[ \t]*([^=\n]+?)[ \t]*===", "### ${1}"),
        Rule::new(r"==[ \t]*([^=\n]+?)[ \t]*==", "## ${1}"),
    ]
});

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(\*+)[ \t]*(.+)$").expect("valid bullet pattern"));

static INLINE: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(r"(?m)^#[ \t]*([^#\s].*)$", "1. ${1}"),
        Rule::new(r"'''(.+?)'''", "**${1}**"),
        Rule::new(r"''(.+?)''", "*${1}*"),
        Rule::new(r"\[\[([^|\]]+?)\|([^\]]+?)\]\]", "[${2}](${1})"),
        Rule::new(r"\[\[([^\]]+?)\]\]", "[${1}](${1})"),
        Rule::new(&format!(r"\[({URL})[ \t]+([^\]\n]+?)\]"), "[${2}](${1})"),
        Rule::new(&format!(r"\[({URL})\]"), "[${1}](${1})"),
        Rule::new(r"\n{3,}", "\n\n"),
    ]
});

/// Convert wiki markup to Markdown.
pub fn to_markdown(wiki_markup: &str) -> String {
    let mut text = wiki_markup.to_string();
    for rule in HEADERS.iter() {
        text = rule.apply(&text);
    }

    text = BULLET
        .replace_all(&text, |caps: &Captures| {
            let depth = caps[1].len();
            format!("{}* {}", "  ".repeat(depth - 1), &caps[2])
        })
        .into_owned();

    for rule in INLINE.iter() {
        text = rule.apply(&text);
    }

    text.trim().to_string()
}
