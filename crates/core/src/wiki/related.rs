//! "See also" expansion.
//!
//! Fetches a main article, reads the titles listed in its "See also"
//! section, and fetches those concurrently. A related title that fails to
//! fetch is dropped from the result; it never fails the expansion.

use std::sync::LazyLock;

use futures::stream::{self, StreamExt};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::source::{ArticleSource, FetchError};

/// A whole line holding the level-2 "See also" header.
static SEE_ALSO_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^==[ \t]*See [Aa]lso[ \t]*==[ \t]*$").expect("valid see-also pattern"));

/// A related article fetched during expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RelatedArticle {
    pub title: String,
    pub content: String,
}

/// Main article text plus the related articles that could be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Expansion {
    pub main_article: String,
    pub related_articles: Vec<RelatedArticle>,
}

/// Per-title result of a related fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelatedOutcome {
    Fetched(RelatedArticle),
    Failed { title: String, error: FetchError },
}

/// Titles listed in the first "See also" section, in order of appearance.
///
/// List markers and surrounding whitespace are stripped; duplicates are kept.
pub fn see_also_titles(text: &str) -> Vec<String> {
    text.lines()
        .skip_while(|line| !SEE_ALSO_HEADER.is_match(line))
        .skip(1)
        .take_while(|line| !line.starts_with("=="))
        .map(|line| line.trim_matches(|c: char| c == '*' || c.is_whitespace()))
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fetch `titles` with at most `concurrency` requests in flight.
///
/// Completion order is arbitrary; the returned outcomes follow the input order.
pub async fn fetch_related<S>(source: &S, titles: Vec<String>, concurrency: usize) -> Vec<RelatedOutcome>
where
    S: ArticleSource + ?Sized,
{
    stream::iter(titles)
        .map(|title| async move {
            match source.fetch_article(&title).await {
                Ok(content) => RelatedOutcome::Fetched(RelatedArticle { title, content }),
                Err(error) => RelatedOutcome::Failed { title, error },
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Fetch `title` and every article its "See also" section links to.
///
/// # Errors
///
/// Only a failure to fetch the main article is returned. Related titles that
/// fail are omitted and logged.
pub async fn expand<S>(source: &S, title: &str, concurrency: usize) -> Result<Expansion, FetchError>
where
    S: ArticleSource + ?Sized,
{
    let main_article = source.fetch_article(title).await?;
    let titles = see_also_titles(&main_article);
    tracing::debug!(title, related = titles.len(), "expanding see-also section");

    let related_articles = fetch_related(source, titles, concurrency)
        .await
        .into_iter()
        .filter_map(|outcome| match outcome {
            RelatedOutcome::Fetched(article) => Some(article),
            RelatedOutcome::Failed { title, error } => {
                tracing::warn!(title = %title, error = %error, "skipping related article");
                None
            }
        })
        .collect();

    Ok(Expansion { main_article, related_articles })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiki::testing::FakeSource;

    const TIDAL_WAVE: &str = "A tidal wave is a wave.\n\n== See also ==\n* Storm\n* Flood\n== References ==\n* Some book";

    #[test]
    fn test_see_also_titles_basic() {
        assert_eq!(see_also_titles(TIDAL_WAVE), ["Storm", "Flood"]);
    }

    #[test]
    fn test_see_also_titles_at_end_of_text() {
        let text = "Intro\n== See also ==\n*  Storm surge \n\n* Flood\n";
        assert_eq!(see_also_titles(text), ["Storm surge", "Flood"]);
    }

    #[test]
    fn test_see_also_titles_absent() {
        assert!(see_also_titles("Intro\n== History ==\nText").is_empty());
    }

    #[test]
    fn test_see_also_titles_ignores_level_three_header() {
        assert!(see_also_titles("Intro\n=== See also ===\n* Storm").is_empty());
    }

    #[test]
    fn test_see_also_titles_empty_section_stops_at_next_header() {
        let text = "Intro\n== See also ==\n== References ==\n* Some book\n* Another";
        assert!(see_also_titles(text).is_empty());
    }

    #[test]
    fn test_see_also_titles_stops_at_next_header_with_crlf() {
        let text = "Intro\r\n== See also ==\r\n* Storm\r\n== Notes ==\r\n* Footnote";
        assert_eq!(see_also_titles(text), ["Storm"]);
    }

    #[test]
    fn test_see_also_titles_capitalization() {
        assert_eq!(see_also_titles("Intro\n==See Also==\n* Storm"), ["Storm"]);
    }

    #[test]
    fn test_see_also_titles_keeps_duplicates_and_first_section_only() {
        let text = "== See also ==\n* Storm\n* Storm\n* \n== See also ==\n* Flood";
        assert_eq!(see_also_titles(text), ["Storm", "Storm"]);
    }

    #[tokio::test]
    async fn test_expand_omits_failed_titles_in_order() {
        let source = FakeSource::default()
            .with("Tidal Wave", TIDAL_WAVE)
            .with("Storm", "A storm is weather.")
            .failing("Flood", FetchError::Transport { status: Some(500), reason: "boom".into() });

        let expansion = expand(&source, "Tidal Wave", 4).await.unwrap();

        assert_eq!(expansion.main_article, TIDAL_WAVE);
        assert_eq!(
            expansion.related_articles,
            [RelatedArticle { title: "Storm".into(), content: "A storm is weather.".into() }]
        );
        assert_eq!(source.call_count(), 3);
    }

    #[tokio::test]
    async fn test_expand_without_see_also() {
        let source = FakeSource::default().with("Cat", "Cats are mammals.");
        let expansion = expand(&source, "Cat", 4).await.unwrap();
        assert!(expansion.related_articles.is_empty());
        assert_eq!(source.calls(), ["Cat"]);
    }

    #[tokio::test]
    async fn test_expand_main_failure_propagates() {
        let source = FakeSource::default();
        let result = expand(&source, "Nowhere", 4).await;
        assert!(matches!(result, Err(FetchError::NotFound(t)) if t == "Nowhere"));
    }

    #[tokio::test]
    async fn test_fetch_related_preserves_input_order() {
        let source = FakeSource::default().with("A", "a").with("C", "c");
        let outcomes = fetch_related(&source, vec!["A".into(), "B".into(), "C".into(), "A".into()], 2).await;

        let titles: Vec<_> = outcomes
            .iter()
            .map(|o| match o {
                RelatedOutcome::Fetched(a) => format!("ok:{}", a.title),
                RelatedOutcome::Failed { title, .. } => format!("err:{title}"),
            })
            .collect();
        assert_eq!(titles, ["ok:A", "err:B", "ok:C", "ok:A"]);
    }
}
