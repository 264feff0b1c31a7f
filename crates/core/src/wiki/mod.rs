//! Article resolution on top of the store.
//!
//! - [`ArticleSource`] is the seam to the upstream fetch capability.
//! - [`WikiCache`] decides between serving a stored entry and re-fetching,
//!   persists the result, and writes the audit row.
//! - [`expand`] fetches an article plus everything listed in its
//!   "See also" section, concurrently.

pub mod related;
pub mod resolve;
pub mod source;

pub use related::{Expansion, RelatedArticle, RelatedOutcome, expand, fetch_related, see_also_titles};
pub use resolve::{CacheStatus, RefreshOutcome, RefreshStatus, RefreshSummary, RelatedResolution, Resolution, WikiCache};
pub use source::{ArticleSource, FetchError};
