pub mod cache;
pub mod context;
pub mod source;

pub use cache::{CacheGuard, StreamCache};
pub use context::{FetchedTables, SourceContext};
pub use source::{GitHubSource, Stream, StreamSource};
