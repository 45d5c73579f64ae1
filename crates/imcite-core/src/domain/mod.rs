//! Domain models: papers, search results, annotations

mod annotation;
mod paper;
mod search_result;

pub use annotation::{Highlight, Rect};
pub use paper::Paper;
pub use search_result::{SearchFields, SearchResult, Source};
