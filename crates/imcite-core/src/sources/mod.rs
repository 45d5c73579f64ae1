//! Source plugins for bibliographic metadata providers

pub mod crossref;
pub mod openalex;
pub mod semantic_scholar;
pub mod traits;

pub use crossref::CrossrefClient;
pub use openalex::OpenAlexClient;
pub use semantic_scholar::SemanticScholarClient;
pub use traits::{ProviderClient, ReferenceProvider, SourceError, SourceMetadata};
