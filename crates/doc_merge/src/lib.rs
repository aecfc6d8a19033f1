//! Document Merge
//!
//! This crate concatenates OpenDocument Text packages into one composite
//! document for the Book of Status.
//!
//! # Features
//!
//! - Style renaming per source (`<name>_doc<ordinal>`) so identically named
//!   styles from different sources never collide
//! - Style reference rewriting across styles and body content
//! - Optional page breaks between sources
//! - Single-pass placeholder token substitution (`%DATETIME%`, `%LAST_GIT_COMMIT%`)
//!
//! # Example
//!
//! ```rust,ignore
//! use doc_merge::{merge_sources, MergeOptions, SourceDocument, TokenSet};
//!
//! let sources = vec![
//!     SourceDocument::new("team-a.odt", std::fs::read("team-a.odt")?),
//!     SourceDocument::new("team-b.odt", std::fs::read("team-b.odt")?),
//! ];
//! let tokens = TokenSet::standard(chrono::Utc::now(), "abc123");
//! let (bytes, summary) = merge_sources(sources, MergeOptions::default(), &tokens)?;
//! ```

mod error;
pub mod job;
pub mod merger;
pub mod resolver;
pub mod tokens;

pub use error::{MergeError, Result};
pub use job::{merge_sources, MergeJob, MergeSummary, SourceDocument};
pub use merger::{DocumentMerger, MergeOptions, MergeStep, SeedPolicy, PAGE_BREAK_STYLE};
pub use resolver::{
    renamed_style_name, resolve_styles, rewrite_references, RenameMap, ResolvedStyles,
    STYLE_REFERENCE_ATTRIBUTES,
};
pub use tokens::{
    format_timestamp, paragraph_text, substitute, SubstitutionReport, TokenSet,
    TokenSubstitution, DATETIME_FORMAT, DATETIME_TOKEN, MAX_SPACE_RUN, REVISION_TOKEN,
};
