//! Core of the narrative search: a flat in-memory index of precomputed
//! embeddings, a brute-force dot-product matcher over it, and the trait
//! seams for the external embedding/generation services.
//!
//! The corpus is small (tens to low thousands of narratives), so the
//! matcher is a linear scan; no approximate index is warranted at this
//! scale. Everything network-facing lives behind [`service::QueryEmbedder`]
//! and [`service::AnswerGenerator`] so this crate stays pure and testable.

pub mod load;
pub mod matcher;
pub mod pipeline;
pub mod record;
pub mod service;

pub use load::IndexLoadError;
pub use matcher::{MatchError, MatchResult, find_best_match};
pub use pipeline::{Answer, QueryError, answer_query};
pub use record::{NarrativeRecord, SearchIndex};
pub use service::{AnswerGenerator, QueryEmbedder, ServiceError};
