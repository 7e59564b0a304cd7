//! Integration module for connecting tracker output and fence authoring with
//! the crossing engine.
//!
//! This module provides the source trait, a JSON-lines reader for recorded
//! tracker output, and the one-shot fence builder.

mod builder;
mod pipeline;
mod source;

pub use builder::FenceBuilder;
pub use pipeline::CountingPipeline;
pub use source::{IntoTracks, JsonLinesSource, SourceError, TrackSource};
