//! Virtual fence crossing counter for multi-object tracker output.
//!
//! Feed per-frame `(box, track id)` pairs into a [`CrossingEngine`]; every
//! motion between two consecutive centroids is tested against up to three
//! fences, classified forward or backward by its crossing angle, and counted.
//! Tracks that crossed a fence accumulate a trail for rendering.

pub mod config;
pub mod crossing;
pub mod error;
pub mod integration;

pub use config::{CounterConfig, FenceLine};
pub use crossing::{
    CrossingEngine, CrossingEvent, Direction, EngineConfig, Fence, FenceCounts, FenceId,
    FenceRegistry, FrameReport, Point, Rect, Segment, TrackId, TrackStore, TrackTrail,
    TrackedObject,
};
pub use error::{ConfigError, FenceError};
pub use integration::{CountingPipeline, FenceBuilder, IntoTracks, JsonLinesSource, TrackSource};
