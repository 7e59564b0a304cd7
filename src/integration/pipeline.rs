//! CountingPipeline for combining a track source with the crossing engine.

use crate::crossing::{CrossingEngine, EngineConfig, FenceCounts, FenceRegistry, FrameReport};

use super::{IntoTracks, TrackSource};

/// Bundles any `TrackSource` with a `CrossingEngine` for end-to-end counting.
pub struct CountingPipeline<S: TrackSource> {
    source: S,
    engine: CrossingEngine,
}

impl<S: TrackSource> CountingPipeline<S> {
    /// Create a new counting pipeline with the given source, fences and config.
    pub fn new(source: S, registry: FenceRegistry, config: EngineConfig) -> Self {
        Self {
            source,
            engine: CrossingEngine::new(registry, config),
        }
    }

    /// Create a new counting pipeline with default engine configuration.
    pub fn with_default_config(source: S, registry: FenceRegistry) -> Self {
        Self::new(source, registry, EngineConfig::default())
    }

    /// Pull the next frame from the source and run it through the engine.
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    pub fn process_next(&mut self) -> Result<Option<FrameReport>, S::Error> {
        match self.source.next_frame()? {
            Some(tracks) => Ok(Some(self.engine.update(tracks))),
            None => Ok(None),
        }
    }

    /// Run tracks obtained outside the source through the engine.
    pub fn push<T: IntoTracks>(&mut self, tracks: T) -> FrameReport {
        self.engine.update(tracks.into_tracks())
    }

    /// Drain the source, handing every report to `on_frame`, and return the
    /// final counters.
    pub fn run<F>(&mut self, mut on_frame: F) -> Result<Vec<FenceCounts>, S::Error>
    where
        F: FnMut(&FrameReport),
    {
        while let Some(report) = self.process_next()? {
            on_frame(&report);
        }
        Ok(self.engine.counts())
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a reference to the underlying engine.
    pub fn engine(&self) -> &CrossingEngine {
        &self.engine
    }

    /// Get a mutable reference to the underlying engine.
    pub fn engine_mut(&mut self) -> &mut CrossingEngine {
        &mut self.engine
    }
}
