//! Frame loop tying the fence registry, classifier and track store together.

use log::{debug, warn};
use serde::Serialize;

use crate::crossing::classifier::{self, CrossingEvent};
use crate::crossing::fence::{FenceCounts, FenceRegistry};
use crate::crossing::geometry::{Point, is_finite_point};
use crate::crossing::rect::Rect;
use crate::crossing::track_state::{TrackId, TrackStore};

/// Configuration for the CrossingEngine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Evict a track after this many frames without an observation.
    /// `None` keeps every identity for the whole run.
    pub retire_after_frames: Option<u64>,
}

/// One tracker output entry: a box and its persistent identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedObject {
    pub track_id: TrackId,
    pub bbox: Rect,
}

impl TrackedObject {
    pub fn new(track_id: TrackId, bbox: Rect) -> Self {
        Self { track_id, bbox }
    }

    /// Build from TLBR corners (x1, y1, x2, y2).
    pub fn from_tlbr(track_id: TrackId, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(track_id, Rect::from_tlbr(x1, y1, x2, y2))
    }

    #[inline]
    pub fn centroid(&self) -> Point {
        self.bbox.centroid()
    }
}

impl From<([f32; 4], TrackId)> for TrackedObject {
    fn from((tlbr, track_id): ([f32; 4], TrackId)) -> Self {
        Self::new(track_id, Rect::from(tlbr))
    }
}

/// Trail of a track that has crossed at least one fence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackTrail {
    pub track_id: TrackId,
    pub points: Vec<Point>,
}

/// Everything the renderer needs after a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub events: Vec<CrossingEvent>,
    pub counts: Vec<FenceCounts>,
    pub trails: Vec<TrackTrail>,
}

impl FrameReport {
    /// Events that moved a counter.
    pub fn counted_events(&self) -> impl Iterator<Item = &CrossingEvent> {
        self.events.iter().filter(|e| e.is_counted())
    }
}

/// Per-run crossing state: the fences, every track's position and trail, and
/// the frame counter.
///
/// Feed it one [`CrossingEngine::update`] per frame, in frame order.
pub struct CrossingEngine {
    registry: FenceRegistry,
    store: TrackStore,
    frame_id: u64,
    config: EngineConfig,
}

impl CrossingEngine {
    pub fn new(registry: FenceRegistry, config: EngineConfig) -> Self {
        Self {
            registry,
            store: TrackStore::new(),
            frame_id: 0,
            config,
        }
    }

    pub fn with_default_config(registry: FenceRegistry) -> Self {
        Self::new(registry, EngineConfig::default())
    }

    /// Process one frame of tracker output.
    ///
    /// Tracks are handled in ascending id order. Boxes with a non-finite
    /// corner or centroid are skipped, then any repeat of an already accepted
    /// id within the frame.
    pub fn update(&mut self, tracks: Vec<TrackedObject>) -> FrameReport {
        self.frame_id += 1;
        self.store.set_frame(self.frame_id);

        let mut tracks = tracks;
        tracks.sort_by_key(|t| t.track_id);

        let mut events = Vec::new();
        let mut previous: Option<TrackId> = None;

        for track in &tracks {
            let id = track.track_id;
            // A finite box can still overflow f32 when centered
            let centroid = track.centroid();
            if !track.bbox.is_finite() || !is_finite_point(&centroid) {
                warn!("frame {}: track {} has a non-finite box, skipped", self.frame_id, id);
                continue;
            }

            if previous == Some(id) {
                warn!("frame {}: duplicate track id {}, skipped", self.frame_id, id);
                continue;
            }
            previous = Some(id);

            let motion = self.store.observe(id, centroid);

            let mut crossed = false;
            for fence in self.registry.fences_mut() {
                if let Some(event) = classifier::classify(fence, &motion, id) {
                    events.push(event);
                    crossed = true;
                }
            }

            // Extend before flagging so the crossing frame is seeded, not doubled
            self.store.append_trail(id, centroid);
            if crossed {
                self.store.mark_crossed(id);
            }
        }

        if let Some(max_idle) = self.config.retire_after_frames {
            self.store.retire_idle(max_idle);
        }

        if !events.is_empty() {
            debug!("frame {}: {} crossing event(s)", self.frame_id, events.len());
        }

        FrameReport {
            frame: self.frame_id,
            events,
            counts: self.registry.counts(),
            trails: self.trails(),
        }
    }

    /// Trails of all flagged tracks, ascending by id.
    pub fn trails(&self) -> Vec<TrackTrail> {
        self.store
            .trails()
            .into_iter()
            .map(|(track_id, points)| TrackTrail {
                track_id,
                points: points.to_vec(),
            })
            .collect()
    }

    pub fn counts(&self) -> Vec<FenceCounts> {
        self.registry.counts()
    }

    pub fn registry(&self) -> &FenceRegistry {
        &self.registry
    }

    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
