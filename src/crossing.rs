mod classifier;
mod engine;
mod fence;
mod geometry;
mod rect;
mod track_state;

pub use classifier::{
    BACKWARD_BAND, CrossingEvent, FORWARD_BAND, classify, crossing_angle, direction_for_angle,
};
pub use engine::{CrossingEngine, EngineConfig, FrameReport, TrackTrail, TrackedObject};
pub use fence::{Direction, Fence, FenceCounts, FenceId, FenceRegistry, MAX_FENCES};
pub use geometry::{
    Point, Segment, cross, is_finite_point, segments_intersect, signed_angle_degrees, vector,
};
pub use rect::Rect;
pub use track_state::{TrackId, TrackState, TrackStore};
