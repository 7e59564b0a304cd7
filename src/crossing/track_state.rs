//! Per-identity crossing state: last centroid, intrusion flag and trail.

use std::collections::HashMap;

use log::info;

use crate::crossing::geometry::{Point, Segment};

/// Persistent identity assigned by the external tracker.
pub type TrackId = u64;

/// Crossing state of a single track identity.
#[derive(Debug, Clone, Default)]
pub struct TrackState {
    /// Centroid from the most recent observation; `None` until first observed
    last_centroid: Option<Point>,
    /// Set on the first fence crossing and never cleared
    has_crossed: bool,
    /// Polyline recorded since the first crossing
    trail: Vec<Point>,
    /// Frame of the most recent observation
    last_seen_frame: u64,
}

impl TrackState {
    #[inline]
    pub fn last_centroid(&self) -> Option<Point> {
        self.last_centroid
    }

    #[inline]
    pub fn has_crossed(&self) -> bool {
        self.has_crossed
    }

    #[inline]
    pub fn trail(&self) -> &[Point] {
        &self.trail
    }

    #[inline]
    pub fn last_seen_frame(&self) -> u64 {
        self.last_seen_frame
    }
}

/// Identity-keyed store of [`TrackState`]s.
///
/// Unknown ids are created on first use by any operation. Entries live until
/// [`TrackStore::retire_idle`] removes them.
#[derive(Debug, Clone, Default)]
pub struct TrackStore {
    tracks: HashMap<TrackId, TrackState>,
    frame_id: u64,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame number stamped on subsequent observations.
    pub fn set_frame(&mut self, frame_id: u64) {
        self.frame_id = frame_id;
    }

    /// Record `centroid` for `track_id` and return this frame's motion segment.
    ///
    /// The segment runs from the previous centroid to `centroid`, or is the
    /// zero-length segment at `centroid` on the first observation.
    pub fn observe(&mut self, track_id: TrackId, centroid: Point) -> Segment {
        let state = self.tracks.entry(track_id).or_default();
        let from = state.last_centroid.unwrap_or(centroid);
        state.last_centroid = Some(centroid);
        state.last_seen_frame = self.frame_id;
        Segment::new(from, centroid)
    }

    /// Flag `track_id` as having crossed a fence.
    ///
    /// The first call seeds the trail with the current centroid; later calls
    /// change nothing.
    pub fn mark_crossed(&mut self, track_id: TrackId) {
        let state = self.tracks.entry(track_id).or_default();
        if state.has_crossed {
            return;
        }
        state.has_crossed = true;
        if let Some(c) = state.last_centroid {
            state.trail.push(c);
        }
    }

    /// Append `point` to the trail of a flagged track; no-op otherwise.
    pub fn append_trail(&mut self, track_id: TrackId, point: Point) {
        let state = self.tracks.entry(track_id).or_default();
        if state.has_crossed {
            state.trail.push(point);
        }
    }

    pub fn get(&self, track_id: TrackId) -> Option<&TrackState> {
        self.tracks.get(&track_id)
    }

    pub fn has_crossed(&self, track_id: TrackId) -> bool {
        self.tracks.get(&track_id).is_some_and(|s| s.has_crossed)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Trails of every flagged track, in ascending id order.
    pub fn trails(&self) -> Vec<(TrackId, &[Point])> {
        let mut trails: Vec<(TrackId, &[Point])> = self
            .tracks
            .iter()
            .filter(|(_, s)| s.has_crossed)
            .map(|(id, s)| (*id, s.trail.as_slice()))
            .collect();
        trails.sort_unstable_by_key(|(id, _)| *id);
        trails
    }

    /// Drop every track not observed within the last `max_idle` frames.
    ///
    /// Returns the number of evicted tracks.
    pub fn retire_idle(&mut self, max_idle: u64) -> usize {
        let now = self.frame_id;
        let before = self.tracks.len();
        self.tracks
            .retain(|_, s| now.saturating_sub(s.last_seen_frame) <= max_idle);
        let retired = before - self.tracks.len();
        if retired > 0 {
            info!(
                "retired {} track(s) idle for more than {} frames at frame {}",
                retired, max_idle, now
            );
        }
        retired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_is_degenerate() {
        let mut store = TrackStore::new();
        let motion = store.observe(7, Point::new(50.0, 50.0));
        assert!(motion.is_degenerate());
        assert_eq!(motion.to, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_observe_returns_motion_segment() {
        let mut store = TrackStore::new();
        store.observe(7, Point::new(50.0, 50.0));
        let motion = store.observe(7, Point::new(50.0, 60.0));
        assert_eq!(motion.from, Point::new(50.0, 50.0));
        assert_eq!(motion.to, Point::new(50.0, 60.0));
        assert_eq!(store.get(7).unwrap().last_centroid(), Some(Point::new(50.0, 60.0)));
    }

    #[test]
    fn test_append_before_crossing_is_noop() {
        let mut store = TrackStore::new();
        store.observe(1, Point::new(0.0, 0.0));
        store.append_trail(1, Point::new(1.0, 1.0));
        store.append_trail(1, Point::new(2.0, 2.0));
        assert!(!store.has_crossed(1));
        assert!(store.get(1).unwrap().trail().is_empty());
    }

    #[test]
    fn test_mark_crossed_seeds_trail_once() {
        let mut store = TrackStore::new();
        store.observe(1, Point::new(3.0, 4.0));
        store.mark_crossed(1);
        store.mark_crossed(1);
        assert!(store.has_crossed(1));
        assert_eq!(store.get(1).unwrap().trail(), &[Point::new(3.0, 4.0)]);
    }

    #[test]
    fn test_trail_grows_by_one_per_append() {
        let mut store = TrackStore::new();
        store.observe(1, Point::new(0.0, 0.0));
        store.mark_crossed(1);
        for i in 1..=5 {
            store.append_trail(1, Point::new(i as f64, 0.0));
            assert_eq!(store.get(1).unwrap().trail().len(), 1 + i);
        }
    }

    #[test]
    fn test_unknown_ids_are_created_lazily() {
        let mut store = TrackStore::new();
        store.append_trail(4, Point::new(1.0, 1.0));
        assert!(!store.has_crossed(4));
        assert_eq!(store.len(), 1);

        store.mark_crossed(5);
        assert!(store.has_crossed(5));
        assert!(store.get(5).unwrap().trail().is_empty());

        // First observation after a lazy creation still has no prior segment
        assert!(store.observe(5, Point::new(9.0, 9.0)).is_degenerate());
    }

    #[test]
    fn test_trails_sorted_by_id() {
        let mut store = TrackStore::new();
        for id in [9, 2, 5] {
            store.observe(id, Point::new(id as f64, 0.0));
            store.mark_crossed(id);
        }
        store.observe(3, Point::new(0.0, 0.0));

        let ids: Vec<TrackId> = store.trails().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn test_retire_idle() {
        let mut store = TrackStore::new();
        store.set_frame(1);
        store.observe(1, Point::new(0.0, 0.0));
        store.observe(2, Point::new(0.0, 0.0));
        store.set_frame(5);
        store.observe(2, Point::new(1.0, 0.0));

        assert_eq!(store.retire_idle(4), 0);
        store.set_frame(6);
        assert_eq!(store.retire_idle(4), 1);
        assert!(store.get(1).is_none());
        assert!(store.get(2).is_some());
    }
}
