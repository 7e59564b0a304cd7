//! Crossing classification of a track's motion segment against a fence.

use log::debug;
use serde::Serialize;

use crate::crossing::fence::{Direction, Fence, FenceId};
use crate::crossing::geometry::{Segment, signed_angle_degrees};
use crate::crossing::track_state::TrackId;

/// Angular band (exclusive, degrees) counted as a forward crossing.
pub const FORWARD_BAND: (f64, f64) = (15.0, 165.0);
/// Angular band (exclusive, degrees) counted as a backward crossing.
pub const BACKWARD_BAND: (f64, f64) = (195.0, 345.0);

/// A motion segment intersecting a fence.
///
/// `direction` is `None` when the crossing angle falls in a dead zone: the
/// crossing is reported but no counter moved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrossingEvent {
    pub track_id: TrackId,
    pub fence_id: FenceId,
    pub direction: Option<Direction>,
    pub angle: f64,
}

impl CrossingEvent {
    #[inline]
    pub fn is_counted(&self) -> bool {
        self.direction.is_some()
    }
}

/// Map a crossing angle to a direction, or `None` inside the dead zones.
pub fn direction_for_angle(angle: f64) -> Option<Direction> {
    if angle > FORWARD_BAND.0 && angle < FORWARD_BAND.1 {
        Some(Direction::Forward)
    } else if angle > BACKWARD_BAND.0 && angle < BACKWARD_BAND.1 {
        Some(Direction::Backward)
    } else {
        None
    }
}

/// Angle of `motion` measured from the fence orientation, in `[0, 360)`.
#[inline]
pub fn crossing_angle(fence: &Segment, motion: &Segment) -> f64 {
    signed_angle_degrees(&fence.direction(), &motion.direction())
}

/// Test `motion` against `fence` and update the fence counters.
///
/// Each call with an intersecting, non-dead-zone motion increments a counter,
/// so the caller must invoke this once per (track, fence, frame).
pub fn classify(fence: &mut Fence, motion: &Segment, track_id: TrackId) -> Option<CrossingEvent> {
    if !motion.crosses(fence.segment()) {
        return None;
    }

    let angle = crossing_angle(fence.segment(), motion);
    let direction = direction_for_angle(angle);

    match direction {
        Some(d) => {
            fence.record(d);
            debug!(
                "track {} crossed fence {} {} at {:.1} deg",
                track_id,
                fence.id(),
                d.as_str(),
                angle
            );
        }
        None => debug!(
            "track {} grazed fence {} at {:.1} deg, not counted",
            track_id,
            fence.id(),
            angle
        ),
    }

    Some(CrossingEvent {
        track_id,
        fence_id: fence.id(),
        direction,
        angle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossing::geometry::Point;

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    fn horizontal_fence() -> Fence {
        Fence::new(1, seg(0.0, 0.0, 10.0, 0.0))
    }

    #[test]
    fn test_bands() {
        assert_eq!(direction_for_angle(0.0), None);
        assert_eq!(direction_for_angle(15.0), None);
        assert_eq!(direction_for_angle(15.1), Some(Direction::Forward));
        assert_eq!(direction_for_angle(90.0), Some(Direction::Forward));
        assert_eq!(direction_for_angle(165.0), None);
        assert_eq!(direction_for_angle(180.0), None);
        assert_eq!(direction_for_angle(195.0), None);
        assert_eq!(direction_for_angle(270.0), Some(Direction::Backward));
        assert_eq!(direction_for_angle(344.9), Some(Direction::Backward));
        assert_eq!(direction_for_angle(345.0), None);
    }

    #[test]
    fn test_forward_crossing() {
        let mut fence = horizontal_fence();
        let event = classify(&mut fence, &seg(5.0, -5.0, 5.0, 5.0), 3).unwrap();
        assert_eq!(event.direction, Some(Direction::Forward));
        assert_eq!(event.fence_id, 1);
        assert_eq!(event.track_id, 3);
        assert!((event.angle - 90.0).abs() < 1e-9);
        assert_eq!(fence.count_forward(), 1);
        assert_eq!(fence.count_backward(), 0);
    }

    #[test]
    fn test_backward_crossing() {
        let mut fence = horizontal_fence();
        let event = classify(&mut fence, &seg(5.0, 5.0, 5.0, -5.0), 3).unwrap();
        assert_eq!(event.direction, Some(Direction::Backward));
        assert!((event.angle - 270.0).abs() < 1e-9);
        assert_eq!(fence.count_forward(), 0);
        assert_eq!(fence.count_backward(), 1);
    }

    #[test]
    fn test_miss_has_no_side_effect() {
        let mut fence = horizontal_fence();
        assert!(classify(&mut fence, &seg(5.0, -5.0, 20.0, 5.0), 3).is_none());
        assert!(classify(&mut fence, &seg(5.0, 1.0, 5.0, 5.0), 3).is_none());
        assert_eq!(fence.counts().total(), 0);
    }

    #[test]
    fn test_zero_length_motion_never_crosses() {
        let mut fence = horizontal_fence();
        for p in [
            Point::new(5.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(5.0, 3.0),
            Point::new(-1.0, -1.0),
        ] {
            assert!(classify(&mut fence, &Segment::degenerate(p), 1).is_none());
        }
        assert_eq!(fence.counts().total(), 0);
    }

    #[test]
    fn test_dead_zone_reports_without_counting() {
        let mut fence = horizontal_fence();
        let (s, c) = 10f64.to_radians().sin_cos();
        let motion = seg(2.0, -0.5, 2.0 + 6.0 * c, -0.5 + 6.0 * s);

        let event = classify(&mut fence, &motion, 4).unwrap();
        assert!(!event.is_counted());
        assert!((event.angle - 10.0).abs() < 1e-6);
        assert_eq!(fence.counts().total(), 0);
    }

    #[test]
    fn test_reversal_flips_direction() {
        let motions = [
            seg(5.0, -5.0, 5.0, 5.0),
            seg(1.0, -3.0, 8.0, 2.0),
            seg(9.0, -1.0, 2.0, 4.0),
            seg(3.0, 2.0, 6.0, -7.0),
        ];
        for motion in motions {
            let fence = horizontal_fence();
            let a = crossing_angle(fence.segment(), &motion);
            let b = crossing_angle(fence.segment(), &motion.reversed());
            assert!((b - (a + 180.0) % 360.0).abs() < 1e-6);

            let forward = direction_for_angle(a);
            let backward = direction_for_angle(b);
            match forward {
                Some(Direction::Forward) => assert_eq!(backward, Some(Direction::Backward)),
                Some(Direction::Backward) => assert_eq!(backward, Some(Direction::Forward)),
                None => assert_eq!(backward, None),
            }
        }
    }

    #[test]
    fn test_repeated_calls_count_twice() {
        let mut fence = horizontal_fence();
        let motion = seg(5.0, -5.0, 5.0, 5.0);
        classify(&mut fence, &motion, 1);
        classify(&mut fence, &motion, 1);
        assert_eq!(fence.count_forward(), 2);
    }
}
