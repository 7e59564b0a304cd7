//! Virtual fences and the registry holding them for a run.

use log::{info, warn};
use serde::Serialize;

use crate::crossing::geometry::{Point, Segment};

/// Upper bound on fences an authoring component may produce.
pub const MAX_FENCES: usize = 3;

/// Fence identifier, assigned once at authoring time.
pub type FenceId = u32;

/// Crossing direction relative to a fence's orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

/// A fixed boundary segment with its two directional counters.
///
/// `id` and `segment` are immutable after construction; the counters only
/// ever grow.
#[derive(Debug, Clone)]
pub struct Fence {
    id: FenceId,
    segment: Segment,
    count_forward: u64,
    count_backward: u64,
}

impl Fence {
    pub fn new(id: FenceId, segment: Segment) -> Self {
        Self {
            id,
            segment,
            count_forward: 0,
            count_backward: 0,
        }
    }

    pub fn from_points(id: FenceId, from: Point, to: Point) -> Self {
        Self::new(id, Segment::new(from, to))
    }

    #[inline]
    pub fn id(&self) -> FenceId {
        self.id
    }

    #[inline]
    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    #[inline]
    pub fn count_forward(&self) -> u64 {
        self.count_forward
    }

    #[inline]
    pub fn count_backward(&self) -> u64 {
        self.count_backward
    }

    #[inline]
    pub fn count(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Forward => self.count_forward,
            Direction::Backward => self.count_backward,
        }
    }

    /// Increment the counter for `direction` by one.
    pub fn record(&mut self, direction: Direction) {
        match direction {
            Direction::Forward => self.count_forward = self.count_forward.saturating_add(1),
            Direction::Backward => self.count_backward = self.count_backward.saturating_add(1),
        }
    }

    pub fn counts(&self) -> FenceCounts {
        FenceCounts {
            fence_id: self.id,
            forward: self.count_forward,
            backward: self.count_backward,
        }
    }
}

/// Snapshot of one fence's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FenceCounts {
    pub fence_id: FenceId,
    pub forward: u64,
    pub backward: u64,
}

impl FenceCounts {
    pub fn total(&self) -> u64 {
        self.forward + self.backward
    }
}

/// Fixed set of fences for a run.
///
/// The registry accepts any number of fences, including none; the
/// [`MAX_FENCES`] limit is enforced by the authoring side.
#[derive(Debug, Clone, Default)]
pub struct FenceRegistry {
    fences: Vec<Fence>,
}

impl FenceRegistry {
    /// Fence ids must be unique; a repeated id keeps the first fence and the
    /// later ones are dropped with a warning.
    pub fn new(fences: Vec<Fence>) -> Self {
        let mut unique: Vec<Fence> = Vec::with_capacity(fences.len());
        for fence in fences {
            if unique.iter().any(|f| f.id == fence.id) {
                warn!("duplicate fence id {}; keeping the first definition", fence.id);
                continue;
            }
            if fence.segment.is_degenerate() {
                warn!("fence {} has coincident endpoints and will never be crossed", fence.id);
            }
            unique.push(fence);
        }
        let fences = unique;
        info!("fence registry initialized with {} fence(s)", fences.len());
        Self { fences }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fences.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fences.is_empty()
    }

    pub fn fences(&self) -> &[Fence] {
        &self.fences
    }

    pub fn get(&self, id: FenceId) -> Option<&Fence> {
        self.fences.iter().find(|f| f.id == id)
    }

    /// Mutable access for the classifier. Ids and segments stay private, so
    /// only the counters can change through this.
    pub(crate) fn fences_mut(&mut self) -> &mut [Fence] {
        &mut self.fences
    }

    /// Record a crossing of fence `id` in `direction`. Returns `false` if no
    /// such fence exists.
    pub fn increment(&mut self, id: FenceId, direction: Direction) -> bool {
        match self.fences.iter_mut().find(|f| f.id == id) {
            Some(fence) => {
                fence.record(direction);
                true
            }
            None => false,
        }
    }

    pub fn counts(&self) -> Vec<FenceCounts> {
        self.fences.iter().map(Fence::counts).collect()
    }
}
