//! One-shot builder producing the immutable fence set for a run.

use crate::crossing::{Fence, FenceId, FenceRegistry, MAX_FENCES, Point};
use crate::error::FenceError;

/// Builder for the fence registry.
///
/// Fences receive ids 1, 2, 3 in the order they are added. The builder is
/// consumed by [`FenceBuilder::build`], so a finished registry can never be
/// extended.
#[derive(Debug, Clone, Default)]
pub struct FenceBuilder {
    lines: Vec<(Point, Point)>,
}

impl FenceBuilder {
    /// Create a new, empty fence builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fence between two pixel coordinates.
    pub fn line(mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        self.lines.push((Point::new(x1, y1), Point::new(x2, y2)));
        self
    }

    /// Add a fence between two points.
    pub fn points(mut self, from: Point, to: Point) -> Self {
        self.lines.push((from, to));
        self
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Validate and build the registry.
    pub fn build(self) -> Result<FenceRegistry, FenceError> {
        if self.lines.len() > MAX_FENCES {
            return Err(FenceError::too_many(self.lines.len()));
        }

        let mut fences = Vec::with_capacity(self.lines.len());
        for (idx, (from, to)) in self.lines.into_iter().enumerate() {
            let id = idx as FenceId + 1;
            let fence = Fence::from_points(id, from, to);
            if !fence.segment().is_finite() {
                return Err(FenceError::NonFinite { id });
            }
            fences.push(fence);
        }
        Ok(FenceRegistry::new(fences))
    }
}
