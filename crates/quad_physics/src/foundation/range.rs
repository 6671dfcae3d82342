//! Scalar intervals with configurable boundary semantics
//!
//! By default containment is exclusive at both ends. Callers opt into
//! inclusive ends per side, which is how the partition makes an element
//! sitting exactly on a quadrant boundary register with both neighbours.

use super::math::{is_zero_within, Vec2};

/// Which ends of a [`Range`] count as inside for a containment test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainsParams {
    /// Include the minimum in the check
    pub left: bool,
    /// Include the maximum in the check
    pub right: bool,
}

impl ContainsParams {
    /// Both ends excluded
    pub const EXCLUSIVE: Self = Self { left: false, right: false };
    
    /// Both ends included
    pub const INCLUSIVE: Self = Self { left: true, right: true };
}

/// Boundary semantics for [`Range::overlaps`]
///
/// `left` controls how the other range's minimum is tested for
/// containment, `right` how its maximum is tested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlapParams {
    /// Semantics applied to the other range's minimum
    pub left: ContainsParams,
    /// Semantics applied to the other range's maximum
    pub right: ContainsParams,
}

impl OverlapParams {
    /// Exclusive everywhere
    pub const EXCLUSIVE: Self = Self {
        left: ContainsParams::EXCLUSIVE,
        right: ContainsParams::EXCLUSIVE,
    };
    
    /// Inclusive everywhere: touching ranges overlap
    pub const INCLUSIVE: Self = Self {
        left: ContainsParams::INCLUSIVE,
        right: ContainsParams::INCLUSIVE,
    };
}

/// Immutable closed-or-open scalar interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    min: f32,
    max: f32,
}

impl Range {
    /// Create a range; a reversed range is logged but still constructed
    pub fn new(min: f32, max: f32) -> Self {
        if min > max {
            log::warn!("Range min {} must not exceed max {}", min, max);
        }
        Self { min, max }
    }
    
    /// Lower bound
    pub fn min(&self) -> f32 {
        self.min
    }
    
    /// Upper bound
    pub fn max(&self) -> f32 {
        self.max
    }
    
    /// Length of the interval
    pub fn span(&self) -> f32 {
        self.max - self.min
    }
    
    /// New range moved by `offset`
    #[must_use]
    pub fn shifted(&self, offset: f32) -> Self {
        Self::new(self.min + offset, self.max + offset)
    }
    
    /// `t` clamped into the interval
    pub fn clamp(&self, t: f32) -> f32 {
        t.max(self.min).min(self.max)
    }
    
    /// Whether `t` lies inside, with per-side inclusivity
    pub fn contains(&self, t: f32, params: ContainsParams) -> bool {
        let above_min = if params.left { self.min <= t } else { self.min < t };
        let below_max = if params.right { t <= self.max } else { t < self.max };
        above_min && below_max
    }
    
    /// Whether `other` overlaps this range
    ///
    /// True when either endpoint of `other` is contained (per `params`), or
    /// when `other` covers this range entirely.
    pub fn overlaps(&self, other: &Range, params: OverlapParams) -> bool {
        self.contains(other.min, params.left)
            || self.contains(other.max, params.right)
            || (other.min <= self.min && self.max <= other.max)
    }
    
    /// Both bounds within `epsilon` of `other`'s
    pub fn approx_eq(&self, other: &Range, epsilon: f32) -> bool {
        is_zero_within(self.min - other.min, epsilon) && is_zero_within(self.max - other.max, epsilon)
    }
}

/// Per-axis overlap test of two rectangles given as (bottom-left, size)
pub fn rect_intersect(a_pos: Vec2, a_dim: Vec2, b_pos: Vec2, b_dim: Vec2, params: OverlapParams) -> bool {
    let ax = Range::new(a_pos.x, a_pos.x + a_dim.x);
    let ay = Range::new(a_pos.y, a_pos.y + a_dim.y);
    let bx = Range::new(b_pos.x, b_pos.x + b_dim.x);
    let by = Range::new(b_pos.y, b_pos.y + b_dim.y);
    ax.overlaps(&bx, params) && ay.overlaps(&by, params)
}
