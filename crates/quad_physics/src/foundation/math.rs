//! Math utilities and types
//!
//! Provides the 2D vector type used by the partition and the collision
//! code, plus the handful of helpers nalgebra does not offer directly.

use approx::AbsDiffEq;

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Default tolerance for float comparisons
pub const DEFAULT_EPSILON: f32 = 0.0001;

/// Sign of a scalar as -1, 0 or 1 (zero stays zero, unlike `f32::signum`)
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// `|value| <= epsilon`
pub fn is_zero_within(value: f32, epsilon: f32) -> bool {
    value.abs() <= epsilon
}

/// Smallest power of two that is at least `extent` (and at least 1)
///
/// The root of the partition uses this as its side length so recursive
/// halving always lands on whole numbers down to the minimum cell size.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn next_power_of_two(extent: f32) -> u32 {
    if !extent.is_finite() || extent <= 1.0 {
        return 1;
    }
    let whole = extent.ceil().min(u32::MAX as f32) as u32;
    whole.checked_next_power_of_two().unwrap_or(1 << 31)
}

/// Extension methods for [`Vec2`]
///
/// Tolerances are always passed in explicitly; nothing here reads global
/// state.
pub trait Vec2Ext {
    /// Component-wise sign, zero components stay zero
    fn sign_unit(&self) -> Vec2;
    
    /// Angle relative to the +x axis in radians
    fn heading(&self) -> f32;
    
    /// Unsigned angle between this vector and `other` in radians
    ///
    /// Returns 0 if either vector has zero length.
    fn angle_to(&self, other: &Vec2) -> f32;
    
    /// Rescale so the magnitude lies within `[lo, hi]`
    ///
    /// The zero vector has no direction and is returned unchanged.
    fn clamp_length(&self, lo: f32, hi: f32) -> Vec2;
    
    /// Both components within `epsilon` of zero
    fn is_zero_within(&self, epsilon: f32) -> bool;
    
    /// Both components within `epsilon` of `other`
    fn approx_eq_within(&self, other: &Vec2, epsilon: f32) -> bool;
}

impl Vec2Ext for Vec2 {
    fn sign_unit(&self) -> Vec2 {
        Vec2::new(sign(self.x), sign(self.y))
    }
    
    fn heading(&self) -> f32 {
        self.y.atan2(self.x)
    }
    
    fn angle_to(&self, other: &Vec2) -> f32 {
        let denom = self.magnitude() * other.magnitude();
        if denom == 0.0 {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0).acos()
    }
    
    fn clamp_length(&self, lo: f32, hi: f32) -> Vec2 {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            return *self;
        }
        if magnitude < lo {
            return *self * (lo / magnitude);
        }
        if magnitude > hi {
            return *self * (hi / magnitude);
        }
        *self
    }
    
    fn is_zero_within(&self, epsilon: f32) -> bool {
        is_zero_within(self.x, epsilon) && is_zero_within(self.y, epsilon)
    }
    
    fn approx_eq_within(&self, other: &Vec2, epsilon: f32) -> bool {
        self.abs_diff_eq(other, epsilon)
    }
}
