//! Rays and swept rectangle intersection

use crate::foundation::math::{sign, Vec2};

/// A ray with an unnormalized direction
///
/// `direction` is the full displacement over the frame, so intersection
/// times are fractions of the frame's motion: 0 at the origin, 1 at
/// `origin + direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point
    pub origin: Vec2,
    /// Displacement over the frame
    pub direction: Vec2,
}

/// Result of a ray/rectangle intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Normal of the face that was hit, pointing back against the ray
    pub normal: Vec2,
    /// Point where the ray enters the rectangle
    pub contact: Vec2,
    /// Entry time in `[0, 1]`
    pub time: f32,
}

impl Ray {
    /// Creates a new ray
    pub fn new(origin: Vec2, direction: Vec2) -> Self {
        Self { origin, direction }
    }
    
    /// Point at parametric time `t`
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.origin + self.direction * t
    }
    
    /// Slab test against the rectangle with bottom-left `pos` and size `dim`
    ///
    /// Hits that start behind the origin or beyond the end of the ray
    /// (`t` outside `[0, 1]`) are not reported.
    pub fn intersect_rect(&self, pos: Vec2, dim: Vec2) -> Option<RayHit> {
        let far_corner = pos + dim;
        let (near_x, far_x) = slab(self.origin.x, self.direction.x, pos.x, far_corner.x)?;
        let (near_y, far_y) = slab(self.origin.y, self.direction.y, pos.y, far_corner.y)?;
        
        if !(near_x < far_y && near_y < far_x) {
            return None;
        }
        
        let time = near_x.max(near_y);
        if !(0.0..=1.0).contains(&time) {
            return None;
        }
        
        // the axis entered last is the face we hit
        let normal = if near_x < near_y {
            Vec2::new(0.0, -sign(self.direction.y))
        } else {
            Vec2::new(-sign(self.direction.x), 0.0)
        };
        
        Some(RayHit {
            normal,
            contact: self.point_at(time),
            time,
        })
    }
}

/// Entry and exit times along one axis, ordered
///
/// With no motion on the axis the ray is either strictly between the
/// bounds for all time or never.
fn slab(origin: f32, direction: f32, min: f32, max: f32) -> Option<(f32, f32)> {
    if direction == 0.0 {
        return (min < origin && origin < max).then_some((f32::NEG_INFINITY, f32::INFINITY));
    }
    let near = (min - origin) / direction;
    let far = (max - origin) / direction;
    Some(if far < near { (far, near) } else { (near, far) })
}
