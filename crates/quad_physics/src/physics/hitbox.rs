//! Axis-aligned rectangle collider
//!
//! The moving box is reduced to its centre point, and the other box is
//! grown by this box's half extents on every side (their Minkowski sum).
//! A ray from the centre along `velocity * delta` against the grown box
//! gives the time of impact and the face that was hit.

use crate::config::SweepMode;
use crate::foundation::math::{sign, Vec2};
use crate::foundation::range::{rect_intersect, OverlapParams};
use crate::physics::collision::CollisionInfo;
use crate::physics::ray::{Ray, RayHit};
use crate::spatial::{BoundedElement, NodeRegion};

/// Rectangle with a velocity, stored in a [`crate::spatial::QuadTree`]
#[derive(Debug, Clone, PartialEq)]
pub struct Hitbox {
    /// Bottom-left corner
    pub position: Vec2,
    
    /// Width and height
    pub dimensions: Vec2,
    
    /// Velocity in world units per second
    pub velocity: Vec2,
    
    /// Pairwise test used by [`BoundedElement::intersects`]
    pub sweep_mode: SweepMode,
}

impl Hitbox {
    /// Create a swept hitbox
    pub fn new(position: Vec2, dimensions: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            dimensions,
            velocity,
            sweep_mode: SweepMode::Swept,
        }
    }
    
    /// Use a different pairwise test
    #[must_use]
    pub fn with_sweep_mode(mut self, mode: SweepMode) -> Self {
        self.sweep_mode = mode;
        self
    }
    
    /// Centre of the rectangle
    pub fn center(&self) -> Vec2 {
        self.position + self.dimensions / 2.0
    }
    
    /// Top-right corner
    pub fn far_corner(&self) -> Vec2 {
        self.position + self.dimensions
    }
    
    fn swept(&self, other: &Hitbox, delta: f32) -> Option<RayHit> {
        let ray = Ray::new(self.center(), self.velocity * delta);
        let half = self.dimensions / 2.0;
        ray.intersect_rect(other.position - half, other.dimensions + self.dimensions)
    }
    
    /// Overlap at the current positions, reported on the axis of least
    /// penetration and only while moving into the other box
    fn overlapping(&self, other: &Hitbox) -> Option<RayHit> {
        let low = self.position.sup(&other.position);
        let high = self.far_corner().inf(&other.far_corner());
        let overlap = high - low;
        if overlap.x < 0.0 || overlap.y < 0.0 {
            return None;
        }
        
        let towards = other.center() - self.center();
        let normal = if overlap.x <= overlap.y {
            if self.velocity.x * towards.x <= 0.0 {
                return None;
            }
            Vec2::new(-sign(self.velocity.x), 0.0)
        } else {
            if self.velocity.y * towards.y <= 0.0 {
                return None;
            }
            Vec2::new(0.0, -sign(self.velocity.y))
        };
        
        Some(RayHit {
            normal,
            contact: self.center(),
            time: 0.0,
        })
    }
}

impl BoundedElement for Hitbox {
    fn position(&self) -> Vec2 {
        self.position
    }
    
    fn dimensions(&self) -> Vec2 {
        self.dimensions
    }
    
    fn velocity(&self) -> Vec2 {
        self.velocity
    }
    
    fn copy_host_values(&mut self, pos: Vec2, dim: Vec2, vel: Vec2) {
        self.position = pos;
        self.dimensions = dim;
        self.velocity = vel;
    }
    
    fn set_velocity(&mut self, vel: Vec2) {
        self.velocity = vel;
    }
    
    fn is_contained_by(&self, region: &NodeRegion) -> bool {
        rect_intersect(self.position, self.dimensions, region.pos, region.extent(), OverlapParams::INCLUSIVE)
    }
    
    fn intersects(&self, other: &Self, delta: f32) -> Option<RayHit> {
        match self.sweep_mode {
            SweepMode::Swept => self.swept(other, delta),
            SweepMode::Static => self.overlapping(other),
        }
    }
    
    /// Bleed off the velocity into the contact face for the rest of the frame
    fn resolve_collision(&mut self, info: &CollisionInfo) {
        self.velocity += info.normal.component_mul(&self.velocity.abs()) * (1.0 - info.time);
    }
}
