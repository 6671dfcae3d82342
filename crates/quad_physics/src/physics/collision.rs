//! Collision records produced by the swept pass

use crate::foundation::math::Vec2;
use crate::physics::ray::RayHit;
use crate::spatial::ElementKey;

/// One detected collision from the point of view of the moving element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    /// The element that was hit
    pub other: ElementKey,
    /// Contact normal, pointing back against the motion
    pub normal: Vec2,
    /// Contact point (centre of the moving box at the time of impact)
    pub contact: Vec2,
    /// Time of impact as a fraction of this frame's motion, in `[0, 1]`
    pub time: f32,
}

impl CollisionInfo {
    /// Build a record from a ray hit against `other`
    pub fn from_hit(other: ElementKey, hit: RayHit) -> Self {
        Self {
            other,
            normal: hit.normal,
            contact: hit.contact,
            time: hit.time,
        }
    }
}

/// Time-ordered collection of collisions that keeps duplicate times
///
/// Ties are common (two walls hit at once) and every tied entry must be
/// processed, so this is a multi-map: equal times keep their insertion
/// order.
#[derive(Debug, Clone, Default)]
pub struct CollisionQueue {
    entries: Vec<CollisionInfo>,
}

impl CollisionQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Record a collision
    pub fn push(&mut self, info: CollisionInfo) {
        self.entries.push(info);
    }
    
    /// Number of recorded collisions
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    
    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    
    /// All collisions by ascending time of impact
    pub fn into_ordered(mut self) -> Vec<CollisionInfo> {
        // stable sort keeps tied entries in insertion order
        self.entries.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.entries
    }
}

/// Outcome of one element's collision pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Distinct neighbours tested
    pub candidates: usize,
    /// Hits found by the sweep, ordered by time of impact
    pub detected: Vec<CollisionInfo>,
    /// Hits that still held when re-tested and were resolved, in order
    pub resolved: Vec<CollisionInfo>,
}
