//! Per-frame collision driver
//!
//! Based on Game Engine Architecture 3rd Edition, Chapter 13:
//! "The collision detection system is typically split into two phases:
//! broad-phase and narrow-phase."
//!
//! Host bodies own their transforms; the world mirrors each one into a
//! [`Hitbox`] stored in the quadtree. Every frame runs in a fixed order:
//!
//! 1. move every hitbox to its body's latest state
//! 2. run the collision pass for every hitbox
//! 3. copy resolved velocities back to the bodies
//! 4. integrate body positions by `velocity * delta`
//!
//! All moves happen before any test so no hitbox is tested against a
//! neighbour's previous-frame position.

use crate::config::PhysicsConfig;
use crate::error::PhysicsError;
use crate::foundation::collections::{IndexedList, ListHandle};
use crate::foundation::math::{Vec2, Vec2Ext};
use crate::physics::hitbox::Hitbox;
use crate::spatial::{ElementKey, QuadTree};

/// Handle to a body spawned in a [`PhysicsWorld`]
pub type BodyHandle = ListHandle;

/// Host-side moving object
///
/// Positions are box centres; the mirrored hitbox stores the bottom-left
/// corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Centre of the box
    pub position: Vec2,
    
    /// Width and height
    pub dimensions: Vec2,
    
    /// Largest speed `set_velocity` accepts; negative values act as 0
    pub max_speed: f32,
    
    velocity: Vec2,
    hitbox: Option<ElementKey>,
}

impl Body {
    /// Create a body at rest
    ///
    /// A negative `max_speed` is raised to 0.
    pub fn new(position: Vec2, dimensions: Vec2, max_speed: f32) -> Self {
        Self {
            position,
            dimensions,
            max_speed: max_speed.max(0.0),
            velocity: Vec2::zeros(),
            hitbox: None,
        }
    }
    
    /// Start with a velocity (clamped to `max_speed`)
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.set_velocity(velocity);
        self
    }
    
    /// Current velocity
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }
    
    /// Set the velocity, rescaling its magnitude into `[0, max_speed]`
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity.clamp_length(0.0, self.max_speed.max(0.0));
    }
    
    /// Key of the mirrored hitbox while the body is spawned
    pub fn hitbox(&self) -> Option<ElementKey> {
        self.hitbox
    }
    
    /// Bottom-left corner of the box
    pub fn corner(&self) -> Vec2 {
        self.position - self.dimensions / 2.0
    }
}

/// Counters from one [`PhysicsWorld::step`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Bodies stepped
    pub bodies: usize,
    /// Pairwise tests run
    pub candidates: usize,
    /// Collisions found by the sweep
    pub detected: usize,
    /// Collisions that re-verified and were resolved
    pub resolved: usize,
    /// Leaves in the partition after the frame
    pub leaves: usize,
    /// Nodes in the partition after the frame
    pub nodes: usize,
}

/// Bodies plus the quadtree of their hitboxes
#[derive(Debug)]
pub struct PhysicsWorld {
    tree: QuadTree<Hitbox>,
    bodies: IndexedList<Body>,
    config: PhysicsConfig,
}

impl PhysicsWorld {
    /// Create an empty world between `min` and `max`
    pub fn new(min: Vec2, max: Vec2, config: PhysicsConfig) -> Result<Self, PhysicsError> {
        let tree = QuadTree::new(min, max, config.clone())?;
        Ok(Self {
            tree,
            bodies: IndexedList::with_capacity(config.max_bodies),
            config,
        })
    }
    
    /// Configuration the world was built with
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }
    
    /// The partition holding every spawned hitbox
    pub fn tree(&self) -> &QuadTree<Hitbox> {
        &self.tree
    }
    
    /// Number of spawned bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }
    
    /// Whether no body is spawned
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
    
    /// Add a body and insert its hitbox into the tree
    pub fn spawn(&mut self, body: Body) -> Result<BodyHandle, PhysicsError> {
        let hitbox = Hitbox::new(body.corner(), body.dimensions, body.velocity)
            .with_sweep_mode(self.config.sweep_mode);
        
        let handle = self.bodies.add(body)?;
        let key = self.tree.insert(hitbox);
        if let Some(body) = self.bodies.get_mut(handle) {
            body.hitbox = Some(key);
        }
        
        log::debug!("Spawned body {:?} with hitbox {:?}", handle, key);
        Ok(handle)
    }
    
    /// Remove a body and its hitbox, returning the body
    pub fn despawn(&mut self, handle: BodyHandle) -> Result<Body, PhysicsError> {
        let mut body = self.bodies.remove(handle).ok_or(PhysicsError::UnknownBody(handle))?;
        if let Some(key) = body.hitbox.take() {
            self.tree.remove(key)?;
        }
        Ok(body)
    }
    
    /// Get a body by handle
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }
    
    /// Get a mutable body by handle
    ///
    /// Changes take effect in the tree at the start of the next step.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }
    
    /// Iterate over spawned bodies in slot order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies.iter()
    }
    
    /// Advance the simulation by `delta` seconds
    pub fn step(&mut self, delta: f32) -> FrameStats {
        let linked: Vec<(BodyHandle, ElementKey)> = self
            .bodies
            .iter()
            .filter_map(|(handle, body)| body.hitbox.map(|key| (handle, key)))
            .collect();
        
        let mut stats = FrameStats {
            bodies: linked.len(),
            ..FrameStats::default()
        };
        
        for &(handle, key) in &linked {
            let Some(body) = self.bodies.get(handle) else { continue };
            if let Err(err) = self.tree.move_element(key, body.corner(), body.dimensions, body.velocity) {
                log::warn!("Failed to move hitbox of body {:?}: {}", handle, err);
            }
        }
        
        for &(handle, key) in &linked {
            match self.tree.update_element(key, delta) {
                Ok(report) => {
                    stats.candidates += report.candidates;
                    stats.detected += report.detected.len();
                    stats.resolved += report.resolved.len();
                }
                Err(err) => log::warn!("Failed to update hitbox of body {:?}: {}", handle, err),
            }
        }
        
        // resolution only changes velocity; a hitbox may lag its body by up
        // to the tolerance, so the body keeps its own position
        for &(handle, key) in &linked {
            let Some(resolved) = self.tree.get(key).map(|hitbox| hitbox.velocity) else { continue };
            if let Some(body) = self.bodies.get_mut(handle) {
                body.set_velocity(resolved);
            }
        }
        
        for &(handle, _) in &linked {
            if let Some(body) = self.bodies.get_mut(handle) {
                body.position += body.velocity * delta;
            }
        }
        
        stats.leaves = self.tree.leaves().len();
        stats.nodes = self.tree.node_count();
        log::debug!(
            "Stepped {} bodies: {} candidates, {} collisions detected, {} resolved, {} leaves",
            stats.bodies, stats.candidates, stats.detected, stats.resolved, stats.leaves
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    
    fn world(config: PhysicsConfig) -> PhysicsWorld {
        PhysicsWorld::new(Vec2::new(-64.0, -64.0), Vec2::new(64.0, 64.0), config).unwrap()
    }
    
    fn crate_at(x: f32, y: f32) -> Body {
        Body::new(Vec2::new(x, y), Vec2::new(10.0, 10.0), 200.0)
    }
    
    #[test]
    fn test_set_velocity_clamps_to_max_speed() {
        let mut body = Body::new(Vec2::zeros(), Vec2::new(1.0, 1.0), 10.0);
        body.set_velocity(Vec2::new(30.0, 40.0));
        assert_relative_eq!(body.velocity(), Vec2::new(6.0, 8.0), epsilon = 1e-5);
        
        body.set_velocity(Vec2::new(3.0, 4.0));
        assert_relative_eq!(body.velocity(), Vec2::new(3.0, 4.0));
        
        body.set_velocity(Vec2::zeros());
        assert_eq!(body.velocity(), Vec2::zeros());
    }
    
    #[test]
    fn test_negative_max_speed_never_flips_velocity() {
        let mut body = Body::new(Vec2::zeros(), Vec2::new(1.0, 1.0), -5.0);
        assert_eq!(body.max_speed, 0.0);
        body.set_velocity(Vec2::new(3.0, 4.0));
        assert_eq!(body.velocity(), Vec2::zeros());
        
        body.max_speed = -2.0;
        body.set_velocity(Vec2::new(3.0, 4.0));
        assert_eq!(body.velocity(), Vec2::zeros());
    }
    
    #[test]
    fn test_slow_body_still_advances() {
        let mut world = world(PhysicsConfig::default());
        let handle = world.spawn(crate_at(0.0, 0.0).with_velocity(Vec2::new(0.0005, 0.0))).unwrap();
        
        // each frame moves it by half the tolerance
        for _ in 0..100 {
            world.step(0.1);
        }
        
        let body = world.body(handle).unwrap();
        assert_relative_eq!(body.position.x, 0.005, epsilon = 1e-5);
        let hitbox = world.tree().get(body.hitbox().unwrap()).unwrap();
        assert_relative_eq!(hitbox.center().x, body.position.x, epsilon = 2.0 * world.config().epsilon);
        assert!(world.tree().check_invariants().is_empty());
    }
    
    #[test]
    fn test_free_body_integrates() {
        let mut world = world(PhysicsConfig::default());
        let handle = world.spawn(crate_at(0.0, 0.0).with_velocity(Vec2::new(10.0, -4.0))).unwrap();
        
        let stats = world.step(0.5);
        assert_eq!(stats.bodies, 1);
        assert_eq!(stats.detected, 0);
        assert_eq!(stats.leaves, 1);
        assert_relative_eq!(world.body(handle).unwrap().position, Vec2::new(5.0, -2.0));
    }
    
    #[test]
    fn test_head_on_stops_flush_then_rests() {
        let mut world = world(PhysicsConfig::default());
        let mover = world.spawn(crate_at(5.0, 5.0).with_velocity(Vec2::new(100.0, 0.0))).unwrap();
        let wall = world.spawn(crate_at(25.0, 5.0)).unwrap();
        
        let stats = world.step(0.2);
        assert_eq!(stats.detected, 1);
        assert_eq!(stats.resolved, 1);
        
        let body = world.body(mover).unwrap();
        assert_relative_eq!(body.velocity().x, 50.0);
        assert_relative_eq!(body.position.x, 15.0);
        
        // second frame starts in resting contact and bleeds off the rest
        let stats = world.step(0.2);
        assert_eq!(stats.resolved, 1);
        let body = world.body(mover).unwrap();
        assert_relative_eq!(body.velocity().x, 0.0);
        assert_relative_eq!(body.position.x, 15.0);
        assert_relative_eq!(world.body(wall).unwrap().position.x, 25.0);
    }
    
    #[test]
    fn test_despawn_removes_hitbox() {
        let mut world = world(PhysicsConfig::default());
        let handle = world.spawn(crate_at(0.0, 0.0)).unwrap();
        assert_eq!(world.tree().element_count(), 1);
        
        let body = world.despawn(handle).unwrap();
        assert!(body.hitbox().is_none());
        assert_eq!(world.tree().element_count(), 0);
        assert!(world.is_empty());
        assert_eq!(world.despawn(handle), Err(PhysicsError::UnknownBody(handle)));
    }
    
    #[test]
    fn test_spawn_past_capacity() {
        let mut world = world(PhysicsConfig::default().with_max_bodies(1));
        world.spawn(crate_at(0.0, 0.0)).unwrap();
        
        let result = world.spawn(crate_at(20.0, 0.0));
        assert_eq!(result, Err(PhysicsError::CapacityExceeded { capacity: 1 }));
        assert_eq!(world.tree().element_count(), 1);
    }
    
    #[test]
    fn test_invalid_config_is_rejected() {
        let result = PhysicsWorld::new(Vec2::zeros(), Vec2::new(10.0, 10.0), PhysicsConfig::default().with_threshold(0));
        assert!(matches!(result, Err(PhysicsError::InvalidConfig(_))));
    }
}
