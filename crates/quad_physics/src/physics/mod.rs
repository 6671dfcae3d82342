//! Physics module for collision detection and response
//!
//! Provides swept AABB collision testing on top of the quadtree in
//! [`crate::spatial`], the rectangle hitbox that implements the element
//! contract, and the per-frame driver that keeps host bodies and hitboxes
//! in step.

pub mod ray;
pub mod collision;
pub mod hitbox;
pub mod collision_system;

pub use ray::{Ray, RayHit};
pub use collision::{CollisionInfo, CollisionQueue, CollisionReport};
pub use hitbox::Hitbox;
pub use collision_system::{Body, BodyHandle, FrameStats, PhysicsWorld};
