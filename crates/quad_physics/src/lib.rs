//! # Quad Physics
//!
//! Broad-phase partitioning and swept collision resolution for 2D games.
//!
//! ## Features
//!
//! - **Dynamic Quadtree**: Leaves divide and merge as boxes move, no per-frame rebuild
//! - **Multi-Leaf Membership**: Boxes straddling a quadrant edge are listed in every leaf they touch
//! - **Local Merges**: Grandparent reference counts bound merge work to the region a box left
//! - **Swept AABB Tests**: Ray vs Minkowski-expanded box, resolved in time-of-impact order
//! - **Arena Storage**: Nodes and elements refer to each other by key, never by pointer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quad_physics::prelude::*;
//!
//! fn main() -> Result<(), PhysicsError> {
//!     quad_physics::foundation::logging::init();
//!
//!     let mut world = PhysicsWorld::new(Vec2::new(0.0, 0.0), Vec2::new(256.0, 256.0), PhysicsConfig::default())?;
//!     let ship = world.spawn(Body::new(Vec2::new(20.0, 20.0), Vec2::new(8.0, 8.0), 120.0).with_velocity(Vec2::new(60.0, 0.0)))?;
//!     world.spawn(Body::new(Vec2::new(60.0, 20.0), Vec2::new(8.0, 32.0), 0.0))?;
//!
//!     for _ in 0..60 {
//!         let stats = world.step(1.0 / 60.0);
//!         log::debug!("{} collisions resolved", stats.resolved);
//!     }
//!
//!     if let Some(body) = world.body(ship) {
//!         log::info!("Ship came to rest at ({}, {})", body.position.x, body.position.y);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod spatial;
pub mod physics;
pub mod debug;
pub mod error;

pub use error::PhysicsError;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        PhysicsError,
        config::{Config, ConfigError, PhysicsConfig, SweepMode},
        foundation::math::{Vec2, Vec2Ext},
        spatial::{BoundedElement, ElementKey, MergeOutcome, NodeKey, NodeView, QuadTree},
        physics::{Body, BodyHandle, CollisionInfo, CollisionReport, FrameStats, Hitbox, PhysicsWorld},
        debug::PartitionSnapshot,
    };
}

#[cfg(test)]
mod tests;
