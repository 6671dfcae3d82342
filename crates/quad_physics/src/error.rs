//! Error types for the physics substrate
//!
//! Structural anomalies inside the partition (out-of-world inserts, refused
//! divisions, merges of leaves) are logged and never surface here. These
//! errors only report misuse of the public API: dead handles, full lists
//! and invalid configuration.

use crate::foundation::collections::ListHandle;
use crate::spatial::ElementKey;
use thiserror::Error;

/// Errors returned by the quadtree and the collision driver
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhysicsError {
    /// The element key does not refer to a live element
    #[error("Unknown element: {0:?}")]
    UnknownElement(ElementKey),
    
    /// The body handle does not refer to a live body
    #[error("Unknown body: {0:?}")]
    UnknownBody(ListHandle),
    
    /// A fixed-capacity list has no free slot left
    #[error("Capacity exceeded: list holds at most {capacity} items")]
    CapacityExceeded {
        /// Maximum number of items the list can hold
        capacity: usize,
    },
    
    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
