//! Debug module for visualization and debugging tools
//!
//! Based on Game Engine Architecture 3rd Edition, Chapter 10.2:
//! "Debug Drawing Facilities"

pub mod partition;

pub use partition::{ElementOutline, LeafOutline, LineSegment, PartitionSnapshot};
