//! Spatial partitioning data structures
//!
//! Provides a dynamic quadtree over axis-aligned boxes that move every
//! simulation tick. Nodes, list entries and elements all live in arenas
//! and refer to each other by key, so parent links and membership records
//! can never dangle.

mod node;
mod element;
mod quadtree;

pub use node::{NodeRegion, NodeView, CHILD_COUNT};
pub use element::BoundedElement;
pub use quadtree::{QuadTree, MergeOutcome};

slotmap::new_key_type! {
    /// Stable handle to a node of a [`QuadTree`]
    pub struct NodeKey;
    
    /// Stable handle to an element stored in a [`QuadTree`]
    pub struct ElementKey;
}
