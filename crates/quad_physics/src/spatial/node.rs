//! Partition node storage

use super::{ElementKey, NodeKey};
use crate::foundation::math::Vec2;

/// Number of children of a divided node
pub const CHILD_COUNT: usize = 4;

/// Quadrant offsets as fractions of the parent side:
/// bottom-left, bottom-right, top-right, top-left
pub(crate) const QUADRANT_OFFSETS: [(f32, f32); CHILD_COUNT] = [(0.0, 0.0), (0.5, 0.0), (0.5, 0.5), (0.0, 0.5)];

slotmap::new_key_type! {
    /// Handle to one entry of a leaf's element list
    pub(crate) struct EntryKey;
}

/// Square region covered by a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRegion {
    /// Bottom-left corner
    pub pos: Vec2,
    /// Side length
    pub side: f32,
}

impl NodeRegion {
    /// Width and height of the region as a vector
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.side, self.side)
    }
}

/// Read-only snapshot of a node for diagnostics and debug drawing
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    /// Bottom-left corner
    pub pos: Vec2,
    /// Side length
    pub dim: u32,
    /// Elements held directly (always 0 for divided nodes)
    pub count: usize,
    /// Parent node, `None` for the root
    pub parent: Option<NodeKey>,
    /// Children in quadrant order, `None` for leaves
    pub children: Option<[NodeKey; CHILD_COUNT]>,
}

impl NodeView {
    /// Whether this node has been divided into four children
    pub fn is_divided(&self) -> bool {
        self.children.is_some()
    }
}

/// One link of a leaf's doubly-linked element list
#[derive(Debug, Clone, Copy)]
pub(crate) struct ListEntry {
    pub(crate) element: ElementKey,
    pub(crate) prev: Option<EntryKey>,
    pub(crate) next: Option<EntryKey>,
}

/// A node of the tree: a leaf holding a list of elements, or a divided
/// node owning exactly four children and no elements
#[derive(Debug, Clone)]
pub(crate) struct QuadNode {
    /// Bottom-left corner
    pub(crate) pos: Vec2,
    /// Side length, always a power of two
    pub(crate) dim: u32,
    pub(crate) children: Option<[NodeKey; CHILD_COUNT]>,
    pub(crate) parent: Option<NodeKey>,
    /// Head of the element list (leaves only)
    pub(crate) head: Option<EntryKey>,
    pub(crate) count: usize,
}

impl QuadNode {
    pub(crate) fn new(pos: Vec2, dim: u32, parent: Option<NodeKey>) -> Self {
        Self {
            pos,
            dim,
            children: None,
            parent,
            head: None,
            count: 0,
        }
    }
    
    pub(crate) fn is_divided(&self) -> bool {
        self.children.is_some()
    }
    
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn region(&self) -> NodeRegion {
        NodeRegion { pos: self.pos, side: self.dim as f32 }
    }
    
    pub(crate) fn view(&self) -> NodeView {
        NodeView {
            pos: self.pos,
            dim: self.dim,
            count: self.count,
            parent: self.parent,
            children: self.children,
        }
    }
}
