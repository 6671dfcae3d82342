//! Partition snapshots for debug drawing
//!
//! Based on Game Engine Architecture 3rd Edition, Section 10.2:
//! "Debug drawing facilities allow programmers to render simple shapes like
//! lines, points, spheres and boxes for debugging and visualization purposes."
//!
//! A snapshot copies out what a renderer needs to outline the partition,
//! so it can outlive the borrow of the tree.

use crate::foundation::math::Vec2;
use crate::spatial::{BoundedElement, ElementKey, NodeKey, QuadTree};

/// Line segment from start to end
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// First endpoint
    pub start: Vec2,
    /// Second endpoint
    pub end: Vec2,
}

/// Region covered by one leaf
#[derive(Debug, Clone, PartialEq)]
pub struct LeafOutline {
    /// Leaf node
    pub node: NodeKey,
    
    /// Bottom-left corner
    pub pos: Vec2,
    
    /// Side length
    pub side: u32,
    
    /// Elements listed in the leaf
    pub count: usize,
}

/// Box of one element
#[derive(Debug, Clone, PartialEq)]
pub struct ElementOutline {
    /// Element key
    pub element: ElementKey,
    
    /// Bottom-left corner
    pub pos: Vec2,
    
    /// Width and height
    pub dim: Vec2,
    
    /// Number of leaves listing the element (0 when outside the world)
    pub leaves: usize,
}

/// Copy of the partition's leaves and element boxes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionSnapshot {
    /// Leaves in depth-first quadrant order
    pub leaves: Vec<LeafOutline>,
    
    /// Element boxes
    pub elements: Vec<ElementOutline>,
}

impl PartitionSnapshot {
    /// Capture the current state of `tree`
    pub fn capture<C: BoundedElement>(tree: &QuadTree<C>) -> Self {
        let leaves = tree
            .leaves()
            .into_iter()
            .filter_map(|node| {
                tree.node(node).map(|view| LeafOutline {
                    node,
                    pos: view.pos,
                    side: view.dim,
                    count: view.count,
                })
            })
            .collect();
        
        let elements = tree
            .elements
            .iter()
            .map(|(element, record)| ElementOutline {
                element,
                pos: record.collider.position(),
                dim: record.collider.dimensions(),
                leaves: record.parents.len(),
            })
            .collect();
        
        Self { leaves, elements }
    }
    
    /// Four outline segments per leaf, counter-clockwise from the
    /// bottom-left corner
    pub fn line_segments(&self) -> Vec<LineSegment> {
        let mut segments = Vec::with_capacity(self.leaves.len() * 4);
        for leaf in &self.leaves {
            #[allow(clippy::cast_precision_loss)]
            let side = leaf.side as f32;
            let corners = [
                leaf.pos,
                leaf.pos + Vec2::new(side, 0.0),
                leaf.pos + Vec2::new(side, side),
                leaf.pos + Vec2::new(0.0, side),
            ];
            for i in 0..corners.len() {
                segments.push(LineSegment {
                    start: corners[i],
                    end: corners[(i + 1) % corners.len()],
                });
            }
        }
        segments
    }
    
    /// Elements that are not listed in any leaf
    pub fn orphans(&self) -> impl Iterator<Item = &ElementOutline> {
        self.elements.iter().filter(|element| element.leaves == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::physics::Hitbox;
    
    fn tree() -> QuadTree<Hitbox> {
        QuadTree::new(Vec2::zeros(), Vec2::new(16.0, 16.0), PhysicsConfig::default().with_threshold(1)).unwrap()
    }
    
    fn block(x: f32, y: f32) -> Hitbox {
        Hitbox::new(Vec2::new(x, y), Vec2::new(1.0, 1.0), Vec2::zeros())
    }
    
    #[test]
    fn test_single_leaf_outline() {
        let tree = tree();
        let snapshot = PartitionSnapshot::capture(&tree);
        
        assert_eq!(snapshot.leaves.len(), 1);
        assert!(snapshot.elements.is_empty());
        
        let segments = snapshot.line_segments();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0].start, Vec2::zeros());
        assert_eq!(segments[0].end, Vec2::new(16.0, 0.0));
        assert_eq!(segments[3].end, Vec2::zeros());
    }
    
    #[test]
    fn test_divided_tree_outlines_every_leaf() {
        let mut tree = tree();
        tree.insert(block(1.0, 1.0));
        tree.insert(block(12.0, 12.0));
        tree.insert(block(40.0, 40.0));
        
        let snapshot = PartitionSnapshot::capture(&tree);
        assert_eq!(snapshot.leaves.len(), 4);
        assert!(snapshot.leaves.iter().all(|leaf| leaf.side == 8));
        assert_eq!(snapshot.line_segments().len(), 16);
        assert_eq!(snapshot.elements.len(), 3);
        assert_eq!(snapshot.orphans().count(), 1);
    }
}
