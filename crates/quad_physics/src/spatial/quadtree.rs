//! Dynamic quadtree partition
//!
//! A node is either a leaf holding up to `threshold` elements in a
//! doubly-linked list, or a divided node owning exactly four children and
//! holding nothing itself. Leaves divide when an insert arrives at a full
//! leaf; divided nodes collapse back into a leaf when the unique elements
//! below them fit under the threshold again.
//!
//! Element membership is boundary-inclusive, so a box that straddles a
//! quadrant edge is listed in every leaf it touches.

use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;

use super::element::{BoundedElement, ElementRecord};
use super::node::{EntryKey, ListEntry, QuadNode, QUADRANT_OFFSETS};
use super::{ElementKey, NodeKey, NodeView};
use crate::config::PhysicsConfig;
use crate::error::PhysicsError;
use crate::foundation::math::{next_power_of_two, Vec2};

/// Result of a merge attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Children were destroyed and their elements now live in the node
    Merged {
        /// Unique elements moved into the node
        elements: usize,
    },
    
    /// Too many unique elements below the node; it stays divided
    Skipped {
        /// Unique elements found below the node
        elements: usize,
    },
    
    /// The node was a leaf (or does not exist)
    NotDivided,
}

/// Dynamic quadtree over movable bounded elements
///
/// The tree owns every node, every list entry and every element record.
/// Callers hold [`ElementKey`]s and drive elements through
/// [`QuadTree::move_element`], [`QuadTree::update_element`] and
/// [`QuadTree::remove`].
#[derive(Debug)]
pub struct QuadTree<C> {
    pub(crate) nodes: SlotMap<NodeKey, QuadNode>,
    pub(crate) entries: SlotMap<EntryKey, ListEntry>,
    pub(crate) elements: SlotMap<ElementKey, ElementRecord<C>>,
    pub(crate) root: NodeKey,
    pub(crate) config: PhysicsConfig,
}

impl<C: BoundedElement> QuadTree<C> {
    /// Create a tree covering the world between `min` and `max`
    ///
    /// The root's side is the smallest power of two spanning the larger
    /// of the two world extents, anchored at `min`.
    pub fn new(min: Vec2, max: Vec2, config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate().map_err(PhysicsError::InvalidConfig)?;
        
        let diff = max - min;
        let dim = next_power_of_two(diff.x.max(diff.y));
        
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(QuadNode::new(min, dim, None));
        
        log::debug!(
            "Created quadtree at ({}, {}) with side {} (threshold {}, min node size {})",
            min.x, min.y, dim, config.threshold, config.min_node_size
        );
        
        Ok(Self {
            nodes,
            entries: SlotMap::with_key(),
            elements: SlotMap::with_key(),
            root,
            config,
        })
    }
    
    /// Configuration the tree was built with
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }
    
    /// Key of the root node
    pub fn root(&self) -> NodeKey {
        self.root
    }
    
    /// Snapshot of a node's position, side, count and links
    pub fn node(&self, key: NodeKey) -> Option<NodeView> {
        self.nodes.get(key).map(QuadNode::view)
    }
    
    /// Total number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
    
    /// Total number of live elements, whether or not they are inside the world
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
    
    /// All leaves in depth-first quadrant order
    pub fn leaves(&self) -> Vec<NodeKey> {
        let mut leaves = Vec::new();
        self.collect_leaves(self.root, &mut leaves);
        leaves
    }
    
    /// Elements listed directly in `node`, most recently added first
    pub fn elements_in(&self, node: NodeKey) -> Vec<ElementKey> {
        let mut out = Vec::new();
        let mut cursor = self.nodes.get(node).and_then(|n| n.head);
        while let Some(entry) = cursor {
            let Some(link) = self.entries.get(entry) else { break };
            out.push(link.element);
            cursor = link.next;
        }
        out
    }
    
    /// Insert an existing element starting from the root
    pub fn add(&mut self, element: ElementKey) -> Result<(), PhysicsError> {
        self.add_to(self.root, element)
    }
    
    /// Insert an existing element into the subtree rooted at `node`
    pub fn add_to(&mut self, node: NodeKey, element: ElementKey) -> Result<(), PhysicsError> {
        if !self.elements.contains_key(element) {
            return Err(PhysicsError::UnknownElement(element));
        }
        self.add_to_node(node, element);
        Ok(())
    }
    
    pub(crate) fn add_to_node(&mut self, node: NodeKey, element: ElementKey) {
        let Some(current) = self.nodes.get(node) else { return };
        let region = current.region();
        let is_root = current.parent.is_none();
        let Some(record) = self.elements.get(element) else { return };
        
        if !record.collider.is_contained_by(&region) {
            // only the root reports; children are simply the wrong quadrant
            if is_root {
                let pos = record.collider.position();
                let dim = record.collider.dimensions();
                log::warn!(
                    "QuadTree [({}, {}), ({}, {})] cannot contain element [({}, {}), ({}, {})]",
                    region.pos.x, region.pos.y, region.pos.x + region.side, region.pos.y + region.side,
                    pos.x, pos.y, pos.x + dim.x, pos.y + dim.y
                );
            }
            return;
        }
        
        if !current.is_divided() {
            if record.parents.contains_key(&node) {
                log::debug!("Element {:?} is already listed in node {:?}", element, node);
                return;
            }
            if current.count == self.config.threshold {
                self.divide(node);
            }
        }
        
        if let Some(children) = self.nodes[node].children {
            for child in children {
                self.add_to_node(child, element);
            }
        } else {
            self.push_entry(node, element);
        }
    }
    
    /// Split a leaf into four children and push its elements down
    ///
    /// Refuses (logged, returns `false`) when the leaf is already at or
    /// below the minimum side length; the leaf then stays over threshold.
    pub fn divide(&mut self, node: NodeKey) -> bool {
        let Some(current) = self.nodes.get(node) else { return false };
        if current.is_divided() {
            log::debug!("Node {:?} is already divided", node);
            return false;
        }
        if current.dim <= self.config.min_node_size {
            log::warn!(
                "Cannot divide quadtree node at ({}, {}) with side {}: too many intersecting elements for threshold {}",
                current.pos.x, current.pos.y, current.dim, self.config.threshold
            );
            return false;
        }
        
        let pos = current.pos;
        let dim = current.dim;
        let held = self.drain_leaf(node);
        
        #[allow(clippy::cast_precision_loss)]
        let side = dim as f32;
        let children = QUADRANT_OFFSETS.map(|(ox, oy)| {
            self.nodes.insert(QuadNode::new(pos + Vec2::new(ox * side, oy * side), dim / 2, Some(node)))
        });
        self.nodes[node].children = Some(children);
        
        log::debug!(
            "Divided node at ({}, {}) with side {}, redistributing {} elements",
            pos.x, pos.y, dim, held.len()
        );
        
        for child in children {
            for &element in &held {
                self.add_to_node(child, element);
            }
        }
        true
    }
    
    /// Collapse a divided node back into a leaf if its subtree holds at
    /// most `threshold` unique elements
    pub fn merge(&mut self, node: NodeKey) -> MergeOutcome {
        match self.nodes.get(node) {
            Some(current) if current.is_divided() => self.merge_divided(node),
            _ => {
                log::warn!("Cannot merge quadtree node {:?}: it is not divided", node);
                MergeOutcome::NotDivided
            }
        }
    }
    
    fn merge_divided(&mut self, node: NodeKey) -> MergeOutcome {
        let unique = self.unique_elements(node);
        if unique.len() > self.config.threshold {
            log::trace!("Merge of node {:?} skipped: {} unique elements", node, unique.len());
            return MergeOutcome::Skipped { elements: unique.len() };
        }
        
        let mut leaves = Vec::new();
        self.collect_leaves(node, &mut leaves);
        for leaf in leaves {
            self.drain_leaf(leaf);
        }
        self.destroy_children(node);
        
        // every element below was inside a child, so it is inside this node
        for &element in &unique {
            self.push_entry(node, element);
        }
        
        log::debug!("Merged node {:?} back into a leaf of {} elements", node, unique.len());
        MergeOutcome::Merged { elements: unique.len() }
    }
    
    /// Every element reachable below `node`, each listed once
    pub fn unique_elements(&self, node: NodeKey) -> Vec<ElementKey> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_unique(node, &mut seen, &mut out);
        out
    }
    
    fn collect_unique(&self, node: NodeKey, seen: &mut HashSet<ElementKey>, out: &mut Vec<ElementKey>) {
        let Some(current) = self.nodes.get(node) else { return };
        if let Some(children) = current.children {
            for child in children {
                self.collect_unique(child, seen, out);
            }
        } else {
            for element in self.elements_in(node) {
                if seen.insert(element) {
                    out.push(element);
                }
            }
        }
    }
    
    fn collect_leaves(&self, node: NodeKey, out: &mut Vec<NodeKey>) {
        let Some(current) = self.nodes.get(node) else { return };
        match current.children {
            Some(children) => {
                for child in children {
                    self.collect_leaves(child, out);
                }
            }
            None => out.push(node),
        }
    }
    
    fn destroy_children(&mut self, node: NodeKey) {
        let Some(children) = self.nodes.get_mut(node).and_then(|n| n.children.take()) else { return };
        for child in children {
            self.destroy_children(child);
            self.nodes.remove(child);
        }
    }
    
    /// Attempt merges on grandparents an element no longer touches,
    /// smallest nodes first
    pub(crate) fn merge_stale(&mut self, candidates: impl IntoIterator<Item = NodeKey>) {
        let mut stale: Vec<(u32, NodeKey)> = candidates
            .into_iter()
            .filter_map(|key| self.nodes.get(key).map(|n| (n.dim, key)))
            .collect();
        stale.sort_unstable();
        
        for (_, key) in stale {
            // an earlier merge may have destroyed or collapsed this one
            if self.nodes.get(key).is_some_and(QuadNode::is_divided) {
                self.merge_divided(key);
            }
        }
    }
    
    fn push_entry(&mut self, node: NodeKey, element: ElementKey) {
        let Some(current) = self.nodes.get(node) else { return };
        let head = current.head;
        let parent = current.parent;
        
        let entry = self.entries.insert(ListEntry { element, prev: None, next: head });
        if let Some(old_head) = head.and_then(|key| self.entries.get_mut(key)) {
            old_head.prev = Some(entry);
        }
        
        let current = &mut self.nodes[node];
        current.head = Some(entry);
        current.count += 1;
        
        self.register(node, parent, element, entry);
    }
    
    /// Unlink one entry from a leaf's list
    pub(crate) fn detach_entry(&mut self, node: NodeKey, entry: EntryKey) {
        let Some(link) = self.entries.remove(entry) else { return };
        if let Some(prev) = link.prev.and_then(|key| self.entries.get_mut(key)) {
            prev.next = link.next;
        }
        if let Some(next) = link.next.and_then(|key| self.entries.get_mut(key)) {
            next.prev = link.prev;
        }
        if let Some(current) = self.nodes.get_mut(node) {
            if current.head == Some(entry) {
                current.head = link.next;
            }
            current.count = current.count.saturating_sub(1);
        }
    }
    
    /// Empty a leaf, unregistering every element it held
    fn drain_leaf(&mut self, node: NodeKey) -> Vec<ElementKey> {
        let mut held = Vec::new();
        let mut cursor = self.nodes.get(node).and_then(|n| n.head);
        while let Some(entry) = cursor {
            let Some(link) = self.entries.remove(entry) else { break };
            cursor = link.next;
            self.unregister(node, link.element);
            held.push(link.element);
        }
        if let Some(current) = self.nodes.get_mut(node) {
            current.head = None;
            current.count = 0;
        }
        held
    }
    
    /// Record that `element` is listed in leaf `node` at `entry`
    fn register(&mut self, node: NodeKey, parent: Option<NodeKey>, element: ElementKey, entry: EntryKey) {
        let Some(record) = self.elements.get_mut(element) else { return };
        record.parents.insert(node, entry);
        if let Some(grandparent) = parent {
            *record.grandparents.entry(grandparent).or_insert(0) += 1;
        }
    }
    
    /// Forget that `element` is listed in leaf `node`, returning its entry
    pub(crate) fn unregister(&mut self, node: NodeKey, element: ElementKey) -> Option<EntryKey> {
        let parent = self.nodes.get(node).and_then(|n| n.parent);
        let record = self.elements.get_mut(element)?;
        let entry = record.parents.remove(&node)?;
        if let Some(grandparent) = parent {
            if let Some(count) = record.grandparents.get_mut(&grandparent) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    record.grandparents.remove(&grandparent);
                }
            }
        }
        Some(entry)
    }
    
    /// Structural invariants that do not hold, one message each
    ///
    /// An empty result means the tree and every element's bookkeeping
    /// agree with each other, and every element is listed in exactly the
    /// leaves its stored geometry touches.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut problems = Vec::new();
        
        if self.nodes.get(self.root).map_or(true, |root| root.parent.is_some()) {
            problems.push("root is missing or has a parent".to_string());
        }
        
        for (key, node) in &self.nodes {
            if let Some(children) = node.children {
                if node.count != 0 || node.head.is_some() {
                    problems.push(format!("divided node {key:?} holds {} elements", node.count));
                }
                for child in children {
                    match self.nodes.get(child) {
                        Some(c) if c.parent == Some(key) && c.dim * 2 == node.dim => {}
                        _ => problems.push(format!("child {child:?} of {key:?} is missing or mislinked")),
                    }
                }
            } else {
                let listed = self.elements_in(key);
                if listed.len() != node.count {
                    problems.push(format!("leaf {key:?} counts {} but lists {}", node.count, listed.len()));
                }
                for element in listed {
                    let registered = self.elements.get(element).is_some_and(|r| r.parents.contains_key(&key));
                    if !registered {
                        problems.push(format!("leaf {key:?} lists {element:?} without a matching record"));
                    }
                }
            }
        }
        
        for (key, record) in &self.elements {
            let mut expected: HashMap<NodeKey, u32> = HashMap::new();
            for (&node, &entry) in &record.parents {
                match self.nodes.get(node) {
                    Some(leaf) if !leaf.is_divided() => {
                        if let Some(parent) = leaf.parent {
                            *expected.entry(parent).or_insert(0) += 1;
                        }
                    }
                    _ => problems.push(format!("element {key:?} records non-leaf {node:?}")),
                }
                if self.entries.get(entry).map(|link| link.element) != Some(key) {
                    problems.push(format!("element {key:?} records a foreign entry in {node:?}"));
                }
            }
            if expected != record.grandparents {
                problems.push(format!("element {key:?} grandparent counts are out of date"));
            }
        }
        
        let leaves = self.leaves();
        for (key, record) in &self.elements {
            for &leaf in &leaves {
                let Some(node) = self.nodes.get(leaf) else { continue };
                let inside = record.collider.is_contained_by(&node.region());
                let listed = record.parents.contains_key(&leaf);
                if inside && !listed {
                    problems.push(format!("element {key:?} touches leaf {leaf:?} but is not listed there"));
                } else if listed && !inside {
                    problems.push(format!("element {key:?} is listed in leaf {leaf:?} it does not touch"));
                }
            }
        }
        
        problems
    }
}
