//! Bounded elements and their membership bookkeeping
//!
//! Each element remembers which leaves list it (and where in each list),
//! plus a reference count per "grandparent": the parent of a containing
//! leaf. When a move or a removal drops a grandparent's count to zero the
//! element has left that subtree, and only those subtrees are offered a
//! merge. A move therefore costs work proportional to the region it
//! touched, not to the whole tree.

use std::collections::{HashMap, HashSet};

use super::node::{EntryKey, NodeRegion};
use super::quadtree::QuadTree;
use super::{ElementKey, NodeKey};
use crate::error::PhysicsError;
use crate::foundation::math::{Vec2, Vec2Ext};
use crate::physics::collision::{CollisionInfo, CollisionQueue, CollisionReport};
use crate::physics::ray::RayHit;

/// Contract a concrete element implements to live in a [`QuadTree`]
///
/// The tree is generic over a single implementation, so every element in
/// one tree shares the same shape and resolution policy.
pub trait BoundedElement {
    /// Bottom-left corner
    fn position(&self) -> Vec2;
    
    /// Width and height
    fn dimensions(&self) -> Vec2;
    
    /// Velocity in world units per second
    fn velocity(&self) -> Vec2;
    
    /// Overwrite position, dimensions and velocity with the host's values
    fn copy_host_values(&mut self, pos: Vec2, dim: Vec2, vel: Vec2);
    
    /// Overwrite only the velocity
    fn set_velocity(&mut self, vel: Vec2);
    
    /// Whether this element belongs in the given node region
    fn is_contained_by(&self, region: &NodeRegion) -> bool;
    
    /// Test this element against `other` over a frame of length `delta`
    fn intersects(&self, other: &Self, delta: f32) -> Option<RayHit>;
    
    /// Adjust this element's state in response to a verified collision
    fn resolve_collision(&mut self, info: &CollisionInfo);
}

/// Element state stored by the tree
#[derive(Debug)]
pub(crate) struct ElementRecord<C> {
    pub(crate) collider: C,
    /// Containing leaf -> this element's entry in that leaf's list
    pub(crate) parents: HashMap<NodeKey, EntryKey>,
    /// Parent of a containing leaf -> number of containing leaves under it
    pub(crate) grandparents: HashMap<NodeKey, u32>,
    /// Neighbours already tested during the current update
    pub(crate) checked: HashSet<ElementKey>,
}

impl<C> ElementRecord<C> {
    fn new(collider: C) -> Self {
        Self {
            collider,
            parents: HashMap::new(),
            grandparents: HashMap::new(),
            checked: HashSet::new(),
        }
    }
}

impl<C: BoundedElement> QuadTree<C> {
    /// Take ownership of an element and add it from the root
    ///
    /// An element outside the world is logged and kept, but is not listed
    /// in any leaf until a later move brings it inside.
    pub fn insert(&mut self, collider: C) -> ElementKey {
        let key = self.elements.insert(ElementRecord::new(collider));
        self.add_to_node(self.root, key);
        key
    }
    
    /// The element behind `key`
    pub fn get(&self, key: ElementKey) -> Option<&C> {
        self.elements.get(key).map(|record| &record.collider)
    }
    
    /// Leaves currently listing the element, in key order
    pub fn containing_leaves(&self, key: ElementKey) -> Vec<NodeKey> {
        let mut leaves: Vec<NodeKey> = self
            .elements
            .get(key)
            .map(|record| record.parents.keys().copied().collect())
            .unwrap_or_default();
        leaves.sort_unstable();
        leaves
    }
    
    /// Grandparents the element touches with their reference counts
    pub fn grandparents(&self, key: ElementKey) -> HashMap<NodeKey, u32> {
        self.elements
            .get(key)
            .map(|record| record.grandparents.clone())
            .unwrap_or_default()
    }
    
    /// Bring an element up to date with its host's latest state
    ///
    /// If position or dimensions changed the element leaves every leaf,
    /// re-enters from the root, and then each grandparent it no longer
    /// touches is offered a merge. If the geometry moved by no more than
    /// the tolerance, only the velocity is stored: the element keeps the
    /// geometry it was registered with, so small steps accumulate until
    /// they force a re-insert.
    pub fn move_element(&mut self, key: ElementKey, pos: Vec2, dim: Vec2, vel: Vec2) -> Result<(), PhysicsError> {
        let epsilon = self.config.epsilon;
        let record = self.elements.get_mut(key).ok_or(PhysicsError::UnknownElement(key))?;
        
        let moved = !record.collider.position().approx_eq_within(&pos, epsilon)
            || !record.collider.dimensions().approx_eq_within(&dim, epsilon);
        if !moved {
            record.collider.set_velocity(vel);
            return Ok(());
        }
        record.collider.copy_host_values(pos, dim, vel);
        
        let original: Vec<NodeKey> = record.grandparents.keys().copied().collect();
        self.remove_from_parents(key);
        self.add_to_node(self.root, key);
        
        let current = self.grandparents(key);
        let stale: Vec<NodeKey> = original.into_iter().filter(|gp| !current.contains_key(gp)).collect();
        if !stale.is_empty() {
            log::trace!("Element {:?} left {} grandparents", key, stale.len());
            self.merge_stale(stale);
        }
        Ok(())
    }
    
    /// Swept collision pass for one element over a frame of length `delta`
    ///
    /// Every neighbour sharing a leaf is tested once. Hits are resolved in
    /// time order; each is re-tested first because an earlier resolution
    /// in the same pass may have made it stale.
    pub fn update_element(&mut self, key: ElementKey, delta: f32) -> Result<CollisionReport, PhysicsError> {
        let epsilon = self.config.epsilon;
        let record = self.elements.get_mut(key).ok_or(PhysicsError::UnknownElement(key))?;
        if record.collider.velocity().is_zero_within(epsilon) {
            return Ok(CollisionReport::default());
        }
        record.checked.clear();
        
        let mut leaves: Vec<NodeKey> = record.parents.keys().copied().collect();
        leaves.sort_unstable();
        
        let mut queue = CollisionQueue::new();
        let mut candidates = 0;
        for leaf in leaves {
            for other in self.elements_in(leaf) {
                if other == key || !self.mark_checked(key, other) {
                    continue;
                }
                candidates += 1;
                
                let (Some(this), Some(that)) = (self.elements.get(key), self.elements.get(other)) else { continue };
                if let Some(hit) = this.collider.intersects(&that.collider, delta) {
                    log::trace!("Element {:?} hits {:?} at t = {}", key, other, hit.time);
                    queue.push(CollisionInfo::from_hit(other, hit));
                }
            }
        }
        
        let detected = queue.into_ordered();
        let mut resolved = Vec::with_capacity(detected.len());
        for recorded in &detected {
            let (Some(this), Some(that)) = (self.elements.get(key), self.elements.get(recorded.other)) else { continue };
            let Some(hit) = this.collider.intersects(&that.collider, delta) else {
                log::trace!("Collision of {:?} with {:?} went stale", key, recorded.other);
                continue;
            };
            
            let info = CollisionInfo::from_hit(recorded.other, hit);
            if let Some(record) = self.elements.get_mut(key) {
                record.collider.resolve_collision(&info);
            }
            resolved.push(info);
        }
        
        Ok(CollisionReport { candidates, detected, resolved })
    }
    
    /// Detach an element from the tree and hand it back
    ///
    /// Grandparents that lose the element are offered a merge before the
    /// element's bookkeeping is dropped.
    pub fn remove(&mut self, key: ElementKey) -> Result<C, PhysicsError> {
        let grandparents: Vec<NodeKey> = self
            .elements
            .get(key)
            .ok_or(PhysicsError::UnknownElement(key))?
            .grandparents
            .keys()
            .copied()
            .collect();
        
        self.remove_from_parents(key);
        self.merge_stale(grandparents);
        
        self.elements
            .remove(key)
            .map(|record| record.collider)
            .ok_or(PhysicsError::UnknownElement(key))
    }
    
    /// Returns `false` if `other` was already checked this pass
    fn mark_checked(&mut self, key: ElementKey, other: ElementKey) -> bool {
        self.elements
            .get_mut(key)
            .is_some_and(|record| record.checked.insert(other))
    }
    
    /// Leave every containing leaf
    fn remove_from_parents(&mut self, key: ElementKey) {
        let parents: Vec<(NodeKey, EntryKey)> = match self.elements.get_mut(key) {
            Some(record) => record.parents.drain().collect(),
            None => return,
        };
        for (node, entry) in parents {
            self.detach_entry(node, entry);
        }
        if let Some(record) = self.elements.get_mut(key) {
            record.grandparents.clear();
        }
    }
}
