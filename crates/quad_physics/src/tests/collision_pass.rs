//! Swept collision pass through the tree
//!
//! Box A (10x10) at the origin moving right at 100 units/s is the
//! reference mover in most cases below.

use crate::config::PhysicsConfig;
use crate::error::PhysicsError;
use crate::foundation::math::Vec2;
use crate::physics::Hitbox;
use crate::spatial::{BoundedElement, QuadTree};
use approx::assert_relative_eq;

#[cfg(test)]
mod tests {
    use super::*;
    
    fn arena() -> QuadTree<Hitbox> {
        QuadTree::new(Vec2::new(-64.0, -64.0), Vec2::new(64.0, 64.0), PhysicsConfig::default()).unwrap()
    }
    
    fn crate_box(x: f32, y: f32) -> Hitbox {
        Hitbox::new(Vec2::new(x, y), Vec2::new(10.0, 10.0), Vec2::zeros())
    }
    
    fn mover() -> Hitbox {
        Hitbox::new(Vec2::zeros(), Vec2::new(10.0, 10.0), Vec2::new(100.0, 0.0))
    }
    
    #[test]
    fn test_head_on_hit_is_resolved() {
        let mut tree = arena();
        let a = tree.insert(mover());
        let b = tree.insert(crate_box(20.0, 0.0));
        
        let report = tree.update_element(a, 0.2).unwrap();
        assert_eq!(report.candidates, 1);
        assert_eq!(report.detected.len(), 1);
        assert_eq!(report.resolved.len(), 1);
        
        let hit = report.resolved[0];
        assert_eq!(hit.other, b);
        assert_relative_eq!(hit.time, 0.5);
        assert_eq!(hit.normal, Vec2::new(-1.0, 0.0));
        assert_relative_eq!(tree.get(a).unwrap().velocity().x, 50.0);
    }
    
    #[test]
    fn test_short_frame_reports_nothing() {
        let mut tree = arena();
        let a = tree.insert(mover());
        tree.insert(crate_box(20.0, 0.0));
        
        let report = tree.update_element(a, 0.05).unwrap();
        assert_eq!(report.candidates, 1);
        assert!(report.detected.is_empty());
        assert_relative_eq!(tree.get(a).unwrap().velocity().x, 100.0);
    }
    
    #[test]
    fn test_resting_contact_zeroes_approach() {
        let mut tree = arena();
        let a = tree.insert(mover());
        tree.insert(crate_box(10.0, 0.0));
        
        let report = tree.update_element(a, 0.2).unwrap();
        assert_eq!(report.resolved.len(), 1);
        assert_relative_eq!(report.resolved[0].time, 0.0);
        assert_relative_eq!(tree.get(a).unwrap().velocity().x, 0.0);
    }
    
    #[test]
    fn test_tied_collisions_are_all_attempted() {
        let mut tree = arena();
        let a = tree.insert(mover());
        let low = tree.insert(crate_box(20.0, -6.0));
        let high = tree.insert(crate_box(20.0, 6.0));
        
        let report = tree.update_element(a, 0.2).unwrap();
        assert_eq!(report.detected.len(), 2);
        assert_relative_eq!(report.detected[0].time, 0.5);
        assert_relative_eq!(report.detected[1].time, 0.5);
        
        let mut others = vec![report.detected[0].other, report.detected[1].other];
        others.sort_unstable();
        let mut expected = vec![low, high];
        expected.sort_unstable();
        assert_eq!(others, expected);
        
        // the second hit is re-tested with the slowed velocity and now
        // lands at the very end of the frame
        assert_eq!(report.resolved.len(), 2);
        assert_relative_eq!(report.resolved[1].time, 1.0);
        assert_relative_eq!(tree.get(a).unwrap().velocity().x, 50.0);
    }
    
    #[test]
    fn test_stale_collision_is_skipped() {
        let mut tree = arena();
        let a = tree.insert(mover());
        let near = tree.insert(crate_box(10.0, 0.0));
        tree.insert(crate_box(20.0, 0.0));
        
        // both walls are in the path, but stopping at the first one
        // means the second is never reached
        let report = tree.update_element(a, 0.2).unwrap();
        assert_eq!(report.detected.len(), 2);
        assert_eq!(report.resolved.len(), 1);
        assert_eq!(report.resolved[0].other, near);
        assert_relative_eq!(tree.get(a).unwrap().velocity().x, 0.0);
    }
    
    #[test]
    fn test_never_collides_with_itself() {
        let mut tree = arena();
        let a = tree.insert(mover());
        
        let report = tree.update_element(a, 0.2).unwrap();
        assert_eq!(report.candidates, 0);
        assert!(report.detected.is_empty());
        
        tree.insert(crate_box(20.0, 0.0));
        let report = tree.update_element(a, 0.2).unwrap();
        assert!(report.detected.iter().all(|info| info.other != a));
    }
    
    #[test]
    fn test_resting_element_is_skipped() {
        let mut tree = arena();
        let still = tree.insert(crate_box(0.0, 0.0));
        tree.insert(crate_box(5.0, 0.0));
        
        let report = tree.update_element(still, 0.2).unwrap();
        assert_eq!(report.candidates, 0);
        assert!(report.detected.is_empty());
    }
    
    #[test]
    fn test_neighbour_in_several_shared_leaves_is_tested_once() {
        let mut tree = QuadTree::new(Vec2::zeros(), Vec2::new(16.0, 16.0), PhysicsConfig::default()).unwrap();
        for (x, y) in [(1.0, 1.0), (12.0, 1.0), (12.0, 12.0), (1.0, 12.0), (2.0, 2.0)] {
            tree.insert(Hitbox::new(Vec2::new(x, y), Vec2::new(1.0, 1.0), Vec2::zeros()));
        }
        let a = tree.insert(Hitbox::new(Vec2::new(7.0, 4.0), Vec2::new(2.0, 2.0), Vec2::new(0.0, 50.0)));
        let b = tree.insert(Hitbox::new(Vec2::new(7.0, 6.5), Vec2::new(2.0, 2.0), Vec2::zeros()));
        assert_eq!(tree.containing_leaves(a).len(), 2);
        assert_eq!(tree.containing_leaves(b).len(), 4);
        
        let report = tree.update_element(a, 0.1).unwrap();
        assert_eq!(report.candidates, 4);
        assert_eq!(report.detected.len(), 1);
        assert_eq!(report.detected[0].other, b);
        assert_eq!(report.detected[0].normal, Vec2::new(0.0, -1.0));
        assert_relative_eq!(report.detected[0].time, 0.1, epsilon = 1e-5);
        assert_relative_eq!(tree.get(a).unwrap().velocity().y, 5.0, epsilon = 1e-4);
    }
    
    #[test]
    fn test_dead_keys_are_reported() {
        let mut tree = arena();
        let a = tree.insert(mover());
        tree.remove(a).unwrap();
        
        assert_eq!(tree.update_element(a, 0.2), Err(PhysicsError::UnknownElement(a)));
        assert_eq!(
            tree.move_element(a, Vec2::zeros(), Vec2::new(1.0, 1.0), Vec2::zeros()),
            Err(PhysicsError::UnknownElement(a))
        );
        assert_eq!(tree.add(a), Err(PhysicsError::UnknownElement(a)));
    }
}
