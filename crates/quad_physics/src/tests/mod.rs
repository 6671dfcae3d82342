//! Cross-module scenarios for the partition and the collision pass

mod collision_pass;
