//! Axis-aligned collision tests
//!
//! Everything on the road is a rectangle, so overlap is a plain AABB check.
//! The inequalities are strict on all four edges: boxes that merely touch
//! do not collide.

use super::entity::Body;

/// Axis-aligned bounding-box overlap between two bodies
pub fn aabb_overlap(a: &Body, b: &Body) -> bool {
    a.pos.x < b.pos.x + b.width
        && a.pos.x + a.width > b.pos.x
        && a.pos.y < b.pos.y + b.height
        && a.pos.y + a.height > b.pos.y
}

/// Distance between two box centers along the scroll axis.
///
/// Lightning strikes are resolved on this alone; a bolt does not care how
/// high the truck is flying.
pub fn horizontal_gap(a: &Body, b: &Body) -> f32 {
    (a.center_x() - b.center_x()).abs()
}
