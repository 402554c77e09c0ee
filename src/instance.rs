//! Conversion of plant geometry into per-instance attribute arrays.
//!
//! The engine is Y-up; instancers consume Z-up data. Every point is
//! remapped `(x, y, z) -> (x, z, y)` before instance attributes are derived.

use crate::geometry::{Branch, Flower, PlantGeometry};
use bevy_math::Dir3;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Dynamic per-instance attribute arrays, as consumed by a particle instancer.
///
/// All populated arrays have one entry per instance. `aim_directions` is left
/// empty for point-only outputs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayAttrs {
    pub ids: Vec<f64>,
    pub positions: Vec<Vec3>,
    pub scales: Vec<Vec3>,
    pub aim_directions: Vec<Vec3>,
}

impl ArrayAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Normalized aim direction of instance `i`, if it has a non-degenerate one.
    pub fn aim_dir3(&self, i: usize) -> Option<Dir3> {
        self.aim_directions
            .get(i)
            .and_then(|&aim| Dir3::new(aim).ok())
    }
}

/// Swaps the Y and Z axes.
pub fn y_up_to_z_up(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, v.y)
}

/// Builds branch instances: midpoint position, aim along the segment,
/// uniform scale equal to the branch width.
pub fn branch_instances(branches: &[Branch]) -> ArrayAttrs {
    let mut attrs = ArrayAttrs::new();
    for (i, branch) in branches.iter().enumerate() {
        let begin = y_up_to_z_up(branch.start);
        let end = y_up_to_z_up(branch.end);
        attrs.ids.push(i as f64);
        attrs.positions.push((begin + end) / 2.0);
        attrs.aim_directions.push(end - begin);
        attrs.scales.push(Vec3::splat(branch.width));
    }
    attrs
}

/// Builds flower instances: remapped position and unit scale.
pub fn flower_instances(flowers: &[Flower]) -> ArrayAttrs {
    let mut attrs = ArrayAttrs::new();
    for (j, flower) in flowers.iter().enumerate() {
        attrs.ids.push(j as f64);
        attrs.positions.push(y_up_to_z_up(flower.position));
        attrs.scales.push(Vec3::ONE);
    }
    attrs
}

/// Converts a whole interpretation result into `(branches, flowers)` arrays.
pub fn plant_instances(geometry: &PlantGeometry) -> (ArrayAttrs, ArrayAttrs) {
    (
        branch_instances(&geometry.branches),
        flower_instances(&geometry.flowers),
    )
}
