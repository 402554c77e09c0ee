//! Branch segments and flower points produced by the turtle.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The engine-agnostic output of one turtle interpretation pass.
///
/// Branches and flowers are stored in the order the turtle produced them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantGeometry {
    /// Every drawn segment of the plant skeleton.
    pub branches: Vec<Branch>,

    /// Every marker point (flowers, leaves, buds).
    pub flowers: Vec<Flower>,
}

impl PlantGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_branch(&mut self, branch: Branch) {
        self.branches.push(branch);
    }

    pub fn add_flower(&mut self, flower: Flower) {
        self.flowers.push(flower);
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty() && self.flowers.is_empty()
    }

    /// Branches flattened to `[sx, sy, sz, ex, ey, ez]` per segment.
    pub fn branch_floats(&self) -> Vec<f32> {
        self.branches.iter().flat_map(Branch::to_array).collect()
    }

    /// Flowers flattened to `[x, y, z]` per point.
    pub fn flower_floats(&self) -> Vec<f32> {
        self.flowers.iter().flat_map(Flower::to_array).collect()
    }
}

/// One forward-draw step of the turtle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub start: Vec3,
    pub end: Vec3,
    /// Turtle width when the segment was drawn.
    pub width: f32,
}

impl Branch {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self {
            start,
            end,
            width: 1.0,
        }
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn midpoint(&self) -> Vec3 {
        (self.start + self.end) / 2.0
    }

    /// Unnormalized direction from start to end.
    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }

    pub fn length(&self) -> f32 {
        self.direction().length()
    }

    /// Start then end, as the six floats handed to the instance adapter.
    pub fn to_array(&self) -> [f32; 6] {
        [
            self.start.x,
            self.start.y,
            self.start.z,
            self.end.x,
            self.end.y,
            self.end.z,
        ]
    }

    pub fn from_array(v: [f32; 6]) -> Self {
        Self::new(Vec3::new(v[0], v[1], v[2]), Vec3::new(v[3], v[4], v[5]))
    }
}

/// A marker point emitted by a flower symbol.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flower {
    pub position: Vec3,
}

impl Flower {
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }

    pub fn to_array(&self) -> [f32; 3] {
        self.position.to_array()
    }

    pub fn from_array(v: [f32; 3]) -> Self {
        Self::new(Vec3::from_array(v))
    }
}
