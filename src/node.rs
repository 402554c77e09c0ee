//! Dependency-graph nodes wrapping the point scatter and the L-System engine.
//!
//! Each node owns its inputs and cached outputs. Setting any input marks the
//! node dirty (every input affects every output); reading an output
//! recomputes only when dirty.

use crate::error::{LSystemError, Result};
use crate::geometry::PlantGeometry;
use crate::instance::{self, ArrayAttrs};
use crate::lsystem::LSystem;
use crate::scatter::{self, Bounds};
use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const RANDOM_NODE_NAME: &str = "randomNode";
pub const RANDOM_NODE_ID: u32 = 0x8701;
pub const LSYSTEM_INSTANCE_NODE_NAME: &str = "LSystemInstanceNode";
pub const LSYSTEM_INSTANCE_NODE_ID: u32 = 0x8204;

/// Grammar file used by a fresh [`LSystemInstanceNode`], relative to the plugin path.
pub const DEFAULT_GRAMMAR_FILE: &str = "plants/simple1.txt";

/// A node the host can instantiate and ask to recompute.
pub trait Node: Send {
    fn type_name(&self) -> &'static str;

    fn node_id(&self) -> u32;

    /// True when an input changed since the last compute.
    fn is_dirty(&self) -> bool;

    /// Recomputes every output if dirty; a no-op otherwise.
    fn compute(&mut self);
}

/// Inputs of [`RandomNode`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomNodeInputs {
    /// Number of points; negative counts produce no points.
    pub num_points: i32,
    pub min: Vec3,
    pub max: Vec3,
    pub seed: u64,
}

impl Default for RandomNodeInputs {
    fn default() -> Self {
        Self {
            num_points: 10,
            min: Vec3::new(0.0, 5.0, 0.0),
            max: Vec3::new(5.0, 0.0, 5.0),
            seed: 0,
        }
    }
}

/// Produces random locations inside a box, for use with an instancer.
#[derive(Clone, Debug)]
pub struct RandomNode {
    inputs: RandomNodeInputs,
    out_points: ArrayAttrs,
    dirty: bool,
}

impl Default for RandomNode {
    fn default() -> Self {
        Self::new(RandomNodeInputs::default())
    }
}

impl RandomNode {
    pub fn new(inputs: RandomNodeInputs) -> Self {
        Self {
            inputs,
            out_points: ArrayAttrs::default(),
            dirty: true,
        }
    }

    pub fn inputs(&self) -> &RandomNodeInputs {
        &self.inputs
    }

    pub fn set_num_points(&mut self, num_points: i32) {
        self.inputs.num_points = num_points;
        self.dirty = true;
    }

    pub fn set_min(&mut self, min: Vec3) {
        self.inputs.min = min;
        self.dirty = true;
    }

    pub fn set_max(&mut self, max: Vec3) {
        self.inputs.max = max;
        self.dirty = true;
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.inputs.seed = seed;
        self.dirty = true;
    }

    /// Point ids and positions, recomputed if any input changed.
    pub fn out_points(&mut self) -> &ArrayAttrs {
        self.compute();
        &self.out_points
    }
}

impl Node for RandomNode {
    fn type_name(&self) -> &'static str {
        RANDOM_NODE_NAME
    }

    fn node_id(&self) -> u32 {
        RANDOM_NODE_ID
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn compute(&mut self) {
        if !self.dirty {
            return;
        }
        let count = usize::try_from(self.inputs.num_points).unwrap_or(0);
        let bounds = Bounds::new(self.inputs.min, self.inputs.max);
        let mut rng = Pcg64::seed_from_u64(self.inputs.seed);

        let mut attrs = ArrayAttrs::new();
        for (i, p) in scatter::random_points(count, bounds, &mut rng)
            .into_iter()
            .enumerate()
        {
            attrs.ids.push(i as f64);
            attrs.positions.push(p);
        }
        tracing::debug!(points = attrs.len(), "randomNode computed");

        self.out_points = attrs;
        self.dirty = false;
    }
}

/// Inputs of [`LSystemInstanceNode`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LSystemNodeInputs {
    /// Turn angle in degrees; overrides the grammar's default.
    pub angle: f32,
    /// Step length; overrides the grammar's default.
    pub step: f32,
    /// Grammar path, relative to the plugin load path unless absolute.
    pub grammar_file: String,
    /// Number of generations; negative values are treated as 0.
    pub iterations: i32,
    pub seed: u64,
}

impl Default for LSystemNodeInputs {
    fn default() -> Self {
        Self {
            angle: 30.0,
            step: 1.0,
            grammar_file: DEFAULT_GRAMMAR_FILE.to_string(),
            iterations: 2,
            seed: 0,
        }
    }
}

/// Evaluates a grammar file and outputs branch and flower instance arrays.
#[derive(Debug)]
pub struct LSystemInstanceNode {
    inputs: LSystemNodeInputs,
    plugin_path: PathBuf,
    out_branches: ArrayAttrs,
    out_flowers: ArrayAttrs,
    last_error: Option<LSystemError>,
    dirty: bool,
}

impl LSystemInstanceNode {
    /// Creates a node resolving grammar files against `plugin_path`.
    pub fn new(plugin_path: impl Into<PathBuf>) -> Self {
        Self::with_inputs(plugin_path, LSystemNodeInputs::default())
    }

    pub fn with_inputs(plugin_path: impl Into<PathBuf>, inputs: LSystemNodeInputs) -> Self {
        Self {
            inputs,
            plugin_path: plugin_path.into(),
            out_branches: ArrayAttrs::default(),
            out_flowers: ArrayAttrs::default(),
            last_error: None,
            dirty: true,
        }
    }

    pub fn inputs(&self) -> &LSystemNodeInputs {
        &self.inputs
    }

    pub fn plugin_path(&self) -> &Path {
        &self.plugin_path
    }

    pub fn set_angle(&mut self, degrees: f32) {
        self.inputs.angle = degrees;
        self.dirty = true;
    }

    pub fn set_step(&mut self, step: f32) {
        self.inputs.step = step;
        self.dirty = true;
    }

    pub fn set_grammar_file(&mut self, grammar_file: impl Into<String>) {
        self.inputs.grammar_file = grammar_file.into();
        self.dirty = true;
    }

    pub fn set_iterations(&mut self, iterations: i32) {
        self.inputs.iterations = iterations;
        self.dirty = true;
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.inputs.seed = seed;
        self.dirty = true;
    }

    /// Full path of the grammar file this node evaluates.
    pub fn grammar_path(&self) -> PathBuf {
        self.plugin_path.join(&self.inputs.grammar_file)
    }

    /// The error from the most recent compute, if it failed.
    pub fn last_error(&self) -> Option<&LSystemError> {
        self.last_error.as_ref()
    }

    pub fn out_branches(&mut self) -> &ArrayAttrs {
        self.compute();
        &self.out_branches
    }

    pub fn out_flowers(&mut self) -> &ArrayAttrs {
        self.compute();
        &self.out_flowers
    }

    /// Runs the engine on the current inputs without touching the cache.
    pub fn evaluate(&self) -> Result<PlantGeometry> {
        let mut lsystem = LSystem::load(self.grammar_path())?;
        lsystem.set_default_angle(self.inputs.angle);
        lsystem.set_default_step(self.inputs.step);
        lsystem.set_seed(self.inputs.seed);
        lsystem.evaluate(usize::try_from(self.inputs.iterations).unwrap_or(0))
    }
}

impl Node for LSystemInstanceNode {
    fn type_name(&self) -> &'static str {
        LSYSTEM_INSTANCE_NODE_NAME
    }

    fn node_id(&self) -> u32 {
        LSYSTEM_INSTANCE_NODE_ID
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn compute(&mut self) {
        if !self.dirty {
            return;
        }
        match self.evaluate() {
            Ok(geometry) => {
                let (branches, flowers) = instance::plant_instances(&geometry);
                tracing::debug!(
                    grammar = %self.grammar_path().display(),
                    branches = branches.len(),
                    flowers = flowers.len(),
                    "LSystemInstanceNode computed"
                );
                self.out_branches = branches;
                self.out_flowers = flowers;
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    grammar = %self.grammar_path().display(),
                    "LSystemInstanceNode compute failed"
                );
                self.out_branches = ArrayAttrs::default();
                self.out_flowers = ArrayAttrs::default();
                self.last_error = Some(e);
            }
        }
        self.dirty = false;
    }
}
