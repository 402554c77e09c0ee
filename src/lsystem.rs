//! An evaluation session: one grammar plus the defaults and seed to run it with.

use crate::error::Result;
use crate::expander::{Expander, ExpanderConfig};
use crate::geometry::PlantGeometry;
use crate::grammar::Grammar;
use crate::interpreter::{TurtleConfig, TurtleInterpreter};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::path::Path;
use std::sync::Arc;

/// Loads, expands and interprets a grammar.
///
/// The grammar itself is immutable and may be shared between sessions;
/// angle, step and seed overrides belong to the session.
#[derive(Clone, Debug)]
pub struct LSystem {
    grammar: Arc<Grammar>,
    angle: f32,
    step: f32,
    seed: u64,
    expander: Expander,
    interpreter: TurtleInterpreter,
}

impl LSystem {
    /// Loads the grammar at `path` with default expansion and turtle settings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_grammar(Arc::new(Grammar::load(path)?)))
    }

    pub fn from_grammar(grammar: Arc<Grammar>) -> Self {
        Self {
            angle: grammar.default_angle(),
            step: grammar.default_step(),
            grammar,
            seed: 0,
            expander: Expander::default(),
            interpreter: TurtleInterpreter::default(),
        }
    }

    pub fn with_expander_config(mut self, config: ExpanderConfig) -> Self {
        self.expander = Expander::new(config);
        self
    }

    /// Rebuilds the standard interpreter with `config`.
    ///
    /// Only the width and stack settings take effect: the turn angle and step
    /// always come from the session (see [`Self::set_default_angle`] and
    /// [`Self::set_default_step`]), so `config.default_angle` and
    /// `config.default_step` are ignored.
    pub fn with_turtle_config(mut self, config: TurtleConfig) -> Self {
        self.interpreter = TurtleInterpreter::standard(config);
        self
    }

    /// Replaces the interpreter, e.g. one with a custom symbol map.
    pub fn with_interpreter(mut self, interpreter: TurtleInterpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    /// Overrides the grammar's default turn angle, in degrees.
    pub fn set_default_angle(&mut self, degrees: f32) {
        self.angle = degrees;
    }

    /// Overrides the grammar's default step length.
    pub fn set_default_step(&mut self, step: f32) {
        self.step = step;
    }

    /// Sets the seed used by [`expand`](Self::expand) and [`evaluate`](Self::evaluate).
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    pub fn default_angle(&self) -> f32 {
        self.angle
    }

    pub fn default_step(&self) -> f32 {
        self.step
    }

    /// Expands the axiom with the session seed.
    pub fn expand(&self, iterations: usize) -> Result<String> {
        self.expander
            .expand(&self.grammar, iterations, &mut self.rng())
    }

    /// Expands and interprets with the session seed. Identical inputs
    /// always produce identical geometry.
    pub fn evaluate(&self, iterations: usize) -> Result<PlantGeometry> {
        self.evaluate_with_rng(iterations, &mut self.rng())
    }

    /// Expands with the supplied random source, then interprets.
    pub fn evaluate_with_rng<R: Rng + ?Sized>(
        &self,
        iterations: usize,
        rng: &mut R,
    ) -> Result<PlantGeometry> {
        let expanded = self.expander.expand(&self.grammar, iterations, rng)?;
        self.interpreter
            .interpret_with(&expanded, self.angle, self.step)
    }

    fn rng(&self) -> Pcg64 {
        Pcg64::seed_from_u64(self.seed)
    }
}
