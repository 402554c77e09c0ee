//! Interpreter that converts an expanded L-System string into [`PlantGeometry`].
//!
//! The entry point is [`TurtleInterpreter`]. Configure it with a [`TurtleConfig`],
//! register symbol-to-operation mappings via [`TurtleInterpreter::set_op`] or
//! [`TurtleInterpreter::populate_standard_symbols`], then call
//! [`TurtleInterpreter::interpret`] with the expanded string.

use crate::error::{LSystemError, Result};
use crate::geometry::{Branch, Flower, PlantGeometry};
use crate::symbol;
use crate::turtle::{TurtleOp, TurtleState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f32::consts::PI;

/// Configuration for turtle interpretation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurtleConfig {
    /// Default step length for `F`/`f` if no parameter is provided.
    pub default_step: f32,
    /// Default rotation angle (in radians) for Yaw/Pitch/Roll.
    pub default_angle: f32,
    /// Initial branch width.
    pub default_width: f32,
    /// Factor applied to the width by a bare `!`.
    pub width_decay: f32,
    /// Maximum stack depth for push/pop operations.
    pub max_stack_depth: usize,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            default_step: 1.0,
            default_angle: 25.0f32.to_radians(),
            default_width: 1.0,
            width_decay: 0.7,
            max_stack_depth: 1024,
        }
    }
}

/// Everything a single interpretation pass produced.
#[derive(Clone, Debug)]
pub struct Interpretation {
    pub geometry: PlantGeometry,
    /// Turtle state after the last module.
    pub final_state: TurtleState,
    /// Pushes still on the stack at the end of the string.
    pub open_branches: usize,
}

/// Interprets expanded L-System strings as 3D turtle graphics.
#[derive(Clone, Debug)]
pub struct TurtleInterpreter {
    op_map: HashMap<char, TurtleOp>,
    config: TurtleConfig,
}

impl Default for TurtleInterpreter {
    fn default() -> Self {
        Self::standard(TurtleConfig::default())
    }
}

impl TurtleInterpreter {
    /// Creates a new interpreter with the given configuration and an empty symbol map.
    ///
    /// Register operations with [`set_op`](Self::set_op) or
    /// [`populate_standard_symbols`](Self::populate_standard_symbols) before calling
    /// [`interpret`](Self::interpret).
    pub fn new(config: TurtleConfig) -> Self {
        Self {
            op_map: HashMap::new(),
            config,
        }
    }

    /// Creates an interpreter with the standard symbol table already registered.
    pub fn standard(config: TurtleConfig) -> Self {
        let mut interpreter = Self::new(config);
        interpreter.populate_standard_symbols();
        interpreter
    }

    /// Replaces the entire symbol-to-operation map in one step (builder pattern).
    pub fn with_map(mut self, map: HashMap<char, TurtleOp>) -> Self {
        self.op_map = map;
        self
    }

    /// Assigns a single [`TurtleOp`] to a symbol, replacing any previous mapping.
    pub fn set_op(&mut self, symbol: char, op: TurtleOp) {
        self.op_map.insert(symbol, op);
    }

    /// Returns the operation registered for `symbol`.
    pub fn op(&self, symbol: char) -> TurtleOp {
        self.op_map.get(&symbol).copied().unwrap_or(TurtleOp::Ignore)
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    /// Registers the conventional symbol-to-operation mappings.
    pub fn populate_standard_symbols(&mut self) {
        let mappings = [
            // Drawing
            ('F', TurtleOp::Draw),
            ('G', TurtleOp::Draw),
            ('f', TurtleOp::Move),
            ('g', TurtleOp::Move),
            // Spatial
            ('+', TurtleOp::Yaw(1.0)),
            ('-', TurtleOp::Yaw(-1.0)),
            ('&', TurtleOp::Pitch(1.0)),
            ('^', TurtleOp::Pitch(-1.0)),
            ('\\', TurtleOp::Roll(1.0)),
            ('/', TurtleOp::Roll(-1.0)),
            ('|', TurtleOp::TurnAround),
            // Markers and style
            ('K', TurtleOp::Flower),
            ('*', TurtleOp::Flower),
            ('!', TurtleOp::SetWidth),
            // Flow
            ('[', TurtleOp::Push),
            (']', TurtleOp::Pop),
        ];

        for (sym, op) in mappings {
            self.set_op(sym, op);
        }
    }

    /// Interprets `expanded` with the configured default angle and step.
    pub fn interpret(&self, expanded: &str) -> Result<PlantGeometry> {
        self.interpret_with(
            expanded,
            self.config.default_angle.to_degrees(),
            self.config.default_step,
        )
    }

    /// Interprets `expanded` with an explicit default angle (degrees) and step.
    pub fn interpret_with(
        &self,
        expanded: &str,
        angle_degrees: f32,
        step: f32,
    ) -> Result<PlantGeometry> {
        self.run(expanded, angle_degrees, step)
            .map(|walk| walk.geometry)
    }

    /// Walks every module of `expanded` once and returns the full pass result.
    ///
    /// The turtle starts at the world origin heading along `+Y`. A module's
    /// parameter replaces the default step for `F`/`f` and the default angle
    /// (in degrees) for turns. Symbols with no registered mapping are ignored.
    ///
    /// # Push / Pop
    ///
    /// `[` saves the full turtle state (position, rotation, width) and `]`
    /// restores it. A `]` with nothing to restore fails the whole pass with
    /// [`LSystemError::UnbalancedStack`]; pushes still open at the end of the
    /// string are not an error.
    pub fn run(&self, expanded: &str, angle_degrees: f32, step: f32) -> Result<Interpretation> {
        let mut geometry = PlantGeometry::default();
        let mut turtle = TurtleState {
            width: self.config.default_width,
            ..Default::default()
        };
        let mut stack: Vec<TurtleState> = Vec::new();

        for (i, module) in symbol::modules(expanded).enumerate() {
            let module = module?;
            let angle = module.param.unwrap_or(angle_degrees).to_radians();
            let distance = module.param.unwrap_or(step);

            match self.op(module.symbol) {
                TurtleOp::Draw => {
                    let from = turtle.advance(distance);
                    geometry.add_branch(Branch::new(from, turtle.position).with_width(turtle.width));
                }
                TurtleOp::Move => {
                    turtle.advance(distance);
                }
                TurtleOp::Yaw(s) => turtle.rotate_local_z(angle * s),
                TurtleOp::Pitch(s) => turtle.rotate_local_x(angle * s),
                TurtleOp::Roll(s) => turtle.rotate_local_y(angle * s),
                TurtleOp::TurnAround => turtle.rotate_local_z(PI),
                TurtleOp::SetWidth => {
                    turtle.width = module
                        .param
                        .unwrap_or(turtle.width * self.config.width_decay);
                }
                TurtleOp::Flower => geometry.add_flower(Flower::new(turtle.position)),
                TurtleOp::Push => {
                    if stack.len() >= self.config.max_stack_depth {
                        return Err(LSystemError::StackDepthExceeded {
                            limit: self.config.max_stack_depth,
                        });
                    }
                    stack.push(turtle.clone());
                }
                TurtleOp::Pop => {
                    turtle = stack
                        .pop()
                        .ok_or(LSystemError::UnbalancedStack { position: i })?;
                }
                TurtleOp::Ignore => {}
            }
        }

        tracing::debug!(
            branches = geometry.branches.len(),
            flowers = geometry.flowers.len(),
            open_branches = stack.len(),
            "interpreted plant"
        );

        Ok(Interpretation {
            geometry,
            final_state: turtle,
            open_branches: stack.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn interp() -> TurtleInterpreter {
        TurtleInterpreter::default()
    }

    #[test]
    fn draw_emits_branches_along_heading() {
        let g = interp().interpret_with("FF", 25.0, 2.0).unwrap();
        assert_eq!(g.branches.len(), 2);
        assert_eq!(g.branches[0].start, Vec3::ZERO);
        assert!(g.branches[0].end.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-6));
        assert!(g.branches[1].end.abs_diff_eq(Vec3::new(0.0, 4.0, 0.0), 1e-6));
    }

    #[test]
    fn move_does_not_draw() {
        let g = interp().interpret_with("fF", 25.0, 1.0).unwrap();
        assert_eq!(g.branches.len(), 1);
        assert!(g.branches[0].start.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn parameters_override_step_and_angle() {
        let g = interp().interpret_with("F(3)+(90)F(2)", 25.0, 1.0).unwrap();
        assert!(g.branches[0].end.abs_diff_eq(Vec3::new(0.0, 3.0, 0.0), 1e-5));
        assert!(g.branches[1].end.abs_diff_eq(Vec3::new(-2.0, 3.0, 0.0), 1e-5));
    }

    #[test]
    fn flower_marks_current_position() {
        let g = interp().interpret_with("FK", 25.0, 1.0).unwrap();
        assert_eq!(g.flowers.len(), 1);
        assert!(g.flowers[0].position.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn push_pop_restores_state() {
        let run = interp().run("F[+F]", 25.0, 1.0).unwrap();
        assert!(run.final_state.position.abs_diff_eq(Vec3::Y, 1e-6));
        assert!(run.final_state.heading().abs_diff_eq(Vec3::Y, 1e-6));
        assert_eq!(run.open_branches, 0);
    }

    #[test]
    fn pop_on_empty_stack_fails() {
        match interp().interpret("F]F") {
            Err(LSystemError::UnbalancedStack { position }) => assert_eq!(position, 1),
            other => panic!("expected unbalanced stack, got {other:?}"),
        }
    }

    #[test]
    fn trailing_pushes_are_allowed() {
        let run = interp().run("F[+F[-F", 25.0, 1.0).unwrap();
        assert_eq!(run.geometry.branches.len(), 3);
        assert_eq!(run.open_branches, 2);
    }

    #[test]
    fn stack_depth_is_bounded() {
        let interpreter = TurtleInterpreter::standard(TurtleConfig {
            max_stack_depth: 2,
            ..Default::default()
        });
        assert!(interpreter.interpret("[[]]").is_ok());
        assert!(matches!(
            interpreter.interpret("[[["),
            Err(LSystemError::StackDepthExceeded { limit: 2 })
        ));
    }

    #[test]
    fn width_decays_and_is_restored() {
        let g = interp().interpret("F[!F]F!(0.25)F").unwrap();
        let widths: Vec<f32> = g.branches.iter().map(|b| b.width).collect();
        assert_eq!(widths, vec![1.0, 0.7, 1.0, 0.25]);
    }

    #[test]
    fn unknown_symbols_are_ignored() {
        let g = interp().interpret("XFYZ").unwrap();
        assert_eq!(g.branches.len(), 1);
        assert!(g.flowers.is_empty());
    }

    #[test]
    fn custom_symbol_map() {
        let mut interpreter = TurtleInterpreter::new(TurtleConfig::default());
        interpreter.set_op('A', TurtleOp::Draw);
        interpreter.set_op('o', TurtleOp::Flower);
        let g = interpreter.interpret("AFo").unwrap();
        assert_eq!(g.branches.len(), 1);
        assert_eq!(g.flowers.len(), 1);
    }
}
