//! Turtle state and operations for plant interpretation.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// The state of the drawing turtle.
///
/// The turtle's heading is its local +Y axis, so a fresh turtle grows
/// straight up along world +Y. Local +X is "right" and local +Z points
/// out of the turning plane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    /// Current world-space position of the "cursor".
    pub position: Vec3,

    /// Current world-space orientation.
    pub rotation: Quat,

    /// Current branch width (modified by `!`).
    pub width: f32,
}

impl Default for TurtleState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            width: 1.0,
        }
    }
}

impl TurtleState {
    /// Returns the turtle's heading (local Y axis) in world space.
    pub fn heading(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Returns the turtle's local Z axis in world space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Returns the turtle's local right direction (X-axis) in world space.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Moves the turtle `distance` along its heading and returns the old position.
    pub fn advance(&mut self, distance: f32) -> Vec3 {
        let from = self.position;
        self.position += self.heading() * distance;
        from
    }

    /// Rotates the turtle around its local X axis by `angle` radians (Pitch).
    pub fn rotate_local_x(&mut self, angle: f32) {
        let rot = Quat::from_axis_angle(Vec3::X, angle);
        self.rotation = (self.rotation * rot).normalize();
    }

    /// Rotates the turtle around its local Y axis by `angle` radians (Roll).
    pub fn rotate_local_y(&mut self, angle: f32) {
        let rot = Quat::from_axis_angle(Vec3::Y, angle);
        self.rotation = (self.rotation * rot).normalize();
    }

    /// Rotates the turtle around its local Z axis by `angle` radians (Yaw).
    pub fn rotate_local_z(&mut self, angle: f32) {
        let rot = Quat::from_axis_angle(Vec3::Z, angle);
        self.rotation = (self.rotation * rot).normalize();
    }
}

/// Operations that can be performed by the plant turtle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TurtleOp {
    /// Move forward and emit a branch (`F`). Param overrides the step.
    Draw,
    /// Move forward without drawing (`f`). Param overrides the step.
    Move,
    /// Rotate around local Z (`+`/`-`). Param overrides the angle (degrees).
    Yaw(f32),
    /// Rotate around local X (`&`/`^`).
    Pitch(f32),
    /// Rotate around the heading (`\` / `/`).
    Roll(f32),
    /// Turn 180 degrees (`|`).
    TurnAround,
    /// Set the width to the param, or scale it by the configured decay (`!`).
    SetWidth,
    /// Emit a flower at the current position (`K`).
    Flower,
    /// Save the full turtle state onto the stack (`[`).
    Push,
    /// Restore the most recently pushed turtle state (`]`).
    Pop,
    /// No-op; symbol has no registered meaning.
    Ignore,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn fresh_turtle_faces_up_y() {
        let t = TurtleState::default();
        assert_eq!(t.heading(), Vec3::Y);
        assert_eq!(t.right(), Vec3::X);
        assert_eq!(t.up(), Vec3::Z);
    }

    #[test]
    fn yaw_turns_heading_in_xy_plane() {
        let mut t = TurtleState::default();
        t.rotate_local_z(FRAC_PI_2);
        assert!(t.heading().abs_diff_eq(-Vec3::X, 1e-6));
        assert!(t.up().abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn pitch_tilts_heading_toward_z() {
        let mut t = TurtleState::default();
        t.rotate_local_x(FRAC_PI_2);
        assert!(t.heading().abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn roll_keeps_heading() {
        let mut t = TurtleState::default();
        t.rotate_local_y(1.0);
        assert!(t.heading().abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn advance_moves_along_heading() {
        let mut t = TurtleState::default();
        let from = t.advance(2.0);
        assert_eq!(from, Vec3::ZERO);
        assert!(t.position.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-6));
    }
}
