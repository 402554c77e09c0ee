//! # lsystem-instancer
//!
//! A procedural plant engine that turns L-System grammars into instanceable
//! geometry, plus the two dependency-graph nodes that drive it.
//!
//! The pipeline is *grammar text* → [`Grammar`] → [`Expander`] (rewriting for
//! N generations) → [`TurtleInterpreter`] (3D turtle walk) → [`PlantGeometry`]
//! (branch segments and flower points) → [`instance`] arrays ready for a
//! particle instancer. [`LSystem`] bundles the first four steps into a
//! session; [`node`] and [`plugin`] wrap it for a host application.
//!
//! ```
//! use lsystem_instancer::{Grammar, LSystem};
//! use std::sync::Arc;
//!
//! let grammar = Grammar::parse("axiom F\nangle 25\nF -> F[+F]F[-F]F").unwrap();
//! let plant = LSystem::from_grammar(Arc::new(grammar)).evaluate(1).unwrap();
//! assert_eq!(plant.branches.len(), 5);
//! ```

pub mod error;
pub mod expander;
pub mod geometry;
pub mod grammar;
pub mod instance;
pub mod interpreter;
pub mod lsystem;
pub mod node;
pub mod plugin;
pub mod scatter;
pub mod symbol;
pub mod turtle;

pub use error::{LSystemError, Result};
pub use expander::{Expander, ExpanderConfig};
pub use geometry::*;
pub use grammar::{Grammar, Rule};
pub use instance::ArrayAttrs;
pub use interpreter::*;
pub use lsystem::LSystem;
pub use node::{LSystemInstanceNode, LSystemNodeInputs, Node, RandomNode, RandomNodeInputs};
pub use plugin::{NodeRegistry, PluginContext, initialize_plugin, uninitialize_plugin};
pub use scatter::Bounds;
pub use turtle::*;
