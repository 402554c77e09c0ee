//! Error kinds shared by the grammar loader, expander, interpreter and node layer.

use std::path::PathBuf;

/// Errors produced while loading, expanding or interpreting an L-System.
#[derive(Debug, thiserror::Error)]
pub enum LSystemError {
    /// The grammar path does not resolve to a file.
    #[error("grammar file not found: {}", path.display())]
    GrammarNotFound { path: PathBuf },

    /// A line of grammar text is malformed. `line` is 1-based; 0 means the
    /// text did not come from a grammar file (e.g. a raw symbol string).
    #[error("grammar parse error at line {line}: {message}")]
    GrammarParse { line: usize, message: String },

    /// The grammar file exists but could not be read.
    #[error("failed to read grammar: {0}")]
    Io(#[from] std::io::Error),

    /// Expansion produced a string longer than the configured ceiling.
    #[error(
        "expansion exceeded {limit} bytes at generation {generation} (reached {length} bytes)"
    )]
    IterationBudgetExceeded {
        generation: usize,
        length: usize,
        limit: usize,
    },

    /// A `]` was interpreted while the turtle stack was empty.
    #[error("unbalanced stack: pop on empty stack at module {position}")]
    UnbalancedStack { position: usize },

    /// Too many nested `[` for the configured stack depth.
    #[error("turtle stack depth exceeded limit of {limit}")]
    StackDepthExceeded { limit: usize },

    /// A node type name or id is already taken in the registry.
    #[error("node '{name}' is already registered")]
    NodeAlreadyRegistered { name: String },

    /// No node with this type id is registered.
    #[error("no node registered with type id {type_id:#06x}")]
    NodeNotRegistered { type_id: u32 },
}

impl LSystemError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::GrammarParse {
            line,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LSystemError>;
