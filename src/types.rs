//! This module defines the core data structures and types used throughout the multi-tape
//! Turing Machine simulator, including transitions, head moves, configuration, statistics
//! and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single tape symbol.
pub type Symbol = char;

/// The maximum number of tapes a machine can drive.
pub const MAX_TAPES: usize = 3;
/// The default blank symbol used on the Turing Machine tapes.
pub const DEFAULT_BLANK_SYMBOL: Symbol = ' ';
/// The start state used when none is configured.
pub const DEFAULT_START_STATE: &str = "q0";
/// The maximum number of steps a machine executes before refusing to step further.
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;
/// The maximum allowed size for a Turing Machine program in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB

/// Symbols for every tape slot. Slots past the active tape count hold the blank symbol.
pub type Symbols = [Symbol; MAX_TAPES];
/// Head moves for every tape slot.
pub type Moves = [Move; MAX_TAPES];

/// Represents the possible moves of a Turing Machine head.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Move {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    #[default]
    Stay,
}

impl Move {
    /// The head offset this move applies.
    pub fn offset(self) -> i64 {
        match self {
            Move::Left => -1,
            Move::Right => 1,
            Move::Stay => 0,
        }
    }

    /// The letter used for this move in program text.
    pub fn as_char(self) -> char {
        match self {
            Move::Left => 'L',
            Move::Right => 'R',
            Move::Stay => 'S',
        }
    }

    /// Parses a move letter (`L`, `R` or `S`).
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'L' => Some(Move::Left),
            'R' => Some(Move::Right),
            'S' => Some(Move::Stay),
            _ => None,
        }
    }
}

/// Represents a single transition rule of a multi-tape Turing Machine.
///
/// A transition is keyed by `(from_state, read)`: when the machine is in `from_state`
/// and reads `read` under its heads, it writes `write`, applies `moves` and enters `to_state`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// The state this transition leaves from.
    pub from_state: String,
    /// The symbols that must be under each head.
    pub read: Symbols,
    /// The state the machine transitions to.
    pub to_state: String,
    /// The symbols written under each head.
    pub write: Symbols,
    /// The move applied to each head after writing.
    pub moves: Moves,
}

impl Transition {
    pub fn new(
        from_state: impl Into<String>,
        read: Symbols,
        to_state: impl Into<String>,
        write: Symbols,
        moves: Moves,
    ) -> Self {
        Self {
            from_state: from_state.into(),
            read,
            to_state: to_state.into(),
            write,
            moves,
        }
    }

    /// The table key of this transition.
    pub fn key(&self) -> (String, Symbols) {
        (self.from_state.clone(), self.read)
    }
}

/// The outcome of a single execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A transition was applied.
    Continue,
    /// No transition matches the current state and symbols. State and heads are unchanged.
    Halt,
}

/// The outcome of running a machine to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The machine reached one of its accept states.
    Accepted,
    /// The machine halted in a state that is not an accept state.
    Halted,
}

/// Runtime configuration for building a machine.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// let config: mtur::MachineConfig = serde_json::from_str(r#"{ "tapes": 2 }"#).unwrap();
/// assert_eq!(config.start_state, "q0");
/// assert_eq!(config.tapes, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub start_state: String,
    pub tapes: usize,
    pub blank: Symbol,
    pub max_steps: usize,
    pub accept_states: Vec<String>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            start_state: DEFAULT_START_STATE.to_string(),
            tapes: 1,
            blank: DEFAULT_BLANK_SYMBOL,
            max_steps: DEFAULT_MAX_STEPS,
            accept_states: Vec::new(),
        }
    }
}

/// A snapshot of one tape's storage statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeStatistics {
    pub tape_index: usize,
    pub materialized_cells: usize,
    pub modified_cells: usize,
    pub min_index: i64,
    pub max_index: i64,
    pub head_position: i64,
}

impl fmt::Display for TapeStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tape {} Statistics:", self.tape_index + 1)?;
        writeln!(f, "  Materialized cells: {}", self.materialized_cells)?;
        writeln!(f, "  Modified cells: {}", self.modified_cells)?;
        writeln!(f, "  Min index: {}", self.min_index)?;
        writeln!(f, "  Max index: {}", self.max_index)?;
        write!(f, "  Current position: {}", self.head_position)
    }
}

/// Represents various errors that can occur during Turing Machine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    /// Bad construction parameters or a mismatched number of tape inputs.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// A tape-indexed operation referenced a tape the machine does not drive.
    #[error("Invalid tape index {index} (machine has {active} active tapes)")]
    InvalidTapeIndex { index: usize, active: usize },
    /// The step ceiling was reached.
    #[error("Maximum steps exceeded ({0})")]
    StepBudgetExceeded(usize),
    /// A program was required to compile cleanly but produced diagnostics.
    #[error("Program compilation error:\n{0}")]
    Compile(String),
    /// Indicates an error related to reading or writing program files.
    #[error("File error: {0}")]
    FileError(String),
}
