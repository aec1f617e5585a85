//! This crate provides the core logic for a deterministic multi-tape Turing Machine simulator.
//! It includes modules for compiling transition-table programs, storing sparse bi-infinite
//! tapes, executing machines step by step, loading program files, and a small library of
//! bundled example programs.

pub mod compiler;
pub mod loader;
pub mod machine;
pub mod tape;
pub mod templates;
pub mod types;

/// Re-exports the `Rule` enum from the compiler module, used by the `pest` grammar.
pub use crate::compiler::Rule;
/// Re-exports the compiler entry points and their result types.
pub use compiler::{compile, parse_line, render, Compilation, Diagnostic};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `Machine` struct from the machine module.
pub use machine::Machine;
/// Re-exports the `SparseTape` struct from the tape module.
pub use tape::SparseTape;
/// Re-exports the bundled templates.
pub use templates::{Template, TemplateManager, TEMPLATES};
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    MachineConfig, MachineError, Move, Outcome, Step, Symbol, TapeStatistics, Transition,
    MAX_PROGRAM_SIZE, MAX_TAPES,
};
