//! Bundled example programs.
//!
//! Every template is generated as program text, exactly what a user would type, and is
//! compiled like any other source.

use crate::compiler::{compile, Compilation};
use crate::machine::Machine;
use crate::types::{MachineConfig, MachineError};

/// A bundled example program.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// Short identifier, used on the command line.
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Number of tapes the program expects.
    pub tapes: usize,
    /// The state the program ends in on success.
    pub accept_state: &'static str,
    /// An input that exercises the program, one entry per tape.
    pub sample_input: Vec<&'static str>,
    /// The program text.
    pub source: String,
}

impl Template {
    /// Compiles the template's program text.
    pub fn compile(&self) -> Compilation {
        compile(&self.source)
    }

    /// Builds a machine configured for this template, with its transitions loaded and
    /// its tapes seeded from the sample input.
    pub fn machine(&self) -> Result<Machine, MachineError> {
        let config = MachineConfig {
            tapes: self.tapes,
            accept_states: vec![self.accept_state.to_string()],
            ..MachineConfig::default()
        };
        let transitions = self.compile().into_result()?;

        let mut machine = Machine::with_config(&config)?;
        machine.load(&transitions);
        machine.initialize_tapes(self.sample_input.as_slice())?;
        Ok(machine)
    }
}

lazy_static::lazy_static! {
    pub static ref TEMPLATES: Vec<Template> = vec![
        Template {
            id: "alphabet-copy",
            name: "Copy English Alphabet",
            description: "Copies a word over a-z from tape 1 to tape 2",
            tapes: 2,
            accept_state: "q1",
            sample_input: vec!["turing", ""],
            source: copy_program("Copy English Alphabet (a-z)", 'a'..='z'),
        },
        Template {
            id: "alphanumeric-copy",
            name: "Copy Alphanumeric",
            description: "Copies a word over A-Z, a-z and 0-9 from tape 1 to tape 2",
            tapes: 2,
            accept_state: "q1",
            sample_input: vec!["Tape42", ""],
            source: copy_program(
                "Copy Alphanumeric (A-Z, a-z, 0-9)",
                ('A'..='Z').chain('a'..='z').chain('0'..='9'),
            ),
        },
        Template {
            id: "binary-inverter",
            name: "Binary Inverter",
            description: "Flips every bit of tape 1 in place",
            tapes: 1,
            accept_state: "q1",
            sample_input: vec!["0110"],
            source: binary_inverter(),
        },
        Template {
            id: "binary-inverter-2",
            name: "Binary Inverter (two tapes)",
            description: "Writes the inverted bits of tape 1 to tape 2",
            tapes: 2,
            accept_state: "q1",
            sample_input: vec!["0110", ""],
            source: binary_inverter_two_tapes(),
        },
        Template {
            id: "unary-addition",
            name: "Unary Addition",
            description: "Adds two unary numbers separated by '+' onto tape 2",
            tapes: 2,
            accept_state: "q2",
            sample_input: vec!["111+11", ""],
            source: unary_addition(),
        },
        Template {
            id: "binary-copy",
            name: "Binary Copy",
            description: "Copies the bits of tape 1 to tape 2",
            tapes: 2,
            accept_state: "q1",
            sample_input: vec!["1011", ""],
            source: binary_copy(),
        },
        Template {
            id: "simple-copy",
            name: "Simple Copy",
            description: "Copies a run of 'a' from tape 1 to tape 2",
            tapes: 2,
            accept_state: "q1",
            sample_input: vec!["aaa", ""],
            source: simple_copy(),
        },
    ];
}

pub struct TemplateManager;

impl TemplateManager {
    /// Get a template by its id or its name (case-insensitive)
    pub fn get(key: &str) -> Result<&'static Template, MachineError> {
        TEMPLATES
            .iter()
            .find(|t| t.id.eq_ignore_ascii_case(key) || t.name.eq_ignore_ascii_case(key))
            .ok_or_else(|| MachineError::InvalidArgument(format!("Template '{}' not found", key)))
    }

    /// List all template ids
    pub fn list_ids() -> Vec<&'static str> {
        TEMPLATES.iter().map(|t| t.id).collect()
    }
}

/// A two-tape program copying every symbol in `symbols` from tape 1 to tape 2.
fn copy_program(title: &str, symbols: impl IntoIterator<Item = char>) -> String {
    let mut code = format!("# {title}\n# Tape 1: input, Tape 2: output\n\n");
    for c in symbols {
        code.push_str(&format!("q0,{c}, , ->q0,{c},{c}, ,R,R,S\n"));
    }
    code.push_str("q0, , , ->q1, , , ,S,S,S\n");
    code
}

fn binary_inverter() -> String {
    [
        "# Binary Inverter (0->1, 1->0)",
        "# Tape 1: input/output",
        "",
        "q0,0, , ->q0,1, , ,R,S,S",
        "q0,1, , ->q0,0, , ,R,S,S",
        "q0, , , ->q1, , , ,S,S,S",
        "",
    ]
    .join("\n")
}

fn binary_inverter_two_tapes() -> String {
    [
        "# Binary Inverter (0->1, 1->0) - Two Tapes",
        "# Tape 1: input, Tape 2: inverted output",
        "",
        "q0,0, , ->q0,0,1, ,R,R,S",
        "q0,1, , ->q0,1,0, ,R,R,S",
        "q0, , , ->q1, , , ,S,S,S",
        "",
    ]
    .join("\n")
}

fn unary_addition() -> String {
    [
        "# Unary Addition (e.g., 111+11 = 11111)",
        "# Tape 1: input (e.g., 111+11), Tape 2: output",
        "# Format: first number + second number separated by '+'",
        "",
        "# State q0: copy first number (1's)",
        "q0,1, , ->q0,1,1, ,R,R,S",
        "# Encounter +, move to state q1",
        "q0,+, , ->q1,+, , ,R,S,S",
        "",
        "# State q1: copy second number",
        "q1,1, , ->q1,1,1, ,R,R,S",
        "# Encounter space, finish",
        "q1, , , ->q2, , , ,S,S,S",
        "",
    ]
    .join("\n")
}

fn binary_copy() -> String {
    [
        "# Binary Copy: read bits from Tape 1, write them to Tape 2",
        "# Tape 1: input binary, Tape 2: output (starts empty)",
        "",
        "q0,0, , ->q0,0,0, ,R,R,S",
        "q0,1, , ->q0,1,1, ,R,R,S",
        "q0, , , ->q1, , , ,S,S,S",
        "",
    ]
    .join("\n")
}

fn simple_copy() -> String {
    [
        "# Simple Copy: copy 'a' symbols from Tape 1 to Tape 2",
        "q0,a, , ->q0,a,a, ,R,R,S",
        "q0, , , ->q1, , , ,S,S,S",
        "",
    ]
    .join("\n")
}
