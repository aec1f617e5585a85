//! This module compiles program text into transitions, utilizing the `pest` crate.
//!
//! A program is line oriented: one transition per line, `#` starts a comment line and
//! blank lines are ignored. Every other line must match
//!
//! ```text
//! FROM , R1 , R2 , R3 -> TO , W1 , W2 , W3 , M1 , M2 , M3
//! ```
//!
//! where a symbol slot holding only spaces stands for the blank symbol and `M` is one of
//! `R`, `L` or `S`. Lines are parsed independently: a malformed line is skipped and
//! reported as a [`Diagnostic`], the remaining lines still compile.

use crate::types::{
    MachineError, Move, Moves, Symbols, Transition, DEFAULT_BLANK_SYMBOL, MAX_TAPES,
};
use log::{debug, trace};
use pest::{
    error::{Error, LineColLocation},
    iterators::Pair,
    Parser as PestParser,
};
use pest_derive::Parser as PestParser;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derives a `PestParser` for the transition line grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TransitionParser;

/// A non-fatal problem found on one line of program text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column where parsing stopped.
    pub column: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

/// The result of compiling program text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compilation {
    /// Transitions in source line order, malformed lines omitted.
    pub transitions: Vec<Transition>,
    /// One diagnostic per malformed line.
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    /// Whether every line compiled.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// All diagnostics, one per line.
    pub fn error_report(&self) -> String {
        self.diagnostics
            .iter()
            .map(Diagnostic::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns the transitions if every line compiled.
    ///
    /// # Errors
    ///
    /// * `MachineError::Compile` carrying the error report otherwise.
    pub fn into_result(self) -> Result<Vec<Transition>, MachineError> {
        if self.is_clean() {
            Ok(self.transitions)
        } else {
            Err(MachineError::Compile(self.error_report()))
        }
    }
}

/// Compiles program text into transitions.
///
/// This never fails: malformed lines are collected as diagnostics and every well-formed
/// line still produces a transition. Transitions always describe [`MAX_TAPES`] tapes;
/// a machine driving fewer tapes ignores the extra slots.
///
/// ```
/// let compilation = mtur::compile("q0,a, , ->q0,a,a, ,R,R,S\nBADLINE\n");
/// assert_eq!(compilation.transitions.len(), 1);
/// assert_eq!(compilation.error_report(), "Line 2: Invalid format");
/// ```
pub fn compile(source: &str) -> Compilation {
    let mut compilation = Compilation::default();

    for (index, line) in source.lines().enumerate() {
        let content = line.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }

        match parse_line(line) {
            Ok(transition) => compilation.transitions.push(transition),
            Err(e) => {
                trace!("line {}: {}", index + 1, e);
                compilation.diagnostics.push(Diagnostic {
                    line: index + 1,
                    column: error_column(&e),
                    message: "Invalid format".to_string(),
                });
            }
        }
    }

    debug!(
        "compiled {} transitions with {} diagnostics",
        compilation.transitions.len(),
        compilation.diagnostics.len()
    );

    compilation
}

/// Parses a single line of program text into a transition.
///
/// # Errors
///
/// * The `pest` error describing where the line stops matching the grammar.
pub fn parse_line(line: &str) -> Result<Transition, Box<Error<Rule>>> {
    let pairs = TransitionParser::parse(Rule::transition, line)?;

    let mut states = Vec::with_capacity(2);
    let mut read = [DEFAULT_BLANK_SYMBOL; MAX_TAPES];
    let mut write = [DEFAULT_BLANK_SYMBOL; MAX_TAPES];
    let mut moves = Moves::default();

    // Rule: transition > [state, read, state, write, directions, EOI]
    for pair in pairs.flat_map(Pair::into_inner) {
        match pair.as_rule() {
            Rule::state => states.push(pair.as_str().to_string()),
            Rule::read => read = parse_symbols(pair),
            Rule::write => write = parse_symbols(pair),
            Rule::directions => moves = parse_directions(pair),
            _ => {}
        }
    }

    let mut states = states.into_iter();
    let from_state = states.next().unwrap_or_default();
    let to_state = states.next().unwrap_or_default();

    Ok(Transition {
        from_state,
        read,
        to_state,
        write,
        moves,
    })
}

/// Renders transitions back into program text, one line per transition.
///
/// Compiling the output yields the same transitions.
pub fn render<'a>(transitions: impl IntoIterator<Item = &'a Transition>) -> String {
    transitions
        .into_iter()
        .map(|t| render_line(t) + "\n")
        .collect()
}

/// Renders a single transition as a line of program text (without a line break).
pub fn render_line(t: &Transition) -> String {
    let read: Vec<String> = t.read.iter().map(char::to_string).collect();
    let write: Vec<String> = t.write.iter().map(char::to_string).collect();
    let moves: Vec<String> = t.moves.iter().map(|m| m.as_char().to_string()).collect();

    format!(
        "{},{}->{},{},{}",
        t.from_state,
        read.join(","),
        t.to_state,
        write.join(","),
        moves.join(",")
    )
}

/// Parses the three symbol slots of a `read` or `write` pair.
fn parse_symbols(pair: Pair<Rule>) -> Symbols {
    let mut symbols = [DEFAULT_BLANK_SYMBOL; MAX_TAPES];

    for (slot, symbol_pair) in symbols.iter_mut().zip(pair.into_inner()) {
        if symbol_pair.as_rule() == Rule::symbol {
            *slot = symbol_pair
                .as_str()
                .chars()
                .next()
                .unwrap_or(DEFAULT_BLANK_SYMBOL);
        }
    }

    symbols
}

/// Parses the three head moves of a `directions` pair.
fn parse_directions(pair: Pair<Rule>) -> Moves {
    let mut moves = Moves::default();

    for (slot, dir_pair) in moves.iter_mut().zip(pair.into_inner()) {
        *slot = dir_pair
            .as_str()
            .chars()
            .next()
            .and_then(Move::from_char)
            .unwrap_or_default();
    }

    moves
}

fn error_column(error: &Error<Rule>) -> usize {
    match error.line_col {
        LineColLocation::Pos((_, column)) | LineColLocation::Span((_, column), _) => column,
    }
}
