//! This module defines the `Machine` struct, which simulates a deterministic multi-tape
//! Turing Machine. It owns the sparse tapes, the transition table, the control state and
//! the head positions, and executes transitions one step at a time.

use crate::tape::SparseTape;
use crate::types::{
    MachineConfig, MachineError, Move, Moves, Outcome, Step, Symbol, Symbols, TapeStatistics,
    Transition, DEFAULT_BLANK_SYMBOL, MAX_TAPES,
};
use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

type TableKey = (String, Symbols);

/// Represents a multi-tape Turing Machine.
///
/// The machine drives between 1 and [`MAX_TAPES`] tapes, fixed at construction. Its
/// transition table maps `(state, symbols under the heads)` to a single [`Transition`],
/// so execution is deterministic. Adding a transition whose key already exists replaces
/// the previous one.
#[derive(Debug, Clone)]
pub struct Machine {
    table: BTreeMap<TableKey, Transition>,
    state: String,
    start_state: String,
    tapes: Vec<SparseTape>,
    heads: Vec<i64>,
    accept_states: BTreeSet<String>,
    states: BTreeSet<String>,
    blank: Symbol,
    step_count: usize,
    max_steps: usize,
}

impl Machine {
    /// Creates a machine with `tapes` tapes starting in `start_state`, using the default
    /// blank symbol and step ceiling.
    ///
    /// # Errors
    ///
    /// * `MachineError::InvalidArgument` if `tapes` is not in `1..=MAX_TAPES`.
    pub fn new(start_state: impl Into<String>, tapes: usize) -> Result<Self, MachineError> {
        Self::with_config(&MachineConfig {
            start_state: start_state.into(),
            tapes,
            ..MachineConfig::default()
        })
    }

    /// Creates a machine from a [`MachineConfig`].
    ///
    /// # Errors
    ///
    /// * `MachineError::InvalidArgument` if the configured tape count is not in `1..=MAX_TAPES`.
    pub fn with_config(config: &MachineConfig) -> Result<Self, MachineError> {
        if config.tapes < 1 || config.tapes > MAX_TAPES {
            return Err(MachineError::InvalidArgument(format!(
                "Number of tapes must be between 1 and {MAX_TAPES}, got {}",
                config.tapes
            )));
        }

        let mut machine = Self {
            table: BTreeMap::new(),
            state: config.start_state.clone(),
            start_state: config.start_state.clone(),
            tapes: vec![SparseTape::new(config.blank); config.tapes],
            heads: vec![0; config.tapes],
            accept_states: BTreeSet::new(),
            states: BTreeSet::from([config.start_state.clone()]),
            blank: config.blank,
            step_count: 0,
            max_steps: config.max_steps,
        };

        for state in &config.accept_states {
            machine.set_accept_state(state.clone());
        }

        Ok(machine)
    }

    /// Adds a transition, replacing any existing transition with the same
    /// `(from_state, read)` key.
    ///
    /// Slots for tapes the machine does not drive are ignored: their read and write
    /// symbols become the blank symbol and their move becomes [`Move::Stay`].
    pub fn add_transition(&mut self, transition: Transition) {
        let transition = self.normalize(transition);

        self.states.insert(transition.from_state.clone());
        self.states.insert(transition.to_state.clone());
        self.table.insert(transition.key(), transition);
    }

    /// Adds every transition in `transitions`, in order.
    ///
    /// Program text always writes the blank as `' '`; those symbols are rewritten to the
    /// machine's own blank symbol before insertion.
    pub fn load<'a>(&mut self, transitions: impl IntoIterator<Item = &'a Transition>) {
        let mut count = 0;
        for transition in transitions {
            let mut transition = transition.clone();
            self.map_program_blank(&mut transition.read);
            self.map_program_blank(&mut transition.write);
            self.add_transition(transition);
            count += 1;
        }
        debug!("loaded {count} transitions ({} in table)", self.table.len());
    }

    /// Edits the behaviour of a single tape for a transition leaving `from`.
    ///
    /// The first transition keyed by `from` in table order (the one with the smallest
    /// read tuple) is removed, and re-inserted with tape `tape_index`'s read symbol, write
    /// symbol and move replaced. The other tapes keep their values. When no transition
    /// leaves `from` yet, the other tapes read and write blank and stay.
    ///
    /// This is a convenience for interactive editing: when several transitions leave
    /// `from`, which one gets edited depends only on table order.
    ///
    /// # Errors
    ///
    /// * `MachineError::InvalidTapeIndex` if `tape_index` is not an active tape.
    pub fn add_transition_for_tape(
        &mut self,
        from: &str,
        tape_index: usize,
        read: Symbol,
        to: &str,
        write: Symbol,
        direction: Move,
    ) -> Result<(), MachineError> {
        self.check_tape(tape_index)?;

        let key = self
            .table
            .keys()
            .find(|(state, _)| state == from)
            .cloned();
        let existing = key.and_then(|key| self.table.remove(&key));

        let (mut reads, mut writes, mut moves) = match existing {
            Some(t) => (t.read, t.write, t.moves),
            None => (
                [self.blank; MAX_TAPES],
                [self.blank; MAX_TAPES],
                Moves::default(),
            ),
        };

        reads[tape_index] = read;
        writes[tape_index] = write;
        moves[tape_index] = direction;

        self.add_transition(Transition::new(from, reads, to, writes, moves));
        Ok(())
    }

    /// Removes the transition keyed by `(from, read)`, returning it if present.
    ///
    /// `read` is matched the way transitions are stored: slots for inactive tapes are
    /// ignored, and when no exact match exists a `' '` also matches the machine's blank,
    /// so keys taken from compiled program text find what [`Machine::load`] inserted.
    pub fn remove_transition(&mut self, from: &str, read: &Symbols) -> Option<Transition> {
        let mut key = (from.to_string(), self.normalize_read(*read));
        if let Some(transition) = self.table.remove(&key) {
            return Some(transition);
        }

        if self.blank == DEFAULT_BLANK_SYMBOL {
            return None;
        }
        self.map_program_blank(&mut key.1);
        self.table.remove(&key)
    }

    /// Removes the transition at position `row` in table order, returning it if present.
    pub fn remove_transition_at(&mut self, row: usize) -> Option<Transition> {
        let key = self.table.keys().nth(row).cloned()?;
        self.table.remove(&key)
    }

    /// Removes every transition. Accept states and known states are kept.
    pub fn clear_transitions(&mut self) {
        self.table.clear();
    }

    /// Iterates over the transition table, ordered by `(from_state, read)`.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.table.values()
    }

    pub fn transition_count(&self) -> usize {
        self.table.len()
    }

    /// Marks `state` as accepting.
    pub fn set_accept_state(&mut self, state: impl Into<String>) {
        let state = state.into();
        self.states.insert(state.clone());
        self.accept_states.insert(state);
    }

    /// Seeds tape `tape_index` with `input` and moves its head back to 0.
    ///
    /// # Errors
    ///
    /// * `MachineError::InvalidTapeIndex` if `tape_index` is not an active tape.
    pub fn initialize_tape(&mut self, tape_index: usize, input: &str) -> Result<(), MachineError> {
        self.check_tape(tape_index)?;
        self.heads[tape_index] = 0;
        self.tapes[tape_index].initialize(input);
        Ok(())
    }

    /// Seeds every tape, one input per active tape.
    ///
    /// # Errors
    ///
    /// * `MachineError::InvalidArgument` if `inputs.len()` differs from the active tape count.
    pub fn initialize_tapes<S: AsRef<str>>(&mut self, inputs: &[S]) -> Result<(), MachineError> {
        self.check_input_count(inputs.len())?;
        for (i, input) in inputs.iter().enumerate() {
            self.initialize_tape(i, input.as_ref())?;
        }
        Ok(())
    }

    /// Executes a single step of the machine.
    ///
    /// Reads the symbol under every head, looks up the matching transition, writes,
    /// moves the heads and enters the next state.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue)` if a transition was applied.
    /// * `Ok(Step::Halt)` if no transition matches; state and heads are left unchanged.
    /// * `Err(MachineError::StepBudgetExceeded)` if the step ceiling was already reached.
    pub fn step(&mut self) -> Result<Step, MachineError> {
        if self.step_count >= self.max_steps {
            return Err(MachineError::StepBudgetExceeded(self.max_steps));
        }

        let symbols = self.read_symbols();
        let Some(transition) = self.table.get(&(self.state.clone(), symbols)) else {
            trace!("no transition for {} {:?}", self.state, symbols);
            return Ok(Step::Halt);
        };

        for (i, tape) in self.tapes.iter_mut().enumerate() {
            tape.set(self.heads[i], transition.write[i]);
            self.heads[i] += transition.moves[i].offset();
        }

        trace!(
            "step {}: {} {:?} -> {}",
            self.step_count + 1,
            self.state,
            symbols,
            transition.to_state
        );

        self.state = transition.to_state.clone();
        self.step_count += 1;

        Ok(Step::Continue)
    }

    /// Runs the machine until it accepts or halts, bounded only by the step ceiling.
    ///
    /// Acceptance is checked before every step, so a machine that starts in an accept
    /// state accepts without stepping.
    pub fn run(&mut self) -> Result<Outcome, MachineError> {
        loop {
            if let Some(outcome) = self.advance()? {
                return Ok(outcome);
            }
        }
    }

    /// Runs the machine for at most `limit` steps.
    ///
    /// # Errors
    ///
    /// * `MachineError::StepBudgetExceeded` if neither outcome is reached within `limit` steps.
    pub fn run_for(&mut self, limit: usize) -> Result<Outcome, MachineError> {
        for _ in 0..limit {
            if let Some(outcome) = self.advance()? {
                return Ok(outcome);
            }
        }

        // The last allowed step may have entered an accept state.
        if self.is_accept_state() {
            return Ok(self.finish(Outcome::Accepted));
        }

        Err(MachineError::StepBudgetExceeded(limit))
    }

    /// Resets the machine to its start state with zero steps, heads at 0 and every
    /// tape's materialized cells dropped. When `new_inputs` is given, every tape is then
    /// seeded again from it.
    ///
    /// # Errors
    ///
    /// * `MachineError::InvalidArgument` if `new_inputs` does not hold exactly one input per
    ///   active tape. The machine is left untouched in that case.
    pub fn reset<S: AsRef<str>>(&mut self, new_inputs: Option<&[S]>) -> Result<(), MachineError> {
        if let Some(inputs) = new_inputs {
            self.check_input_count(inputs.len())?;
        }

        self.state = self.start_state.clone();
        self.step_count = 0;
        for (tape, head) in self.tapes.iter_mut().zip(self.heads.iter_mut()) {
            *head = 0;
            tape.clear_materialized();
        }

        if let Some(inputs) = new_inputs {
            self.initialize_tapes(inputs)?;
        }

        debug!("machine reset to {}", self.start_state);
        Ok(())
    }

    /// Returns the symbols in `[from, to]` of a tape, materializing the visited cells.
    pub fn tape_content(
        &mut self,
        tape_index: usize,
        from: i64,
        to: i64,
    ) -> Result<String, MachineError> {
        self.check_tape(tape_index)?;
        Ok(self.tapes[tape_index].content(from, to))
    }

    /// Returns the symbol under the head of a tape, materializing it.
    pub fn symbol_at_head(&mut self, tape_index: usize) -> Result<Symbol, MachineError> {
        self.check_tape(tape_index)?;
        let head = self.heads[tape_index];
        Ok(self.tapes[tape_index].get(head))
    }

    /// Read-only access to a tape.
    pub fn tape(&self, tape_index: usize) -> Result<&SparseTape, MachineError> {
        self.check_tape(tape_index)?;
        Ok(&self.tapes[tape_index])
    }

    pub fn head_position(&self, tape_index: usize) -> Result<i64, MachineError> {
        self.check_tape(tape_index)?;
        Ok(self.heads[tape_index])
    }

    /// Head positions of the active tapes.
    pub fn head_positions(&self) -> &[i64] {
        &self.heads
    }

    /// Returns the current state of the machine.
    pub fn current_state(&self) -> &str {
        &self.state
    }

    pub fn start_state(&self) -> &str {
        &self.start_state
    }

    /// Returns the total number of steps executed since construction or the last reset.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Whether the current state is an accept state.
    pub fn is_accept_state(&self) -> bool {
        self.accept_states.contains(&self.state)
    }

    pub fn accept_states(&self) -> &BTreeSet<String> {
        &self.accept_states
    }

    /// Every state referenced by the start state, a transition or an accept state.
    pub fn states(&self) -> &BTreeSet<String> {
        &self.states
    }

    pub fn active_tapes(&self) -> usize {
        self.tapes.len()
    }

    /// Returns the blank symbol used by this machine.
    pub fn blank(&self) -> Symbol {
        self.blank
    }

    pub fn materialized_cells(&self, tape_index: usize) -> Result<usize, MachineError> {
        Ok(self.tape(tape_index)?.materialized_count())
    }

    pub fn modified_cells(&self, tape_index: usize) -> Result<usize, MachineError> {
        Ok(self.tape(tape_index)?.modified_count())
    }

    pub fn total_materialized_cells(&self) -> usize {
        self.tapes.iter().map(SparseTape::materialized_count).sum()
    }

    pub fn total_modified_cells(&self) -> usize {
        self.tapes.iter().map(SparseTape::modified_count).sum()
    }

    /// Returns storage statistics for every active tape.
    pub fn tape_statistics(&self) -> Vec<TapeStatistics> {
        self.tapes
            .iter()
            .zip(&self.heads)
            .enumerate()
            .map(|(tape_index, (tape, &head_position))| TapeStatistics {
                tape_index,
                materialized_cells: tape.materialized_count(),
                modified_cells: tape.modified_count(),
                min_index: tape.min_index(),
                max_index: tape.max_index(),
                head_position,
            })
            .collect()
    }

    /// Renders every tape on its own line, with the cell under the head in brackets.
    ///
    /// The window covers every materialized cell plus `window` cells on each side of the
    /// head; a negative `window` shows no extra cells. Rendering does not materialize cells.
    ///
    /// ```
    /// let mut machine = mtur::Machine::new("q0", 1).unwrap();
    /// machine.initialize_tapes(&["ab"]).unwrap();
    /// assert_eq!(machine.visualize(1), "Tape 1:  [a]b\n");
    /// ```
    pub fn visualize(&self, window: i64) -> String {
        let window = window.max(0);
        let mut out = String::new();
        for (i, (tape, &head)) in self.tapes.iter().zip(&self.heads).enumerate() {
            out.push_str(&format!("Tape {}: ", i + 1));

            let start = tape.min_index().min(head.saturating_sub(window));
            let end = tape.max_index().max(head.saturating_add(window));
            for j in start..=end {
                if j == head {
                    out.push('[');
                    out.push(tape.peek(j));
                    out.push(']');
                } else {
                    out.push(tape.peek(j));
                }
            }
            out.push('\n');
        }
        out
    }

    /// Checks for acceptance, then steps once. Returns the outcome if one was reached.
    fn advance(&mut self) -> Result<Option<Outcome>, MachineError> {
        if self.is_accept_state() {
            return Ok(Some(self.finish(Outcome::Accepted)));
        }
        match self.step()? {
            Step::Continue => Ok(None),
            Step::Halt => Ok(Some(self.finish(Outcome::Halted))),
        }
    }

    fn finish(&self, outcome: Outcome) -> Outcome {
        debug!(
            "{outcome:?} in state {} after {} steps",
            self.state, self.step_count
        );
        outcome
    }

    fn read_symbols(&mut self) -> Symbols {
        let mut symbols = [self.blank; MAX_TAPES];
        for (i, tape) in self.tapes.iter_mut().enumerate() {
            symbols[i] = tape.get(self.heads[i]);
        }
        symbols
    }

    fn normalize(&self, mut transition: Transition) -> Transition {
        transition.read = self.normalize_read(transition.read);
        for i in self.tapes.len()..MAX_TAPES {
            transition.write[i] = self.blank;
            transition.moves[i] = Move::Stay;
        }
        transition
    }

    fn normalize_read(&self, mut read: Symbols) -> Symbols {
        for symbol in read.iter_mut().skip(self.tapes.len()) {
            *symbol = self.blank;
        }
        read
    }

    /// Rewrites the program blank `' '` to this machine's blank.
    fn map_program_blank(&self, symbols: &mut Symbols) {
        if self.blank == DEFAULT_BLANK_SYMBOL {
            return;
        }
        for symbol in symbols.iter_mut().filter(|s| **s == DEFAULT_BLANK_SYMBOL) {
            *symbol = self.blank;
        }
    }

    fn check_tape(&self, tape_index: usize) -> Result<(), MachineError> {
        if tape_index >= self.tapes.len() {
            return Err(MachineError::InvalidTapeIndex {
                index: tape_index,
                active: self.tapes.len(),
            });
        }
        Ok(())
    }

    fn check_input_count(&self, count: usize) -> Result<(), MachineError> {
        if count != self.tapes.len() {
            return Err(MachineError::InvalidArgument(format!(
                "Number of inputs ({count}) must match number of active tapes ({})",
                self.tapes.len()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "State: {} | Steps: {}", self.state, self.step_count)?;
        let heads = self
            .heads
            .iter()
            .enumerate()
            .map(|(i, head)| format!("Tape{}={}", i + 1, head))
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "Head positions: {} | Total materialized cells: {} | Modified cells: {}",
            heads,
            self.total_materialized_cells(),
            self.total_modified_cells()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Move::{Left, Right, Stay};

    const NO_INPUTS: Option<&[&str]> = None;

    fn copy_machine() -> Machine {
        let mut machine = Machine::new("q0", 2).unwrap();
        machine.add_transition(Transition::new(
            "q0",
            ['a', ' ', ' '],
            "q1",
            ['a', 'a', ' '],
            [Right, Right, Stay],
        ));
        machine.initialize_tapes(&["a", ""]).unwrap();
        machine
    }

    #[test]
    fn test_machine_creation() {
        let machine = Machine::new("start", 3).unwrap();

        assert_eq!(machine.current_state(), "start");
        assert_eq!(machine.active_tapes(), 3);
        assert_eq!(machine.head_positions(), &[0, 0, 0]);
        assert_eq!(machine.step_count(), 0);
        assert!(machine.states().contains("start"));
    }

    #[test]
    fn test_invalid_tape_count() {
        assert!(matches!(
            Machine::new("q0", 0),
            Err(MachineError::InvalidArgument(_))
        ));
        assert!(matches!(
            Machine::new("q0", MAX_TAPES + 1),
            Err(MachineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_single_step_copies_symbol() {
        let mut machine = copy_machine();

        assert_eq!(machine.step().unwrap(), Step::Continue);
        assert_eq!(machine.current_state(), "q1");
        assert_eq!(machine.head_positions(), &[1, 1]);
        assert_eq!(machine.step_count(), 1);

        let tape0 = machine.tape(0).unwrap();
        assert_eq!(tape0.peek(0), 'a');
        assert!(tape0.is_materialized(0));

        let tape1 = machine.tape(1).unwrap();
        assert_eq!(tape1.peek(0), 'a');
        assert!(tape1.is_modified(0));
    }

    #[test]
    fn test_step_without_transition_halts_unchanged() {
        let mut machine = copy_machine();
        machine.initialize_tapes(&["b", ""]).unwrap();

        assert_eq!(machine.step().unwrap(), Step::Halt);
        assert_eq!(machine.current_state(), "q0");
        assert_eq!(machine.head_positions(), &[0, 0]);
        assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn test_last_write_wins() {
        let mut machine = Machine::new("q0", 1).unwrap();
        machine.add_transition(Transition::new(
            "q0",
            ['a', ' ', ' '],
            "q1",
            ['x', ' ', ' '],
            [Right, Stay, Stay],
        ));
        machine.add_transition(Transition::new(
            "q0",
            ['a', ' ', ' '],
            "q2",
            ['y', ' ', ' '],
            [Left, Stay, Stay],
        ));
        machine.initialize_tapes(&["a"]).unwrap();

        assert_eq!(machine.transition_count(), 1);
        machine.step().unwrap();
        assert_eq!(machine.current_state(), "q2");
        assert_eq!(machine.head_position(0).unwrap(), -1);
        assert_eq!(machine.tape_content(0, 0, 0).unwrap(), "y");
    }

    #[test]
    fn test_unused_slots_are_ignored() {
        let mut machine = Machine::new("q0", 1).unwrap();
        machine.add_transition(Transition::new(
            "q0",
            ['1', 'x', 'y'],
            "q0",
            ['0', 'z', 'z'],
            [Right, Left, Left],
        ));
        machine.initialize_tapes(&["11"]).unwrap();

        let transition = machine.transitions().next().unwrap();
        assert_eq!(transition.read, ['1', ' ', ' ']);
        assert_eq!(transition.moves, [Right, Stay, Stay]);

        assert_eq!(machine.run().unwrap(), Outcome::Halted);
        assert_eq!(machine.tape_content(0, 0, 1).unwrap(), "00");
    }

    #[test]
    fn test_load_rewrites_program_blank() {
        let config = MachineConfig {
            tapes: 1,
            blank: '_',
            ..MachineConfig::default()
        };
        let mut machine = Machine::with_config(&config).unwrap();
        machine.load(&[Transition::new(
            "q0",
            [' ', ' ', ' '],
            "done",
            ['x', ' ', ' '],
            [Stay, Stay, Stay],
        )]);

        assert_eq!(machine.step().unwrap(), Step::Continue);
        assert_eq!(machine.current_state(), "done");
        assert_eq!(machine.symbol_at_head(0).unwrap(), 'x');
    }

    #[test]
    fn test_run_accepts_without_stepping() {
        let mut machine = copy_machine();
        machine.set_accept_state("q0");

        assert_eq!(machine.run().unwrap(), Outcome::Accepted);
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.current_state(), "q0");
    }

    #[test]
    fn test_run_halts_without_accepting() {
        let mut machine = copy_machine();

        assert_eq!(machine.run().unwrap(), Outcome::Halted);
        assert_eq!(machine.current_state(), "q1");
        assert!(!machine.is_accept_state());
    }

    #[test]
    fn test_run_accepts_after_steps() {
        let mut machine = copy_machine();
        machine.set_accept_state("q1");

        assert_eq!(machine.run().unwrap(), Outcome::Accepted);
        assert_eq!(machine.step_count(), 1);
    }

    fn looping_machine(max_steps: usize) -> Machine {
        let config = MachineConfig {
            max_steps,
            ..MachineConfig::default()
        };
        let mut machine = Machine::with_config(&config).unwrap();
        machine.add_transition(Transition::new(
            "q0",
            [' ', ' ', ' '],
            "q0",
            [' ', ' ', ' '],
            [Right, Stay, Stay],
        ));
        machine
    }

    #[test]
    fn test_step_budget() {
        let mut machine = looping_machine(3);

        for _ in 0..3 {
            assert_eq!(machine.step().unwrap(), Step::Continue);
        }
        assert_eq!(machine.step(), Err(MachineError::StepBudgetExceeded(3)));
        assert_eq!(machine.run(), Err(MachineError::StepBudgetExceeded(3)));
        assert_eq!(machine.step_count(), 3);
    }

    #[test]
    fn test_run_for_limit() {
        let mut machine = looping_machine(1_000);

        assert_eq!(
            machine.run_for(10),
            Err(MachineError::StepBudgetExceeded(10))
        );
        assert_eq!(machine.step_count(), 10);
        assert_eq!(machine.head_position(0).unwrap(), 10);
    }

    #[test]
    fn test_run_for_accepts_on_last_step() {
        let mut machine = copy_machine();
        machine.set_accept_state("q1");

        assert_eq!(machine.run_for(1).unwrap(), Outcome::Accepted);
    }

    #[test]
    fn test_reset() {
        let mut machine = copy_machine();
        machine.run().unwrap();

        machine.reset(NO_INPUTS).unwrap();
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.current_state(), "q0");
        assert_eq!(machine.head_positions(), &[0, 0]);
        for i in 0..machine.active_tapes() {
            assert_eq!(machine.materialized_cells(i).unwrap(), 0);
        }

        // Untouched cells fall back to the original input.
        assert_eq!(machine.symbol_at_head(0).unwrap(), 'a');
    }

    #[test]
    fn test_reset_with_inputs() {
        let mut machine = copy_machine();
        machine.run().unwrap();

        machine.reset(Some(&["aaa", "b"][..])).unwrap();
        assert_eq!(machine.total_materialized_cells(), 4);
        assert_eq!(machine.total_modified_cells(), 0);
        assert_eq!(machine.tape_content(1, 0, 1).unwrap(), "b ");
    }

    #[test]
    fn test_reset_with_wrong_input_count_keeps_state() {
        let mut machine = copy_machine();
        machine.step().unwrap();

        let result = machine.reset(Some(&["a"][..]));
        assert!(matches!(result, Err(MachineError::InvalidArgument(_))));
        assert_eq!(machine.current_state(), "q1");
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_initialize_tapes_count_mismatch() {
        let mut machine = Machine::new("q0", 2).unwrap();

        assert!(matches!(
            machine.initialize_tapes(&["a", "b", "c"]),
            Err(MachineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_invalid_tape_index() {
        let mut machine = Machine::new("q0", 2).unwrap();
        let expected = MachineError::InvalidTapeIndex {
            index: 2,
            active: 2,
        };

        assert_eq!(machine.head_position(2), Err(expected.clone()));
        assert_eq!(machine.symbol_at_head(2), Err(expected.clone()));
        assert_eq!(machine.tape_content(2, 0, 1), Err(expected.clone()));
        assert_eq!(machine.initialize_tape(2, "a"), Err(expected.clone()));
        assert_eq!(machine.modified_cells(2), Err(expected.clone()));
        assert_eq!(
            machine.add_transition_for_tape("q0", 2, 'a', "q1", 'b', Right),
            Err(expected)
        );
    }

    #[test]
    fn test_add_transition_for_tape_edits_first_match() {
        let mut machine = Machine::new("q0", 2).unwrap();
        machine.add_transition(Transition::new(
            "q0",
            ['b', 'y', ' '],
            "q1",
            ['b', 'y', ' '],
            [Right, Right, Stay],
        ));
        machine.add_transition(Transition::new(
            "q0",
            ['a', 'x', ' '],
            "q1",
            ['a', 'x', ' '],
            [Left, Left, Stay],
        ));

        machine
            .add_transition_for_tape("q0", 1, 'z', "q2", 'w', Stay)
            .unwrap();

        // ('a', 'x') sorts first, so it is the one replaced.
        assert_eq!(machine.transition_count(), 2);
        assert!(machine.remove_transition("q0", &['a', 'x', ' ']).is_none());

        let edited = machine
            .remove_transition("q0", &['a', 'z', ' '])
            .expect("edited transition");
        assert_eq!(edited.to_state, "q2");
        assert_eq!(edited.write, ['a', 'w', ' ']);
        assert_eq!(edited.moves, [Left, Stay, Stay]);
        assert!(machine.states().contains("q2"));
    }

    #[test]
    fn test_add_transition_for_tape_without_existing() {
        let mut machine = Machine::new("q0", 3).unwrap();
        machine
            .add_transition_for_tape("q0", 2, '1', "q1", '0', Left)
            .unwrap();

        let transition = machine.transitions().next().unwrap();
        assert_eq!(transition.read, [' ', ' ', '1']);
        assert_eq!(transition.write, [' ', ' ', '0']);
        assert_eq!(transition.moves, [Stay, Stay, Left]);
    }

    #[test]
    fn test_remove_transition_at_row() {
        let mut machine = copy_machine();
        machine.add_transition(Transition::new(
            "p",
            [' ', ' ', ' '],
            "q0",
            [' ', ' ', ' '],
            [Stay, Stay, Stay],
        ));

        let removed = machine.remove_transition_at(0).unwrap();
        assert_eq!(removed.from_state, "p");
        assert_eq!(machine.transition_count(), 1);
        assert!(machine.remove_transition_at(5).is_none());
    }

    #[test]
    fn test_remove_transition_on_single_tape() {
        let mut machine = Machine::new("q0", 1).unwrap();
        machine.add_transition(Transition::new(
            "q0",
            ['a', 'x', 'y'],
            "q1",
            ['b', 'x', 'y'],
            [Right, Left, Left],
        ));

        let removed = machine
            .remove_transition("q0", &['a', 'x', 'y'])
            .expect("transition added under this key");
        assert_eq!(removed.to_state, "q1");
        assert_eq!(machine.transition_count(), 0);
    }

    #[test]
    fn test_remove_loaded_transition_with_custom_blank() {
        let config = MachineConfig {
            tapes: 2,
            blank: '_',
            ..MachineConfig::default()
        };
        let mut machine = Machine::with_config(&config).unwrap();
        let compiled = Transition::new(
            "q0",
            ['a', ' ', ' '],
            "q1",
            ['a', 'a', ' '],
            [Right, Right, Stay],
        );
        machine.load([&compiled]);
        assert_eq!(machine.transitions().next().unwrap().read, ['a', '_', '_']);

        assert!(machine.remove_transition("q0", &compiled.read).is_some());
        assert_eq!(machine.transition_count(), 0);
    }

    #[test]
    fn test_remove_transition_prefers_exact_key() {
        let config = MachineConfig {
            tapes: 1,
            blank: '_',
            ..MachineConfig::default()
        };
        let mut machine = Machine::with_config(&config).unwrap();
        machine.add_transition(Transition::new(
            "q0",
            [' ', '_', '_'],
            "space",
            [' ', '_', '_'],
            [Stay, Stay, Stay],
        ));
        machine.add_transition(Transition::new(
            "q0",
            ['_', '_', '_'],
            "blank",
            ['_', '_', '_'],
            [Stay, Stay, Stay],
        ));

        let removed = machine.remove_transition("q0", &[' ', ' ', ' ']).unwrap();
        assert_eq!(removed.to_state, "space");
        let removed = machine.remove_transition("q0", &[' ', ' ', ' ']).unwrap();
        assert_eq!(removed.to_state, "blank");
        assert!(machine.remove_transition("q0", &[' ', ' ', ' ']).is_none());
    }

    #[test]
    fn test_clear_transitions_keeps_states() {
        let mut machine = copy_machine();
        machine.set_accept_state("q1");
        machine.clear_transitions();

        assert_eq!(machine.transition_count(), 0);
        assert!(machine.states().contains("q1"));
        assert!(machine.accept_states().contains("q1"));
        assert_eq!(machine.step().unwrap(), Step::Halt);
    }

    #[test]
    fn test_statistics_and_display() {
        let mut machine = copy_machine();
        machine.step().unwrap();

        let stats = machine.tape_statistics();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[1].modified_cells, 1);
        assert_eq!(stats[1].head_position, 1);

        let text = machine.to_string();
        assert!(text.starts_with("State: q1 | Steps: 1"));
        assert!(text.contains("Tape1=1, Tape2=1"));
    }

    #[test]
    fn test_visualize_does_not_materialize() {
        let machine = copy_machine();
        let before = machine.total_materialized_cells();

        let view = machine.visualize(2);
        assert_eq!(view, "Tape 1:   [a]  \nTape 2:   [ ]  \n");
        assert_eq!(machine.total_materialized_cells(), before);
    }

    #[test]
    fn test_visualize_clamps_window() {
        let machine = copy_machine();

        assert_eq!(machine.visualize(-3), machine.visualize(0));
        assert_eq!(machine.visualize(i64::MIN), "Tape 1: [a]\nTape 2: [ ]\n");
    }
}
