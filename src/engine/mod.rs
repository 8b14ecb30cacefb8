// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Non-deterministic search engine.
//!
//! This module implements a backtracking search engine that runs predicates
//! in sequence. The engine coordinates with the trail to provide automatic
//! state restoration on backtracking, and replaces native recursion with an
//! explicit stack so that search depth is bounded by the stack capacity.
//!
//! # Architecture
//!
//! The engine maintains a stack of predicate execution states. Each stack entry tracks:
//! - Which predicate is executing
//! - Current round number (for predicates that execute multiple times)
//! - Choice mode state (whether we're trying alternatives)
//! - Current choice index (when in choice mode)
//!
//! Execution model:
//! 1. Call try_pred(round) on each predicate
//! 2. If Success: advance to next predicate
//! 3. If SuccessSamePredicate: increment round, stay at same predicate
//! 4. If Choices(n): enter choice mode, call retry_pred(round, 0..n-1)
//! 5. If Failure: backtrack to previous stack entry
//!
//! A deterministic predicate (one that answered Success without offering
//! choices) is exhausted once the search backtracks into it.
//!
//! Enumerating every solution is done by ending the program with a terminal
//! predicate that records the current state and then fails.

pub mod predicate;

pub use predicate::{Predicate, PredicateResult, SearchState, TerminalPredicate};

/// Maximum depth of the predicate stack.
const MAX_STACK_SIZE: usize = 1000;

/// Stack entry tracking the state of one predicate execution.
#[derive(Debug)]
struct StackEntry {
    /// Index of the predicate in the predicates list.
    predicate_index: usize,

    /// Current round number (incremented by SuccessSamePredicate).
    round: usize,

    /// Whether we're in choice mode (exploring alternatives).
    in_choice_mode: bool,

    /// Current choice being tried (when in_choice_mode is true).
    current_choice: usize,

    /// Total number of choices (when in_choice_mode is true).
    num_choices: usize,

    /// Trail checkpoint for this stack entry.
    trail_checkpoint: usize,
}

impl StackEntry {
    fn call(predicate_index: usize, round: usize, trail_checkpoint: usize) -> Self {
        Self {
            predicate_index,
            round,
            in_choice_mode: false,
            current_choice: 0,
            num_choices: 0,
            trail_checkpoint,
        }
    }
}

/// Search engine that coordinates predicate execution and backtracking.
pub struct SearchEngine<C> {
    /// List of predicates to execute in sequence.
    predicates: Vec<Box<dyn Predicate<C>>>,

    /// Stack of predicate execution states.
    stack: Vec<StackEntry>,
}

impl<C: SearchState> SearchEngine<C> {
    /// Create a new search engine with the given predicates.
    ///
    /// Predicates will be tried in the order given. Prefer [`EngineBuilder`],
    /// which guarantees the program ends with a terminal predicate.
    pub fn new(predicates: Vec<Box<dyn Predicate<C>>>) -> Self {
        Self {
            predicates,
            stack: Vec::with_capacity(64),
        }
    }

    /// Run the search to exhaustion.
    ///
    /// Returns once every choice has been backtracked past the first
    /// predicate. Solutions are collected by the terminal predicate, and the
    /// trail is back where it was when the search started.
    ///
    /// # Panics
    ///
    /// Panics if the predicate sequence reaches its end without failing, or
    /// if the stack exceeds its maximum depth.
    pub fn search(&mut self, ctx: &mut C) {
        self.stack.clear();

        if self.predicates.is_empty() {
            return;
        }

        self.stack.push(StackEntry::call(0, 0, ctx.trail().len()));
        self.run(ctx);
    }

    fn run(&mut self, ctx: &mut C) {
        // Stack empty: all choices failed
        while let Some(entry) = self.stack.last_mut() {
            // Rewind trail to this entry's checkpoint
            ctx.trail_mut().rewind_to(entry.trail_checkpoint);

            if !entry.in_choice_mode {
                let pred_idx = entry.predicate_index;
                let round = entry.round;
                let result = self.predicates[pred_idx].try_pred(ctx, round);

                match result {
                    PredicateResult::Success => {
                        self.exhaust_top();
                        self.push_next_predicate(ctx);
                    }
                    PredicateResult::SuccessSamePredicate => {
                        self.exhaust_top();
                        self.push_same_predicate(ctx);
                    }
                    PredicateResult::Failure => {
                        self.stack.pop();
                    }
                    PredicateResult::Choices(n) => {
                        let checkpoint = ctx.trail().len();
                        if let Some(entry) = self.stack.last_mut() {
                            entry.in_choice_mode = true;
                            entry.current_choice = 0;
                            entry.num_choices = n;
                            entry.trail_checkpoint = checkpoint;
                        }
                    }
                }
            } else {
                // Check if we've exhausted all choices
                if entry.current_choice >= entry.num_choices {
                    self.stack.pop();
                    continue;
                }

                let pred_idx = entry.predicate_index;
                let round = entry.round;
                let choice = entry.current_choice;
                entry.current_choice += 1;
                let result = self.predicates[pred_idx].retry_pred(ctx, round, choice);

                match result {
                    PredicateResult::Success => self.push_next_predicate(ctx),
                    PredicateResult::SuccessSamePredicate => self.push_same_predicate(ctx),
                    PredicateResult::Failure => {
                        // Try next choice (loop continues)
                    }
                    PredicateResult::Choices(_) => {
                        panic!(
                            "{}::retry_pred returned invalid result: {:?}",
                            self.predicates[pred_idx].name(),
                            result
                        );
                    }
                }
            }
        }
    }

    /// Mark the top entry as having no alternatives left.
    fn exhaust_top(&mut self) {
        if let Some(entry) = self.stack.last_mut() {
            entry.in_choice_mode = true;
            entry.current_choice = 0;
            entry.num_choices = 0;
        }
    }

    /// Push a new stack entry for the next predicate in sequence.
    ///
    /// Panics if we've reached the end of the predicate sequence, as this indicates
    /// an invalid program (all valid programs must end with a terminal predicate).
    fn push_next_predicate(&mut self, ctx: &C) {
        let next_index = self.top().predicate_index + 1;

        if next_index >= self.predicates.len() {
            panic!(
                "Invalid predicate sequence: reached end without FAIL. \
                 All predicate programs must terminate with a terminal predicate."
            );
        }

        self.push(StackEntry::call(next_index, 0, ctx.trail().len()));
    }

    /// Push a new stack entry for the same predicate with incremented round.
    fn push_same_predicate(&mut self, ctx: &C) {
        let top = self.top();
        let entry = StackEntry::call(top.predicate_index, top.round + 1, ctx.trail().len());
        self.push(entry);
    }

    fn top(&self) -> &StackEntry {
        match self.stack.last() {
            Some(entry) => entry,
            None => panic!("search stack is empty"),
        }
    }

    fn push(&mut self, entry: StackEntry) {
        if self.stack.len() >= MAX_STACK_SIZE {
            panic!("Search stack overflow: exceeded {} entries", MAX_STACK_SIZE);
        }
        self.stack.push(entry);
    }
}

/// Builder for predicate programs that always end in a terminal predicate.
pub struct EngineBuilder<C> {
    predicates: Vec<Box<dyn Predicate<C>>>,
}

impl<C: SearchState> EngineBuilder<C> {
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Append a predicate to the program.
    pub fn add(mut self, predicate: Box<dyn Predicate<C>>) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Append the terminal predicate and finish the program.
    pub fn terminal<T: TerminalPredicate<C> + 'static>(mut self, predicate: T) -> TerminatedBuilder<C> {
        self.predicates.push(Box::new(predicate));
        TerminatedBuilder {
            predicates: self.predicates,
        }
    }
}

impl<C: SearchState> Default for EngineBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A predicate program that already ends with its terminal predicate.
pub struct TerminatedBuilder<C> {
    predicates: Vec<Box<dyn Predicate<C>>>,
}

impl<C: SearchState> TerminatedBuilder<C> {
    pub fn build(self) -> SearchEngine<C> {
        SearchEngine::new(self.predicates)
    }
}
