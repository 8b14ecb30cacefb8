// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Predicate trait for non-deterministic search.
//!
//! The search engine works by trying predicates in sequence. Each predicate
//! represents a choice point in the search space. Predicates can succeed,
//! fail, or signal completion.
//!
//! # Example
//!
//! ```
//! use tiling_factors::engine::{Predicate, PredicateResult, SearchState};
//! use tiling_factors::trail::Trail;
//!
//! #[derive(Debug)]
//! struct Ctx(Trail);
//!
//! impl SearchState for Ctx {
//!     fn trail(&self) -> &Trail { &self.0 }
//!     fn trail_mut(&mut self) -> &mut Trail { &mut self.0 }
//! }
//!
//! #[derive(Debug)]
//! struct SimplePredicate;
//!
//! impl Predicate<Ctx> for SimplePredicate {
//!     fn try_pred(&mut self, _ctx: &mut Ctx, _round: usize) -> PredicateResult {
//!         // Return Choices(2) to try two alternatives
//!         PredicateResult::Choices(2)
//!     }
//!
//!     fn retry_pred(&mut self, _ctx: &mut Ctx, _round: usize, choice: usize) -> PredicateResult {
//!         if choice < 2 {
//!             PredicateResult::Success
//!         } else {
//!             PredicateResult::Failure
//!         }
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Simple"
//!     }
//! }
//! ```

use std::fmt::Debug;

use crate::trail::Trail;

/// Result of attempting a predicate.
///
/// Predicates can return:
/// - `Success`: Move to next predicate in the sequence
/// - `SuccessSamePredicate`: Stay at same predicate, increment round (for iterative predicates)
/// - `Failure`: Backtrack to previous predicate
/// - `Choices(n)`: Predicate has n choices to explore via retry_pred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateResult {
    /// Predicate succeeded. Move to next predicate in sequence.
    Success,

    /// Predicate succeeded but stay at same predicate with next round.
    /// The ordered enumerator uses one round per tiling level.
    SuccessSamePredicate,

    /// Predicate has no (more) valid choices. Backtrack to previous predicate.
    Failure,

    /// Predicate has multiple choices to explore.
    /// Engine will call retry_pred(round, choice) for each choice in 0..n.
    Choices(usize),
}

/// State searched by the engine.
///
/// The engine only needs the trail: it takes a checkpoint before every
/// predicate call and rewinds to it before every retry.
pub trait SearchState {
    fn trail(&self) -> &Trail;
    fn trail_mut(&mut self) -> &mut Trail;
}

/// A terminal predicate that ends a predicate program.
///
/// Terminal predicates always fail; they never return Success.
/// [`EngineBuilder::terminal`](super::EngineBuilder::terminal) only accepts
/// these, so every built program ends properly.
pub trait TerminalPredicate<C>: Predicate<C> {}

/// Trait for search predicates in the non-deterministic engine.
///
/// Each predicate represents a choice point in the search. The engine
/// calls `try_pred` to attempt the predicate for the first time, and
/// `retry_pred` on backtracking to try alternative choices.
///
/// # Lifecycle
///
/// 1. Engine calls `try_pred` when first encountering the predicate
/// 2. If Success: engine advances to next predicate
/// 3. If Failure: engine backtracks to previous predicate
/// 4. If Choices(n): engine calls `retry_pred` for each choice until one succeeds
/// 5. On backtrack into a choice point, the next choice is retried
///
/// # Trail Integration
///
/// Predicates write search state through the context's trail. The engine
/// rewinds the trail to the predicate's checkpoint before every retry.
pub trait Predicate<C>: Debug {
    /// Try this predicate for a given round.
    ///
    /// The round starts at 0 and increments each time the predicate returns
    /// `SuccessSamePredicate`.
    fn try_pred(&mut self, ctx: &mut C, round: usize) -> PredicateResult;

    /// Retry this predicate with a specific choice.
    ///
    /// Called after try_pred returns Choices(n), for each choice in 0..n.
    ///
    /// Note: retry_pred cannot return Choices (we're already in choice mode).
    #[allow(unused)]
    fn retry_pred(&mut self, ctx: &mut C, round: usize, choice: usize) -> PredicateResult {
        // Predicates that return Choices must implement this.
        panic!("{}::retry_pred should never be called", self.name());
    }

    /// Name of this predicate, for diagnostics.
    ///
    /// Default implementation returns the type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
