//! Recipe mutations and their in-progress tracking.

mod mutator;
mod tracker;

pub use mutator::RecipeMutator;
pub use tracker::{KindStatus, MutationFlight, MutationKind, MutationSnapshot, MutationState, MutationTracker};
