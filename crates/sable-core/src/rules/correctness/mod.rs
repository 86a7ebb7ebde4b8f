//! Correctness rules (R-series)

mod narrow_scope;
mod no_global_mutation;
mod no_ignored_return;
mod no_var;
mod unbounded_loops;

pub use narrow_scope::PreferNarrowerScope;
pub use no_global_mutation::{NoGlobalMutation, NoGlobalMutationOptions};
pub use no_ignored_return::{NoIgnoredReturn, NoIgnoredReturnOptions};
pub use no_var::NoVar;
pub use unbounded_loops::{NoUnboundedLoops, NoUnboundedLoopsOptions};
