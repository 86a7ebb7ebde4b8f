//! Complexity rules (C-series)

mod max_await_count;
mod max_nesting_depth;
mod max_promise_chain;
mod max_reference_depth;
mod min_assertions;
mod no_recursion;

pub use max_await_count::{MaxAwaitCount, MaxAwaitCountOptions};
pub use max_nesting_depth::{MaxNestingDepth, MaxNestingDepthOptions};
pub use max_promise_chain::{MaxPromiseChain, MaxPromiseChainOptions};
pub use max_reference_depth::{MaxReferenceDepth, MaxReferenceDepthOptions};
pub use min_assertions::{MinAssertions, MinAssertionsOptions};
pub use no_recursion::{NoRecursion, NoRecursionOptions};
