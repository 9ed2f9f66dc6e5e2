mod assertions;
mod bindings;
mod bridge;
mod engine;
mod interaction;
mod node;
mod session;

pub use assertions::{
    assert_equal, assert_false, assert_greater_than, assert_greater_than_equal, assert_less_than,
    assert_less_than_equal, assert_not_equal, assert_true, check_comparison, check_truth,
    Predicate,
};
pub use bridge::{dynamic_is_truthy, dynamic_to_straw, failure_from_eval, render_dynamic};
pub use engine::{
    RunOutcome, ScriptEngine, ScriptEngineOptions, ScriptRun, DEFAULT_MAX_CALL_LEVELS,
};
pub use interaction::{activate, activate_node};
pub use node::{ComponentNode, SharedHost};
pub use session::{raise_failure, Straw, UNKNOWN_SCRIPT_EXCEPTION};

#[cfg(test)]
mod test_support;
