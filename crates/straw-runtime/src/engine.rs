use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rhai::Engine;
use straw_core::Failure;

use crate::bindings::{register_bindings, ScriptLog};
use crate::bridge::failure_from_eval;
use crate::node::SharedHost;
use crate::session::Straw;

pub const DEFAULT_MAX_CALL_LEVELS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEngineOptions {
    /// Prefix for log lines; defaults to the host's application name.
    pub application_name: Option<String>,
    pub max_call_levels: usize,
}

impl Default for ScriptEngineOptions {
    fn default() -> Self {
        Self {
            application_name: None,
            max_call_levels: DEFAULT_MAX_CALL_LEVELS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Passed,
    Failed(Failure),
}

impl RunOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Passed => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptRun {
    pub name: String,
    pub outcome: RunOutcome,
    pub log: Vec<String>,
    /// The host had a pending quit request when the run finished.
    pub quit_requested: bool,
}

impl ScriptRun {
    pub fn passed(&self) -> bool {
        self.outcome.is_passed()
    }
}

/// Rhai engine bound to one component host. Each `run_script` call is an
/// independent invocation with a fresh scope; the host persists between runs.
pub struct ScriptEngine {
    engine: Engine,
    straw: Straw,
    log: ScriptLog,
}

impl ScriptEngine {
    pub fn new(host: SharedHost, options: ScriptEngineOptions) -> Self {
        let application_name = options
            .application_name
            .unwrap_or_else(|| host.borrow().application_name());
        let straw = Straw::new(host);
        let log = ScriptLog::new(application_name);

        let mut engine = Engine::new();
        engine.set_strict_variables(true);
        engine.set_max_call_levels(options.max_call_levels);
        register_bindings(&mut engine, &straw, &log);

        Self { engine, straw, log }
    }

    pub fn host(&self) -> &SharedHost {
        self.straw.host()
    }

    pub fn straw(&self) -> &Straw {
        &self.straw
    }

    pub fn quit_requested(&self) -> bool {
        self.straw
            .host()
            .try_borrow()
            .map(|host| host.quit_requested())
            .unwrap_or(false)
    }

    /// Top-level boundary: every failure raised while the script runs ends up
    /// in the returned outcome, and the host is quiesced before returning.
    pub fn run_script(&mut self, name: &str, source: &str) -> ScriptRun {
        tracing::debug!(script = name, "run started");
        self.log.take();

        let outcome = match catch_unwind(AssertUnwindSafe(|| self.evaluate(source))) {
            Ok(Ok(())) => RunOutcome::Passed,
            Ok(Err(failure)) => RunOutcome::Failed(failure),
            Err(payload) => RunOutcome::Failed(Failure::internal(format!(
                "Host panicked: {}",
                panic_message(payload.as_ref())
            ))),
        };
        let outcome = match (outcome, self.settle_host()) {
            (RunOutcome::Passed, Err(failure)) => RunOutcome::Failed(failure),
            (outcome, _) => outcome,
        };

        match &outcome {
            RunOutcome::Passed => tracing::debug!(script = name, "run passed"),
            RunOutcome::Failed(failure) => tracing::warn!(
                script = name,
                kind = %failure.kind,
                origin = failure.origin.as_deref().unwrap_or("-"),
                "{}",
                failure.message
            ),
        }

        ScriptRun {
            name: name.to_string(),
            outcome,
            log: self.log.take(),
            quit_requested: self.quit_requested(),
        }
    }

    fn evaluate(&self, source: &str) -> Result<(), Failure> {
        let ast = self
            .engine
            .compile(source)
            .map_err(|error| Failure::internal(format!("Script compile error: {}", error)))?;
        self.engine
            .run_ast(&ast)
            .map_err(|error| failure_from_eval(*error))
    }

    fn settle_host(&self) -> Result<(), Failure> {
        match self.straw.host().try_borrow_mut() {
            Ok(mut host) => host.quiesce(),
            Err(_) => {
                tracing::warn!("component host still borrowed after run; skipped quiesce");
                Ok(())
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic".to_string()
}

#[cfg(test)]
mod engine_tests {
    use super::*;
    use crate::test_support::demo_host;
    use straw_core::{find_by_id, ComponentHost, FailureKind, StrawValue};

    fn engine() -> (ScriptEngine, std::rc::Rc<std::cell::RefCell<straw_host::MemoryHost>>) {
        let (host, memory) = demo_host();
        (ScriptEngine::new(host, ScriptEngineOptions::default()), memory)
    }

    fn failure(run: &ScriptRun) -> &Failure {
        run.outcome.failure().expect("run should fail")
    }

    #[test]
    fn find_component_script_passes() {
        let (mut engine, _) = engine();
        let run = engine.run_script(
            "find_component",
            r#"
let slider = straw::findComponent("slider");
straw::assertTrue(slider);
straw::assertEqual(slider.getComponentID(), "slider");
straw::assertEqual(slider.typeName(), "CustomSlider");
straw::assertEqual(straw::findComponentsByType("CustomSlider").len(), 1);

let button = straw::findComponentById("button");
straw::assertEqual(button.getProperties().example, 1337);
straw::assertEqual(slider.customMethod(), "Called customMethod !");
straw::assertEqual(slider.scaled(4), 2);
straw::assertTrue(straw::findComponent("missing") == ());
straw::assertFalse(straw::findComponentsByType("Missing"));
"#,
        );
        assert_eq!(run.outcome, RunOutcome::Passed);
    }

    #[test]
    fn children_and_info_are_exposed() {
        let (mut engine, _) = engine();
        let run = engine.run_script(
            "children",
            r#"
let animation = straw::findComponent("animation");
let children = animation.getChildren();
straw::assertEqual(children.len(), 2);
straw::assertEqual(children[0].getComponentID(), "button");
straw::assertEqual(children[1].getComponentID(), "slider");

let info = straw::componentInfo("animation", true);
straw::assertEqual(info.numChildren, 2);
straw::assertEqual(info.children[1]["type"], "CustomSlider");
straw::assertEqual(animation.info().id, "animation");
"#,
        );
        assert!(run.passed(), "{:?}", run.outcome);
    }

    #[test]
    fn click_component_toggles_slider() {
        let (mut engine, _) = engine();
        let run = engine.run_script(
            "click_component",
            r#"
let slider = straw::findComponent("slider");
straw::assertTrue(slider.isVisible());
straw::clickComponent("button");
straw::assertFalse(slider.isVisible());
straw::activate("button");
straw::assertTrue(slider.isVisible());
"#,
        );
        assert!(run.passed(), "{:?}", run.outcome);
    }

    #[test]
    fn failing_assertion_reaches_boundary() {
        let (mut engine, _) = engine();
        let run = engine.run_script("assert", "straw::assertEqual(1, 2);");
        let failure = failure(&run);
        assert_eq!(failure.kind, FailureKind::Assertion);
        assert_eq!(
            failure.message,
            "assertEqual: Parameters are not equal (expected 1 == 2)"
        );
        assert_eq!(failure.predicate.as_deref(), Some("assertEqual"));
    }

    #[test]
    fn native_failures_carry_call_site_origin() {
        let (mut engine, _) = engine();

        let run = engine.run_script("assert", "\n\nstraw::assertTrue(false);");
        let origin = failure(&run).origin.clone().expect("assertion origin");
        assert!(origin.starts_with("3:"), "{}", origin);

        let run = engine.run_script("raise", "let x = 1;\nstraw::raiseFailure(\"x\");");
        let origin = failure(&run).origin.clone().expect("raise origin");
        assert!(origin.starts_with("2:"), "{}", origin);

        let run = engine.run_script(
            "nested",
            "fn f() {\n    straw::raiseFailure(\"y\");\n}\n\nf();",
        );
        let origin = failure(&run).origin.clone().expect("nested origin");
        assert!(origin.starts_with("2:"), "{}", origin);

        let run = engine.run_script("click", "\nstraw::clickComponent(\"ghost\");");
        let origin = failure(&run).origin.clone().expect("click origin");
        assert!(origin.starts_with("2:"), "{}", origin);

        let run = engine.run_script("throw", "\n\nthrow \"z\";");
        assert_eq!(failure(&run).origin.as_deref(), Some("3:1"));
    }

    #[test]
    fn caught_failure_exposes_origin() {
        let (mut engine, _) = engine();
        let run = engine.run_script(
            "caught",
            r#"
try {
    straw::assertEqual(1, 2);
} catch (failure) {
    straw::assertEqual(failure.kind, "assertion");
    straw::assertTrue(failure.origin.starts_with("3:"));
}
"#,
        );
        assert!(run.passed(), "{:?}", run.outcome);
    }

    #[test]
    fn raise_through_function_pointer_keeps_message() {
        let (mut engine, _) = engine();
        let run = engine.run_script(
            "raise",
            r#"
fn inner(value) {
    if value > 0 {
        straw::raiseFailure("Invalid result ", "of the processing");
    }
}
fn outer(callback) {
    callback.call(42);
}
outer(Fn("inner"));
"#,
        );
        let failure = failure(&run);
        assert_eq!(failure.kind, FailureKind::Explicit);
        assert_eq!(failure.message, "Invalid result of the processing");
    }

    #[test]
    fn throw_exception_without_message_uses_default() {
        let (mut engine, _) = engine();
        let run = engine.run_script("raise", "straw::throwException();");
        assert_eq!(failure(&run).message, "unknown script exception");

        let run = engine.run_script("throw", r#"throw "custom";"#);
        assert_eq!(failure(&run).kind, FailureKind::Explicit);
        assert_eq!(failure(&run).message, "custom");
    }

    #[test]
    fn script_can_catch_failures() {
        let (mut engine, _) = engine();
        let run = engine.run_script(
            "catch",
            r#"
let kind = "";
let message = "";
try {
    straw::assertLessThan(5, 3);
} catch (err) {
    kind = err.kind;
    message = err.message;
}
straw::assertEqual(kind, "assertion");
straw::assertTrue(message.contains("not less than"));
"#,
        );
        assert!(run.passed(), "{:?}", run.outcome);
    }

    #[test]
    fn missing_capability_and_bad_comparison_are_internal() {
        let (mut engine, _) = engine();
        let run = engine.run_script(
            "missing",
            r#"straw::findComponent("button").customMethod();"#,
        );
        assert_eq!(failure(&run).kind, FailureKind::Internal);
        assert!(failure(&run).message.contains("TextButton"));

        let run = engine.run_script("undeclared", r#"straw::findComponent("button").nothing();"#);
        assert_eq!(failure(&run).kind, FailureKind::Internal);

        let run = engine.run_script("compare", r#"straw::assertLessThan("a", 1);"#);
        assert_eq!(failure(&run).kind, FailureKind::Internal);

        let run = engine.run_script("arity", "straw::assertEqual(1);");
        assert_eq!(failure(&run).kind, FailureKind::Internal);

        let run = engine.run_script("click", r#"straw::clickComponent("ghost");"#);
        assert_eq!(failure(&run).message, "Component \"ghost\" not found");
    }

    #[test]
    fn compile_errors_are_internal() {
        let (mut engine, _) = engine();
        let run = engine.run_script("broken", "let = ;");
        assert_eq!(failure(&run).kind, FailureKind::Internal);
        assert!(failure(&run).message.starts_with("Script compile error"));
    }

    #[test]
    fn handle_to_detached_node_reports_not_attached() {
        let (mut engine, memory) = engine();
        {
            let mut memory = memory.borrow_mut();
            let button = find_by_id(&*memory, "button").expect("button");
            memory
                .add_listener(button, |host, _| {
                    let slider = find_by_id(&*host, "slider").expect("slider");
                    host.detach(slider)
                })
                .expect("listener");
        }

        let run = engine.run_script(
            "detached",
            r#"
let slider = straw::findComponent("slider");
straw::assertTrue(slider.isAttached());
straw::clickComponent("button");
straw::assertFalse(slider.isAttached());
straw::assertFalse(slider.isShowing());
straw::assertTrue(straw::findComponent("slider") == ());
"#,
        );
        assert!(run.passed(), "{:?}", run.outcome);

        let run = engine.run_script(
            "detached-invoke",
            r#"
let children = straw::findComponent("animation").getChildren();
straw::assertEqual(children.len(), 1);
"#,
        );
        assert!(run.passed(), "{:?}", run.outcome);
    }

    #[test]
    fn handle_outlives_removed_node() {
        let (mut engine, memory) = engine();
        {
            let mut memory = memory.borrow_mut();
            let button = find_by_id(&*memory, "button").expect("button");
            memory
                .add_listener(button, |host, _| {
                    let slider = find_by_id(&*host, "slider").expect("slider");
                    host.remove(slider)
                })
                .expect("listener");
        }

        let run = engine.run_script(
            "detached",
            r#"
let slider = straw::findComponent("slider");
straw::clickComponent("button");
straw::assertTrue(slider.getComponentID() == ());
straw::assertFalse(slider.isAttached());
straw::assertEqual(slider.getChildren().len(), 0);
straw::assertFalse(slider.getProperties());
straw::assertTrue(straw::findComponent("slider") == ());
"#,
        );
        assert!(run.passed(), "{:?}", run.outcome);

        let run = engine.run_script(
            "detached-invoke",
            r#"
let slider = straw::findComponentsByType("CustomSlider");
straw::assertEqual(slider.len(), 0);
"#,
        );
        assert!(run.passed(), "{:?}", run.outcome);
    }

    #[test]
    fn log_print_and_quit_are_captured() {
        let (mut engine, memory) = engine();
        let run = engine.run_script(
            "log",
            r#"
straw::log("value", 42, true);
print("from print");
straw::log();
straw::quitApplication();
"#,
        );
        assert!(run.passed(), "{:?}", run.outcome);
        assert_eq!(
            run.log,
            vec![
                "[SimpleAutomation] value 42 true".to_string(),
                "[SimpleAutomation] from print".to_string(),
                "[SimpleAutomation] ".to_string(),
            ]
        );
        assert!(run.quit_requested);
        assert!(memory.borrow().quit_requested());
        assert!(engine.quit_requested());

        let next = engine.run_script("empty", "");
        assert!(next.log.is_empty());
    }

    #[test]
    fn invoke_by_id_and_by_handle() {
        let (mut engine, _) = engine();
        let run = engine.run_script(
            "invoke",
            r#"
straw::assertEqual(
    straw::invokeComponentCustomMethod("slider", "customMethod"),
    "Called customMethod !"
);
straw::assertEqual(straw::invokeComponentCustomMethod("slider", "scaled", 3), 1.5);
let slider = straw::findComponent("slider");
straw::assertEqual(slider.invoke("scaled", [2]), 1.0);
"#,
        );
        assert!(run.passed(), "{:?}", run.outcome);
    }

    #[test]
    fn options_override_application_name() {
        let (host, _) = demo_host();
        let mut engine = ScriptEngine::new(
            host,
            ScriptEngineOptions {
                application_name: Some("Custom".to_string()),
                ..ScriptEngineOptions::default()
            },
        );
        let run = engine.run_script("log", r#"straw::log("hi");"#);
        assert_eq!(run.log, vec!["[Custom] hi".to_string()]);
    }

    #[test]
    fn deep_recursion_is_internal() {
        let (host, _) = demo_host();
        let mut engine = ScriptEngine::new(
            host,
            ScriptEngineOptions {
                max_call_levels: 8,
                ..ScriptEngineOptions::default()
            },
        );
        let run = engine.run_script("recurse", "fn down(n) { down(n + 1) } down(0);");
        assert_eq!(failure(&run).kind, FailureKind::Internal);
    }

    #[test]
    fn listener_panics_do_not_exhaust_activation_depth() {
        let (host, memory) = demo_host();
        {
            let mut memory = memory.borrow_mut();
            let animation = find_by_id(&*memory, "animation").expect("animation");
            let bomb = memory.create("bomb", "TextButton");
            memory.add_child(animation, bomb).expect("bomb");
            memory
                .add_listener(bomb, |_, _| -> Result<(), Failure> {
                    panic!("listener exploded")
                })
                .expect("listener");
        }
        let mut engine = ScriptEngine::new(host, ScriptEngineOptions::default());

        for _ in 0..=straw_host::MAX_ACTIVATION_DEPTH {
            let run = engine.run_script("bomb", r#"straw::clickComponent("bomb");"#);
            assert!(failure(&run).message.contains("listener exploded"));
        }

        let run = engine.run_script(
            "click",
            r#"
straw::clickComponent("button");
straw::assertFalse(straw::findComponent("slider").isVisible());
"#,
        );
        assert!(run.passed(), "{:?}", run.outcome);
    }

    #[test]
    fn deferred_failure_fails_an_otherwise_passing_run() {
        let (mut engine, memory) = engine();
        {
            let mut memory = memory.borrow_mut();
            let slider = find_by_id(&*memory, "slider").expect("slider");
            memory.call_async(slider, |_, _| Err(Failure::internal("late failure")));
        }
        let run = engine.run_script("late", "let x = 1;");
        assert_eq!(failure(&run).message, "late failure");
        assert_eq!(failure(&run).kind, FailureKind::Internal);
    }

    #[test]
    fn host_panic_becomes_internal_failure() {
        let (host, memory) = demo_host();
        memory
            .borrow_mut()
            .register_capability("CustomSlider", "explode", |_, _, _| -> Result<StrawValue, Failure> {
                panic!("capability exploded")
            });
        let mut engine = ScriptEngine::new(host, ScriptEngineOptions::default());
        let run = engine.run_script("panic", r#"straw::findComponent("slider").explode();"#);
        let failure = failure(&run);
        assert_eq!(failure.kind, FailureKind::Internal);
        assert!(failure.message.contains("capability exploded"));

        let run = engine.run_script("after", r#"straw::assertTrue(straw::findComponent("slider"));"#);
        assert!(run.passed(), "{:?}", run.outcome);
    }
}
