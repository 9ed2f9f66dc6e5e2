use std::path::Path;

use straw_api::create_engine_from_scene_file;
use straw_runtime::{RunOutcome, ScriptRun};

use crate::source::{read_scripts_from_dir, read_suite_case};
use crate::{Expectation, ExpectedOutcome, StrawToolError, SuiteCase};

#[derive(Debug, Clone, PartialEq)]
pub struct SuiteReport {
    pub runs: Vec<ScriptRun>,
    /// Listed scripts that were not run because an earlier one requested quit.
    pub skipped: Vec<String>,
}

impl SuiteReport {
    pub fn failed(&self) -> usize {
        self.runs.iter().filter(|run| !run.passed()).count()
    }

    pub fn quit_requested(&self) -> bool {
        self.runs.iter().any(|run| run.quit_requested)
    }
}

/// Runs the suite's scripts in order against one scene, sharing the host so
/// later scripts observe what earlier ones did. Scheduling stops once a script
/// requests quit; the rest are reported as skipped.
pub fn run_suite(suite_dir: &Path, case: &SuiteCase) -> Result<SuiteReport, StrawToolError> {
    let mut session = create_engine_from_scene_file(&suite_dir.join(&case.scene))?;
    let scripts = read_scripts_from_dir(suite_dir)?;

    let mut runs = Vec::with_capacity(case.runs.len());
    let mut skipped = Vec::new();
    for run in &case.runs {
        let source = scripts
            .get(&run.script)
            .ok_or_else(|| StrawToolError::ScriptNotFound {
                script: run.script.clone(),
            })?;
        if session.engine.quit_requested() {
            skipped.push(run.script.clone());
            continue;
        }
        runs.push(session.engine.run_script(&run.script, source));
    }

    if !skipped.is_empty() {
        tracing::info!(skipped = skipped.len(), "quit requested; remaining scripts not run");
    }
    Ok(SuiteReport { runs, skipped })
}

pub fn check_expectation(expect: &Expectation, run: &ScriptRun) -> Result<(), StrawToolError> {
    let script = run.name.clone();
    match (&run.outcome, expect.outcome) {
        (RunOutcome::Passed, ExpectedOutcome::Pass) => Ok(()),
        (RunOutcome::Passed, ExpectedOutcome::Fail) => Err(StrawToolError::UnexpectedPass { script }),
        (RunOutcome::Failed(failure), ExpectedOutcome::Pass) => {
            Err(StrawToolError::UnexpectedFailure {
                script,
                message: failure.message.clone(),
            })
        }
        (RunOutcome::Failed(failure), ExpectedOutcome::Fail) => {
            if let Some(expected) = expect.kind {
                if expected != failure.kind {
                    return Err(StrawToolError::FailureKindMismatch {
                        script,
                        expected,
                        actual: failure.kind,
                    });
                }
            }
            if let Some(expected) = &expect.message {
                if *expected != failure.message {
                    return Err(StrawToolError::FailureMessageMismatch {
                        script,
                        expected: expected.clone(),
                        actual: failure.message.clone(),
                    });
                }
            }
            Ok(())
        }
    }
}

pub fn assert_suite(suite_dir: &Path, case_path: &Path) -> Result<SuiteReport, StrawToolError> {
    let case = read_suite_case(case_path)?;
    let report = run_suite(suite_dir, &case)?;

    // skipped runs sit at the tail of the list, after the quit
    for (listed, run) in case.runs.iter().zip(report.runs.iter()) {
        check_expectation(&listed.expect, run)?;
        tracing::debug!(script = %run.name, "expectation met");
    }

    Ok(report)
}
