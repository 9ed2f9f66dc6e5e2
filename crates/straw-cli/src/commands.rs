use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use straw_api::create_engine_from_scene_file;
use straw_core::{component_info, find_by_id, ComponentHost, ComponentInfo, Failure};
use straw_runtime::{RunOutcome, ScriptRun};
use straw_tool::{assert_suite, read_scripts_from_dir};

use crate::{
    map_cli_output_json, map_cli_script_read, map_scene, map_tool, CliError,
    InfoArgs, RunArgs, SuiteArgs,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunLine<'a> {
    name: &'a str,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'a Failure>,
    log: &'a [String],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    quit_requested: bool,
}

pub(crate) fn run_scripts(args: RunArgs) -> Result<i32, CliError> {
    let scripts = load_scripts(&args)?;
    let mut session = create_engine_from_scene_file(Path::new(&args.scene)).map_err(map_scene)?;

    let mut runs = Vec::with_capacity(scripts.len());
    for (name, source) in &scripts {
        if session.engine.quit_requested() {
            break;
        }
        runs.push(session.engine.run_script(name, source));
    }
    emit_runs(&runs, scripts.len() - runs.len())
}

pub(crate) fn run_suite(args: SuiteArgs) -> Result<i32, CliError> {
    let dir = PathBuf::from(&args.dir);
    let case = args
        .case
        .map(PathBuf::from)
        .unwrap_or_else(|| dir.join("suite.json"));

    let report = assert_suite(&dir, &case).map_err(map_tool)?;
    println!("RESULT:OK");
    emit_run_lines(&report.runs)?;
    emit_summary(&report.runs, report.skipped.len());
    Ok(0)
}

pub(crate) fn run_info(args: InfoArgs) -> Result<i32, CliError> {
    let session = create_engine_from_scene_file(Path::new(&args.scene)).map_err(map_scene)?;
    let host = session.host.borrow();

    let infos = match &args.id {
        Some(id) => {
            let node = find_by_id(&*host, id).ok_or_else(|| {
                CliError::new(
                    "CLI_COMPONENT_NOT_FOUND",
                    format!("Component \"{}\" not found.", id),
                )
            })?;
            component_info(&*host, node, args.recursive)
                .into_iter()
                .collect::<Vec<ComponentInfo>>()
        }
        None => host
            .roots()
            .into_iter()
            .filter_map(|root| component_info(&*host, root, args.recursive))
            .collect(),
    };

    println!("RESULT:OK");
    for info in &infos {
        println!(
            "INFO_JSON:{}",
            serde_json::to_string(info).map_err(map_cli_output_json)?
        );
    }
    Ok(0)
}

/// Explicit scripts keep their command-line order; otherwise every `.rhai`
/// file of the scripts directory runs in path order.
fn load_scripts(args: &RunArgs) -> Result<Vec<(String, String)>, CliError> {
    if args.scripts.is_empty() {
        let Some(dir) = &args.scripts_dir else {
            return Err(CliError::new(
                "CLI_NO_SCRIPTS",
                "Pass script files or --scripts-dir.",
            ));
        };
        let scripts = read_scripts_from_dir(Path::new(dir)).map_err(map_tool)?;
        return Ok(scripts.into_iter().collect());
    }

    let base = args.scripts_dir.as_deref().map(Path::new);
    args.scripts
        .iter()
        .map(|script| {
            let path = match base {
                Some(base) => base.join(script),
                None => PathBuf::from(script),
            };
            let source = fs::read_to_string(&path).map_err(map_cli_script_read)?;
            Ok((script.clone(), source))
        })
        .collect()
}

fn failed_count(runs: &[ScriptRun]) -> usize {
    runs.iter().filter(|run| !run.passed()).count()
}

fn emit_runs(runs: &[ScriptRun], skipped: usize) -> Result<i32, CliError> {
    let failed = failed_count(runs);
    if failed == 0 {
        println!("RESULT:OK");
    } else {
        println!("RESULT:FAILED");
    }
    emit_run_lines(runs)?;
    emit_summary(runs, skipped);
    Ok(if failed == 0 { 0 } else { 1 })
}

fn emit_summary(runs: &[ScriptRun], skipped: usize) {
    println!(
        "SUMMARY:total={} failed={} skipped={} quit={}",
        runs.len(),
        failed_count(runs),
        skipped,
        runs.iter().any(|run| run.quit_requested)
    );
}

fn emit_run_lines(runs: &[ScriptRun]) -> Result<(), CliError> {
    for run in runs {
        let line = RunLine {
            name: &run.name,
            outcome: match run.outcome {
                RunOutcome::Passed => "pass",
                RunOutcome::Failed(_) => "fail",
            },
            failure: run.outcome.failure(),
            log: &run.log,
            quit_requested: run.quit_requested,
        };
        println!(
            "RUN_JSON:{}",
            serde_json::to_string(&line).map_err(map_cli_output_json)?
        );
    }
    Ok(())
}
