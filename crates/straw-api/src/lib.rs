use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use straw_host::{parse_scene, read_scene, MemoryHost, Scene, SceneError};
use straw_runtime::{ScriptEngine, ScriptEngineOptions, ScriptRun, SharedHost};

pub use straw_core::{ComponentInfo, Failure, FailureKind, StrawValue};
pub use straw_runtime::RunOutcome;

#[derive(Debug, Clone)]
pub struct CreateEngineFromSceneOptions {
    pub scene: Scene,
    pub application_name: Option<String>,
    pub max_call_levels: Option<usize>,
}

impl CreateEngineFromSceneOptions {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            application_name: None,
            max_call_levels: None,
        }
    }
}

/// Engine plus the concrete in-memory host it drives, so callers can still
/// mutate or inspect the tree between runs.
pub struct SceneSession {
    pub engine: ScriptEngine,
    pub host: Rc<RefCell<MemoryHost>>,
}

pub fn create_engine_from_scene(
    options: CreateEngineFromSceneOptions,
) -> Result<SceneSession, SceneError> {
    let host = Rc::new(RefCell::new(MemoryHost::from_scene(&options.scene)?));
    let shared: SharedHost = host.clone();

    let mut engine_options = ScriptEngineOptions {
        application_name: options.application_name,
        ..ScriptEngineOptions::default()
    };
    if let Some(levels) = options.max_call_levels {
        engine_options.max_call_levels = levels;
    }

    Ok(SceneSession {
        engine: ScriptEngine::new(shared, engine_options),
        host,
    })
}

pub fn create_engine_from_scene_json(raw: &str) -> Result<SceneSession, SceneError> {
    create_engine_from_scene(CreateEngineFromSceneOptions::new(parse_scene(raw)?))
}

pub fn create_engine_from_scene_file(path: &Path) -> Result<SceneSession, SceneError> {
    create_engine_from_scene(CreateEngineFromSceneOptions::new(read_scene(path)?))
}

/// Runs each script in name order against the same host. A failing run never
/// stops the ones after it; a quit request does, and the remaining scripts
/// are not run.
pub fn run_scripts(engine: &mut ScriptEngine, scripts: &BTreeMap<String, String>) -> Vec<ScriptRun> {
    let mut runs = Vec::with_capacity(scripts.len());
    for (name, source) in scripts {
        let run = engine.run_script(name, source);
        let quit = run.quit_requested;
        runs.push(run);
        if quit {
            break;
        }
    }

    let failed = runs.iter().filter(|run| !run.passed()).count();
    tracing::info!(
        total = runs.len(),
        failed,
        skipped = scripts.len() - runs.len(),
        "scripts finished"
    );
    runs
}
