//! Fixtures over the `demos/` directory: each demo is a folder holding a
//! `suite.json`, the scene it names and the `.rhai` scripts it lists.

use std::fs;
use std::path::PathBuf;

use straw_api::{create_engine_from_scene_file, SceneSession};
use straw_tool::{read_suite_case, StrawToolError};

pub fn demos_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
}

pub fn demo_dir(name: &str) -> PathBuf {
    demos_root().join(name)
}

pub fn suite_path(name: &str) -> PathBuf {
    demo_dir(name).join("suite.json")
}

/// Demo names that carry a suite, sorted.
pub fn demo_names() -> Vec<String> {
    let Ok(entries) = fs::read_dir(demos_root()) else {
        return Vec::new();
    };
    let mut names = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().join("suite.json").is_file())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect::<Vec<_>>();
    names.sort();
    names
}

/// The scene file the demo's suite points at.
pub fn scene_path(name: &str) -> Result<PathBuf, StrawToolError> {
    let case = read_suite_case(&suite_path(name))?;
    Ok(demo_dir(name).join(case.scene))
}

/// Fresh engine over the demo's scene, for driving its scripts one by one.
pub fn demo_session(name: &str) -> Result<SceneSession, StrawToolError> {
    let scene = scene_path(name)?;
    create_engine_from_scene_file(&scene).map_err(StrawToolError::from)
}

pub fn demo_script(name: &str, script: &str) -> std::io::Result<String> {
    fs::read_to_string(demo_dir(name).join(script))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_names_lists_suites() {
        assert!(demo_names().contains(&"automation".to_string()));
    }

    #[test]
    fn scene_path_follows_suite_case() {
        let path = scene_path("automation").expect("scene path");
        assert!(path.ends_with("scene.json"));
        assert!(path.is_file());
    }

    #[test]
    fn demo_session_loads_application_name() {
        let session = demo_session("automation").expect("session");
        assert_eq!(session.engine.straw().application_name(), "SimpleAutomation");
    }

    #[test]
    fn missing_demo_is_a_read_error() {
        let error = demo_session("ghost").err().expect("missing demo");
        assert!(matches!(error, StrawToolError::ReadFile { .. }));
    }
}
