use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::{StrawToolError, SuiteCase, SUITE_SCHEMA_V1};

pub const SCRIPT_EXTENSION: &str = ".rhai";

/// Collects every `.rhai` file below `dir`, keyed by its `/`-separated path
/// relative to `dir`.
pub fn read_scripts_from_dir(dir: &Path) -> Result<BTreeMap<String, String>, StrawToolError> {
    let mut scripts = BTreeMap::new();

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !path.to_string_lossy().ends_with(SCRIPT_EXTENSION) {
            continue;
        }
        let Ok(relative) = path.strip_prefix(dir) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");

        let content = fs::read_to_string(path).map_err(|source| StrawToolError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        scripts.insert(relative, content);
    }

    if scripts.is_empty() {
        return Err(StrawToolError::SourceEmpty {
            path: dir.to_path_buf(),
        });
    }

    Ok(scripts)
}

pub fn read_suite_case(case_path: &Path) -> Result<SuiteCase, StrawToolError> {
    let raw = fs::read_to_string(case_path).map_err(|source| StrawToolError::ReadFile {
        path: case_path.to_path_buf(),
        source,
    })?;
    let parsed: SuiteCase =
        serde_json::from_str(&raw).map_err(|source| StrawToolError::ParseCase {
            path: case_path.to_path_buf(),
            source,
        })?;

    if parsed.schema_version != SUITE_SCHEMA_V1 {
        return Err(StrawToolError::InvalidSchemaVersion {
            expected: SUITE_SCHEMA_V1.to_string(),
            found: parsed.schema_version,
        });
    }

    Ok(parsed)
}
