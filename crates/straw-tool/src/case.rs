use serde::{Deserialize, Serialize};
use straw_core::FailureKind;

pub const SUITE_SCHEMA_V1: &str = "straw-suite.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteCase {
    pub schema_version: String,
    /// Scene file, relative to the suite directory.
    #[serde(default = "default_scene")]
    pub scene: String,
    #[serde(default)]
    pub runs: Vec<SuiteRun>,
}

fn default_scene() -> String {
    "scene.json".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteRun {
    pub script: String,
    #[serde(default)]
    pub expect: Expectation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedOutcome {
    #[default]
    Pass,
    Fail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expectation {
    pub outcome: ExpectedOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod case_tests {
    use super::*;

    #[test]
    fn default_scene_is_scene_json() {
        assert_eq!(default_scene(), "scene.json");
    }

    #[test]
    fn suite_deserialize_applies_defaults() {
        let parsed: SuiteCase = serde_json::from_str(
            r#"{
  "schemaVersion": "straw-suite.v1",
  "runs": [ { "script": "test.rhai" } ]
}"#,
        )
        .expect("suite should deserialize");

        assert_eq!(parsed.schema_version, SUITE_SCHEMA_V1);
        assert_eq!(parsed.scene, "scene.json");
        assert_eq!(parsed.runs[0].expect, Expectation::default());
        assert_eq!(parsed.runs[0].expect.outcome, ExpectedOutcome::Pass);
    }

    #[test]
    fn expectation_deserialize_reads_failure_details() {
        let parsed: Expectation = serde_json::from_str(
            r#"{"outcome":"fail","kind":"explicit","message":"Invalid result of the processing"}"#,
        )
        .expect("expectation should deserialize");

        assert_eq!(parsed.outcome, ExpectedOutcome::Fail);
        assert_eq!(parsed.kind, Some(FailureKind::Explicit));
        assert_eq!(
            parsed.message.as_deref(),
            Some("Invalid result of the processing")
        );
    }
}
