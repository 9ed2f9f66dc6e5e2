use std::fmt::Display;

use straw_host::SceneError;
use straw_tool::StrawToolError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CliError {
    pub(crate) code: &'static str,
    pub(crate) message: String,
}

impl CliError {
    pub(crate) fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

fn map_error(code: &'static str, error: impl Display) -> CliError {
    CliError::new(code, error.to_string())
}

pub(crate) fn json_string(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

pub(crate) fn emit_error(error: CliError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!("ERROR_MSG_JSON:{}", json_string(&error.message));
    1
}

pub(crate) fn map_scene(error: SceneError) -> CliError {
    let code = match &error {
        SceneError::Read { .. } => "SCENE_READ",
        SceneError::Parse(_) => "SCENE_PARSE",
        SceneError::InvalidSchemaVersion { .. } => "SCENE_SCHEMA_VERSION",
        SceneError::Build(_) => "SCENE_BUILD",
    };
    map_error(code, error)
}

pub(crate) fn map_tool(error: StrawToolError) -> CliError {
    let code = match &error {
        StrawToolError::ReadFile { .. } => "SUITE_READ",
        StrawToolError::ParseCase { .. } => "SUITE_PARSE",
        StrawToolError::InvalidSchemaVersion { .. } => "SUITE_SCHEMA_VERSION",
        StrawToolError::SourceEmpty { .. } => "SUITE_SOURCE_EMPTY",
        StrawToolError::Scene(_) => "SUITE_SCENE",
        StrawToolError::ScriptNotFound { .. } => "SUITE_SCRIPT_NOT_FOUND",
        StrawToolError::UnexpectedPass { .. } => "SUITE_UNEXPECTED_PASS",
        StrawToolError::UnexpectedFailure { .. } => "SUITE_UNEXPECTED_FAILURE",
        StrawToolError::FailureKindMismatch { .. } => "SUITE_KIND_MISMATCH",
        StrawToolError::FailureMessageMismatch { .. } => "SUITE_MESSAGE_MISMATCH",
    };
    map_error(code, error)
}

pub(crate) fn map_cli_script_read(error: std::io::Error) -> CliError {
    map_error("CLI_SCRIPT_READ", error)
}

pub(crate) fn map_cli_output_json(error: serde_json::Error) -> CliError {
    map_error("CLI_OUTPUT_JSON", error)
}

#[cfg(test)]
mod error_map_tests {
    use super::*;

    #[test]
    fn emit_error_returns_non_zero_exit_code() {
        let code = emit_error(CliError::new("ERR", "failed"));
        assert_eq!(code, 1);
    }

    #[test]
    fn json_string_escapes_quotes() {
        assert_eq!(json_string("a \"b\""), "\"a \\\"b\\\"\"");
    }

    #[test]
    fn mapping_helpers_keep_error_codes() {
        assert_eq!(
            map_cli_script_read(std::io::Error::other("read")).code,
            "CLI_SCRIPT_READ"
        );
        let invalid = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        assert_eq!(map_cli_output_json(invalid).code, "CLI_OUTPUT_JSON");

        let schema = SceneError::InvalidSchemaVersion {
            expected: "a".to_string(),
            found: "b".to_string(),
        };
        assert_eq!(map_scene(schema).code, "SCENE_SCHEMA_VERSION");

        let mismatch = StrawToolError::UnexpectedPass {
            script: "x.rhai".to_string(),
        };
        let mapped = map_tool(mismatch);
        assert_eq!(mapped.code, "SUITE_UNEXPECTED_PASS");
        assert!(mapped.message.contains("x.rhai"));
    }
}
