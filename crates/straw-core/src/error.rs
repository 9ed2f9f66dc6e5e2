use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a failure came from. Not-found is never a failure: queries report
/// absence through `Option`/empty results instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// A predicate checked by the assertion reporter did not hold.
    Assertion,
    /// Script code signalled a failure on purpose.
    Explicit,
    /// The host or the engine could not honour a call.
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assertion => "assertion",
            Self::Explicit => "explicit",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
#[error("{kind} failure: {message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl Failure {
    fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            predicate: None,
            actual: None,
            expected: None,
            origin: None,
        }
    }

    pub fn assertion(predicate: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            predicate: Some(predicate.into()),
            ..Self::new(FailureKind::Assertion, message)
        }
    }

    pub fn explicit(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Explicit, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Internal, message)
    }

    pub fn with_operands(mut self, actual: impl Into<String>, expected: Option<String>) -> Self {
        self.actual = Some(actual.into());
        self.expected = expected;
        self
    }

    /// Records the raise site once; later frames never overwrite it.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        if self.origin.is_none() {
            self.origin = Some(origin.into());
        }
        self
    }

    pub fn is_assertion(&self) -> bool {
        self.kind == FailureKind::Assertion
    }
}
