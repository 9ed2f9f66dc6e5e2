use serde::{Deserialize, Serialize};
use straw_core::StrawValue;

/// Declarative listener attached to a node and fired when it is activated.
/// A missing `target` means the activated node itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Reaction {
    ToggleVisible {
        #[serde(default)]
        target: Option<String>,
    },
    SetVisible {
        #[serde(default)]
        target: Option<String>,
        visible: bool,
    },
    SetProperty {
        #[serde(default)]
        target: Option<String>,
        key: String,
        value: StrawValue,
    },
    Activate {
        target: String,
    },
}

impl Reaction {
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::ToggleVisible { target }
            | Self::SetVisible { target, .. }
            | Self::SetProperty { target, .. } => target.as_deref(),
            Self::Activate { target } => Some(target.as_str()),
        }
    }
}
