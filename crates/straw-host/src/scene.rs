use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use straw_core::{Failure, NodeKey, PropertyMap, StrawValue};
use thiserror::Error;

use crate::memory::{ActivationKind, MemoryHost};
use crate::reaction::Reaction;

pub const SCENE_SCHEMA_V1: &str = "straw-scene.v1";

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Failed to read scene {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse scene: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid scene schema version \"{found}\", expected \"{expected}\".")]
    InvalidSchemaVersion { expected: String, found: String },
    #[error("Failed to build scene: {0}")]
    Build(#[from] Failure),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub schema_version: String,
    #[serde(default = "default_application_name")]
    pub application_name: String,
    #[serde(default)]
    pub types: BTreeMap<String, SceneType>,
    #[serde(default)]
    pub roots: Vec<SceneNode>,
}

fn default_application_name() -> String {
    "straw".to_string()
}

/// Per-type behaviour. Capabilities declared here return a fixed value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneType {
    #[serde(default)]
    pub activation: ActivationKind,
    #[serde(default)]
    pub capabilities: BTreeMap<String, StrawValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default)]
    pub on_activate: Vec<Reaction>,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

fn default_visible() -> bool {
    true
}

pub fn parse_scene(raw: &str) -> Result<Scene, SceneError> {
    let scene: Scene = serde_json::from_str(raw)?;
    if scene.schema_version != SCENE_SCHEMA_V1 {
        return Err(SceneError::InvalidSchemaVersion {
            expected: SCENE_SCHEMA_V1.to_string(),
            found: scene.schema_version,
        });
    }
    Ok(scene)
}

pub fn read_scene(path: &Path) -> Result<Scene, SceneError> {
    let raw = fs::read_to_string(path).map_err(|source| SceneError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_scene(&raw)
}

impl MemoryHost {
    pub fn from_scene(scene: &Scene) -> Result<Self, SceneError> {
        let mut host = MemoryHost::new(scene.application_name.clone());

        for (type_name, declared) in &scene.types {
            host.set_activation(type_name, declared.activation);
            for (name, value) in &declared.capabilities {
                let value = value.clone();
                host.register_capability(type_name, name, move |_, _, _| Ok(value.clone()));
            }
        }

        for root in &scene.roots {
            let key = host.insert_scene_node(root)?;
            host.add_root(key)?;
        }

        Ok(host)
    }

    fn insert_scene_node(&mut self, node: &SceneNode) -> Result<NodeKey, Failure> {
        let key = self.create(node.id.clone(), node.type_name.clone());
        self.set_visible(key, node.visible)?;
        for (name, value) in &node.properties {
            self.set_property(key, name.clone(), value.clone())?;
        }
        for reaction in &node.on_activate {
            self.add_reaction(key, reaction.clone())?;
        }
        for child in &node.children {
            let child_key = self.insert_scene_node(child)?;
            self.add_child(key, child_key)?;
        }
        Ok(key)
    }
}
