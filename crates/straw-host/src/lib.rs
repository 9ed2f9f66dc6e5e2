//! In-memory component tree that implements [`straw_core::ComponentHost`].
//!
//! [`MemoryHost`] stands in for a GUI toolkit's live tree: nodes have ids,
//! concrete type names, visibility flags and properties, component types carry
//! a canonical activation and named capabilities, and activations fire
//! reactions and listeners synchronously. Trees can be built in code or loaded
//! from a JSON [`Scene`].

mod memory;
mod reaction;
mod scene;

pub use memory::{
    ActivationKind, Capability, Listener, MemoryHost, MAX_ACTIVATION_DEPTH,
    MAX_DEFERRED_CALLBACKS, TOGGLE_STATE_PROPERTY,
};
pub use reaction::Reaction;
pub use scene::{parse_scene, read_scene, Scene, SceneError, SceneNode, SceneType, SCENE_SCHEMA_V1};
