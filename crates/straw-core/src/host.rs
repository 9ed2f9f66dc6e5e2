//! The seam between the engine and the application that owns the live
//! component tree.
//!
//! Every accessor takes a [`NodeKey`] and returns `None` once the node is no
//! longer part of the host's tree. Keys are never reused for a different node,
//! so a stale key reports absence instead of aliasing a newer component.

use serde::{Deserialize, Serialize};

use crate::error::Failure;
use crate::value::{PropertyMap, StrawValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    pub index: u32,
    pub generation: u32,
}

impl NodeKey {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

pub trait ComponentHost {
    fn application_name(&self) -> String {
        "straw".to_string()
    }

    /// Top-level containers, in the order traversal must visit them.
    fn roots(&self) -> Vec<NodeKey>;

    fn children(&self, node: NodeKey) -> Option<Vec<NodeKey>>;

    fn component_id(&self, node: NodeKey) -> Option<String>;

    fn type_name(&self, node: NodeKey) -> Option<String>;

    fn is_visible(&self, node: NodeKey) -> Option<bool>;

    /// Visible, every ancestor visible, and reachable from a root.
    fn is_showing(&self, node: NodeKey) -> Option<bool>;

    fn properties(&self, node: NodeKey) -> Option<PropertyMap>;

    /// Alive and reachable from a root. Hosts that keep detached subtrees
    /// alive must override this.
    fn is_attached(&self, node: NodeKey) -> bool {
        self.type_name(node).is_some()
    }

    /// Capability names the concrete node answers to.
    fn capabilities(&self, node: NodeKey) -> Option<Vec<String>>;

    /// Every capability name any component type may expose. Engines use this
    /// to decide which method names scripts may call on a handle.
    fn declared_capabilities(&self) -> Vec<String>;

    fn invoke_capability(
        &mut self,
        node: NodeKey,
        name: &str,
        args: &[StrawValue],
    ) -> Result<StrawValue, Failure>;

    /// Runs the canonical interaction for the node's type, including every
    /// listener it triggers, before returning.
    fn activate(&mut self, node: NodeKey) -> Result<(), Failure>;

    /// Drains any work the host deferred while handling a call and returns the
    /// first failure it raised. Only called between activations.
    fn quiesce(&mut self) -> Result<(), Failure> {
        Ok(())
    }

    fn request_quit(&mut self) {}

    /// Whether a script asked the application to quit. Drivers stop scheduling
    /// further scripts once this turns true.
    fn quit_requested(&self) -> bool {
        false
    }
}
