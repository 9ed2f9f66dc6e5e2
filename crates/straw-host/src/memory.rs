use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use straw_core::{find_by_id, ComponentHost, Failure, NodeKey, PropertyMap, StrawValue};

use crate::reaction::Reaction;

/// Chained activations (a reaction activating another node, and so on) stop
/// with an internal failure past this depth.
pub const MAX_ACTIVATION_DEPTH: usize = 32;

/// Deferred callbacks one `quiesce` drains before giving up on a queue that
/// keeps refilling itself.
pub const MAX_DEFERRED_CALLBACKS: usize = 1024;

pub const TOGGLE_STATE_PROPERTY: &str = "toggleState";

pub type Listener = Rc<dyn Fn(&mut MemoryHost, NodeKey) -> Result<(), Failure>>;

pub type Capability =
    Rc<dyn Fn(&mut MemoryHost, NodeKey, &[StrawValue]) -> Result<StrawValue, Failure>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationKind {
    /// Fire the node's reactions and listeners.
    #[default]
    Press,
    /// Flip the `toggleState` property, then fire like a press.
    Toggle,
    /// The type has no canonical activation.
    None,
}

#[derive(Clone, Default)]
struct ComponentType {
    activation: ActivationKind,
    capabilities: BTreeMap<String, Capability>,
}

#[derive(Clone)]
struct MemoryNode {
    id: String,
    type_name: String,
    visible: bool,
    properties: PropertyMap,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    reactions: Vec<Reaction>,
    listeners: Vec<Listener>,
}

struct Slot {
    generation: u32,
    node: Option<MemoryNode>,
}

pub struct MemoryHost {
    application_name: String,
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: Vec<NodeKey>,
    types: BTreeMap<String, ComponentType>,
    deferred: VecDeque<(NodeKey, Listener)>,
    activation_depth: usize,
    quit_requested: bool,
}

impl fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHost")
            .field("application_name", &self.application_name)
            .field("nodes", &self.node_count())
            .field("roots", &self.roots)
            .field("quit_requested", &self.quit_requested)
            .finish()
    }
}

fn detached(node: NodeKey) -> Failure {
    Failure::internal(format!(
        "Component {}:{} is no longer part of the tree",
        node.index, node.generation
    ))
}

impl MemoryHost {
    pub fn new(application_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            slots: Vec::new(),
            free: Vec::new(),
            roots: Vec::new(),
            types: BTreeMap::new(),
            deferred: VecDeque::new(),
            activation_depth: 0,
            quit_requested: false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    fn node(&self, key: NodeKey) -> Option<&MemoryNode> {
        let slot = self.slots.get(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, key: NodeKey) -> Option<&mut MemoryNode> {
        let slot = self.slots.get_mut(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn node_or_fail(&mut self, key: NodeKey) -> Result<&mut MemoryNode, Failure> {
        self.node_mut(key).ok_or_else(|| detached(key))
    }

    pub fn set_activation(&mut self, type_name: &str, activation: ActivationKind) {
        self.types.entry(type_name.to_string()).or_default().activation = activation;
    }

    pub fn register_capability<F>(&mut self, type_name: &str, name: &str, capability: F)
    where
        F: Fn(&mut MemoryHost, NodeKey, &[StrawValue]) -> Result<StrawValue, Failure> + 'static,
    {
        self.types
            .entry(type_name.to_string())
            .or_default()
            .capabilities
            .insert(name.to_string(), Rc::new(capability));
    }

    /// Creates a visible node that is not attached anywhere yet.
    pub fn create(&mut self, id: impl Into<String>, type_name: impl Into<String>) -> NodeKey {
        let node = MemoryNode {
            id: id.into(),
            type_name: type_name.into(),
            visible: true,
            properties: PropertyMap::new(),
            parent: None,
            children: Vec::new(),
            reactions: Vec::new(),
            listeners: Vec::new(),
        };

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeKey::new(index, slot.generation);
        }

        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeKey::new((self.slots.len() - 1) as u32, 0)
    }

    pub fn add_root(&mut self, node: NodeKey) -> Result<(), Failure> {
        self.detach(node)?;
        self.roots.push(node);
        Ok(())
    }

    /// Appends `child` to `parent`, moving it out of any previous parent.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), Failure> {
        self.node_or_fail(parent)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(Failure::internal(
                "Cannot add a component as a child of its own subtree",
            ));
        }

        self.detach(child)?;
        self.node_or_fail(child)?.parent = Some(parent);
        self.node_or_fail(parent)?.children.push(child);
        Ok(())
    }

    fn is_ancestor_or_self(&self, ancestor: NodeKey, mut node: NodeKey) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.node(node).and_then(|current| current.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// Removes the node from its parent (or the root list) but keeps it alive.
    pub fn detach(&mut self, node: NodeKey) -> Result<(), Failure> {
        let parent = self.node_or_fail(node)?.parent.take();
        match parent {
            Some(parent) => {
                if let Some(parent) = self.node_mut(parent) {
                    parent.children.retain(|child| *child != node);
                }
            }
            None => self.roots.retain(|root| *root != node),
        }
        Ok(())
    }

    /// Destroys the node and its subtree. Outstanding keys stop resolving.
    pub fn remove(&mut self, node: NodeKey) -> Result<(), Failure> {
        self.detach(node)?;

        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            let slot = &mut self.slots[current.index as usize];
            if let Some(removed) = slot.node.take() {
                pending.extend(removed.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
            }
        }
        Ok(())
    }

    pub fn set_component_id(&mut self, node: NodeKey, id: impl Into<String>) -> Result<(), Failure> {
        self.node_or_fail(node)?.id = id.into();
        Ok(())
    }

    pub fn set_visible(&mut self, node: NodeKey, visible: bool) -> Result<(), Failure> {
        self.node_or_fail(node)?.visible = visible;
        Ok(())
    }

    pub fn set_property(
        &mut self,
        node: NodeKey,
        key: impl Into<String>,
        value: impl Into<StrawValue>,
    ) -> Result<(), Failure> {
        self.node_or_fail(node)?
            .properties
            .insert(key.into(), value.into());
        Ok(())
    }

    pub fn add_reaction(&mut self, node: NodeKey, reaction: Reaction) -> Result<(), Failure> {
        self.node_or_fail(node)?.reactions.push(reaction);
        Ok(())
    }

    pub fn add_listener<F>(&mut self, node: NodeKey, listener: F) -> Result<(), Failure>
    where
        F: Fn(&mut MemoryHost, NodeKey) -> Result<(), Failure> + 'static,
    {
        self.node_or_fail(node)?.listeners.push(Rc::new(listener));
        Ok(())
    }

    /// Queues work that runs on the next [`ComponentHost::quiesce`].
    pub fn call_async<F>(&mut self, node: NodeKey, listener: F)
    where
        F: Fn(&mut MemoryHost, NodeKey) -> Result<(), Failure> + 'static,
    {
        self.deferred.push_back((node, Rc::new(listener)));
    }

    pub fn pending_async(&self) -> usize {
        self.deferred.len()
    }

    fn resolve_target(&self, source: NodeKey, target: Option<&str>) -> Result<NodeKey, Failure> {
        match target {
            None => Ok(source),
            Some(id) => find_by_id(self, id).ok_or_else(|| {
                Failure::internal(format!("Reaction target \"{}\" not found", id))
            }),
        }
    }

    fn apply_reaction(&mut self, source: NodeKey, reaction: &Reaction) -> Result<(), Failure> {
        let target = self.resolve_target(source, reaction.target())?;
        match reaction {
            Reaction::ToggleVisible { .. } => {
                let node = self.node_or_fail(target)?;
                node.visible = !node.visible;
                Ok(())
            }
            Reaction::SetVisible { visible, .. } => self.set_visible(target, *visible),
            Reaction::SetProperty { key, value, .. } => {
                self.set_property(target, key.clone(), value.clone())
            }
            Reaction::Activate { .. } => self.activate(target),
        }
    }

    fn fire(&mut self, node: NodeKey) -> Result<(), Failure> {
        let (reactions, listeners) = {
            let current = self.node_or_fail(node)?;
            (current.reactions.clone(), current.listeners.clone())
        };

        for reaction in &reactions {
            self.apply_reaction(node, reaction)?;
        }
        for listener in listeners {
            listener(self, node)?;
        }
        Ok(())
    }

    fn run_activation(&mut self, node: NodeKey) -> Result<(), Failure> {
        let type_name = self.node_or_fail(node)?.type_name.clone();
        let activation = self
            .types
            .get(&type_name)
            .map(|ty| ty.activation)
            .unwrap_or_default();

        tracing::trace!(type_name = %type_name, ?activation, "activating component");

        match activation {
            ActivationKind::None => Err(Failure::internal(format!(
                "Component type \"{}\" has no canonical activation",
                type_name
            ))),
            ActivationKind::Toggle => {
                let current = self.node_or_fail(node)?;
                let state = current
                    .properties
                    .get(TOGGLE_STATE_PROPERTY)
                    .map(StrawValue::is_truthy)
                    .unwrap_or(false);
                current
                    .properties
                    .insert(TOGGLE_STATE_PROPERTY.to_string(), StrawValue::Bool(!state));
                self.fire(node)
            }
            ActivationKind::Press => self.fire(node),
        }
    }
}

impl ComponentHost for MemoryHost {
    fn application_name(&self) -> String {
        self.application_name.clone()
    }

    fn roots(&self) -> Vec<NodeKey> {
        self.roots.clone()
    }

    fn children(&self, node: NodeKey) -> Option<Vec<NodeKey>> {
        self.node(node).map(|current| current.children.clone())
    }

    fn component_id(&self, node: NodeKey) -> Option<String> {
        self.node(node).map(|current| current.id.clone())
    }

    fn type_name(&self, node: NodeKey) -> Option<String> {
        self.node(node).map(|current| current.type_name.clone())
    }

    fn is_visible(&self, node: NodeKey) -> Option<bool> {
        self.node(node).map(|current| current.visible)
    }

    fn is_showing(&self, node: NodeKey) -> Option<bool> {
        let mut current = self.node(node)?;
        let mut key = node;
        loop {
            if !current.visible {
                return Some(false);
            }
            match current.parent {
                Some(parent) => {
                    key = parent;
                    current = self.node(parent)?;
                }
                None => return Some(self.roots.contains(&key)),
            }
        }
    }

    fn properties(&self, node: NodeKey) -> Option<PropertyMap> {
        self.node(node).map(|current| current.properties.clone())
    }

    fn is_attached(&self, node: NodeKey) -> bool {
        let mut key = node;
        loop {
            let Some(current) = self.node(key) else {
                return false;
            };
            match current.parent {
                Some(parent) => key = parent,
                None => return self.roots.contains(&key),
            }
        }
    }

    fn capabilities(&self, node: NodeKey) -> Option<Vec<String>> {
        let current = self.node(node)?;
        Some(
            self.types
                .get(&current.type_name)
                .map(|ty| ty.capabilities.keys().cloned().collect())
                .unwrap_or_default(),
        )
    }

    fn declared_capabilities(&self) -> Vec<String> {
        self.types
            .values()
            .flat_map(|ty| ty.capabilities.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn invoke_capability(
        &mut self,
        node: NodeKey,
        name: &str,
        args: &[StrawValue],
    ) -> Result<StrawValue, Failure> {
        let type_name = self.node_or_fail(node)?.type_name.clone();
        let capability = self
            .types
            .get(&type_name)
            .and_then(|ty| ty.capabilities.get(name))
            .cloned()
            .ok_or_else(|| {
                Failure::internal(format!(
                    "Method \"{}\" to invoke not found in object of type \"{}\"",
                    name, type_name
                ))
            })?;
        capability(self, node, args)
    }

    fn activate(&mut self, node: NodeKey) -> Result<(), Failure> {
        if self.activation_depth >= MAX_ACTIVATION_DEPTH {
            return Err(Failure::internal(format!(
                "Activation chain exceeded {} nested activations",
                MAX_ACTIVATION_DEPTH
            )));
        }

        self.activation_depth += 1;
        let result = self.run_activation(node);
        self.activation_depth -= 1;
        result
    }

    fn quiesce(&mut self) -> Result<(), Failure> {
        // an activation unwound by a panic never decremented its depth
        self.activation_depth = 0;

        let mut first_failure = None;
        let mut drained = 0;
        while let Some((node, listener)) = self.deferred.pop_front() {
            if drained == MAX_DEFERRED_CALLBACKS {
                let dropped = self.deferred.len() + 1;
                self.deferred.clear();
                tracing::warn!(dropped, "deferred callbacks keep re-queuing; dropped the rest");
                if first_failure.is_none() {
                    first_failure = Some(Failure::internal(format!(
                        "Deferred callbacks exceeded {} per quiesce; dropped {} pending",
                        MAX_DEFERRED_CALLBACKS, dropped
                    )));
                }
                break;
            }
            drained += 1;
            if let Err(failure) = listener(self, node) {
                tracing::warn!(%failure, "deferred host callback failed");
                if first_failure.is_none() {
                    first_failure = Some(failure);
                }
            }
        }

        first_failure.map_or(Ok(()), Err)
    }

    fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}
