use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use straw_core::{
    component_info, ComponentHost, ComponentInfo, Failure, NodeKey, PropertyMap, StrawValue,
};

/// The live tree, shared by every handle and binding of one engine. All access
/// happens on the thread that owns the host; borrows never outlive a call.
pub type SharedHost = Rc<RefCell<dyn ComponentHost>>;

/// Weak handle to one node. It stores only the host key, so every accessor
/// reads the host at call time and reports `None` once the node is gone.
#[derive(Clone)]
pub struct ComponentNode {
    host: SharedHost,
    key: NodeKey,
}

impl ComponentNode {
    pub fn new(host: SharedHost, key: NodeKey) -> Self {
        Self { host, key }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub(crate) fn host(&self) -> &SharedHost {
        &self.host
    }

    pub fn component_id(&self) -> Option<String> {
        self.host.borrow().component_id(self.key)
    }

    pub fn type_name(&self) -> Option<String> {
        self.host.borrow().type_name(self.key)
    }

    pub fn is_visible(&self) -> Option<bool> {
        self.host.borrow().is_visible(self.key)
    }

    pub fn is_showing(&self) -> Option<bool> {
        self.host.borrow().is_showing(self.key)
    }

    pub fn is_attached(&self) -> bool {
        self.host.borrow().is_attached(self.key)
    }

    /// Copy of the node's properties; editing it never reaches the host.
    pub fn properties(&self) -> Option<PropertyMap> {
        self.host.borrow().properties(self.key)
    }

    /// Direct children in tree order, empty once detached.
    pub fn children(&self) -> Vec<ComponentNode> {
        let children = self.host.borrow().children(self.key).unwrap_or_default();
        children
            .into_iter()
            .map(|key| ComponentNode::new(Rc::clone(&self.host), key))
            .collect()
    }

    pub fn capabilities(&self) -> Option<Vec<String>> {
        self.host.borrow().capabilities(self.key)
    }

    pub fn info(&self, recursive: bool) -> Option<ComponentInfo> {
        component_info(&*self.host.borrow(), self.key, recursive)
    }

    pub fn invoke(&self, name: &str, args: &[StrawValue]) -> Result<StrawValue, Failure> {
        let mut host = self
            .host
            .try_borrow_mut()
            .map_err(|_| Failure::internal("Component host is busy"))?;
        if !host.is_attached(self.key) {
            return Err(Failure::internal(format!(
                "Cannot invoke \"{}\" on a component that is no longer part of the tree",
                name
            )));
        }
        host.invoke_capability(self.key, name, args)
    }
}

impl fmt::Display for ComponentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(host) = self.host.try_borrow() else {
            return f.write_str("Component(<busy>)");
        };
        match (host.type_name(self.key), host.component_id(self.key)) {
            (Some(type_name), Some(id)) => write!(f, "Component({}#{})", type_name, id),
            _ => f.write_str("Component(<detached>)"),
        }
    }
}

impl fmt::Debug for ComponentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentNode")
            .field("key", &self.key)
            .finish()
    }
}
