use std::rc::Rc;

use straw_core::{find_by_id, Failure};

use crate::node::{ComponentNode, SharedHost};

/// Resolves `id` the way `findComponentById` does and performs the node's
/// canonical activation.
pub fn activate(host: &SharedHost, id: &str) -> Result<(), Failure> {
    let key = find_by_id(&*host.borrow(), id)
        .ok_or_else(|| Failure::internal(format!("Component \"{}\" not found", id)))?;
    activate_node(&ComponentNode::new(Rc::clone(host), key))
}

/// Runs the activation synchronously, then lets the host finish any deferred
/// work so the caller observes the settled tree. A failure of the activation
/// itself wins over one raised by deferred work.
pub fn activate_node(node: &ComponentNode) -> Result<(), Failure> {
    let mut host = node
        .host()
        .try_borrow_mut()
        .map_err(|_| Failure::internal("Component host is busy"))?;

    let result = if host.is_attached(node.key()) {
        tracing::trace!(key = ?node.key(), "activate");
        host.activate(node.key())
    } else {
        Err(Failure::internal(
            "Cannot activate a component that is no longer part of the tree",
        ))
    };
    let settled = host.quiesce();
    result.and(settled)
}
