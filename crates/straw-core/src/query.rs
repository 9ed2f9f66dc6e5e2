//! Depth-first lookups over the live tree. Nothing is cached: every call walks
//! the host from its roots again, so results always reflect the current tree.

use std::ops::ControlFlow;

use crate::host::{ComponentHost, NodeKey};

/// Visits nodes in pre-order (a node before its children, children in their
/// intrinsic order, roots in host order). Stops early on `ControlFlow::Break`.
pub fn walk_preorder<H, F, B>(host: &H, mut visit: F) -> Option<B>
where
    H: ComponentHost + ?Sized,
    F: FnMut(NodeKey) -> ControlFlow<B>,
{
    let mut stack: Vec<NodeKey> = host.roots().into_iter().rev().collect();

    while let Some(node) = stack.pop() {
        if let ControlFlow::Break(found) = visit(node) {
            return Some(found);
        }
        if let Some(children) = host.children(node) {
            stack.extend(children.into_iter().rev());
        }
    }

    None
}

/// First node in pre-order whose id equals `id`. An empty id never matches.
pub fn find_by_id<H>(host: &H, id: &str) -> Option<NodeKey>
where
    H: ComponentHost + ?Sized,
{
    if id.is_empty() {
        return None;
    }

    walk_preorder(host, |node| {
        if host.component_id(node).as_deref() == Some(id) {
            ControlFlow::Break(node)
        } else {
            ControlFlow::Continue(())
        }
    })
}

pub fn find_by_type<H>(host: &H, type_name: &str) -> Vec<NodeKey>
where
    H: ComponentHost + ?Sized,
{
    let mut found = Vec::new();
    walk_preorder::<_, _, ()>(host, |node| {
        if host.type_name(node).as_deref() == Some(type_name) {
            found.push(node);
        }
        ControlFlow::Continue(())
    });
    found
}
