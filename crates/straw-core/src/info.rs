use serde::{Deserialize, Serialize};

use crate::host::{ComponentHost, NodeKey};
use crate::value::PropertyMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub visible: bool,
    pub showing: bool,
    pub properties: PropertyMap,
    pub capabilities: Vec<String>,
    pub num_children: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ComponentInfo>>,
}

/// Snapshot of one node, or `None` if the key no longer resolves.
pub fn component_info<H>(host: &H, node: NodeKey, recursive: bool) -> Option<ComponentInfo>
where
    H: ComponentHost + ?Sized,
{
    let children = host.children(node)?;
    let nested = if recursive {
        Some(
            children
                .iter()
                .filter_map(|child| component_info(host, *child, true))
                .collect(),
        )
    } else {
        None
    };

    Some(ComponentInfo {
        id: host.component_id(node)?,
        type_name: host.type_name(node)?,
        visible: host.is_visible(node)?,
        showing: host.is_showing(node)?,
        properties: host.properties(node)?,
        capabilities: host.capabilities(node)?,
        num_children: children.len(),
        children: nested,
    })
}
