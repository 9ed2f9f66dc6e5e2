use std::rc::Rc;

use straw_core::{find_by_id, find_by_type, ComponentInfo, Failure, StrawValue};

use crate::interaction;
use crate::node::{ComponentNode, SharedHost};

pub const UNKNOWN_SCRIPT_EXCEPTION: &str = "unknown script exception";

/// Rust-side entry point to the harness, mirroring the `straw` script module.
#[derive(Clone)]
pub struct Straw {
    host: SharedHost,
}

impl Straw {
    pub fn new(host: SharedHost) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &SharedHost {
        &self.host
    }

    pub fn application_name(&self) -> String {
        self.host.borrow().application_name()
    }

    pub fn find_by_id(&self, id: &str) -> Option<ComponentNode> {
        let key = find_by_id(&*self.host.borrow(), id)?;
        Some(ComponentNode::new(Rc::clone(&self.host), key))
    }

    pub fn find_by_type(&self, type_name: &str) -> Vec<ComponentNode> {
        let keys = find_by_type(&*self.host.borrow(), type_name);
        keys.into_iter()
            .map(|key| ComponentNode::new(Rc::clone(&self.host), key))
            .collect()
    }

    pub fn activate(&self, id: &str) -> Result<(), Failure> {
        interaction::activate(&self.host, id)
    }

    pub fn invoke(&self, id: &str, name: &str, args: &[StrawValue]) -> Result<StrawValue, Failure> {
        let node = self
            .find_by_id(id)
            .ok_or_else(|| Failure::internal(format!("Component \"{}\" not found", id)))?;
        node.invoke(name, args)
    }

    pub fn component_info(&self, id: &str, recursive: bool) -> Option<ComponentInfo> {
        self.find_by_id(id)?.info(recursive)
    }

    pub fn quit(&self) -> Result<(), Failure> {
        let mut host = self
            .host
            .try_borrow_mut()
            .map_err(|_| Failure::internal("Component host is busy"))?;
        tracing::info!("quit requested");
        host.request_quit();
        Ok(())
    }
}

/// Builds the failure raised by `raiseFailure`: the message is trimmed and an
/// empty one is replaced by a generic text.
pub fn raise_failure(message: &str) -> Failure {
    let message = message.trim();
    if message.is_empty() {
        Failure::explicit(UNKNOWN_SCRIPT_EXCEPTION)
    } else {
        Failure::explicit(message)
    }
}
