pub mod error;
pub mod host;
pub mod info;
pub mod query;
pub mod value;

pub use error::{Failure, FailureKind};
pub use host::{ComponentHost, NodeKey};
pub use info::{component_info, ComponentInfo};
pub use query::{find_by_id, find_by_type, walk_preorder};
pub use value::*;
