//! Host scene abstraction for the look-development toolkit.
//!
//! The surfacing core never talks to a DCC directly. It goes through the
//! [`Host`] trait, which covers typed sets, marker attributes, partitions,
//! mesh hierarchy queries, geometry merging and cache export. [`MemoryHost`]
//! is a complete in-memory implementation used by the command-line tool and
//! by every test in the workspace.

mod adapter;
mod cache;
mod error;
mod memory;
mod node;

pub use adapter::Host;
pub use cache::{CacheDocument, CachedTransform};
pub use error::{HostError, HostResult};
pub use memory::{MemoryHost, ShaderData, TextureData};
pub use node::{CacheOptions, NodeId, NodeType, Rgb};
