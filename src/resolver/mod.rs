//! Resolution of configuration entries that may hold scripts.

pub mod classifier;
pub mod container;
pub mod error;
#[allow(clippy::module_inception)]
pub mod resolver;

pub use classifier::{classify, is_script, EntryValue, ScriptSource, MARKER};
pub use container::{Entry, ResolverContainer, Transform};
pub use error::ResolveError;
pub use resolver::{Resolver, ResolverState};
