//! L3 policy: category → threshold and action, loaded from YAML.

pub mod error;
pub mod store;
pub mod types;


pub use error::{PolicyError, PolicyResult};
pub use store::{PolicyMap, PolicyStore};
pub use types::{Action, PolicyRule};
