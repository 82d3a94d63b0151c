pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::AccessError;
pub use services::{Actor, CapabilitySet, authorize, capabilities_for};
pub use value_objects::{Action, Capability, Resource, Role, capabilities};
