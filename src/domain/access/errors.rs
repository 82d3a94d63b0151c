use thiserror::Error;

use super::value_objects::{Capability, Role};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
  #[error("Missing actor identity")]
  MissingActor,

  #[error("Unknown role: {0}")]
  UnknownRole(String),

  #[error("Role '{role}' lacks capability '{capability}'")]
  Forbidden { role: Role, capability: Capability },
}
