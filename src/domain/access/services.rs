//! Role to capability mapping and the single authorization check.

use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use super::errors::AccessError;
use super::value_objects::capabilities::*;
use super::value_objects::{Action, Capability, Resource, Role};

/// Capabilities granted to a role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
  pub fn contains(&self, capability: Capability) -> bool {
    self.0.contains(&capability)
  }

  pub fn iter(&self) -> impl Iterator<Item = &Capability> {
    self.0.iter()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl FromIterator<Capability> for CapabilitySet {
  fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

/// Identity of the caller as established by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
  pub id: String,
  pub role: Role,
}

impl Actor {
  pub fn new(id: impl Into<String>, role: Role) -> Result<Self, AccessError> {
    let id = id.into();
    if id.trim().is_empty() {
      return Err(AccessError::MissingActor);
    }
    Ok(Self { id, role })
  }

  pub fn capabilities(&self) -> &'static CapabilitySet {
    capabilities_for(self.role)
  }
}

fn build_role_capabilities() -> HashMap<Role, CapabilitySet> {
  let everything: CapabilitySet = Resource::ALL
    .into_iter()
    .flat_map(|resource| {
      Action::ALL
        .into_iter()
        .map(move |action| Capability::new(resource, action))
    })
    .collect();

  let read_only: CapabilitySet = [INVOICE_READ, JOB_READ, COMPANY_READ, DASHBOARD_READ]
    .into_iter()
    .collect();

  let dispatcher: CapabilitySet = read_only
    .iter()
    .copied()
    .chain([
      JOB_CREATE,
      JOB_UPDATE,
      JOB_TRANSITION,
      COMPANY_CREATE,
      COMPANY_UPDATE,
      DASHBOARD_REFRESH,
    ])
    .collect();

  let accounts: CapabilitySet = read_only
    .iter()
    .copied()
    .chain([
      JOB_TRANSITION,
      JOB_INVOICE,
      INVOICE_CREATE,
      INVOICE_UPDATE,
      COMPANY_UPDATE,
      DASHBOARD_REFRESH,
    ])
    .collect();

  HashMap::from([
    (Role::Admin, everything),
    (Role::Dispatcher, dispatcher),
    (Role::Accounts, accounts),
    (Role::Viewer, read_only),
  ])
}

lazy_static! {
  static ref ROLE_CAPABILITIES: HashMap<Role, CapabilitySet> = build_role_capabilities();
  static ref NO_CAPABILITIES: CapabilitySet = CapabilitySet::default();
}

pub fn capabilities_for(role: Role) -> &'static CapabilitySet {
  ROLE_CAPABILITIES.get(&role).unwrap_or(&NO_CAPABILITIES)
}

/// The one place access decisions are made
pub fn authorize(actor: &Actor, capability: Capability) -> Result<(), AccessError> {
  if actor.capabilities().contains(capability) {
    Ok(())
  } else {
    tracing::warn!(
      "Actor {} ({}) denied {}",
      actor.id,
      actor.role,
      capability
    );
    Err(AccessError::Forbidden {
      role: actor.role,
      capability,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  fn actor(role: Role) -> Actor {
    Actor::new("user-42", role).unwrap()
  }

  #[test]
  fn test_admin_holds_every_capability() {
    let admin = actor(Role::Admin);
    assert_eq!(
      admin.capabilities().len(),
      Resource::ALL.len() * Action::ALL.len()
    );
    assert!(authorize(&admin, COMPANY_DELETE).is_ok());
  }

  #[test]
  fn test_viewer_is_read_only() {
    let viewer = actor(Role::Viewer);
    assert!(authorize(&viewer, JOB_READ).is_ok());
    assert!(authorize(&viewer, DASHBOARD_READ).is_ok());
    assert_eq!(
      authorize(&viewer, JOB_CREATE),
      Err(AccessError::Forbidden {
        role: Role::Viewer,
        capability: JOB_CREATE
      })
    );
    assert!(viewer.capabilities().iter().all(|c| c.action == Action::Read));
  }

  #[test]
  fn test_dispatcher_cannot_invoice_and_accounts_cannot_create_jobs() {
    assert!(authorize(&actor(Role::Dispatcher), INVOICE_CREATE).is_err());
    assert!(authorize(&actor(Role::Dispatcher), JOB_TRANSITION).is_ok());
    assert!(authorize(&actor(Role::Accounts), JOB_CREATE).is_err());
    assert!(authorize(&actor(Role::Accounts), INVOICE_CREATE).is_ok());
    assert!(authorize(&actor(Role::Accounts), COMPANY_DELETE).is_err());
  }

  #[test]
  fn test_every_role_has_capabilities() {
    for role in Role::ALL {
      assert!(!capabilities_for(role).is_empty(), "{} has none", role);
    }
  }

  #[test]
  fn test_role_and_actor_parsing() {
    assert_eq!(Role::from_str("Accounts").unwrap(), Role::Accounts);
    assert_eq!(
      Role::from_str("root"),
      Err(AccessError::UnknownRole("root".to_string()))
    );
    assert_eq!(Actor::new(" ", Role::Admin), Err(AccessError::MissingActor));
    assert_eq!(JOB_INVOICE.to_string(), "jobs:invoice");
  }
}
