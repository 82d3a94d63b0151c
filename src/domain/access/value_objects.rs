use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::AccessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
  Jobs,
  Invoices,
  Companies,
  Dashboard,
}

impl Resource {
  pub const ALL: [Resource; 4] = [
    Resource::Jobs,
    Resource::Invoices,
    Resource::Companies,
    Resource::Dashboard,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Resource::Jobs => "jobs",
      Resource::Invoices => "invoices",
      Resource::Companies => "companies",
      Resource::Dashboard => "dashboard",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
  Read,
  Create,
  Update,
  /// Move a job through its lifecycle
  Transition,
  /// Queue work for invoicing or raise invoices
  Invoice,
  Delete,
}

impl Action {
  pub const ALL: [Action; 6] = [
    Action::Read,
    Action::Create,
    Action::Update,
    Action::Transition,
    Action::Invoice,
    Action::Delete,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Action::Read => "read",
      Action::Create => "create",
      Action::Update => "update",
      Action::Transition => "transition",
      Action::Invoice => "invoice",
      Action::Delete => "delete",
    }
  }
}

/// A (resource, action) pair, rendered as `resource:action`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Capability {
  pub resource: Resource,
  pub action: Action,
}

impl Capability {
  pub const fn new(resource: Resource, action: Action) -> Self {
    Self { resource, action }
  }
}

impl fmt::Display for Capability {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.resource.as_str(), self.action.as_str())
  }
}

pub mod capabilities {
  use super::{Action, Capability, Resource};

  pub const JOB_READ: Capability = Capability::new(Resource::Jobs, Action::Read);
  pub const JOB_CREATE: Capability = Capability::new(Resource::Jobs, Action::Create);
  pub const JOB_UPDATE: Capability = Capability::new(Resource::Jobs, Action::Update);
  pub const JOB_TRANSITION: Capability = Capability::new(Resource::Jobs, Action::Transition);
  /// Mark a job ready for invoicing
  pub const JOB_INVOICE: Capability = Capability::new(Resource::Jobs, Action::Invoice);

  pub const INVOICE_READ: Capability = Capability::new(Resource::Invoices, Action::Read);
  /// Raise customer invoices and carrier self-invoices
  pub const INVOICE_CREATE: Capability = Capability::new(Resource::Invoices, Action::Create);
  /// Change status, sweep overdue invoices, request payment
  pub const INVOICE_UPDATE: Capability = Capability::new(Resource::Invoices, Action::Update);

  pub const COMPANY_READ: Capability = Capability::new(Resource::Companies, Action::Read);
  pub const COMPANY_CREATE: Capability = Capability::new(Resource::Companies, Action::Create);
  pub const COMPANY_UPDATE: Capability = Capability::new(Resource::Companies, Action::Update);
  pub const COMPANY_DELETE: Capability = Capability::new(Resource::Companies, Action::Delete);

  pub const DASHBOARD_READ: Capability = Capability::new(Resource::Dashboard, Action::Read);
  pub const DASHBOARD_REFRESH: Capability = Capability::new(Resource::Dashboard, Action::Update);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Dispatcher,
  Accounts,
  Viewer,
}

impl Role {
  pub const ALL: [Role; 4] = [Role::Admin, Role::Dispatcher, Role::Accounts, Role::Viewer];

  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Admin => "admin",
      Role::Dispatcher => "dispatcher",
      Role::Accounts => "accounts",
      Role::Viewer => "viewer",
    }
  }
}

impl FromStr for Role {
  type Err = AccessError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "admin" => Ok(Role::Admin),
      "dispatcher" => Ok(Role::Dispatcher),
      "accounts" => Ok(Role::Accounts),
      "viewer" => Ok(Role::Viewer),
      other => Err(AccessError::UnknownRole(other.to_string())),
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
