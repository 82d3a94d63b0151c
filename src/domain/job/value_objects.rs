use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::shared::ValueObjectError;
use crate::domain::shared::ids::prefixed_id;

prefixed_id!(
  /// Job identifier (`job_…`)
  JobId,
  "job_"
);

/// Job status. Serialized names match the stored values, including the
/// hyphenated `in-progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JobStatus {
  #[serde(rename = "booked")]
  Booked,
  #[serde(rename = "allocated")]
  Allocated,
  #[serde(rename = "in-progress")]
  InProgress,
  #[serde(rename = "delivered")]
  Delivered,
  #[serde(rename = "pod_received")]
  PodReceived,
  #[serde(rename = "finished")]
  Finished,
  #[serde(rename = "ready_for_invoicing")]
  ReadyForInvoicing,
  #[serde(rename = "invoiced")]
  Invoiced,
  #[serde(rename = "self_invoiced")]
  SelfInvoiced,
  #[serde(rename = "cleared")]
  Cleared,
  #[serde(rename = "completed")]
  Completed,
  #[serde(rename = "issues")]
  Issues,
  #[serde(rename = "archived")]
  Archived,
}

impl JobStatus {
  pub const ALL: [JobStatus; 13] = [
    JobStatus::Booked,
    JobStatus::Allocated,
    JobStatus::InProgress,
    JobStatus::Delivered,
    JobStatus::PodReceived,
    JobStatus::Finished,
    JobStatus::ReadyForInvoicing,
    JobStatus::Invoiced,
    JobStatus::SelfInvoiced,
    JobStatus::Cleared,
    JobStatus::Completed,
    JobStatus::Issues,
    JobStatus::Archived,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      JobStatus::Booked => "booked",
      JobStatus::Allocated => "allocated",
      JobStatus::InProgress => "in-progress",
      JobStatus::Delivered => "delivered",
      JobStatus::PodReceived => "pod_received",
      JobStatus::Finished => "finished",
      JobStatus::ReadyForInvoicing => "ready_for_invoicing",
      JobStatus::Invoiced => "invoiced",
      JobStatus::SelfInvoiced => "self_invoiced",
      JobStatus::Cleared => "cleared",
      JobStatus::Completed => "completed",
      JobStatus::Issues => "issues",
      JobStatus::Archived => "archived",
    }
  }

  /// States an issue can be reported from (and resolved back into)
  pub fn is_active(&self) -> bool {
    !matches!(
      self,
      JobStatus::Issues | JobStatus::Completed | JobStatus::Archived
    )
  }

  /// Work is physically done; the job may be queued for invoicing once POD is in
  pub fn is_delivery_complete(&self) -> bool {
    matches!(
      self,
      JobStatus::Finished | JobStatus::Delivered | JobStatus::PodReceived
    )
  }
}

impl FromStr for JobStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s.trim().to_lowercase();
    match normalized.as_str() {
      "in_progress" => Ok(JobStatus::InProgress),
      other => JobStatus::ALL
        .iter()
        .copied()
        .find(|status| status.as_str() == other)
        .ok_or_else(|| ValueObjectError::InvalidStatus(format!("Unknown job status: {}", s))),
    }
  }
}

impl fmt::Display for JobStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPriority {
  Low,
  #[default]
  Medium,
  High,
}

impl JobPriority {
  pub fn as_str(&self) -> &'static str {
    match self {
      JobPriority::Low => "low",
      JobPriority::Medium => "medium",
      JobPriority::High => "high",
    }
  }
}

impl FromStr for JobPriority {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "low" => Ok(JobPriority::Low),
      "medium" => Ok(JobPriority::Medium),
      "high" => Ok(JobPriority::High),
      _ => Err(ValueObjectError::InvalidPriority(format!(
        "Unknown priority: {}",
        s
      ))),
    }
  }
}

/// Canonical human-readable job identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobReference(String);

impl JobReference {
  const MAX_LENGTH: usize = 64;

  pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidReference(
        "Reference cannot be empty".to_string(),
      ));
    }
    if trimmed.len() > Self::MAX_LENGTH {
      return Err(ValueObjectError::InvalidReference(format!(
        "Reference cannot exceed {} characters",
        Self::MAX_LENGTH
      )));
    }
    Ok(Self(trimmed.to_uppercase()))
  }

  /// `JOB-YYMMDD-XXXXXXXX` with a random hex suffix
  pub fn generate(date: NaiveDate) -> Self {
    let suffix: u32 = rand::thread_rng().r#gen();
    Self(format!("JOB-{}-{:08X}", date.format("%y%m%d"), suffix))
  }

  pub fn value(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for JobReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
