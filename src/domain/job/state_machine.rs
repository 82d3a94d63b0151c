//! Job status state machine.
//!
//! Every legal move is declared once in a static table of
//! `(from, to, label, required action)`. Validation is pure: callers collect
//! the facts a required action depends on into a [`TransitionContext`], ask
//! [`validate_transition`] whether the move is allowed, and perform the
//! mutation themselves.

use lazy_static::lazy_static;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::value_objects::JobStatus;

/// Action that must accompany a transition before it is allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobAction {
  AssignHauler,
  UploadPod,
  GenerateInvoice,
  ConfirmPayment,
  ReportIssue,
  ResolveIssue,
  Archive,
}

impl JobAction {
  pub fn as_str(&self) -> &'static str {
    match self {
      JobAction::AssignHauler => "assign-hauler",
      JobAction::UploadPod => "upload-pod",
      JobAction::GenerateInvoice => "generate-invoice",
      JobAction::ConfirmPayment => "confirm-payment",
      JobAction::ReportIssue => "report-issue",
      JobAction::ResolveIssue => "resolve-issue",
      JobAction::Archive => "archive",
    }
  }
}

impl fmt::Display for JobAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
  pub from: JobStatus,
  pub to: JobStatus,
  pub label: &'static str,
  pub action: Option<JobAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
  #[error("Illegal transition from {from} to {to}")]
  IllegalTransition { from: JobStatus, to: JobStatus },

  #[error("Precondition not met for {action}: {reason}")]
  PreconditionNotMet { action: JobAction, reason: String },
}

/// Facts about a job and its surroundings that required actions check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionContext {
  pub carrier_assigned: bool,
  pub pod_uploaded: bool,
  pub ready_for_invoicing: bool,
  pub invoice_linked: bool,
  pub invoice_paid: bool,
  pub issue_details: Option<String>,
  pub status_before_issue: Option<JobStatus>,
}

const fn step(
  from: JobStatus,
  to: JobStatus,
  label: &'static str,
  action: Option<JobAction>,
) -> Transition {
  Transition {
    from,
    to,
    label,
    action,
  }
}

fn build_transition_table() -> Vec<Transition> {
  use JobAction::*;
  use JobStatus::*;

  let mut table = vec![
    step(Booked, Allocated, "Allocate carrier", Some(AssignHauler)),
    step(Allocated, Booked, "Release carrier", None),
    step(Allocated, InProgress, "Start job", None),
    step(InProgress, Delivered, "Mark delivered", None),
    step(InProgress, Finished, "Finish job", Some(UploadPod)),
    step(Delivered, PodReceived, "Receive POD", Some(UploadPod)),
    step(Delivered, Finished, "Finish job", Some(UploadPod)),
    step(PodReceived, Finished, "Finish job", Some(UploadPod)),
    step(Finished, ReadyForInvoicing, "Mark ready for invoicing", Some(UploadPod)),
    step(Delivered, ReadyForInvoicing, "Mark ready for invoicing", Some(UploadPod)),
    step(PodReceived, ReadyForInvoicing, "Mark ready for invoicing", Some(UploadPod)),
    step(SelfInvoiced, ReadyForInvoicing, "Return to invoicing queue", Some(UploadPod)),
    step(Finished, Invoiced, "Generate invoice", Some(GenerateInvoice)),
    step(ReadyForInvoicing, Invoiced, "Generate invoice", Some(GenerateInvoice)),
    step(Invoiced, Cleared, "Confirm payment", Some(ConfirmPayment)),
    step(Cleared, Completed, "Complete job", None),
    step(Completed, Archived, "Archive job", Some(Archive)),
    step(Cleared, Archived, "Archive job", Some(Archive)),
  ];

  for status in JobStatus::ALL.into_iter().filter(JobStatus::is_active) {
    table.push(step(status, Issues, "Report issue", Some(ReportIssue)));
    table.push(step(Issues, status, "Resolve issue", Some(ResolveIssue)));
  }

  table
}

lazy_static! {
  static ref TRANSITIONS: Vec<Transition> = build_transition_table();
}

/// The full declared transition table
pub fn transitions() -> &'static [Transition] {
  &TRANSITIONS
}

pub fn find_transition(from: JobStatus, to: JobStatus) -> Option<&'static Transition> {
  TRANSITIONS.iter().find(|t| t.from == from && t.to == to)
}

/// Transitions declared out of `from`, in table order
pub fn available_transitions(from: JobStatus) -> Vec<&'static Transition> {
  TRANSITIONS.iter().filter(|t| t.from == from).collect()
}

/// Checks that `from → to` is declared and that its required action's
/// precondition holds for `context`.
pub fn validate_transition(
  from: JobStatus,
  to: JobStatus,
  context: &TransitionContext,
) -> Result<&'static Transition, TransitionError> {
  let transition =
    find_transition(from, to).ok_or(TransitionError::IllegalTransition { from, to })?;

  if let Some(action) = transition.action {
    check_precondition(action, to, context)?;
  }

  Ok(transition)
}

fn check_precondition(
  action: JobAction,
  to: JobStatus,
  context: &TransitionContext,
) -> Result<(), TransitionError> {
  let unmet = |reason: String| Err(TransitionError::PreconditionNotMet { action, reason });

  match action {
    JobAction::AssignHauler if !context.carrier_assigned => {
      unmet("a carrier must be assigned to the job".to_string())
    }
    JobAction::UploadPod if !context.pod_uploaded => {
      unmet("proof of delivery has not been uploaded".to_string())
    }
    JobAction::GenerateInvoice if !context.ready_for_invoicing => {
      unmet("job is not ready for invoicing".to_string())
    }
    JobAction::GenerateInvoice if !context.invoice_linked => {
      unmet("no invoice has been generated for this job".to_string())
    }
    JobAction::ConfirmPayment if !context.invoice_paid => {
      unmet("the job's invoice has not been paid".to_string())
    }
    JobAction::ReportIssue
      if context
        .issue_details
        .as_deref()
        .is_none_or(|details| details.trim().is_empty()) =>
    {
      unmet("issue details are required".to_string())
    }
    JobAction::ResolveIssue => match context.status_before_issue {
      Some(previous) if previous != to => {
        unmet(format!("job must return to '{}'", previous))
      }
      _ => Ok(()),
    },
    _ => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use JobStatus::*;

  fn all_facts() -> TransitionContext {
    TransitionContext {
      carrier_assigned: true,
      pod_uploaded: true,
      ready_for_invoicing: true,
      invoice_linked: true,
      invoice_paid: true,
      issue_details: Some("pallet damaged".to_string()),
      status_before_issue: None,
    }
  }

  #[test]
  fn test_undeclared_pairs_are_illegal() {
    let context = all_facts();
    for from in JobStatus::ALL {
      for to in JobStatus::ALL {
        let result = validate_transition(from, to, &context);
        if find_transition(from, to).is_none() {
          assert_eq!(
            result.unwrap_err(),
            TransitionError::IllegalTransition { from, to },
            "{} -> {} should be illegal",
            from,
            to
          );
        } else {
          assert!(result.is_ok(), "{} -> {} should be allowed", from, to);
        }
      }
    }
  }

  #[test]
  fn test_table_has_no_duplicates() {
    let table = transitions();
    for (i, a) in table.iter().enumerate() {
      for b in &table[i + 1..] {
        assert!(!(a.from == b.from && a.to == b.to), "duplicate {:?}", a);
      }
    }
  }

  #[test]
  fn test_main_lifecycle_is_declared() {
    let path = [
      Booked,
      Allocated,
      InProgress,
      Finished,
      Invoiced,
      Cleared,
      Completed,
      Archived,
    ];
    for pair in path.windows(2) {
      assert!(find_transition(pair[0], pair[1]).is_some());
    }
  }

  #[test]
  fn test_archived_is_terminal() {
    assert!(available_transitions(Archived).is_empty());
    assert!(find_transition(Booked, Archived).is_none());
    assert!(find_transition(Invoiced, Archived).is_none());
  }

  #[test]
  fn test_assign_hauler_requires_carrier() {
    let context = TransitionContext::default();
    let err = validate_transition(Booked, Allocated, &context).unwrap_err();
    assert!(matches!(
      err,
      TransitionError::PreconditionNotMet {
        action: JobAction::AssignHauler,
        ..
      }
    ));
  }

  #[test]
  fn test_upload_pod_required_for_finished_and_pod_received() {
    let context = TransitionContext {
      carrier_assigned: true,
      ..Default::default()
    };
    for (from, to) in [
      (InProgress, Finished),
      (Delivered, PodReceived),
      (Delivered, Finished),
    ] {
      let err = validate_transition(from, to, &context).unwrap_err();
      assert!(matches!(
        err,
        TransitionError::PreconditionNotMet {
          action: JobAction::UploadPod,
          ..
        }
      ));
    }
    assert!(validate_transition(InProgress, Delivered, &context).is_ok());
  }

  #[test]
  fn test_generate_invoice_requires_readiness_and_invoice() {
    let mut context = TransitionContext {
      pod_uploaded: true,
      ..Default::default()
    };
    assert!(validate_transition(ReadyForInvoicing, Invoiced, &context).is_err());

    context.ready_for_invoicing = true;
    let err = validate_transition(ReadyForInvoicing, Invoiced, &context).unwrap_err();
    assert!(err.to_string().contains("no invoice"));

    context.invoice_linked = true;
    assert!(validate_transition(ReadyForInvoicing, Invoiced, &context).is_ok());
  }

  #[test]
  fn test_confirm_payment_requires_paid_invoice() {
    let mut context = all_facts();
    context.invoice_paid = false;
    assert!(validate_transition(Invoiced, Cleared, &context).is_err());
  }

  #[test]
  fn test_issue_excursion() {
    let mut context = TransitionContext::default();
    assert!(validate_transition(InProgress, Issues, &context).is_err());

    context.issue_details = Some("  ".to_string());
    assert!(validate_transition(InProgress, Issues, &context).is_err());

    context.issue_details = Some("vehicle breakdown".to_string());
    let transition = validate_transition(InProgress, Issues, &context).unwrap();
    assert_eq!(transition.action, Some(JobAction::ReportIssue));

    let resolved = TransitionContext {
      status_before_issue: Some(InProgress),
      ..Default::default()
    };
    assert!(validate_transition(Issues, InProgress, &resolved).is_ok());
    assert!(matches!(
      validate_transition(Issues, Booked, &resolved),
      Err(TransitionError::PreconditionNotMet {
        action: JobAction::ResolveIssue,
        ..
      })
    ));
    assert!(matches!(
      validate_transition(Issues, Archived, &resolved),
      Err(TransitionError::IllegalTransition { .. })
    ));
  }

  #[test]
  fn test_available_transitions_from_booked() {
    let targets: Vec<JobStatus> = available_transitions(Booked).iter().map(|t| t.to).collect();
    assert_eq!(targets, vec![Allocated, Issues]);
  }
}
