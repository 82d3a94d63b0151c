pub mod assign_carrier;
pub mod create_job;
pub mod get_job;
pub mod job_dto;
pub mod mark_ready_for_invoicing;
pub mod record_pod;
pub mod transition_job;
pub mod update_job;

pub use assign_carrier::{AssignCarrierCommand, AssignCarrierUseCase};
pub use create_job::{CreateJobCommand, CreateJobUseCase};
pub use get_job::{
  GetJobTransitionsUseCase, GetJobUseCase, GetJobsReadyForInvoicingUseCase,
  JobTransitionsResponse, ListJobsCommand, ListJobsResponse, ListJobsUseCase,
};
pub use job_dto::{JobDto, TransitionDto};
pub use mark_ready_for_invoicing::MarkReadyForInvoicingUseCase;
pub use record_pod::{RecordPodCommand, RecordPodUseCase};
pub use transition_job::{ResolveIssueUseCase, TransitionJobCommand, TransitionJobUseCase};
pub use update_job::{UpdateJobCommand, UpdateJobUseCase};
