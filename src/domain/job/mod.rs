pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod state_machine;
pub mod value_objects;

pub use entities::{Job, JobUpdate, NewJob};
pub use errors::JobError;
pub use ports::{JobFilter, JobRepository};
pub use services::{CarrierAssignment, JobService};
pub use state_machine::{JobAction, Transition, TransitionContext, TransitionError};
pub use value_objects::{JobId, JobPriority, JobReference, JobStatus};
