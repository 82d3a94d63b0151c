pub mod entities;
pub mod errors;
pub mod ports;

pub use entities::{PayloadFormat, WebhookEvent, WebhookEventId};
pub use errors::WebhookError;
pub use ports::WebhookEventRepository;
