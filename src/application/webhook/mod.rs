pub mod receive_webhook;

pub use receive_webhook::{ReceiveWebhookCommand, ReceiveWebhookResponse, ReceiveWebhookUseCase};
