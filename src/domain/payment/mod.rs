pub mod entities;
pub mod errors;
pub mod ports;

pub use entities::{PaymentIntent, PaymentIntentRequest};
pub use errors::PaymentError;
pub use ports::PaymentGateway;
