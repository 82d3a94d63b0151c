pub mod errors;
pub mod ids;
pub mod value_objects;

pub use errors::{RepositoryError, extract_error_message};
pub use value_objects::{Currency, Location, Money, ValueObjectError};
