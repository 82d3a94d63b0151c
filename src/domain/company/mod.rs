pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{Company, CompanyProfile};
pub use errors::CompanyError;
pub use ports::CompanyRepository;
pub use services::CompanyService;
pub use value_objects::{CompanyId, CompanyName, CompanyType, ContactInfo};
