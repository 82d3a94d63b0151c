pub mod company_dto;
pub mod create_company;
pub mod delete_company;
pub mod list_companies;
pub mod update_company;

pub use company_dto::CompanyDto;
pub use create_company::{CompanyProfileInput, CreateCompanyCommand, CreateCompanyUseCase};
pub use delete_company::DeleteCompanyUseCase;
pub use list_companies::{GetCompanyUseCase, ListCompaniesResponse, ListCompaniesUseCase};
pub use update_company::{UpdateCompanyCommand, UpdateCompanyUseCase};
