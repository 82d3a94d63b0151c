pub mod config;
pub mod payments;
pub mod persistence;
pub mod retry;
