pub mod access;
pub mod company;
pub mod invoice;
pub mod job;
pub mod payment;
pub mod shared;
pub mod webhook;
