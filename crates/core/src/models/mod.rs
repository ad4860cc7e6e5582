pub mod appointment;
pub mod branch;
pub mod branch_service;
pub mod employee;
pub mod history;
pub mod profile;
pub mod service;
