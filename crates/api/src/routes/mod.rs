pub mod appointment;
pub mod branch;
pub mod branch_service;
pub mod employee;
pub mod health;
pub mod profile;
pub mod service;
