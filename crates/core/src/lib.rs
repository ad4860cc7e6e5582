//! # MFC Core
//!
//! Domain layer for the multi-function center administration service: the entity
//! models and their closed enumerations, the error taxonomy, field validation,
//! the search predicate builder, presentation adapters and the consistency rules
//! that every write goes through.
//!
//! Persistence is abstracted behind [`store::MfcStore`]; photo files behind
//! [`storage::PhotoStorage`].

pub mod catalog;
pub mod errors;
pub mod filter;
pub mod models;
pub mod pagination;
pub mod presentation;
pub mod rules;
pub mod search;
pub mod storage;
pub mod store;
pub mod validation;
