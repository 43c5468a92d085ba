//! # Rota Core
//!
//! Shared data model, error taxonomy and collaborator contract for the rota
//! engine. Nothing in this crate performs I/O.

pub mod errors;
pub mod free_cell;
pub mod models;
pub mod service;
pub mod skeleton;
