//! # Rota Engine
//!
//! Assignment resolution and editing for the weekly rota grid: effective
//! availability, cell lookups, scoped edits, swaps, day inclusion and
//! publishing. All remote state goes through a [`RotaService`].
//!
//! [`RotaService`]: rota_core::service::RotaService

pub mod availability;
pub mod conflict;
pub mod deselection;
pub mod edit;
pub mod editor;
pub mod generation;
pub mod index;
pub mod publish;
pub mod scope;
pub mod sequencer;
pub mod session;
pub mod swap;

pub mod mock;

pub use editor::RotaEditor;
pub use session::{Actor, EditSession};
