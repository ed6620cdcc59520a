//! Domain layer types and invariants.

pub mod clientes;
pub mod email;
pub mod entities;
pub mod error;
pub mod requerimentos;
pub mod types;
