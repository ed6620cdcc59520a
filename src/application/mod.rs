//! Use cases over the repository and e-mail boundaries.

pub mod cache;
pub mod clientes;
pub mod email;
pub mod error;
pub mod error_handling;
pub mod especialistas;
pub mod faturamento;
pub mod permissions;
pub mod repos;
pub mod requerimentos;
pub mod retry;
