//! Requirement billing, client contacts and billing e-mail dispatch for the Books portal.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
