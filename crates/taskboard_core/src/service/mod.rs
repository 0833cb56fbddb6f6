//! Core use-case services.
//!
//! # Responsibility
//! - Hold the current board on behalf of presentation layers.
//! - Keep presentation code decoupled from storage details.

pub mod board_service;
