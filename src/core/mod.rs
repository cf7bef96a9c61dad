//! Core business logic

pub mod logs;
