//! Database-backed and in-memory partition stores

pub mod entities;
pub mod memory_store;
pub mod migration;
pub mod seaorm_store;
pub mod store;
