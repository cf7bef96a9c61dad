//! SeaORM entities

pub mod game_log;

pub use game_log::Entity as GameLog;
