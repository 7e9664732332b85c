pub mod config;
pub mod medicine;
pub mod session;
pub mod stats;
