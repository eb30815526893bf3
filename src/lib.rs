pub mod agent;
pub mod arxiv;
pub mod capability;
pub mod errors;
pub mod models;
pub mod providers;
pub mod roster;
pub mod session;
pub mod team;
pub mod transcript;
