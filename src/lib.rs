// Public API for integration tests and potential library usage

pub mod admin;
pub mod api;
pub mod auth;
pub mod flow;
pub mod state;
pub mod store;
pub mod types;
pub mod validation;
pub mod wheel;
