pub mod auth;
pub mod campaign;
pub mod profile;
pub mod registry;
pub mod sale;
