pub mod decimal;
pub mod error;
