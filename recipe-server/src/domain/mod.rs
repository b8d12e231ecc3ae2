pub mod error;
pub mod label;
pub mod ownership;
pub mod recipe;
pub mod user;
pub mod validation;
