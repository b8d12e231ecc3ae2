pub mod admin;
pub mod auth;
pub mod label;
pub mod recipe;
pub mod user;
