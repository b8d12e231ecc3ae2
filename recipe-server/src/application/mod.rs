pub mod admin_service;
pub mod auth_service;
pub mod label_service;
pub mod recipe_service;
