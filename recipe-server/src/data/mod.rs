pub mod label_repository;
#[cfg(test)]
pub mod memory;
pub mod recipe_repository;
pub mod user_repository;
