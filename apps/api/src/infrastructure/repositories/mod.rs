pub mod memory_review_repository;
pub mod sqlx_review_repository;
