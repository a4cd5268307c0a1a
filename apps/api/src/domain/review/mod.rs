pub mod entity;
pub mod errors;
pub mod query;
pub mod rating;
pub mod repository;
pub mod verification;
