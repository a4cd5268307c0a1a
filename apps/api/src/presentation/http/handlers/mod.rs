pub mod admin_reviews;
pub mod health;
pub mod reviews;
