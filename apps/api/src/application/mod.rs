pub mod reviews;
pub mod submit_review;
