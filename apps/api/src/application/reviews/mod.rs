pub mod dto;
pub mod locks;
pub mod service;
