pub mod floor_service;
pub mod kitchen_service;
pub mod register_service;
