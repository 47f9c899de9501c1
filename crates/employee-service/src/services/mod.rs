pub mod auth_service;
pub mod employee_service;
pub mod token_service;
