pub mod auth_service;
pub mod dog_service;
pub mod employee_service;
pub mod event_service;
