pub mod auth;
pub mod dogs;
pub mod employees;
pub mod events;
