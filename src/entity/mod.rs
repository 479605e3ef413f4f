pub mod dogs;
pub mod employees;
pub mod events;

pub use dogs::Entity as Dogs;
pub use employees::Entity as Employees;
pub use events::Entity as Events;
