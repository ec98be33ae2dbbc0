//! API endpoint handlers.
//!
//! One module per resource. Handlers validate input, call the repository
//! layer, and map failures to HTTP statuses via `ApiError`.

pub mod events;
pub mod files;
pub mod health;
pub mod notifications;
pub mod professionals;
pub mod users;
