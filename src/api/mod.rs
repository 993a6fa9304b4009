//! API handlers for the booking backend REST endpoints

pub mod bookings;
pub mod catalog;
pub mod health;
pub mod openapi;
pub mod slots;
