//! Data models shared by the booking backend and the booking wizard

pub mod appointment;
pub mod branch;
pub mod draft;
pub mod provider;
pub mod service;
pub mod slot;
pub mod working_date;

// Re-export commonly used types
pub use appointment::{Appointment, CreateBooking, NewAppointment};
pub use branch::Branch;
pub use draft::BookingDraft;
pub use provider::{Provider, ProviderRecord};
pub use service::{DurationOption, Service};
pub use slot::TimeSlot;
pub use working_date::WorkingDate;
