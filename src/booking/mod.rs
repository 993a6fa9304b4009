//! Appointment availability engine and booking wizard
//!
//! The wizard sequences a customer's choices (branch, service, duration,
//! provider, date, time, contact details), asks the [`AvailabilityResolver`]
//! which dates and times are bookable, and commits through the
//! [`BookingConflictGuard`]. Collaborators are reached through the traits in
//! [`gateway`]; [`http::HttpBackend`] implements them against the booking
//! backend REST API.

pub mod clock;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod http;
pub mod resolver;
pub mod store;
pub mod wizard;

pub use clock::{BusinessClock, Clock, FixedClock};
pub use error::{BookingError, GatewayError};
pub use gateway::{AvailabilitySource, BookingGateway, ProviderDirectory, ServiceCatalog};
pub use guard::{BookingConflictGuard, PhonePattern};
pub use http::HttpBackend;
pub use resolver::{AvailabilityResolver, WorkableDates};
pub use store::{DraftStore, MemoryDraftStore, RedisDraftStore};
pub use wizard::{BookingWizard, EntryParams, WizardDeps, WizardEvent, WizardNotice, WizardSnapshot, WizardStep};
