//! Booking wizard state machine
//!
//! Steps advance strictly in order:
//! `Branch → Service → Duration → Provider → DateTime → ContactInfo → Confirmation`.
//! `Duration` is skipped when the service has a single duration option. Every
//! accepted event is checked against [`accepts`] before its guards run, and the
//! draft is saved to the [`DraftStore`] after each successful transition so a
//! reload can resume where the customer left off.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use chrono::{NaiveDate, NaiveTime};
use tokio::sync::Mutex;

use super::{
    clock::{BusinessClock, Clock},
    error::BookingError,
    gateway::{AvailabilitySource, BookingGateway, ProviderDirectory, ServiceCatalog},
    guard::{BookingConflictGuard, PhonePattern},
    http::HttpBackend,
    resolver::{AvailabilityResolver, WorkableDates},
    store::DraftStore,
};
use crate::{
    config::BookingConfig,
    models::{Appointment, BookingDraft, Branch, DurationOption, Provider, Service, TimeSlot},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    Branch,
    Service,
    Duration,
    Provider,
    DateTime,
    ContactInfo,
    Confirmation,
}

impl WizardStep {
    pub fn name(self) -> &'static str {
        match self {
            WizardStep::Branch => "Branch",
            WizardStep::Service => "Service",
            WizardStep::Duration => "Duration",
            WizardStep::Provider => "Provider",
            WizardStep::DateTime => "DateTime",
            WizardStep::ContactInfo => "ContactInfo",
            WizardStep::Confirmation => "Confirmation",
        }
    }
}

/// User input driving the wizard
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    SelectBranch(i32),
    SelectService(i32),
    SelectDuration(DurationOption),
    SelectProvider(i32),
    SelectDate(NaiveDate),
    SelectTime(NaiveTime),
    SubmitContact { name: String, phone: String },
    Back,
    Restart,
}

impl WizardEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WizardEvent::SelectBranch(_) => "SelectBranch",
            WizardEvent::SelectService(_) => "SelectService",
            WizardEvent::SelectDuration(_) => "SelectDuration",
            WizardEvent::SelectProvider(_) => "SelectProvider",
            WizardEvent::SelectDate(_) => "SelectDate",
            WizardEvent::SelectTime(_) => "SelectTime",
            WizardEvent::SubmitContact { .. } => "SubmitContact",
            WizardEvent::Back => "Back",
            WizardEvent::Restart => "Restart",
        }
    }
}

/// Transition table: which events each step accepts
pub fn accepts(step: WizardStep, event: &WizardEvent) -> bool {
    use WizardEvent as E;
    use WizardStep as S;

    matches!(
        (step, event),
        (S::Branch, E::SelectBranch(_))
            | (S::Service, E::SelectService(_))
            | (S::Duration, E::SelectDuration(_))
            | (S::Provider, E::SelectProvider(_))
            | (S::DateTime, E::SelectDate(_) | E::SelectTime(_))
            | (S::ContactInfo, E::SubmitContact { .. })
            | (
                S::Service | S::Duration | S::Provider | S::DateTime | S::ContactInfo,
                E::Back
            )
            | (_, E::Restart)
    )
}

/// Informational message shown alongside the current step
#[derive(Debug, Clone, PartialEq)]
pub enum WizardNotice {
    /// No provider, date or slot to offer; pick something else
    NoAvailability,
    /// The chosen time was booked by someone else
    SlotTaken,
    SourceUnavailable(String),
    CommitFailed(String),
    FieldInvalid { field: &'static str, message: String },
}

/// Deep-link parameters pre-selecting wizard steps
#[derive(Debug, Clone, Default)]
pub struct EntryParams {
    pub branch: Option<i32>,
    pub service: Option<i32>,
}

/// Capabilities the wizard is built from
pub struct WizardDeps {
    pub catalog: Arc<dyn ServiceCatalog>,
    pub directory: Arc<dyn ProviderDirectory>,
    pub availability: Arc<dyn AvailabilitySource>,
    pub bookings: Arc<dyn BookingGateway>,
    pub store: Arc<dyn DraftStore>,
    pub clock: Arc<dyn Clock>,
    pub branches: Vec<Branch>,
    pub horizon_days: u32,
    pub phone: PhonePattern,
}

impl WizardDeps {
    /// Wire every collaborator to one backend, with rules from configuration
    pub fn from_config(
        backend: Arc<HttpBackend>,
        store: Arc<dyn DraftStore>,
        config: &BookingConfig,
    ) -> Result<Self, ::config::ConfigError> {
        let phone = PhonePattern::new(&config.phone_pattern)
            .map_err(|e| ::config::ConfigError::Message(format!("Invalid booking.phone_pattern: {}", e)))?;
        Ok(Self {
            catalog: backend.clone(),
            directory: backend.clone(),
            availability: backend.clone(),
            bookings: backend,
            store,
            clock: Arc::new(BusinessClock::new(config.business_offset()?)),
            branches: config.branches.clone(),
            horizon_days: config.horizon_days,
            phone,
        })
    }
}

/// Read-only view of the wizard for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct WizardSnapshot {
    pub step: WizardStep,
    pub draft: BookingDraft,
    pub branches: Vec<Branch>,
    pub services: Vec<Service>,
    pub providers: Vec<Provider>,
    pub workable_dates: WorkableDates,
    pub slots: Vec<TimeSlot>,
    pub loading: bool,
    pub notice: Option<WizardNotice>,
    pub appointment: Option<Appointment>,
}

#[derive(Debug)]
struct WizardState {
    step: WizardStep,
    draft: BookingDraft,
    duration_skipped: bool,
    providers: Vec<Provider>,
    workable: WorkableDates,
    slots: Vec<TimeSlot>,
    /// (provider, date) the current slot set answers
    slots_for: Option<(i32, NaiveDate)>,
    slot_ticket: u64,
    notice: Option<WizardNotice>,
    appointment: Option<Appointment>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            step: WizardStep::Branch,
            draft: BookingDraft::default(),
            duration_skipped: false,
            providers: Vec::new(),
            workable: WorkableDates::default(),
            slots: Vec::new(),
            slots_for: None,
            slot_ticket: 0,
            notice: None,
            appointment: None,
        }
    }
}

impl WizardState {
    /// Back to a blank session; the slot ticket keeps counting so late
    /// responses from before the reset are still recognized as stale
    fn reset(&mut self) {
        let ticket = self.slot_ticket;
        *self = Self::default();
        self.slot_ticket = ticket;
    }

    fn clear_availability(&mut self) {
        self.workable = WorkableDates::default();
        self.slots.clear();
        self.slots_for = None;
    }
}

/// Counts one outstanding resolver or guard call
struct Pending<'a>(&'a AtomicUsize);

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Marks a booking commit as outstanding until dropped
struct Committing<'a>(&'a AtomicBool);

impl Drop for Committing<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct BookingWizard {
    services: Vec<Service>,
    branches: Vec<Branch>,
    directory: Arc<dyn ProviderDirectory>,
    resolver: AvailabilityResolver,
    guard: BookingConflictGuard,
    store: Arc<dyn DraftStore>,
    clock: Arc<dyn Clock>,
    state: Mutex<WizardState>,
    /// Single-flight gate for slot selection and contact submission
    selecting: Mutex<()>,
    /// Set while a contact submission is being committed; every other event
    /// is refused until it settles
    committing: AtomicBool,
    pending: AtomicUsize,
}

impl BookingWizard {
    /// Start a wizard session.
    ///
    /// A saved draft is restored (and consumed) first; otherwise the entry
    /// parameters pre-select branch and service. Fails only when the service
    /// catalog cannot be loaded.
    pub async fn start(deps: WizardDeps, params: EntryParams) -> Result<Self, BookingError> {
        let services = deps.catalog.list_services().await.map_err(|e| {
            tracing::error!("Booking wizard cannot start, catalog unavailable: {}", e);
            BookingError::CatalogUnavailable(e.to_string())
        })?;

        let wizard = Self {
            services,
            branches: deps.branches,
            directory: deps.directory,
            resolver: AvailabilityResolver::new(deps.availability, deps.clock.clone(), deps.horizon_days),
            guard: BookingConflictGuard::new(deps.bookings, deps.phone),
            store: deps.store,
            clock: deps.clock,
            state: Mutex::new(WizardState::default()),
            selecting: Mutex::new(()),
            committing: AtomicBool::new(false),
            pending: AtomicUsize::new(0),
        };

        if !wizard.restore().await {
            wizard.deep_link(params).await;
        }
        Ok(wizard)
    }

    pub async fn step(&self) -> WizardStep {
        self.state.lock().await.step
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        let state = self.state.lock().await;
        WizardSnapshot {
            step: state.step,
            draft: state.draft.clone(),
            branches: self.branches.clone(),
            services: self.services.clone(),
            providers: state.providers.clone(),
            workable_dates: state.workable.clone(),
            slots: state.slots.clone(),
            loading: self.pending.load(Ordering::SeqCst) > 0,
            notice: state.notice.clone(),
            appointment: state.appointment.clone(),
        }
    }

    /// Apply one user event.
    ///
    /// On error the wizard stays in a consistent state, which may differ from
    /// the step the event started in (a booking conflict returns to
    /// `DateTime`); `snapshot()` reflects it. `InFlight` means the input was
    /// ignored because an earlier selection has not settled. While a booking
    /// is being committed every event is ignored this way, so the commit
    /// result always lands on the draft it was made from.
    pub async fn dispatch(&self, event: WizardEvent) -> Result<WizardStep, BookingError> {
        let _flight = match event {
            WizardEvent::SelectTime(_) | WizardEvent::SubmitContact { .. } => {
                Some(self.selecting.try_lock().map_err(|_| {
                    tracing::debug!("Ignoring {} while a selection is in flight", event.name());
                    BookingError::InFlight
                })?)
            }
            _ => None,
        };
        let _commit = match event {
            WizardEvent::SubmitContact { .. } => Some(self.begin_commit()?),
            _ if self.committing.load(Ordering::SeqCst) => {
                tracing::debug!("Ignoring {} while a booking is being committed", event.name());
                return Err(BookingError::InFlight);
            }
            _ => None,
        };

        let step = self.step().await;
        if !accepts(step, &event) {
            return Err(BookingError::InvalidTransition {
                step: step.name(),
                event: event.name(),
            });
        }

        let persist = !matches!(event, WizardEvent::SubmitContact { .. } | WizardEvent::Restart);
        let result = match event {
            WizardEvent::SelectBranch(id) => self.select_branch(id).await,
            WizardEvent::SelectService(id) => self.select_service(id).await,
            WizardEvent::SelectDuration(option) => self.select_duration(option).await,
            WizardEvent::SelectProvider(id) => self.select_provider(id).await,
            WizardEvent::SelectDate(date) => self.select_date(date).await,
            WizardEvent::SelectTime(time) => self.select_time(time).await,
            WizardEvent::SubmitContact { name, phone } => self.submit_contact(name, phone).await,
            WizardEvent::Back => self.back().await,
            WizardEvent::Restart => self.restart().await,
        };

        match &result {
            Ok(next) => {
                tracing::debug!("Booking wizard {} -> {}", step.name(), next.name());
                if persist {
                    self.persist().await;
                }
            }
            Err(e) => self.note_error(e).await,
        }
        result
    }

    // ---- Transitions ----

    async fn select_branch(&self, branch_id: i32) -> Result<WizardStep, BookingError> {
        if !self.branches.iter().any(|b| b.id == branch_id) {
            return Err(BookingError::validation("branch", format!("unknown branch {}", branch_id)));
        }

        let mut state = self.state.lock().await;
        let contact = (state.draft.name.take(), state.draft.phone.take());
        state.reset();
        state.draft.branch = Some(branch_id);
        (state.draft.name, state.draft.phone) = contact;
        state.step = WizardStep::Service;
        Ok(WizardStep::Service)
    }

    async fn select_service(&self, service_id: i32) -> Result<WizardStep, BookingError> {
        let service = self
            .services
            .iter()
            .find(|s| s.id == service_id)
            .ok_or_else(|| BookingError::validation("service", format!("unknown service {}", service_id)))?;

        if service.available_durations.is_empty() {
            return Err(BookingError::validation("service", "has no bookable duration"));
        }

        if let Some(option) = service.single_option().copied() {
            return self.enter_provider_step(service.id, option, true).await;
        }

        let mut state = self.state.lock().await;
        state.draft.service_id = Some(service.id);
        clear_from(&mut state.draft, WizardStep::Duration);
        state.duration_skipped = false;
        state.providers.clear();
        state.clear_availability();
        state.step = WizardStep::Duration;
        Ok(WizardStep::Duration)
    }

    async fn select_duration(&self, option: DurationOption) -> Result<WizardStep, BookingError> {
        let service_id = self.state.lock().await.draft.service_id;
        let service = service_id
            .and_then(|id| self.services.iter().find(|s| s.id == id))
            .ok_or_else(|| BookingError::validation("service", "is required"))?;

        if !service.offers(option.duration, option.price) {
            return Err(BookingError::validation(
                "duration",
                format!("{} minutes at {} is not offered", option.duration, option.price),
            ));
        }
        self.enter_provider_step(service.id, option, false).await
    }

    /// Fetch providers for the branch and service, then move to `Provider`
    async fn enter_provider_step(
        &self,
        service_id: i32,
        option: DurationOption,
        duration_skipped: bool,
    ) -> Result<WizardStep, BookingError> {
        let branch_id = self
            .state
            .lock()
            .await
            .draft
            .branch
            .ok_or_else(|| BookingError::validation("branch", "is required"))?;

        let providers = {
            let _pending = self.pending();
            self.directory.list_providers(branch_id, Some(service_id)).await
        }
        .map_err(|e| {
            tracing::warn!("Providers for branch {} unavailable: {}", branch_id, e);
            BookingError::SourceUnavailable(e.to_string())
        })?;

        let mut state = self.state.lock().await;
        state.draft.service_id = Some(service_id);
        state.draft.service_duration = Some(option.duration);
        state.draft.service_price = Some(option.price);
        clear_from(&mut state.draft, WizardStep::Provider);
        state.duration_skipped = duration_skipped;
        state.notice = providers.is_empty().then_some(WizardNotice::NoAvailability);
        state.providers = providers;
        state.clear_availability();
        state.step = WizardStep::Provider;
        Ok(WizardStep::Provider)
    }

    async fn select_provider(&self, provider_id: i32) -> Result<WizardStep, BookingError> {
        self.enter_date_step(provider_id, None).await
    }

    /// Resolve workable dates for the provider, then move to `DateTime`.
    ///
    /// The initial date is `preferred` when workable, otherwise today.
    async fn enter_date_step(
        &self,
        provider_id: i32,
        preferred: Option<NaiveDate>,
    ) -> Result<WizardStep, BookingError> {
        if !self.state.lock().await.providers.iter().any(|p| p.id == provider_id) {
            return Err(BookingError::validation(
                "provider",
                format!("provider {} is not offered for this service", provider_id),
            ));
        }

        let workable = {
            let _pending = self.pending();
            self.resolver.resolve_workable_dates(provider_id).await
        };

        let today = self.clock.today();
        let date = preferred.filter(|&d| workable.contains(d)).unwrap_or(today);
        let fetch_slots = workable.contains(date);
        {
            let mut state = self.state.lock().await;
            state.draft.provider_id = Some(provider_id);
            clear_from(&mut state.draft, WizardStep::DateTime);
            state.draft.date = Some(date);
            state.slots.clear();
            state.slots_for = None;
            state.notice = match workable.failure() {
                Some(reason) => Some(WizardNotice::SourceUnavailable(reason.to_string())),
                None if workable.is_empty() => Some(WizardNotice::NoAvailability),
                None => None,
            };
            state.workable = workable;
            state.step = WizardStep::DateTime;
        }

        if fetch_slots {
            self.refresh_slots().await;
        }
        Ok(WizardStep::DateTime)
    }

    async fn select_date(&self, date: NaiveDate) -> Result<WizardStep, BookingError> {
        {
            let mut state = self.state.lock().await;
            if !state.workable.contains(date) {
                return Err(BookingError::validation("date", format!("{} is not available", date)));
            }
            state.draft.date = Some(date);
            state.draft.time = None;
            state.notice = None;
        }
        self.refresh_slots().await;
        Ok(WizardStep::DateTime)
    }

    async fn select_time(&self, time: NaiveTime) -> Result<WizardStep, BookingError> {
        let mut state = self.state.lock().await;
        if state.step != WizardStep::DateTime {
            return Err(BookingError::InvalidTransition {
                step: state.step.name(),
                event: "SelectTime",
            });
        }

        let (Some(provider_id), Some(date)) = (state.draft.provider_id, state.draft.date) else {
            return Err(BookingError::validation("date", "is required"));
        };
        if !state.workable.contains(date) {
            return Err(BookingError::validation("date", format!("{} is not available", date)));
        }

        let offered = state.slots_for == Some((provider_id, date))
            && state.slots.iter().any(|s| s.time == time && s.available);
        if !offered {
            return Err(BookingError::validation("time", format!("{} is not available", time)));
        }

        state.draft.time = Some(time);
        state.notice = None;
        state.step = WizardStep::ContactInfo;
        Ok(WizardStep::ContactInfo)
    }

    async fn submit_contact(&self, name: String, phone: String) -> Result<WizardStep, BookingError> {
        let draft = {
            let mut state = self.state.lock().await;
            state.draft.name = Some(name.trim().to_string());
            state.draft.phone = Some(phone.trim().to_string());
            state.draft.clone()
        };

        self.guard.validate(&draft)?;
        self.persist().await;

        let result = {
            let _pending = self.pending();
            self.guard.commit(&draft).await
        };

        match result {
            Ok(appointment) => {
                {
                    let mut state = self.state.lock().await;
                    state.appointment = Some(appointment);
                    state.notice = None;
                    state.step = WizardStep::Confirmation;
                }
                self.clear_store().await;
                Ok(WizardStep::Confirmation)
            }
            Err(BookingError::Conflict) => {
                {
                    let mut state = self.state.lock().await;
                    state.draft.time = None;
                    state.step = WizardStep::DateTime;
                }
                self.refresh_slots().await;
                self.persist().await;
                Err(BookingError::Conflict)
            }
            Err(e) => Err(e),
        }
    }

    async fn back(&self) -> Result<WizardStep, BookingError> {
        let previous = {
            let mut state = self.state.lock().await;
            let previous = match state.step {
                WizardStep::Service => WizardStep::Branch,
                WizardStep::Duration => WizardStep::Service,
                WizardStep::Provider if state.duration_skipped => WizardStep::Service,
                WizardStep::Provider => WizardStep::Duration,
                WizardStep::DateTime => WizardStep::Provider,
                WizardStep::ContactInfo => WizardStep::DateTime,
                step => {
                    return Err(BookingError::InvalidTransition {
                        step: step.name(),
                        event: "Back",
                    })
                }
            };

            // The date stays so its slots can be offered again
            match previous {
                WizardStep::DateTime => state.draft.time = None,
                step => clear_from(&mut state.draft, step),
            }
            if previous <= WizardStep::Provider {
                state.clear_availability();
            }
            if previous <= WizardStep::Duration {
                state.providers.clear();
            }
            state.notice = None;
            state.step = previous;
            previous
        };

        if previous == WizardStep::DateTime {
            self.refresh_slots().await;
        }
        Ok(previous)
    }

    async fn restart(&self) -> Result<WizardStep, BookingError> {
        self.state.lock().await.reset();
        self.clear_store().await;
        Ok(WizardStep::Branch)
    }

    // ---- Slots ----

    /// Re-fetch slots for the selected provider and date.
    ///
    /// A response is applied only if it answers the latest request and the
    /// provider and date are still the selected ones.
    async fn refresh_slots(&self) {
        let request = {
            let mut state = self.state.lock().await;
            state.slot_ticket += 1;
            state.slots.clear();
            state.slots_for = None;
            match (state.draft.provider_id, state.draft.date, state.draft.service_duration) {
                (Some(provider), Some(date), Some(duration)) => Some((state.slot_ticket, provider, date, duration)),
                _ => None,
            }
        };
        let Some((ticket, provider_id, date, duration)) = request else { return };

        let result = {
            let _pending = self.pending();
            self.resolver.resolve_time_slots(provider_id, date, duration).await
        };

        let mut state = self.state.lock().await;
        let current = state.slot_ticket == ticket
            && state.draft.provider_id == Some(provider_id)
            && state.draft.date == Some(date);
        if !current {
            tracing::debug!("Discarding stale slots for provider {} on {}", provider_id, date);
            return;
        }

        state.slots_for = Some((provider_id, date));
        match result {
            Ok(slots) => state.slots = slots,
            Err(BookingError::SourceUnavailable(reason)) => {
                state.slots_for = None;
                state.notice = Some(WizardNotice::SourceUnavailable(reason));
            }
            Err(_) => state.notice = Some(WizardNotice::NoAvailability),
        }
    }

    // ---- Recovery ----

    /// Resume from a saved draft, consuming it; `false` when nothing was restored
    async fn restore(&self) -> bool {
        let raw = match self.store.load().await {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!("Saved booking draft unreadable: {}", e);
                return false;
            }
        };

        let restored = match BookingDraft::parse(&raw) {
            Some(saved) if !saved.is_empty() => self.replay(saved).await,
            _ => false,
        };
        self.clear_store().await;

        if restored {
            tracing::info!("Booking draft restored at step {}", self.step().await.name());
        } else {
            self.state.lock().await.reset();
        }
        restored
    }

    /// Re-apply saved choices through the normal guards, stopping at the first
    /// one that no longer holds
    async fn replay(&self, saved: BookingDraft) -> bool {
        let Some(branch) = saved.branch else { return false };
        if self.select_branch(branch).await.is_err() {
            return false;
        }
        {
            let mut state = self.state.lock().await;
            state.draft.name = saved.name.clone();
            state.draft.phone = saved.phone.clone();
        }

        let Some(service_id) = saved.service_id else { return true };
        match self.select_service(service_id).await {
            Ok(WizardStep::Duration) => {
                let option = self
                    .services
                    .iter()
                    .find(|s| s.id == service_id)
                    .and_then(|s| saved.service_duration.and_then(|d| s.option_for(d)))
                    .filter(|o| saved.service_price.map_or(true, |p| p == o.price))
                    .copied();
                let Some(option) = option else { return true };
                if self.select_duration(option).await.is_err() {
                    return true;
                }
            }
            Ok(_) => {}
            Err(_) => return true,
        }

        let Some(provider_id) = saved.provider_id else { return true };
        if self.enter_date_step(provider_id, saved.date).await.is_err() {
            return true;
        }

        if let Some(time) = saved.time {
            if self.select_time(time).await.is_err() {
                self.state.lock().await.notice = Some(WizardNotice::SlotTaken);
            }
        }
        true
    }

    async fn deep_link(&self, params: EntryParams) {
        let Some(branch) = params.branch else { return };
        if let Err(e) = self.select_branch(branch).await {
            tracing::warn!("Ignoring deep link branch {}: {}", branch, e);
            self.note_error(&e).await;
            return;
        }
        if let Some(service) = params.service {
            if let Err(e) = self.select_service(service).await {
                tracing::warn!("Ignoring deep link service {}: {}", service, e);
                self.note_error(&e).await;
            }
        }
        self.persist().await;
    }

    // ---- Helpers ----

    fn begin_commit(&self) -> Result<Committing<'_>, BookingError> {
        if self.committing.swap(true, Ordering::SeqCst) {
            return Err(BookingError::InFlight);
        }
        Ok(Committing(&self.committing))
    }

    fn pending(&self) -> Pending<'_> {
        self.pending.fetch_add(1, Ordering::SeqCst);
        Pending(&self.pending)
    }

    async fn persist(&self) {
        let draft = self.state.lock().await.draft.clone();
        if draft.is_empty() {
            self.clear_store().await;
            return;
        }
        match draft.to_json() {
            Ok(raw) => {
                if let Err(e) = self.store.save(raw).await {
                    tracing::warn!("Failed to save booking draft: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize booking draft: {}", e),
        }
    }

    async fn clear_store(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::warn!("Failed to clear booking draft: {}", e);
        }
    }

    async fn note_error(&self, error: &BookingError) {
        let notice = match error {
            BookingError::Validation { field, message } => WizardNotice::FieldInvalid {
                field,
                message: message.clone(),
            },
            BookingError::NoAvailability => WizardNotice::NoAvailability,
            BookingError::Conflict => WizardNotice::SlotTaken,
            BookingError::SourceUnavailable(reason) => WizardNotice::SourceUnavailable(reason.clone()),
            BookingError::CommitFailure(reason) => WizardNotice::CommitFailed(reason.clone()),
            _ => return,
        };
        self.state.lock().await.notice = Some(notice);
    }
}

/// Clear the draft fields chosen at `step` and after it.
///
/// Contact details survive so the customer does not retype them.
fn clear_from(draft: &mut BookingDraft, step: WizardStep) {
    if step <= WizardStep::Branch {
        draft.branch = None;
    }
    if step <= WizardStep::Service {
        draft.service_id = None;
    }
    if step <= WizardStep::Duration {
        draft.service_duration = None;
        draft.service_price = None;
    }
    if step <= WizardStep::Provider {
        draft.provider_id = None;
    }
    if step <= WizardStep::DateTime {
        draft.date = None;
    }
    if step <= WizardStep::ContactInfo {
        draft.time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_transition_table_forward_events() {
        let option = DurationOption {
            duration: 60,
            price: Decimal::new(2200, 0),
        };
        assert!(accepts(WizardStep::Branch, &WizardEvent::SelectBranch(1)));
        assert!(accepts(WizardStep::Duration, &WizardEvent::SelectDuration(option)));
        assert!(accepts(WizardStep::DateTime, &WizardEvent::SelectDate(NaiveDate::MIN)));
        assert!(accepts(WizardStep::DateTime, &WizardEvent::SelectTime(NaiveTime::MIN)));

        // No skipping ahead
        assert!(!accepts(WizardStep::Branch, &WizardEvent::SelectService(1)));
        assert!(!accepts(WizardStep::Service, &WizardEvent::SelectProvider(1)));
        assert!(!accepts(WizardStep::Provider, &WizardEvent::SelectTime(NaiveTime::MIN)));
        assert!(!accepts(
            WizardStep::DateTime,
            &WizardEvent::SubmitContact {
                name: "Ivan".into(),
                phone: "+996700111222".into()
            }
        ));
    }

    #[test]
    fn test_transition_table_back_and_restart() {
        assert!(!accepts(WizardStep::Branch, &WizardEvent::Back));
        assert!(!accepts(WizardStep::Confirmation, &WizardEvent::Back));
        assert!(accepts(WizardStep::ContactInfo, &WizardEvent::Back));
        for step in [WizardStep::Branch, WizardStep::DateTime, WizardStep::Confirmation] {
            assert!(accepts(step, &WizardEvent::Restart));
        }
        assert!(!accepts(WizardStep::Confirmation, &WizardEvent::SelectBranch(1)));
    }

    #[test]
    fn test_clear_from_keeps_earlier_choices() {
        let mut draft = BookingDraft {
            branch: Some(1),
            service_id: Some(2),
            service_duration: Some(60),
            service_price: Some(Decimal::new(2200, 0)),
            provider_id: Some(3),
            date: NaiveDate::from_ymd_opt(2026, 10, 19),
            time: NaiveTime::from_hms_opt(11, 0, 0),
            name: Some("Ivan".into()),
            phone: Some("+996700111222".into()),
        };

        clear_from(&mut draft, WizardStep::ContactInfo);
        assert!(draft.time.is_none());
        assert!(draft.date.is_some());

        clear_from(&mut draft, WizardStep::Provider);
        assert!(draft.provider_id.is_none() && draft.date.is_none());
        assert_eq!(draft.service_duration, Some(60));
        assert_eq!(draft.name.as_deref(), Some("Ivan"));

        clear_from(&mut draft, WizardStep::Branch);
        assert!(draft.branch.is_none() && draft.service_id.is_none());
    }
}
