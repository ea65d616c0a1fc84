// File: src/booking.rs
// Purpose: The booking form controller: field ownership, reactive derived
// state, async email uniqueness, submission gate

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use travel_forms_validation::{
    validate_date_range, DirectoryError, EmailDirectory, ValidationError,
};

use crate::config::{FormOptions, CLASS_TOURIST, TRIP_ONE_WAY};
use crate::events::FieldChange;
use crate::field::{FieldId, FieldState, FieldStatus, PassengerField, Rule, Validity};
use crate::record::{BookingRecord, Passenger};
use crate::value::FieldValue;

/// Derived-state recomputations the form can register for field changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reaction {
    ResizePassengers,
    RecomputePrice,
}

/// A registered listener. `field: None` reacts to every change; watchers
/// run in registration order, which is what makes the passenger resize
/// settle before the price recompute.
struct Watcher {
    field: Option<FieldId>,
    reaction: Reaction,
}

/// Resolution of one dispatched email lookup
struct LookupOutcome {
    generation: u64,
    email: String,
    result: Result<bool, DirectoryError>,
}

/// Sub-form for one traveler beyond the primary
#[derive(Debug, Clone)]
pub struct PassengerEntry {
    pub name: FieldState,
    pub age: FieldState,
    pub relation: FieldState,
}

impl PassengerEntry {
    fn new(today: NaiveDate) -> Self {
        Self {
            name: FieldState::new(FieldValue::from(""), vec![Rule::Required], today),
            age: FieldState::new(
                FieldValue::Null,
                vec![Rule::Required, Rule::AtLeast(0.0)],
                today,
            ),
            relation: FieldState::new(FieldValue::from(""), vec![Rule::Required], today),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.name.validity.is_valid()
            && self.age.validity.is_valid()
            && self.relation.validity.is_valid()
    }

    fn field_mut(&mut self, field: PassengerField) -> &mut FieldState {
        match field {
            PassengerField::Name => &mut self.name,
            PassengerField::Age => &mut self.age,
            PassengerField::Relation => &mut self.relation,
        }
    }
}

/// Submission refusal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("email uniqueness check still pending")]
    LookupPending,
    #[error("form has invalid fields: {}", fields.join(", "))]
    Invalid { fields: Vec<String> },
}

/// The booking form: owns every field, reacts to value changes, and
/// maintains the derived state (filtered destinations, passenger
/// sub-forms, total price).
///
/// Single-threaded by design: the record is owned exclusively by the
/// form, and async lookup outcomes only apply when the owner drains them
/// via [`poll_email_lookup`](Self::poll_email_lookup) or
/// [`settle_email`](Self::settle_email).
pub struct BookingForm {
    options: FormOptions,
    directory: Arc<dyn EmailDirectory>,
    today: NaiveDate,

    fields: BTreeMap<FieldId, FieldState>,
    passengers: Vec<PassengerEntry>,
    watchers: Vec<Watcher>,
    record_fault: Option<ValidationError>,

    search_text: String,
    filtered_destinations: Vec<String>,
    total_price: u32,

    email_generation: u64,
    outcome_tx: mpsc::UnboundedSender<LookupOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<LookupOutcome>,

    change_tx: broadcast::Sender<FieldChange>,
}

impl BookingForm {
    pub fn new(options: FormOptions, directory: Arc<dyn EmailDirectory>) -> Self {
        Self::with_today(options, directory, Local::now().date_naive())
    }

    /// Like [`new`](Self::new) with an explicit "today" anchor for the
    /// date rules, so tests stay deterministic.
    pub fn with_today(
        options: FormOptions,
        directory: Arc<dyn EmailDirectory>,
        today: NaiveDate,
    ) -> Self {
        let mut fields = BTreeMap::new();
        let declarations: [(FieldId, FieldValue, Vec<Rule>); 13] = [
            (
                FieldId::FullName,
                FieldValue::from(""),
                vec![Rule::Required, Rule::MinLength(3), Rule::PersonalName],
            ),
            (
                FieldId::DniNie,
                FieldValue::from(""),
                vec![Rule::Required, Rule::IdDocument],
            ),
            (
                FieldId::Email,
                FieldValue::from(""),
                vec![Rule::Required, Rule::EmailFormat],
            ),
            (
                FieldId::Phone,
                FieldValue::from(""),
                vec![Rule::Required, Rule::SpanishPhone],
            ),
            (
                FieldId::BirthDate,
                FieldValue::Null,
                vec![Rule::Required, Rule::AdultBirthDate],
            ),
            (FieldId::Destination, FieldValue::from(""), vec![Rule::Required]),
            (
                FieldId::DepartureDate,
                FieldValue::Null,
                vec![Rule::Required, Rule::FutureDate],
            ),
            (FieldId::ReturnDate, FieldValue::Null, vec![Rule::Required]),
            (
                FieldId::TripType,
                FieldValue::from(TRIP_ONE_WAY),
                vec![Rule::Required],
            ),
            (
                FieldId::TravelClass,
                FieldValue::from(CLASS_TOURIST),
                vec![Rule::Required],
            ),
            (
                FieldId::PassengerCount,
                FieldValue::from(1),
                vec![Rule::Required, Rule::Range { min: 1.0, max: 10.0 }],
            ),
            (FieldId::Terms, FieldValue::from(false), vec![Rule::Accepted]),
            (FieldId::Newsletter, FieldValue::from(false), vec![]),
        ];
        for (id, value, rules) in declarations {
            fields.insert(id, FieldState::new(value, rules, today));
        }

        // Registration order is evaluation order: the passenger-count
        // watcher comes before the any-field price watcher.
        let watchers = vec![
            Watcher {
                field: Some(FieldId::PassengerCount),
                reaction: Reaction::ResizePassengers,
            },
            Watcher {
                field: None,
                reaction: Reaction::RecomputePrice,
            },
        ];

        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let (change_tx, _) = broadcast::channel(1000);

        let filtered_destinations = options.destinations.clone();
        let mut form = Self {
            options,
            directory,
            today,
            fields,
            passengers: Vec::new(),
            watchers,
            record_fault: None,
            search_text: String::new(),
            filtered_destinations,
            total_price: 0,
            email_generation: 0,
            outcome_tx,
            outcome_rx,
            change_tx,
        };
        form.recompute_price();
        form.revalidate_record();
        form
    }

    // ----- inbound -----

    /// Applies a new value to a record field, runs its rules, and lets
    /// the registered watchers recompute derived state.
    pub fn set_value(&mut self, field: FieldId, value: FieldValue) {
        if field == FieldId::Email {
            self.set_email(value);
        } else {
            let today = self.today;
            self.state_mut(field).set(value, today);
        }

        self.run_watchers(Some(field));
        self.revalidate_record();
        self.emit(field.as_str().to_string(), field);
    }

    /// Applies a value to one sub-field of an additional passenger.
    /// Returns false when the entry does not exist.
    pub fn set_passenger_field(
        &mut self,
        index: usize,
        field: PassengerField,
        value: FieldValue,
    ) -> bool {
        let today = self.today;
        let Some(entry) = self.passengers.get_mut(index) else {
            return false;
        };
        entry.field_mut(field).set(value, today);

        self.run_watchers(None);

        let path = format!("passenger[{index}].{}", field.as_str());
        let state = match field {
            PassengerField::Name => &self.passengers[index].name,
            PassengerField::Age => &self.passengers[index].age,
            PassengerField::Relation => &self.passengers[index].relation,
        };
        let _ = self.change_tx.send(FieldChange::new(path, state.value.to_json()));
        true
    }

    /// Updates the destination search box. The box is a standalone
    /// control: filtering never touches validity or price.
    pub fn set_search_text(&mut self, text: &str) {
        self.search_text = text.to_string();
        let needle = text.to_lowercase();
        self.filtered_destinations = self
            .options
            .destinations
            .iter()
            .filter(|d| d.to_lowercase().contains(&needle))
            .cloned()
            .collect();
    }

    // ----- email lookup -----

    fn set_email(&mut self, value: FieldValue) {
        let today = self.today;
        let state = self.state_mut(FieldId::Email);
        state.set(value, today);

        // Every edit supersedes any in-flight lookup, even when the new
        // value fails the sync rules and no fresh lookup is dispatched.
        self.email_generation += 1;

        if !self.state(FieldId::Email).validity.is_valid() {
            return;
        }

        let generation = self.email_generation;
        let email = self
            .state(FieldId::Email)
            .value
            .as_text_or_empty()
            .to_string();
        self.state_mut(FieldId::Email).validity = Validity::Pending;

        let directory = Arc::clone(&self.directory);
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = directory.exists(&email).await;
            let _ = tx.send(LookupOutcome {
                generation,
                email,
                result,
            });
        });
    }

    /// Applies every lookup outcome that has already resolved, without
    /// waiting. Returns how many outcomes were applied (stale ones are
    /// discarded and not counted).
    pub fn poll_email_lookup(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if self.apply_outcome(outcome) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits until the email field leaves the pending state, applying
    /// outcomes (and discarding superseded ones) as they arrive.
    pub async fn settle_email(&mut self) {
        while self.state(FieldId::Email).validity.is_pending() {
            match self.outcome_rx.recv().await {
                Some(outcome) => {
                    self.apply_outcome(outcome);
                }
                None => break,
            }
        }
    }

    fn apply_outcome(&mut self, outcome: LookupOutcome) -> bool {
        // Last write wins: a resolution for anything but the newest
        // dispatched check must not touch the field.
        if outcome.generation != self.email_generation {
            debug!(email = %outcome.email, "discarding superseded email lookup");
            return false;
        }

        let state = self.state_mut(FieldId::Email);
        state.validity = match outcome.result {
            Ok(true) => Validity::Invalid(vec![ValidationError::EmailTaken]),
            Ok(false) => Validity::Valid,
            Err(err) => {
                warn!(error = %err, "email lookup failed");
                Validity::Invalid(vec![ValidationError::LookupFailed])
            }
        };
        true
    }

    // ----- derived state -----

    fn run_watchers(&mut self, changed: Option<FieldId>) {
        let reactions: Vec<Reaction> = self
            .watchers
            .iter()
            .filter(|w| w.field.is_none() || w.field == changed)
            .map(|w| w.reaction)
            .collect();

        for reaction in reactions {
            match reaction {
                Reaction::ResizePassengers => self.resize_passengers(),
                Reaction::RecomputePrice => self.recompute_price(),
            }
        }
    }

    /// Keeps the additional-passenger list at exactly `count - 1`
    /// entries. Growth appends fresh entries; shrinking drops from the
    /// tail. Setting the same count twice is a no-op.
    fn resize_passengers(&mut self) {
        let count = self
            .state(FieldId::PassengerCount)
            .value
            .as_number()
            .unwrap_or(1.0) as usize;
        let target = count.saturating_sub(1);

        while self.passengers.len() < target {
            self.passengers.push(PassengerEntry::new(self.today));
        }
        if self.passengers.len() > target {
            self.passengers.truncate(target);
        }
        debug!(entries = self.passengers.len(), "passenger list resized");
    }

    fn recompute_price(&mut self) {
        let class = self
            .state(FieldId::TravelClass)
            .value
            .as_text_or_empty()
            .to_string();
        let base = self.options.base_price(&class);
        let quantity = self
            .state(FieldId::PassengerCount)
            .value
            .as_number()
            .filter(|n| *n != 0.0)
            .unwrap_or(1.0);

        self.total_price = base.saturating_mul(quantity as u32);
        debug!(class = %class, quantity, total = self.total_price, "price recomputed");
    }

    fn revalidate_record(&mut self) {
        let departure = self.state(FieldId::DepartureDate).value.as_date();
        let return_date = self.state(FieldId::ReturnDate).value.as_date();
        self.record_fault = validate_date_range(departure, return_date).err();
    }

    // ----- submission -----

    /// Hands the booking record to the caller iff every field, every
    /// passenger sub-field, and the cross-field date rule report valid
    /// and the email check has resolved. Otherwise nothing is emitted.
    pub fn submit(&mut self) -> Result<BookingRecord, SubmitError> {
        if self.state(FieldId::Email).validity.is_pending() {
            return Err(SubmitError::LookupPending);
        }

        let mut offenders: Vec<String> = Vec::new();
        for id in FieldId::ALL {
            if !self.state(id).validity.is_valid() {
                offenders.push(id.as_str().to_string());
            }
        }
        for (index, entry) in self.passengers.iter().enumerate() {
            for (field, state) in [
                (PassengerField::Name, &entry.name),
                (PassengerField::Age, &entry.age),
                (PassengerField::Relation, &entry.relation),
            ] {
                if !state.validity.is_valid() {
                    offenders.push(format!("passenger[{index}].{}", field.as_str()));
                }
            }
        }
        if self.record_fault.is_some() {
            offenders.push("booking".to_string());
        }

        if !offenders.is_empty() {
            return Err(SubmitError::Invalid { fields: offenders });
        }

        let record = self.snapshot();
        info!(
            record = %serde_json::to_string(&record).unwrap_or_default(),
            "booking submitted"
        );
        Ok(record)
    }

    fn snapshot(&self) -> BookingRecord {
        BookingRecord {
            full_name: self.text_of(FieldId::FullName),
            dni_nie: self.text_of(FieldId::DniNie),
            email: self.text_of(FieldId::Email),
            phone: self.text_of(FieldId::Phone),
            birth_date: self.state(FieldId::BirthDate).value.as_date().unwrap_or_default(),
            destination: self.text_of(FieldId::Destination),
            departure_date: self
                .state(FieldId::DepartureDate)
                .value
                .as_date()
                .unwrap_or_default(),
            return_date: self
                .state(FieldId::ReturnDate)
                .value
                .as_date()
                .unwrap_or_default(),
            trip_type: self.text_of(FieldId::TripType),
            travel_class: self.text_of(FieldId::TravelClass),
            passenger_count: self
                .state(FieldId::PassengerCount)
                .value
                .as_number()
                .unwrap_or(1.0) as u32,
            additional_passengers: self
                .passengers
                .iter()
                .map(|entry| Passenger {
                    name: entry.name.value.as_text_or_empty().to_string(),
                    age: entry.age.value.as_number().unwrap_or(0.0) as u32,
                    relation: entry.relation.value.as_text_or_empty().to_string(),
                })
                .collect(),
            terms: self.state(FieldId::Terms).value.as_bool(),
            newsletter: self.state(FieldId::Newsletter).value.as_bool(),
        }
    }

    // ----- outbound -----

    /// Subscribe to applied field changes.
    pub fn subscribe(&self) -> broadcast::Receiver<FieldChange> {
        self.change_tx.subscribe()
    }

    pub fn field(&self, id: FieldId) -> &FieldState {
        self.state(id)
    }

    pub fn field_status(&self, id: FieldId) -> FieldStatus {
        self.state(id).status()
    }

    pub fn passengers(&self) -> &[PassengerEntry] {
        &self.passengers
    }

    pub fn filtered_destinations(&self) -> &[String] {
        &self.filtered_destinations
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn total_price(&self) -> u32 {
        self.total_price
    }

    /// Cross-field date-range fault, if any. Attached to the record as a
    /// whole, never to either date field.
    pub fn record_fault(&self) -> Option<ValidationError> {
        self.record_fault
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Whether submission would currently be accepted.
    pub fn is_valid(&self) -> bool {
        FieldId::ALL.iter().all(|id| self.state(*id).validity.is_valid())
            && self.passengers.iter().all(PassengerEntry::is_valid)
            && self.record_fault.is_none()
    }

    // ----- internals -----

    fn state(&self, id: FieldId) -> &FieldState {
        self.fields.get(&id).expect("all fields seeded at construction")
    }

    fn state_mut(&mut self, id: FieldId) -> &mut FieldState {
        self.fields
            .get_mut(&id)
            .expect("all fields seeded at construction")
    }

    fn text_of(&self, id: FieldId) -> String {
        self.state(id).value.as_text_or_empty().to_string()
    }

    fn emit(&self, path: String, field: FieldId) {
        let value = self.state(field).value.to_json();
        let _ = self.change_tx.send(FieldChange::new(path, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use travel_forms_validation::InMemoryEmailDirectory;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    fn form() -> BookingForm {
        let directory = Arc::new(InMemoryEmailDirectory::seeded(
            std::time::Duration::from_millis(10),
        ));
        BookingForm::with_today(FormOptions::default(), directory, today())
    }

    #[tokio::test]
    async fn test_initial_defaults() {
        let form = form();

        assert_eq!(form.field(FieldId::TripType).value, FieldValue::from(TRIP_ONE_WAY));
        assert_eq!(
            form.field(FieldId::TravelClass).value,
            FieldValue::from(CLASS_TOURIST)
        );
        assert_eq!(form.field(FieldId::PassengerCount).value, FieldValue::from(1));
        assert!(!form.field(FieldId::Terms).value.as_bool());
        assert!(!form.field(FieldId::Newsletter).value.as_bool());

        // One tourist traveler
        assert_eq!(form.total_price(), 100);
        assert!(form.passengers().is_empty());
        assert_eq!(form.filtered_destinations().len(), 6);

        // Everything starts pristine even though required fields are
        // already computed invalid
        assert_eq!(form.field_status(FieldId::FullName), FieldStatus::Pristine);
        assert!(!form.is_valid());
    }

    #[tokio::test]
    async fn test_search_filters_catalog() {
        let mut form = form();

        form.set_search_text("ma");
        assert_eq!(form.filtered_destinations(), &["Madrid", "Mallorca"]);

        form.set_search_text("BARCE");
        assert_eq!(form.filtered_destinations(), &["Barcelona"]);

        form.set_search_text("");
        assert_eq!(form.filtered_destinations().len(), 6);

        // Filtering is cosmetic: no validity or price effect
        assert_eq!(form.total_price(), 100);
    }

    #[tokio::test]
    async fn test_price_tracks_class_and_count() {
        let mut form = form();

        form.set_value(FieldId::TravelClass, FieldValue::from("business"));
        assert_eq!(form.total_price(), 250);

        form.set_value(FieldId::PassengerCount, FieldValue::from(3));
        assert_eq!(form.total_price(), 750);

        form.set_value(FieldId::TravelClass, FieldValue::from("first"));
        assert_eq!(form.total_price(), 1500);

        // Unrecognized class prices to zero
        form.set_value(FieldId::TravelClass, FieldValue::from("economy plus"));
        assert_eq!(form.total_price(), 0);
    }

    #[tokio::test]
    async fn test_change_events_are_broadcast() {
        let mut form = form();
        let mut events = form.subscribe();

        form.set_value(FieldId::Destination, FieldValue::from("Madrid"));

        let change = events.try_recv().unwrap();
        assert_eq!(change.field, "destination");
        assert_eq!(change.value, serde_json::json!("Madrid"));
    }

    #[tokio::test]
    async fn test_record_rule_attaches_to_form() {
        let mut form = form();
        let dep = NaiveDate::from_ymd_opt(2026, 9, 10).unwrap();

        form.set_value(FieldId::DepartureDate, FieldValue::from(dep));
        assert_eq!(form.record_fault(), None);

        form.set_value(
            FieldId::ReturnDate,
            FieldValue::from(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()),
        );
        assert_eq!(form.record_fault(), Some(ValidationError::InvalidRange));

        // Neither date field carries the fault itself
        assert!(!form.field(FieldId::DepartureDate).has_fault(ValidationError::InvalidRange));
        assert!(!form.field(FieldId::ReturnDate).has_fault(ValidationError::InvalidRange));
    }
}
