// Integration tests: the booking form driven the way a UI would drive it

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use travel_forms::validation::DirectoryError;
use travel_forms::{
    BookingForm, EmailDirectory, FieldId, FieldStatus, FieldValue, FormOptions,
    InMemoryEmailDirectory, PassengerField, SubmitError, ValidationError, Validity,
    CLASS_BUSINESS, TRIP_ROUND,
};

const LATENCY_MS: u64 = 20;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn empty_form() -> BookingForm {
    let directory = Arc::new(InMemoryEmailDirectory::seeded(Duration::from_millis(
        LATENCY_MS,
    )));
    BookingForm::with_today(FormOptions::default(), directory, today())
}

/// A form with every field filled in validly, email already resolved.
async fn filled_form() -> BookingForm {
    let mut form = empty_form();

    form.set_value(FieldId::FullName, FieldValue::from("María García"));
    form.set_value(FieldId::DniNie, FieldValue::from("12345678Z"));
    form.set_value(FieldId::Phone, FieldValue::from("612345678"));
    form.set_value(FieldId::BirthDate, FieldValue::from(date(1990, 5, 1)));
    form.set_value(FieldId::Destination, FieldValue::from("Madrid"));
    form.set_value(FieldId::DepartureDate, FieldValue::from(date(2026, 9, 1)));
    form.set_value(FieldId::ReturnDate, FieldValue::from(date(2026, 9, 10)));
    form.set_value(FieldId::TripType, FieldValue::from(TRIP_ROUND));
    form.set_value(FieldId::Terms, FieldValue::from(true));

    form.set_value(FieldId::Email, FieldValue::from("maria@example.com"));
    form.settle_email().await;

    form
}

// ----- passenger synchronization -----

#[tokio::test]
async fn growing_passenger_count_appends_entries() {
    let mut form = empty_form();

    form.set_value(FieldId::PassengerCount, FieldValue::from(4));
    assert_eq!(form.passengers().len(), 3);

    // Fresh entries need all three sub-fields
    assert!(!form.passengers()[0].is_valid());
    assert_eq!(form.passengers()[0].name.status(), FieldStatus::Pristine);

    // Price reflects the settled count, not the old one
    assert_eq!(form.total_price(), 400);
}

#[tokio::test]
async fn shrinking_passenger_count_drops_from_the_tail() {
    let mut form = empty_form();
    form.set_value(FieldId::PassengerCount, FieldValue::from(4));

    for (i, name) in ["Ana", "Berta", "Carla"].iter().enumerate() {
        form.set_passenger_field(i, PassengerField::Name, FieldValue::from(*name));
    }

    form.set_value(FieldId::PassengerCount, FieldValue::from(2));
    assert_eq!(form.passengers().len(), 1);
    // The survivor is the head of the list, order preserved
    assert_eq!(form.passengers()[0].name.value, FieldValue::from("Ana"));
    assert_eq!(form.total_price(), 200);
}

#[tokio::test]
async fn resize_is_idempotent() {
    let mut form = empty_form();
    form.set_value(FieldId::PassengerCount, FieldValue::from(3));
    form.set_passenger_field(0, PassengerField::Name, FieldValue::from("Ana"));

    form.set_value(FieldId::PassengerCount, FieldValue::from(3));
    assert_eq!(form.passengers().len(), 2);
    // Entries survive a same-count write untouched
    assert_eq!(form.passengers()[0].name.value, FieldValue::from("Ana"));
}

#[tokio::test]
async fn passenger_field_changes_recompute_price() {
    let mut form = empty_form();
    form.set_value(FieldId::TravelClass, FieldValue::from(CLASS_BUSINESS));
    form.set_value(FieldId::PassengerCount, FieldValue::from(2));
    assert_eq!(form.total_price(), 500);

    // Any passenger sub-field change re-derives price
    assert!(form.set_passenger_field(0, PassengerField::Age, FieldValue::from(30)));
    assert_eq!(form.total_price(), 500);

    // Out-of-range entries are rejected
    assert!(!form.set_passenger_field(5, PassengerField::Age, FieldValue::from(30)));
}

// ----- async email uniqueness -----

#[tokio::test]
async fn known_email_resolves_to_taken() {
    let mut form = empty_form();

    form.set_value(FieldId::Email, FieldValue::from("test@test.com"));
    assert!(form.field(FieldId::Email).validity.is_pending());

    form.settle_email().await;
    assert!(form.field(FieldId::Email).has_fault(ValidationError::EmailTaken));
}

#[tokio::test]
async fn fresh_email_resolves_to_valid() {
    let mut form = empty_form();

    form.set_value(FieldId::Email, FieldValue::from("new@unique.com"));
    form.settle_email().await;
    assert_eq!(form.field(FieldId::Email).validity, Validity::Valid);
}

#[tokio::test]
async fn superseded_lookup_never_overwrites_the_newer_one() {
    let mut form = empty_form();

    // The first address is taken; its resolution must be discarded once
    // a second check is in flight.
    form.set_value(FieldId::Email, FieldValue::from("test@test.com"));
    form.set_value(FieldId::Email, FieldValue::from("new@unique.com"));

    tokio::time::sleep(Duration::from_millis(LATENCY_MS * 5)).await;
    let applied = form.poll_email_lookup();

    assert_eq!(applied, 1);
    assert_eq!(form.field(FieldId::Email).validity, Validity::Valid);
    assert!(!form.field(FieldId::Email).has_fault(ValidationError::EmailTaken));
}

#[tokio::test]
async fn sync_invalid_email_cancels_pending_lookup() {
    let mut form = empty_form();

    form.set_value(FieldId::Email, FieldValue::from("new@unique.com"));
    assert!(form.field(FieldId::Email).validity.is_pending());

    // The edit supersedes the in-flight check and fails fast on format
    form.set_value(FieldId::Email, FieldValue::from("not-an-email"));
    assert!(form.field(FieldId::Email).has_fault(ValidationError::InvalidEmail));

    tokio::time::sleep(Duration::from_millis(LATENCY_MS * 5)).await;
    assert_eq!(form.poll_email_lookup(), 0);
    assert!(form.field(FieldId::Email).has_fault(ValidationError::InvalidEmail));
}

struct FailingDirectory;

#[async_trait::async_trait]
impl EmailDirectory for FailingDirectory {
    async fn exists(&self, _email: &str) -> Result<bool, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }
}

#[tokio::test]
async fn lookup_failure_blocks_submission_with_its_own_kind() {
    let mut form =
        BookingForm::with_today(FormOptions::default(), Arc::new(FailingDirectory), today());

    form.set_value(FieldId::Email, FieldValue::from("maria@example.com"));
    form.settle_email().await;

    assert!(form.field(FieldId::Email).has_fault(ValidationError::LookupFailed));
    assert!(matches!(form.submit(), Err(SubmitError::Invalid { .. })));
}

// ----- submission gate -----

#[tokio::test]
async fn complete_form_submits_the_record() {
    let mut form = filled_form().await;
    form.set_value(FieldId::TravelClass, FieldValue::from(CLASS_BUSINESS));
    form.set_value(FieldId::PassengerCount, FieldValue::from(2));
    form.set_passenger_field(0, PassengerField::Name, FieldValue::from("Carlos García"));
    form.set_passenger_field(0, PassengerField::Age, FieldValue::from(34));
    form.set_passenger_field(0, PassengerField::Relation, FieldValue::from("spouse"));

    assert!(form.is_valid());
    let record = form.submit().expect("form is fully valid");

    assert_eq!(record.full_name, "María García");
    assert_eq!(record.destination, "Madrid");
    assert_eq!(record.travel_class, CLASS_BUSINESS);
    assert_eq!(record.passenger_count, 2);
    assert_eq!(record.additional_passengers.len(), 1);
    assert_eq!(record.additional_passengers[0].name, "Carlos García");
    assert!(record.terms);
    assert!(!record.newsletter);
}

#[tokio::test]
async fn incomplete_form_is_refused() {
    let mut form = empty_form();

    let err = form.submit().unwrap_err();
    let SubmitError::Invalid { fields } = err else {
        panic!("expected field listing");
    };
    assert!(fields.contains(&"full_name".to_string()));
    assert!(fields.contains(&"terms".to_string()));
    // Defaulted selects are fine as they are
    assert!(!fields.contains(&"trip_type".to_string()));
    assert!(!fields.contains(&"travel_class".to_string()));
}

#[tokio::test]
async fn pending_email_refuses_submission() {
    let mut form = filled_form().await;

    form.set_value(FieldId::Email, FieldValue::from("other@example.com"));
    assert_eq!(form.submit(), Err(SubmitError::LookupPending));

    form.settle_email().await;
    assert!(form.submit().is_ok());
}

#[tokio::test]
async fn underage_traveler_blocks_submission() {
    let mut form = filled_form().await;

    // 18 years minus one day on the anchored date
    form.set_value(FieldId::BirthDate, FieldValue::from(date(2008, 8, 7)));
    assert!(form.field(FieldId::BirthDate).has_fault(ValidationError::UnderAge));

    let SubmitError::Invalid { fields } = form.submit().unwrap_err() else {
        panic!("expected field listing");
    };
    assert_eq!(fields, vec!["birth_date".to_string()]);
}

#[tokio::test]
async fn equal_trip_dates_fail_the_record_rule() {
    let mut form = filled_form().await;

    form.set_value(FieldId::ReturnDate, FieldValue::from(date(2026, 9, 1)));
    assert_eq!(form.record_fault(), Some(ValidationError::InvalidRange));

    let SubmitError::Invalid { fields } = form.submit().unwrap_err() else {
        panic!("expected field listing");
    };
    assert_eq!(fields, vec!["booking".to_string()]);
}

#[tokio::test]
async fn incomplete_passenger_entries_block_submission() {
    let mut form = filled_form().await;
    form.set_value(FieldId::PassengerCount, FieldValue::from(2));

    let SubmitError::Invalid { fields } = form.submit().unwrap_err() else {
        panic!("expected field listing");
    };
    assert_eq!(
        fields,
        vec![
            "passenger[0].name".to_string(),
            "passenger[0].age".to_string(),
            "passenger[0].relation".to_string(),
        ]
    );
}
