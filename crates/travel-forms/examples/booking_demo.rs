// Example: a full booking driven end to end
// Shows field entry, the async email check, destination filtering,
// passenger growth, and submission.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Local};
use travel_forms::{
    BookingForm, FieldId, FieldValue, FormOptions, InMemoryEmailDirectory, PassengerField,
    CLASS_BUSINESS, TRIP_ROUND,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let options = FormOptions {
        lookup_latency_ms: 300,
        ..FormOptions::default()
    };
    let directory = Arc::new(InMemoryEmailDirectory::seeded(Duration::from_millis(300)));
    let mut form = BookingForm::new(options, directory);

    // The catalog narrows as the search text grows
    form.set_search_text("ma");
    println!("destinations matching 'ma': {:?}", form.filtered_destinations());

    // Client identity
    form.set_value(FieldId::FullName, FieldValue::from("María García López"));
    form.set_value(FieldId::DniNie, FieldValue::from("12345678Z"));
    form.set_value(FieldId::Phone, FieldValue::from("612345678"));
    form.set_value(
        FieldId::BirthDate,
        FieldValue::from(Local::now().date_naive() - ChronoDuration::days(30 * 365)),
    );

    // The seeded directory already knows this address
    form.set_value(FieldId::Email, FieldValue::from("test@test.com"));
    form.settle_email().await;
    println!("taken address resolves to: {:?}", form.field(FieldId::Email).validity);

    form.set_value(FieldId::Email, FieldValue::from("maria@example.com"));
    form.settle_email().await;
    println!("fresh address resolves to: {:?}", form.field(FieldId::Email).validity);

    // Trip details
    let today = form.today();
    form.set_value(FieldId::Destination, FieldValue::from("Madrid"));
    form.set_value(
        FieldId::DepartureDate,
        FieldValue::from(today + ChronoDuration::days(30)),
    );
    form.set_value(
        FieldId::ReturnDate,
        FieldValue::from(today + ChronoDuration::days(37)),
    );
    form.set_value(FieldId::TripType, FieldValue::from(TRIP_ROUND));
    form.set_value(FieldId::TravelClass, FieldValue::from(CLASS_BUSINESS));

    // Three travelers: the sub-forms appear and the price follows
    form.set_value(FieldId::PassengerCount, FieldValue::from(3));
    println!(
        "{} extra passenger forms, total {} EUR",
        form.passengers().len(),
        form.total_price()
    );

    form.set_passenger_field(0, PassengerField::Name, FieldValue::from("Carlos García"));
    form.set_passenger_field(0, PassengerField::Age, FieldValue::from(34));
    form.set_passenger_field(0, PassengerField::Relation, FieldValue::from("spouse"));
    form.set_passenger_field(1, PassengerField::Name, FieldValue::from("Lucía García"));
    form.set_passenger_field(1, PassengerField::Age, FieldValue::from(7));
    form.set_passenger_field(1, PassengerField::Relation, FieldValue::from("daughter"));

    form.set_value(FieldId::Terms, FieldValue::from(true));

    let record = form.submit()?;
    println!("submitted booking for {}", record.full_name);
    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}
