// File: src/record.rs
// Purpose: Submission snapshot of the booking form

use chrono::NaiveDate;
use serde::Serialize;

/// A traveler beyond the primary one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Passenger {
    pub name: String,
    pub age: u32,
    pub relation: String,
}

/// The complete booking handed to the submission sink.
///
/// Built only when every field and the cross-field rule report valid;
/// the record never outlives the form session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRecord {
    pub full_name: String,
    pub dni_nie: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub trip_type: String,
    pub travel_class: String,
    pub passenger_count: u32,
    pub additional_passengers: Vec<Passenger>,
    pub terms: bool,
    pub newsletter: bool,
}
