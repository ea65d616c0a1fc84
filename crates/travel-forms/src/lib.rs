// Travel Forms - reactive booking form core
// Field validation, derived state, and submission gating for a travel
// reservation flow; the rendering layer stays outside this crate.

pub mod booking;
pub mod config;
pub mod events;
pub mod field;
pub mod record;
pub mod value;

// Re-export the form model
pub use booking::{BookingForm, PassengerEntry, SubmitError};
pub use config::{
    FormOptions, CLASS_BUSINESS, CLASS_FIRST, CLASS_TOURIST, TRIP_ONE_WAY, TRIP_ROUND,
};
pub use events::FieldChange;
pub use field::{FieldId, FieldState, FieldStatus, PassengerField, Rule, Validity};
pub use record::{BookingRecord, Passenger};
pub use value::FieldValue;

// Re-export the validator crate and its commonly used types
pub use travel_forms_validation as validation;
pub use travel_forms_validation::{EmailDirectory, InMemoryEmailDirectory, ValidationError};
