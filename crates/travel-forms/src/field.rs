// File: src/field.rs
// Purpose: Field identity, per-field rule configuration, and the field state machine

use std::fmt;

use chrono::NaiveDate;

use travel_forms_validation::{
    validate_accepted, validate_adult, validate_dni_nie, validate_email_format,
    validate_full_name, validate_future_date, validate_min, validate_min_length, validate_phone,
    validate_range, validate_required, ValidationError,
};

use crate::value::FieldValue;

/// Named slots of the booking record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    FullName,
    DniNie,
    Email,
    Phone,
    BirthDate,
    Destination,
    DepartureDate,
    ReturnDate,
    TripType,
    TravelClass,
    PassengerCount,
    Terms,
    Newsletter,
}

impl FieldId {
    pub const ALL: [FieldId; 13] = [
        FieldId::FullName,
        FieldId::DniNie,
        FieldId::Email,
        FieldId::Phone,
        FieldId::BirthDate,
        FieldId::Destination,
        FieldId::DepartureDate,
        FieldId::ReturnDate,
        FieldId::TripType,
        FieldId::TravelClass,
        FieldId::PassengerCount,
        FieldId::Terms,
        FieldId::Newsletter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::FullName => "full_name",
            FieldId::DniNie => "dni_nie",
            FieldId::Email => "email",
            FieldId::Phone => "phone",
            FieldId::BirthDate => "birth_date",
            FieldId::Destination => "destination",
            FieldId::DepartureDate => "departure_date",
            FieldId::ReturnDate => "return_date",
            FieldId::TripType => "trip_type",
            FieldId::TravelClass => "travel_class",
            FieldId::PassengerCount => "passenger_count",
            FieldId::Terms => "terms",
            FieldId::Newsletter => "newsletter",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-fields of an additional-passenger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerField {
    Name,
    Age,
    Relation,
}

impl PassengerField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassengerField::Name => "name",
            PassengerField::Age => "age",
            PassengerField::Relation => "relation",
        }
    }
}

/// A single rule attached to a field.
///
/// The per-field rule lists are configuration: the form declares them at
/// construction, the state machine evaluates them on every change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    Required,
    /// Minimum character count; skipped while the value is empty
    MinLength(usize),
    /// Inclusive numeric bounds; skipped while the value is absent
    Range { min: f64, max: f64 },
    /// Inclusive numeric floor; skipped while the value is absent
    AtLeast(f64),
    /// Checkbox that must be ticked
    Accepted,
    PersonalName,
    SpanishPhone,
    IdDocument,
    /// Structural email check; skipped while the value is empty
    EmailFormat,
    AdultBirthDate,
    FutureDate,
}

impl Rule {
    /// Evaluates the rule against a value. `today` anchors the date rules.
    pub fn evaluate(&self, value: &FieldValue, today: NaiveDate) -> Result<(), ValidationError> {
        match self {
            Rule::Required => {
                if value.is_present() {
                    Ok(())
                } else {
                    validate_required(value.as_text_or_empty())
                }
            }
            Rule::MinLength(min) => match value.as_str() {
                Some(s) if !s.is_empty() => validate_min_length(s, *min),
                _ => Ok(()),
            },
            Rule::Range { min, max } => match value.as_number() {
                Some(n) => validate_range(n, *min, *max),
                None => Ok(()),
            },
            Rule::AtLeast(min) => match value.as_number() {
                Some(n) => validate_min(n, *min),
                None => Ok(()),
            },
            Rule::Accepted => validate_accepted(value.as_bool()),
            Rule::PersonalName => validate_full_name(value.as_text_or_empty()),
            Rule::SpanishPhone => validate_phone(value.as_text_or_empty()),
            Rule::IdDocument => validate_dni_nie(value.as_text_or_empty()),
            Rule::EmailFormat => match value.as_str() {
                Some(s) if !s.is_empty() => validate_email_format(s),
                _ => Ok(()),
            },
            Rule::AdultBirthDate => validate_adult(value.as_date(), today),
            Rule::FutureDate => validate_future_date(value.as_date(), today),
        }
    }
}

/// Computed validity of a field
#[derive(Debug, Clone, PartialEq)]
pub enum Validity {
    Valid,
    /// Non-empty set of failure kinds
    Invalid(Vec<ValidationError>),
    /// Async check dispatched, not yet resolved
    Pending,
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Validity::Pending)
    }

    pub fn faults(&self) -> &[ValidationError] {
        match self {
            Validity::Invalid(faults) => faults,
            _ => &[],
        }
    }
}

/// Presentation status: untouched fields report `Pristine` no matter what
/// validity was computed for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Pristine,
    Pending,
    Valid,
    Invalid,
}

/// One field of the form: value, touch flag, computed validity, rules
#[derive(Debug, Clone)]
pub struct FieldState {
    pub value: FieldValue,
    pub touched: bool,
    pub validity: Validity,
    rules: Vec<Rule>,
}

impl FieldState {
    /// Builds the field and computes its validity immediately, so the
    /// submission gate never depends on whether a field was touched.
    pub fn new(value: FieldValue, rules: Vec<Rule>, today: NaiveDate) -> Self {
        let validity = Self::run_rules(&value, &rules, today);
        Self {
            value,
            touched: false,
            validity,
            rules,
        }
    }

    /// Applies a new value: marks the field touched and revalidates.
    pub fn set(&mut self, value: FieldValue, today: NaiveDate) {
        self.value = value;
        self.touched = true;
        self.revalidate(today);
    }

    pub fn revalidate(&mut self, today: NaiveDate) {
        self.validity = Self::run_rules(&self.value, &self.rules, today);
    }

    fn run_rules(value: &FieldValue, rules: &[Rule], today: NaiveDate) -> Validity {
        // Rules evaluate independently; every failing kind is collected
        let faults: Vec<ValidationError> = rules
            .iter()
            .filter_map(|rule| rule.evaluate(value, today).err())
            .collect();

        if faults.is_empty() {
            Validity::Valid
        } else {
            Validity::Invalid(faults)
        }
    }

    pub fn status(&self) -> FieldStatus {
        if !self.touched {
            return FieldStatus::Pristine;
        }
        match self.validity {
            Validity::Valid => FieldStatus::Valid,
            Validity::Invalid(_) => FieldStatus::Invalid,
            Validity::Pending => FieldStatus::Pending,
        }
    }

    pub fn has_fault(&self, fault: ValidationError) -> bool {
        self.validity.faults().contains(&fault)
    }
}
