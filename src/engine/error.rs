use chrono::NaiveDate;

use crate::model::Field;
use crate::store::StoreError;

/// Why a booking attempt was turned down. Every variant except
/// `PersistenceFailure` is a user-correctable input problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    CapacityExhausted { limit: usize },
    MissingField(Field),
    MissingDate(Field),
    InvalidDateFormat(Field),
    DateTooEarly { field: Field, min: NaiveDate },
    InvalidRange { check_in: NaiveDate, check_out: NaiveDate },
    DateClash { existing: String },
    PersistenceFailure(String),
}

impl Rejection {
    /// Stable identifier for UIs and metric labels.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::CapacityExhausted { .. } => "capacity_exhausted",
            Rejection::MissingField(_) => "missing_field",
            Rejection::MissingDate(_) => "missing_date",
            Rejection::InvalidDateFormat(_) => "invalid_date_format",
            Rejection::DateTooEarly { .. } => "date_too_early",
            Rejection::InvalidRange { .. } => "invalid_range",
            Rejection::DateClash { .. } => "date_clash",
            Rejection::PersistenceFailure(_) => "persistence_failure",
        }
    }

    /// The form field to highlight, if the rejection is about one.
    pub fn field(&self) -> Option<Field> {
        match self {
            Rejection::MissingField(f)
            | Rejection::MissingDate(f)
            | Rejection::InvalidDateFormat(f)
            | Rejection::DateTooEarly { field: f, .. } => Some(*f),
            Rejection::InvalidRange { .. } => Some(Field::CheckOut),
            Rejection::CapacityExhausted { .. }
            | Rejection::DateClash { .. }
            | Rejection::PersistenceFailure(_) => None,
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::CapacityExhausted { limit } => {
                write!(f, "no further bookings accepted: limit of {limit} reached")
            }
            Rejection::MissingField(field) => write!(f, "{field} is required"),
            Rejection::MissingDate(field) => write!(f, "{field} date is required"),
            Rejection::InvalidDateFormat(field) => {
                write!(f, "{field} must be a calendar date in YYYY-MM-DD form")
            }
            Rejection::DateTooEarly { field, min } => {
                write!(f, "{field} is before the first bookable day {min}")
            }
            Rejection::InvalidRange {
                check_in,
                check_out,
            } => write!(f, "check-out {check_out} must be after check-in {check_in}"),
            Rejection::DateClash { existing } => {
                write!(f, "dates overlap existing reservation {existing}")
            }
            Rejection::PersistenceFailure(e) => write!(f, "reservation not saved: {e}"),
        }
    }
}

impl std::error::Error for Rejection {}

impl From<StoreError> for Rejection {
    fn from(e: StoreError) -> Self {
        Rejection::PersistenceFailure(e.to_string())
    }
}
