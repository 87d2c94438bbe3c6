use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Half-open stay `[start, end)` in whole calendar days.
///
/// The check-out day is excluded, so a guest leaving on day X never
/// conflicts with a guest arriving on day X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl StayRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start < end, "StayRange start must be before end");
        Self { start, end }
    }

    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True if the guest sleeps in the room on the night of `day`.
    pub fn contains_night(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }
}

/// The single bookable room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: u32,
    pub hotel: String,
    pub name: String,
}

/// One persisted reservation. Created once by the engine, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    /// Opaque. New records get a ULID; records written by other clients
    /// may carry any string, such as a UUID.
    pub id: String,
    pub room_id: u32,
    pub full_name: String,
    pub email: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl ReservationRecord {
    /// Stay covered by this record. Built without the ordering assertion
    /// because stored data is not re-validated on read.
    pub fn stay(&self) -> StayRange {
        StayRange {
            start: self.check_in,
            end: self.check_out,
        }
    }
}

/// Raw form input as handed over by the UI layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingRequest {
    pub full_name: String,
    pub email: String,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

impl BookingRequest {
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        check_in: impl Into<String>,
        check_out: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            check_in: Some(check_in.into()),
            check_out: Some(check_out.into()),
        }
    }
}

/// Form field a rejection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FullName,
    Email,
    CheckIn,
    CheckOut,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FullName => "full_name",
            Field::Email => "email",
            Field::CheckIn => "check_in",
            Field::CheckOut => "check_out",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Journal record format. Flat, one event per durable write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JournalEvent {
    ReservationCreated(ReservationRecord),
    ReservationRemoved { id: String },
}
