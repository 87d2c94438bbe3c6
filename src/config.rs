use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::model::RoomInfo;

pub const DEFAULT_ROOM_ID: u32 = 1;
pub const DEFAULT_HOTEL_NAME: &str = "Aurora Premium Hotel";
pub const DEFAULT_ROOM_NAME: &str = "Sea View Standard Room";
pub const DEFAULT_STORAGE_KEY: &str = "aurora_premium_single_room_reservations_v1";
pub const DEFAULT_COMPACT_THRESHOLD: u64 = 1000;

/// 2026-01-01: no stay may start or end before this day.
pub fn default_min_check_in() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn default_room() -> RoomInfo {
    RoomInfo {
        id: DEFAULT_ROOM_ID,
        hotel: DEFAULT_HOTEL_NAME.into(),
        name: DEFAULT_ROOM_NAME.into(),
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.into()
}

fn default_compact_threshold() -> u64 {
    DEFAULT_COMPACT_THRESHOLD
}

/// Everything the booking engine treats as policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookingConfig {
    #[serde(default = "default_room")]
    pub room: RoomInfo,
    #[serde(default = "default_min_check_in")]
    pub min_check_in: NaiveDate,
    /// `None`: unlimited, every stay overlap-checked.
    /// `Some(n)`: lock out new bookings once `n` reservations exist.
    #[serde(default)]
    pub max_total_reservations: Option<usize>,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Journal appends between compactions.
    #[serde(default = "default_compact_threshold")]
    pub compact_threshold: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            room: default_room(),
            min_check_in: default_min_check_in(),
            max_total_reservations: None,
            storage_key: default_storage_key(),
            compact_threshold: default_compact_threshold(),
        }
    }
}

impl BookingConfig {
    /// Hard single-use lockout: the first reservation takes the room for good.
    pub fn single_use() -> Self {
        Self {
            max_total_reservations: Some(1),
            ..Self::default()
        }
    }

    pub fn with_room(mut self, room: RoomInfo) -> Self {
        self.room = room;
        self
    }

    pub fn with_min_check_in(mut self, day: NaiveDate) -> Self {
        self.min_check_in = day;
        self
    }

    pub fn with_max_total_reservations(mut self, limit: Option<usize>) -> Self {
        self.max_total_reservations = limit;
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_compact_threshold(mut self, threshold: u64) -> Self {
        self.compact_threshold = threshold;
        self
    }

    /// Build from `INNKEEP_*` environment variables over the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let room = RoomInfo {
            id: parse_var(&lookup, "INNKEEP_ROOM_ID").unwrap_or(defaults.room.id),
            hotel: lookup("INNKEEP_HOTEL_NAME").unwrap_or(defaults.room.hotel),
            name: lookup("INNKEEP_ROOM_NAME").unwrap_or(defaults.room.name),
        };

        let min_check_in = match lookup("INNKEEP_MIN_DATE") {
            Some(raw) => match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                Ok(day) => day,
                Err(e) => {
                    tracing::warn!("ignoring INNKEEP_MIN_DATE={raw:?}: {e}");
                    defaults.min_check_in
                }
            },
            None => defaults.min_check_in,
        };

        // Empty or "unlimited" clears the cap.
        let max_total_reservations = match lookup("INNKEEP_MAX_TOTAL_RESERVATIONS") {
            Some(raw) if raw.trim().is_empty() || raw.trim().eq_ignore_ascii_case("unlimited") => {
                None
            }
            Some(_) => parse_var(&lookup, "INNKEEP_MAX_TOTAL_RESERVATIONS"),
            None => defaults.max_total_reservations,
        };

        Self {
            room,
            min_check_in,
            max_total_reservations,
            storage_key: lookup("INNKEEP_STORAGE_KEY").unwrap_or(defaults.storage_key),
            compact_threshold: parse_var(&lookup, "INNKEEP_COMPACT_THRESHOLD")
                .unwrap_or(defaults.compact_threshold),
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("ignoring unparseable {key}={raw:?}");
            None
        }
    }
}
