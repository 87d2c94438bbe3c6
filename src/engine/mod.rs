mod availability;
mod error;
mod validate;

pub use availability::{booked_ranges, free_ranges, merge_overlapping, subtract_ranges};
pub use error::Rejection;
pub use validate::{evaluate, parse_canonical_date};

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::config::BookingConfig;
use crate::model::*;
use crate::observability;
use crate::store::{ReservationStore, StoreError};

/// Result of one form submission as the UI sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub outcome: Result<ReservationRecord, Rejection>,
    /// Whether a further booking could be attempted after this one.
    pub booking_allowed: bool,
}

/// Booking policy over a reservation store.
///
/// Holds no reservation state of its own: every decision starts from a
/// fresh `list()` of the store. `&mut self` on writes keeps the
/// read-validate-append sequence exclusive; share across threads only
/// behind a mutex.
pub struct BookingEngine<S> {
    config: BookingConfig,
    store: S,
}

impl<S: ReservationStore> BookingEngine<S> {
    pub fn new(config: BookingConfig, store: S) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    pub fn room(&self) -> &RoomInfo {
        &self.config.room
    }

    /// First day the date pickers should offer.
    pub fn min_bookable_date(&self) -> NaiveDate {
        self.config.min_check_in
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// All reservations in insertion order.
    pub fn reservations(&self) -> Vec<ReservationRecord> {
        self.store.list()
    }

    /// Most recent first, the order the reservation list is shown in.
    pub fn reservations_newest_first(&self) -> Vec<ReservationRecord> {
        let mut list = self.store.list();
        list.reverse();
        list
    }

    /// Capacity gate only: may the booking form be opened at all.
    pub fn booking_allowed(&self) -> bool {
        self.gate_open(self.store.list().len())
    }

    fn gate_open(&self, count: usize) -> bool {
        self.config
            .max_total_reservations
            .is_none_or(|limit| count < limit)
    }

    /// Validate `request` against the current store and persist it on success.
    /// A rejection leaves the store untouched.
    pub fn submit(&mut self, request: &BookingRequest) -> Result<ReservationRecord, Rejection> {
        let existing = self.store.list();
        let stay = match evaluate(&self.config, &existing, request) {
            Ok(stay) => stay,
            Err(rejection) => return Err(self.reject(rejection)),
        };

        let record = ReservationRecord {
            id: Ulid::new().to_string(),
            room_id: self.config.room.id,
            full_name: request.full_name.trim().to_string(),
            email: request.email.trim().to_string(),
            check_in: stay.start,
            check_out: stay.end,
            created_at: Utc::now(),
        };

        if let Err(e) = self.store.append(record.clone()) {
            warn!("reservation {} for {} not persisted: {e}", record.id, record.email);
            return Err(self.reject(e.into()));
        }

        metrics::counter!(observability::RESERVATIONS_ACCEPTED_TOTAL).increment(1);
        info!(
            "reservation {} accepted: room {} [{}, {}) {} night(s)",
            record.id,
            record.room_id,
            record.check_in,
            record.check_out,
            stay.nights()
        );
        Ok(record)
    }

    /// [`submit`](Self::submit) plus the recomputed gate for the UI.
    pub fn submit_with_status(&mut self, request: &BookingRequest) -> Submission {
        let outcome = self.submit(request);
        Submission {
            outcome,
            booking_allowed: self.booking_allowed(),
        }
    }

    /// Delete a reservation by id. `Ok(false)` if there was none.
    pub fn cancel(&mut self, id: &str) -> Result<bool, StoreError> {
        match self.store.remove(id) {
            Ok(true) => {
                metrics::counter!(observability::RESERVATIONS_CANCELLED_TOTAL).increment(1);
                info!("reservation {id} cancelled");
                Ok(true)
            }
            Ok(false) => {
                debug!("cancel {id}: no such reservation");
                Ok(false)
            }
            Err(e) => {
                warn!("cancel {id} not persisted: {e}");
                Err(e)
            }
        }
    }

    /// Occupied ranges of the configured room, merged.
    pub fn booked_ranges(&self) -> Vec<StayRange> {
        booked_ranges(self.config.room.id, &self.store.list())
    }

    /// Bookable gaps of the configured room inside `window`.
    pub fn free_ranges(&self, window: StayRange) -> Vec<StayRange> {
        free_ranges(self.config.room.id, &self.store.list(), &window)
    }

    fn reject(&self, rejection: Rejection) -> Rejection {
        metrics::counter!(
            observability::RESERVATIONS_REJECTED_TOTAL,
            "reason" => observability::rejection_label(&rejection)
        )
        .increment(1);
        debug!("booking rejected: {rejection}");
        rejection
    }
}
