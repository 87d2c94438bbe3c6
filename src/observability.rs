use crate::engine::Rejection;

// ── Booking outcomes ────────────────────────────────────────────

/// Counter: reservations persisted.
pub const RESERVATIONS_ACCEPTED_TOTAL: &str = "innkeep_reservations_accepted_total";

/// Counter: booking attempts turned down. Labels: reason.
pub const RESERVATIONS_REJECTED_TOTAL: &str = "innkeep_reservations_rejected_total";

/// Counter: reservations deleted by id.
pub const RESERVATIONS_CANCELLED_TOTAL: &str = "innkeep_reservations_cancelled_total";

// ── Storage ─────────────────────────────────────────────────────

/// Counter: reads that found unreadable data and degraded to empty. Labels: source.
pub const STORE_CORRUPT_READS_TOTAL: &str = "innkeep_store_corrupt_reads_total";

/// Histogram: journal append + fsync duration in seconds.
pub const JOURNAL_FLUSH_DURATION_SECONDS: &str = "innkeep_journal_flush_duration_seconds";

/// Map a rejection to a short label for metrics.
pub fn rejection_label(rejection: &Rejection) -> &'static str {
    rejection.code()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Field;

    #[test]
    fn labels_are_distinct_per_reason() {
        let samples = [
            Rejection::CapacityExhausted { limit: 1 },
            Rejection::MissingField(Field::Email),
            Rejection::MissingDate(Field::CheckIn),
            Rejection::InvalidDateFormat(Field::CheckOut),
            Rejection::DateTooEarly {
                field: Field::CheckIn,
                min: chrono::NaiveDate::MIN,
            },
            Rejection::InvalidRange {
                check_in: chrono::NaiveDate::MAX,
                check_out: chrono::NaiveDate::MIN,
            },
            Rejection::DateClash {
                existing: ulid::Ulid::new().to_string(),
            },
            Rejection::PersistenceFailure("disk full".into()),
        ];
        let mut labels: Vec<_> = samples.iter().map(rejection_label).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), samples.len());
    }
}
