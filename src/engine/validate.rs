use chrono::NaiveDate;

use crate::config::BookingConfig;
use crate::model::*;

use super::Rejection;

/// Parse strict `YYYY-MM-DD`: four-digit year, two-digit month and day,
/// hyphen separated, and a day that exists on the calendar.
pub fn parse_canonical_date(raw: &str) -> Option<NaiveDate> {
    let b = raw.as_bytes();
    if b.len() != 10 || b[4] != b'-' || b[7] != b'-' {
        return None;
    }
    let digits = |r: std::ops::Range<usize>| -> Option<u32> {
        let part = &b[r];
        if !part.iter().all(u8::is_ascii_digit) {
            return None;
        }
        Some(part.iter().fold(0, |acc, d| acc * 10 + u32::from(d - b'0')))
    };
    let year = digits(0..4)?;
    let month = digits(5..7)?;
    let day = digits(8..10)?;
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn required_date(raw: Option<&str>, field: Field) -> Result<&str, Rejection> {
    match raw {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(Rejection::MissingDate(field)),
    }
}

/// Run the booking pipeline against the current reservations.
///
/// Checks run in a fixed order and the first failure wins: capacity,
/// name, email, date presence, date format, minimum date, ordering,
/// overlap. Returns the accepted stay; nothing is written.
pub fn evaluate(
    config: &BookingConfig,
    existing: &[ReservationRecord],
    request: &BookingRequest,
) -> Result<StayRange, Rejection> {
    if let Some(limit) = config.max_total_reservations
        && existing.len() >= limit
    {
        return Err(Rejection::CapacityExhausted { limit });
    }

    if request.full_name.trim().is_empty() {
        return Err(Rejection::MissingField(Field::FullName));
    }
    if request.email.trim().is_empty() {
        return Err(Rejection::MissingField(Field::Email));
    }

    let raw_in = required_date(request.check_in.as_deref(), Field::CheckIn)?;
    let raw_out = required_date(request.check_out.as_deref(), Field::CheckOut)?;

    let check_in =
        parse_canonical_date(raw_in).ok_or(Rejection::InvalidDateFormat(Field::CheckIn))?;
    let check_out =
        parse_canonical_date(raw_out).ok_or(Rejection::InvalidDateFormat(Field::CheckOut))?;

    let min = config.min_check_in;
    if check_in < min {
        return Err(Rejection::DateTooEarly {
            field: Field::CheckIn,
            min,
        });
    }
    if check_out < min {
        return Err(Rejection::DateTooEarly {
            field: Field::CheckOut,
            min,
        });
    }

    if check_out <= check_in {
        return Err(Rejection::InvalidRange {
            check_in,
            check_out,
        });
    }

    let stay = StayRange::new(check_in, check_out);
    check_no_clash(config.room.id, existing, &stay)?;
    Ok(stay)
}

/// Any existing stay in the same room overlapping `stay` is a clash.
pub(crate) fn check_no_clash(
    room_id: u32,
    existing: &[ReservationRecord],
    stay: &StayRange,
) -> Result<(), Rejection> {
    match existing
        .iter()
        .find(|r| r.room_id == room_id && r.stay().overlaps(stay))
    {
        Some(r) => Err(Rejection::DateClash {
            existing: r.id.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_dates_parse() {
        assert_eq!(
            parse_canonical_date("2026-03-01"),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
        assert_eq!(
            parse_canonical_date("2028-02-29"),
            NaiveDate::from_ymd_opt(2028, 2, 29)
        );
    }

    #[test]
    fn non_canonical_dates_rejected() {
        for raw in [
            "2026-3-01",
            "2026-03-1",
            "26-03-01",
            "2026/03/01",
            "01-03-2026",
            "2026-03-01T00:00",
            " 2026-03-01",
            "2026-13-01",
            "2026-02-29",
            "2026-04-31",
            "2026-00-10",
            "+026-03-01",
            "2026-0a-01",
            "",
        ] {
            assert_eq!(parse_canonical_date(raw), None, "{raw:?} should not parse");
        }
    }
}
