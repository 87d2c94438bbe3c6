use crate::model::*;

// ── Occupancy ─────────────────────────────────────────────────────

/// Stays of `room_id`, sorted and merged into disjoint ranges.
/// Inverted or zero-length stored stays are ignored.
pub fn booked_ranges(room_id: u32, records: &[ReservationRecord]) -> Vec<StayRange> {
    let mut stays: Vec<StayRange> = records
        .iter()
        .filter(|r| r.room_id == room_id)
        .map(ReservationRecord::stay)
        .filter(|s| !s.is_empty())
        .collect();
    stays.sort_by_key(|s| s.start);
    merge_overlapping(&stays)
}

/// Gaps inside `window` not covered by any booked stay of `room_id`.
pub fn free_ranges(room_id: u32, records: &[ReservationRecord], window: &StayRange) -> Vec<StayRange> {
    if window.is_empty() {
        return Vec::new();
    }
    subtract_ranges(&[*window], &booked_ranges(room_id, records))
}

/// Merge sorted stays into disjoint ranges. Back-to-back stays, where one
/// checks out the day the next checks in, join into one range.
pub fn merge_overlapping(sorted: &[StayRange]) -> Vec<StayRange> {
    let mut merged: Vec<StayRange> = Vec::new();
    for &stay in sorted {
        if let Some(last) = merged.last_mut()
            && stay.start <= last.end
        {
            last.end = last.end.max(stay.end);
            continue;
        }
        merged.push(stay);
    }
    merged
}

/// Nights of `windows` not covered by `booked`.
///
/// Every range is half-open in calendar days: a window `[d1, d2)` offers
/// the nights d1..d2-1, and a booking ending on day X leaves night X free.
/// Both slices are sorted by start; `booked` must be disjoint, as returned
/// by [`merge_overlapping`]. Returned gaps are never empty.
pub fn subtract_ranges(windows: &[StayRange], booked: &[StayRange]) -> Vec<StayRange> {
    let mut gaps = Vec::new();
    let mut next = 0;

    for window in windows {
        // Bookings checked out before this window opens cannot cut it.
        while booked.get(next).is_some_and(|b| b.end <= window.start) {
            next += 1;
        }

        let mut free_from = window.start;
        for stay in booked[next..].iter().take_while(|b| b.start < window.end) {
            if free_from < stay.start {
                gaps.push(StayRange::new(free_from, stay.start));
            }
            free_from = free_from.max(stay.end);
        }
        if free_from < window.end {
            gaps.push(StayRange::new(free_from, window.end));
        }
    }

    gaps
}
