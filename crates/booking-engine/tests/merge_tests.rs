//! Tests for the buffer/merge stage.

use booking_engine::interval::{pad_and_merge, BusyEvent, TimeInterval};
use chrono::{DateTime, TimeZone, Utc};

/// Helper to create a BusyEvent on 2025-06-01 from hour/minute bounds.
fn busy(start_hour: u32, start_min: u32, end_hour: u32, end_min: u32) -> BusyEvent {
    let start = Utc
        .with_ymd_and_hms(2025, 6, 1, start_hour, start_min, 0)
        .unwrap();
    let end = Utc
        .with_ymd_and_hms(2025, 6, 1, end_hour, end_min, 0)
        .unwrap();
    BusyEvent::new(TimeInterval::new(start, end).unwrap(), None)
}

fn day_bounds() -> (DateTime<Utc>, DateTime<Utc>) {
    (
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(),
    )
}

#[test]
fn empty_input_yields_empty_list() {
    let (start, end) = day_bounds();
    let merged = pad_and_merge(&[], start, end, 15);
    assert!(merged.is_empty(), "no busy events means no busy intervals");
}

#[test]
fn single_event_padded_symmetrically() {
    // 10:00-11:00 with 15-min buffer → 09:45-11:15
    let (start, end) = day_bounds();
    let merged = pad_and_merge(&[busy(10, 0, 11, 0)], start, end, 15);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].start, Utc.with_ymd_and_hms(2025, 6, 1, 9, 45, 0).unwrap());
    assert_eq!(merged[0].end, Utc.with_ymd_and_hms(2025, 6, 1, 11, 15, 0).unwrap());
}

#[test]
fn overlapping_padded_events_merge_into_one() {
    // 09:00-10:00 and 10:10-11:00 with 15-min buffer pad to 08:45-10:15 and
    // 09:55-11:15, which overlap → single 08:45-11:15
    let (start, end) = day_bounds();
    let merged = pad_and_merge(&[busy(9, 0, 10, 0), busy(10, 10, 11, 0)], start, end, 15);

    assert_eq!(merged.len(), 1, "overlapping padded intervals must fuse");
    assert_eq!(merged[0].start, Utc.with_ymd_and_hms(2025, 6, 1, 8, 45, 0).unwrap());
    assert_eq!(merged[0].end, Utc.with_ymd_and_hms(2025, 6, 1, 11, 15, 0).unwrap());
}

#[test]
fn touching_padded_events_merge() {
    // 09:00-10:00 and 10:30-11:00 with 15-min buffer pad to 08:45-10:15 and
    // 10:15-11:15 — touching exactly at 10:15, which must still merge: a gap
    // shorter than the round-trip buffer is not usable.
    let (start, end) = day_bounds();
    let merged = pad_and_merge(&[busy(9, 0, 10, 0), busy(10, 30, 11, 0)], start, end, 15);

    assert_eq!(merged.len(), 1, "touching padded intervals must fuse");
    assert_eq!(merged[0].start, Utc.with_ymd_and_hms(2025, 6, 1, 8, 45, 0).unwrap());
    assert_eq!(merged[0].end, Utc.with_ymd_and_hms(2025, 6, 1, 11, 15, 0).unwrap());
}

#[test]
fn disjoint_events_stay_separate() {
    let (start, end) = day_bounds();
    let merged = pad_and_merge(&[busy(9, 0, 10, 0), busy(14, 0, 15, 0)], start, end, 15);

    assert_eq!(merged.len(), 2);
    assert!(merged[0].end < merged[1].start, "a real gap must remain");
}

#[test]
fn unsorted_input_is_sorted_before_merging() {
    let (start, end) = day_bounds();
    let merged = pad_and_merge(&[busy(14, 0, 15, 0), busy(9, 0, 10, 0)], start, end, 0);

    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].start, Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap());
    assert_eq!(merged[1].start, Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap());
}

#[test]
fn events_clipped_to_range() {
    // Event spilling past both ends of the range is clipped to it.
    let range_start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
    let range_end = Utc.with_ymd_and_hms(2025, 6, 1, 17, 0, 0).unwrap();
    let merged = pad_and_merge(&[busy(7, 0, 18, 0)], range_start, range_end, 15);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].start, range_start);
    assert_eq!(merged[0].end, range_end);
}

#[test]
fn events_outside_range_discarded() {
    let range_start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
    let range_end = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let merged = pad_and_merge(&[busy(14, 0, 15, 0)], range_start, range_end, 15);

    assert!(merged.is_empty(), "padded event beyond the range is invisible");
}

#[test]
fn merging_a_merged_list_is_idempotent() {
    let (start, end) = day_bounds();
    let merged = pad_and_merge(
        &[busy(9, 0, 10, 0), busy(9, 30, 11, 0), busy(14, 0, 15, 0)],
        start,
        end,
        15,
    );

    // Re-merge the output with a zero buffer — it must come back unchanged.
    let as_events: Vec<BusyEvent> = merged
        .iter()
        .map(|i| BusyEvent::new(*i, None))
        .collect();
    let remerged = pad_and_merge(&as_events, start, end, 0);

    assert_eq!(remerged, merged, "merge must be idempotent");
}
