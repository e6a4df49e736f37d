use super::*;

#[test]
fn test_decomposes_known_timestamp() {
    // 2018-11-03 01:19:13.796 UTC, a Saturday
    let row = TimeRow::from_millis(1541207953796).unwrap();
    assert_eq!(
        row,
        TimeRow {
            start_time: 1541207953796,
            hour: 1,
            day: 3,
            week: 44,
            month: 11,
            year: 2018,
            weekday: 5,
        }
    );
}

#[test]
fn test_epoch_is_thursday_week_one() {
    let row = TimeRow::from_millis(0).unwrap();
    assert_eq!(row.year, 1970);
    assert_eq!(row.week, 1);
    assert_eq!(row.weekday, 3);
    assert_eq!(row.hour, 0);
}

#[test]
fn test_iso_week_wraps_into_next_year() {
    // 2018-12-31 is a Monday in ISO week 1 of 2019; the calendar year stays 2018
    let row = TimeRow::from_millis(1546214400000).unwrap();
    assert_eq!(row.year, 2018);
    assert_eq!(row.month, 12);
    assert_eq!(row.day, 31);
    assert_eq!(row.week, 1);
    assert_eq!(row.weekday, 0);
}

#[test]
fn test_iso_week_from_previous_year() {
    // 2021-01-01 is a Friday in ISO week 53 of 2020
    let row = TimeRow::from_millis(1609459200000).unwrap();
    assert_eq!(row.year, 2021);
    assert_eq!(row.week, 53);
    assert_eq!(row.weekday, 4);
}

#[test]
fn test_negative_timestamp_before_epoch() {
    let row = TimeRow::from_millis(-1).unwrap();
    assert_eq!(row.year, 1969);
    assert_eq!(row.hour, 23);
}

#[test]
fn test_out_of_range_timestamp() {
    assert!(TimeRow::from_millis(i64::MAX).is_none());
    let err = TimeRow::parse(i64::MAX, 7).unwrap_err();
    assert!(matches!(
        err,
        EtlError::InvalidField { field: "ts", line: 7, .. }
    ));
}
