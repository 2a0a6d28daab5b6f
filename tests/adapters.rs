use chrono::{NaiveDate, NaiveTime, Timelike};
use context_codec::adapter::{
    format_local_time, format_locale, format_sql_date, format_sql_time, format_sql_timestamp,
    parse_local_time, parse_locale, parse_sql_date, parse_sql_time, parse_sql_timestamp,
};
use context_codec::pool::{BufferPool, BUFFER_CAPACITY, MAX_POOLED};
use context_codec::{Error, Locale};

// ---- sql date ---------------------------------------------------------------

#[test]
fn sql_date_canonical_form() {
    let date = NaiveDate::from_ymd_opt(2023, 7, 5).unwrap();
    assert_eq!(format_sql_date(&date), "2023-07-05");
    assert_eq!(parse_sql_date("2023-07-05").unwrap(), date);
}

#[test]
fn sql_date_rejects_time_component() {
    assert!(matches!(
        parse_sql_date("2023-07-05T10:00:00"),
        Err(Error::Schema(_))
    ));
}

// ---- sql time ---------------------------------------------------------------

#[test]
fn sql_time_canonical_form() {
    let time = NaiveTime::from_hms_opt(10, 15, 30).unwrap();
    assert_eq!(format_sql_time(&time), "10:15:30");
    assert_eq!(parse_sql_time("10:15:30").unwrap(), time);
}

#[test]
fn sql_time_has_no_fraction() {
    let time = NaiveTime::from_hms_milli_opt(10, 15, 30, 250).unwrap();
    assert_eq!(format_sql_time(&time), "10:15:30");
}

// ---- sql timestamp ----------------------------------------------------------

#[test]
fn timestamp_keeps_nanosecond_precision() {
    let ts = NaiveDate::from_ymd_opt(2023, 7, 5)
        .unwrap()
        .and_hms_nano_opt(10, 15, 30, 123_456_789)
        .unwrap();
    let text = format_sql_timestamp(&ts);
    assert_eq!(text, "2023-07-05 10:15:30.123456789");
    assert_eq!(parse_sql_timestamp(&text).unwrap(), ts);
}

#[test]
fn timestamp_trims_trailing_zeros_but_keeps_one_digit() {
    let whole = NaiveDate::from_ymd_opt(2023, 7, 5)
        .unwrap()
        .and_hms_opt(10, 15, 30)
        .unwrap();
    assert_eq!(format_sql_timestamp(&whole), "2023-07-05 10:15:30.0");

    let millis = whole.with_nanosecond(120_000_000);
    assert_eq!(
        format_sql_timestamp(&millis.unwrap()),
        "2023-07-05 10:15:30.12"
    );
}

#[test]
fn timestamp_parses_without_fraction() {
    let ts = parse_sql_timestamp("2023-07-05 10:15:30").unwrap();
    assert_eq!(format_sql_timestamp(&ts), "2023-07-05 10:15:30.0");
}

// ---- local time -------------------------------------------------------------

#[test]
fn local_time_keeps_fraction() {
    let time = NaiveTime::from_hms_milli_opt(10, 15, 30, 250).unwrap();
    let text = format_local_time(&time);
    assert_eq!(text, "10:15:30.250");
    assert_eq!(parse_local_time(&text).unwrap(), time);
}

// ---- locale -----------------------------------------------------------------

#[test]
fn locale_component_forms() {
    assert_eq!(format_locale(&Locale::new("de")), "de");
    assert_eq!(format_locale(&Locale::with_country("de", "CH")), "de_CH");
    assert_eq!(
        format_locale(&Locale::with_variant("de", "CH", "1996")),
        "de_CH_1996"
    );

    assert_eq!(parse_locale("de").unwrap(), Locale::new("de"));
    assert_eq!(
        parse_locale("de_CH").unwrap(),
        Locale::with_country("de", "CH")
    );
    assert_eq!(
        parse_locale("de_CH_1996").unwrap(),
        Locale::with_variant("de", "CH", "1996")
    );
}

#[test]
fn locale_leading_underscore_is_invalid() {
    assert!(matches!(
        parse_locale("_CH"),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn locale_with_too_many_components_is_invalid() {
    assert!(matches!(
        parse_locale("de_CH_1996_extra"),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn empty_locale_is_invalid() {
    assert!(matches!(parse_locale(""), Err(Error::InvalidArgument(_))));
}

// ---- buffer pool ------------------------------------------------------------

#[test]
fn take_returns_empty_buffer_with_fixed_capacity() {
    let pool = BufferPool::new();
    let buf = pool.take();
    assert!(buf.is_empty());
    assert_eq!(buf.capacity(), BUFFER_CAPACITY);
    pool.recycle(buf);
    assert_eq!(pool.pooled(), 1);
}

#[test]
fn recycled_buffer_is_reused() {
    let pool = BufferPool::new();
    let mut buf = pool.take();
    buf.extend_from_slice(b"scratch");
    pool.recycle(buf);
    assert_eq!(pool.pooled(), 1);

    let again = pool.take();
    assert!(again.is_empty(), "recycled buffers come back cleared");
    assert_eq!(pool.pooled(), 0);
}

#[test]
fn saturated_pool_drops_recycled_buffers() {
    let pool = BufferPool::new();
    for _ in 0..(MAX_POOLED + 4) {
        pool.recycle(Vec::with_capacity(BUFFER_CAPACITY));
    }
    assert_eq!(pool.pooled(), MAX_POOLED);
}

#[test]
fn grown_buffers_are_not_pooled() {
    let pool = BufferPool::new();
    pool.recycle(Vec::with_capacity(BUFFER_CAPACITY * 4));
    assert_eq!(pool.pooled(), 0);
}
