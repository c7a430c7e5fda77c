//! Time model: product time to GPS seconds and UTC days since J2000.
//!
//! Product timestamps count days, seconds and microseconds on the TAI
//! scale from 2000-01-01. They are moved onto the GPS scale (seconds since
//! 1980-01-06, 7300 days earlier and 19 s behind TAI), corrected by the
//! leap seconds accrued so far and expressed as fractional UTC days.

use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::debug;

use crate::error::{L2Error, L2Result};
use crate::layout::FieldGroup;
use crate::record::{Column, ColumnData, RecordSet};

/// Days from the GPS epoch (1980-01-06) to 2000-01-01.
pub const GPS_TO_J2000_DAYS: f64 = 7300.0;

/// TAI minus GPS, in seconds.
pub const TAI_GPS_OFFSET: f64 = 19.0;

pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Output column holding UTC days since J2000 per sub-record.
pub const DAYS_J2K_FIELD: &str = "days_J2k";

/// GPS instants at which a leap second accrues, 1981-07-01 to 2017-01-01.
///
/// Append-only and strictly increasing.
pub const LEAP_SECONDS: [f64; 18] = [
    46828800.0,
    78364801.0,
    109900802.0,
    173059203.0,
    252028804.0,
    315187205.0,
    346723206.0,
    393984007.0,
    425520008.0,
    457056009.0,
    504489610.0,
    551750411.0,
    599184012.0,
    820108813.0,
    914803214.0,
    1025136015.0,
    1119744016.0,
    1167264017.0,
];

/// Seconds since the GPS epoch.
pub fn gps_time(day: f64, second: f64, microsecond: f64) -> f64 {
    (day + GPS_TO_J2000_DAYS) * SECONDS_PER_DAY + second + microsecond / 1e6 - TAI_GPS_OFFSET
}

/// Leap seconds accrued at or before GPS time `t`.
pub fn count_leap_seconds(t: f64) -> usize {
    LEAP_SECONDS.partition_point(|&leap| leap <= t)
}

/// UTC days since J2000 for a GPS time.
pub fn utc_days(gps: f64) -> f64 {
    (gps - count_leap_seconds(gps) as f64) / SECONDS_PER_DAY - GPS_TO_J2000_DAYS
}

/// Calendar instant for UTC days since 2000-01-01T00:00:00Z.
///
/// `None` for non-finite input or values out of chrono's range.
pub fn days_to_datetime(days: f64) -> Option<DateTime<Utc>> {
    if !days.is_finite() {
        return None;
    }
    let micros = (days * SECONDS_PER_DAY * 1e6).round();
    if micros.abs() > i64::MAX as f64 {
        return None;
    }
    let epoch = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).single()?;
    epoch.checked_add_signed(Duration::microseconds(micros as i64))
}

/// Add the `days_J2k` column to `records`.
///
/// Every sub-record takes its parent's `Day` and `Second`, and
/// `Micsec + D_time_mics` as microseconds. Invalid slots hold NaN.
pub fn apply_time_model(records: &mut RecordSet) -> L2Result<()> {
    let low = |name: &str| {
        records
            .column(FieldGroup::Data1Hz, name)
            .map(|c| &c.data)
            .ok_or_else(|| L2Error::MissingData(format!("{}/{}", FieldGroup::Data1Hz.name(), name)))
    };
    let day = low("Day")?;
    let second = low("Second")?;
    let micsec = low("Micsec")?;
    let delta = records
        .column(FieldGroup::Data20Hz, "D_time_mics")
        .map(|c| &c.data)
        .ok_or_else(|| L2Error::MissingData("Data_20Hz/D_time_mics".to_string()))?;

    let slots = records.slots();
    let mask = records.mask();
    let mut days = vec![f64::NAN; records.n_records() * slots];

    for record in 0..records.n_records() {
        let d = day.get_f64(record).unwrap_or(f64::NAN);
        let s = second.get_f64(record).unwrap_or(f64::NAN);
        let us = micsec.get_f64(record).unwrap_or(f64::NAN);
        for slot in 0..mask.count(record) {
            let index = record * slots + slot;
            let dt = delta.get_f64(index).unwrap_or(f64::NAN);
            days[index] = utc_days(gps_time(d, s, us + dt));
        }
    }

    debug!(
        records = records.n_records(),
        valid = mask.total_valid(),
        "Computed UTC days since J2000"
    );

    records.insert(Column::new(
        DAYS_J2K_FIELD,
        FieldGroup::Data20Hz,
        ColumnData::F64(days),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gps_time_formula() {
        let t = gps_time(1.0, 10.0, 500_000.0);
        assert_eq!(t, (1.0 + 7300.0) * 86400.0 + 10.0 + 0.5 - 19.0);
    }

    #[test]
    fn test_leap_table_increasing() {
        assert!(LEAP_SECONDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_count_leap_seconds_boundaries() {
        assert_eq!(count_leap_seconds(0.0), 0);
        assert_eq!(count_leap_seconds(46828799.0), 0);
        assert_eq!(count_leap_seconds(46828800.0), 1);
        assert_eq!(count_leap_seconds(1167264016.9), 17);
        assert_eq!(count_leap_seconds(1167264017.0), 18);
        assert_eq!(count_leap_seconds(2.0e9), 18);
    }

    #[test]
    fn test_utc_days_j2000() {
        // 2000-01-01T00:00:00 TAI sits 32 s ahead of UTC: 19 s GPS offset plus 13 leaps
        let days = utc_days(gps_time(0.0, 0.0, 0.0));
        let expected = (-19.0 - 13.0) / 86400.0;
        assert!((days - expected).abs() < 1e-9);
    }

    #[test]
    fn test_days_to_datetime() {
        let dt = days_to_datetime(1.5).unwrap();
        assert_eq!(dt.to_rfc3339(), "2000-01-02T12:00:00+00:00");
        assert!(days_to_datetime(f64::NAN).is_none());
    }
}
