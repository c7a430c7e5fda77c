//! Baseline D array products through the in-memory array source.

use l2_parser::columnar::tables::{FIRST_INDEX, MPH_ATTRIBUTES, SPH_ATTRIBUTES, VALID_COUNT};
use l2_parser::{
    decode_arrays, decode_columnar, ArraySource, ArrayVariable, ColumnData, DecodeOptions,
    FieldGroup, L2Error, MemoryArraySource,
};
use test_utils::{assert_approx_eq, filenames, synthetic_array_source};

#[test]
fn test_ranges_reconstruct_into_slots() {
    let source = synthetic_array_source(&[3, 4]);
    let decoded = decode_arrays(&source).unwrap();
    let records = &decoded.records;

    assert_eq!(records.n_records(), 2);
    assert_eq!(records.slots(), 20);
    assert_eq!(records.record(0).unwrap().n_valid(), 3);
    assert_eq!(records.record(1).unwrap().n_valid(), 4);

    // lat_poca_20_ku holds the flat sample index
    let r0: Vec<f64> = records
        .record(0)
        .unwrap()
        .valid_sub_records()
        .map(|s| s.value("Lat").unwrap())
        .collect();
    assert_eq!(r0, vec![0.0, 1.0, 2.0]);
    let r1: Vec<f64> = records
        .record(1)
        .unwrap()
        .valid_sub_records()
        .map(|s| s.value("Lat").unwrap())
        .collect();
    assert_eq!(r1, vec![3.0, 4.0, 5.0, 6.0]);

    let flat = records.mask().flat();
    assert_eq!(flat.iter().filter(|v| **v).count(), 7);
    assert!(flat[..3].iter().all(|v| *v));
    assert!(!flat[3]);
    assert!(flat[20..24].iter().all(|v| *v));
    assert!(!flat[24]);
}

#[test]
fn test_counts_above_twenty_widen_slots() {
    let source = synthetic_array_source(&[25, 2]);
    let decoded = decode_arrays(&source).unwrap();
    assert_eq!(decoded.records.slots(), 25);
    assert_eq!(decoded.records.record(0).unwrap().n_valid(), 25);
    let last = decoded.records.record(0).unwrap().sub_record(24).unwrap();
    assert!(last.is_valid());
    assert_eq!(last.value("Lat"), Some(24.0));
}

#[test]
fn test_time_split_and_delta() {
    let source = synthetic_array_source(&[3]);
    let decoded = decode_arrays(&source).unwrap();
    let record = decoded.records.record(0).unwrap();

    assert_eq!(record.value(FieldGroup::Data1Hz, "Day"), Some(5000.0));
    assert_eq!(record.value(FieldGroup::Data1Hz, "Second"), Some(10.0));
    assert_eq!(record.value(FieldGroup::Data1Hz, "Micsec"), Some(250_000.0));

    let delta = record.sub_record(2).unwrap().value("D_time_mics").unwrap();
    assert_approx_eq!(delta, 100_000.0, 1.0);
}

#[test]
fn test_attributes_become_headers() {
    let mut source = synthetic_array_source(&[1]);
    source.insert_attribute("xref_sea_ice", "SEA_ICE.nc");

    let decoded = decode_arrays(&source).unwrap();
    let headers = &decoded.headers;
    assert_eq!(headers.mph.len(), MPH_ATTRIBUTES.len());
    assert_eq!(headers.mph.value("ABS_ORBIT"), Some("19847"));
    assert_eq!(headers.mph.value("DOI"), Some("DOI value"));
    assert_eq!(headers.sph.value("SEA_ICE_FILE"), Some("SEA_ICE.nc"));
    assert!(headers.sph.value("DEM_MODEL_FILE").is_none());
    assert_eq!(headers.sph.len(), SPH_ATTRIBUTES.len() + 1);
    assert!(headers.dsd.is_empty());

    let orbit = decoded
        .records
        .column(FieldGroup::Data1Hz, "Abs_Orbit")
        .unwrap();
    assert_eq!(orbit.data, ColumnData::U32(vec![19847]));
    let ascending = decoded
        .records
        .column(FieldGroup::Data1Hz, "Ascending_flag")
        .unwrap();
    assert_eq!(ascending.data, ColumnData::Bool(vec![true]));
}

#[test]
fn test_missing_required_attribute() {
    let mut source = synthetic_array_source(&[1]);
    source.remove_attribute("xref_geoid");
    let err = decode_arrays(&source).unwrap_err();
    assert!(matches!(err, L2Error::MissingData(msg) if msg.contains("xref_geoid")));
}

#[test]
fn test_range_past_array_end() {
    let mut source = synthetic_array_source(&[3, 4]);
    source.insert_variable(FIRST_INDEX, ArrayVariable::new(vec![0.0, 5.0]));
    let err = decode_arrays(&source).unwrap_err();
    assert!(matches!(err, L2Error::InvalidFormat(_)));
}

#[test]
fn test_count_length_mismatch() {
    let mut source = synthetic_array_source(&[3, 4]);
    source.insert_variable(VALID_COUNT, ArrayVariable::new(vec![3.0]));
    assert!(matches!(
        decode_arrays(&source),
        Err(L2Error::InvalidFormat(_))
    ));
}

#[test]
fn test_unpack_uses_scale_factor_attribute() {
    let source = synthetic_array_source(&[3, 4]);
    let packed = decode_columnar(filenames::SIN_D, &source, &DecodeOptions::default()).unwrap();
    let unpacked = decode_columnar(filenames::SIN_D, &source, &DecodeOptions::unpacked()).unwrap();

    let lat = |p: &l2_parser::L2Product| {
        p.records
            .record(1)
            .unwrap()
            .sub_record(1)
            .unwrap()
            .value("Lat")
            .unwrap()
    };
    assert_eq!(lat(&packed), 4.0);
    assert_eq!(lat(&unpacked), 4.0 * 1e-7);

    // No scale_factor attribute: untouched
    let elev = unpacked.records.record(0).unwrap().sub_record(2).unwrap();
    assert_eq!(elev.value("Elev_1"), Some(4.0));
}

#[test]
fn test_days_j2k_from_columnar_time() {
    let source = synthetic_array_source(&[2]);
    let product = decode_columnar(filenames::SIN_D, &source, &DecodeOptions::default()).unwrap();
    let record = product.records.record(0).unwrap();

    let first = record.sub_record(0).unwrap().value("days_J2k").unwrap();
    let second = record.sub_record(1).unwrap().value("days_J2k").unwrap();
    // 0.05 s apart
    assert_approx_eq!((second - first) * 86400.0, 0.05, 1e-5);
    // Day 5000 (September 2013): 19 s GPS offset plus 16 leap seconds
    let expected = 5000.0 + (10.25 - 19.0 - 16.0) / 86400.0;
    assert_approx_eq!(first, expected, 1e-8);
    assert!(record.sub_record(2).unwrap().value("days_J2k").unwrap().is_nan());
}

#[test]
fn test_record_count_from_time_variable() {
    let source = MemoryArraySource::new().with_variable("time_cor_01", vec![0.0; 5]);
    assert_eq!(source.record_count().unwrap(), 5);
    assert!(MemoryArraySource::new().record_count().is_err());
}
