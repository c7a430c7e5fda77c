//! Products carrying MPH/SPH/DSD headers.

use bytes::Bytes;
use l2_parser::header::{parse_dsd, parse_mph, parse_sph, MPH_LINES};
use l2_parser::{
    decode_dbl, Baseline, ColumnData, DecodeOptions, FieldGroup, HeaderEntry, L2Error,
    ProductHeaders, RecordLayout,
};
use test_utils::{data_sets, filenames, synthetic_payload, ProductHeaderBuilder};

fn mph_text(lines: &[&str]) -> Vec<u8> {
    let mut text = String::new();
    for i in 0..MPH_LINES {
        text.push_str(lines.get(i).copied().unwrap_or(""));
        text.push('\n');
    }
    text.into_bytes()
}

#[test]
fn test_mph_round_trip() {
    let data = mph_text(&[
        "PRODUCT=\"CS_OFFL_SIR_SIN_2__20140101T001425_20140101T001853_C001.DBL  \"",
        "PROC_STAGE=O   ",
        "REF_DOC=\"CS-RS-ACS-GS-5106 5.0\"",
        "",
        "no separator on this line",
        "ABS_ORBIT=+19847",
        "SOFTWARE_VER=\"SIR_L2/5.0 \"trailing",
    ]);
    let mph = parse_mph(&data).unwrap();

    assert_eq!(
        mph.value("PRODUCT"),
        Some("CS_OFFL_SIR_SIN_2__20140101T001425_20140101T001853_C001.DBL")
    );
    assert_eq!(mph.value("PROC_STAGE"), Some("O"));
    assert_eq!(mph.value("REF_DOC"), Some("CS-RS-ACS-GS-5106 5.0"));
    assert_eq!(mph.value("ABS_ORBIT"), Some("+19847"));
    assert_eq!(mph.numeric("ABS_ORBIT"), Some(19847));
    // Quoted values run to the last quote on the line
    assert_eq!(mph.value("SOFTWARE_VER"), Some("SIR_L2/5.0"));
    assert_eq!(mph.len(), 5);
}

#[test]
fn test_mph_rejects_bad_first_line() {
    let data = mph_text(&["PRODUCT=CS_UNQUOTED"]);
    let err = parse_mph(&data).unwrap_err();
    assert!(matches!(
        err,
        L2Error::InvalidHeader {
            block: "MPH",
            line: 0,
            ..
        }
    ));
}

#[test]
fn test_mph_too_short() {
    let err = parse_mph(b"PRODUCT=\"X\"\nA=1\n").unwrap_err();
    assert!(matches!(err, L2Error::InvalidHeader { block: "MPH", .. }));
}

#[test]
fn test_sph_groups_and_noise() {
    let mut data = mph_text(&["PRODUCT=\"X\""]);
    let sph = "\n\
SPH_DESCRIPTOR=\"SIR_SIN_L2 SPECIFIC HEADER\"\n\
ASCENDING_FLAG=A\n\
DS_NAME=\"SIR_L1B_PRODUCT   \"\n\
DS_TYPE=R\n\
FILENAME=\"CS_OFFL_SIR_SIN_1B.DBL\"\n\
DS_OFFSET=+00000000000000000000<bytes>\n\
DS_SIZE=+00000000000000000000<bytes>\n\
NUM_DSR=+0000000000\n\
DSR_SIZE=+0000000000<bytes>\n\
BYTE_ORDER=0123\n";
    data.extend_from_slice(sph.as_bytes());
    data.extend_from_slice(b"BAD=\x01\x02\n");

    let block = parse_sph(&data, sph.len() + 8).unwrap();
    assert_eq!(block.value("ASCENDING_FLAG"), Some("A"));
    assert_eq!(block.value("BYTE_ORDER"), Some("0123"));
    assert!(block.get("BAD").is_none());

    let group = block.group("SIR_L1B_PRODUCT").expect("nested data set");
    assert_eq!(group.len(), 6);
    assert_eq!(group.value("DS_TYPE"), Some("R"));
    assert_eq!(group.numeric("DSR_SIZE"), Some(0));
    assert!(matches!(
        block.get("SIR_L1B_PRODUCT"),
        Some(HeaderEntry::Group(_))
    ));
}

#[test]
fn test_sph_requires_descriptor() {
    let mut data = mph_text(&["PRODUCT=\"X\""]);
    data.extend_from_slice(b"\nNOT_A_DESCRIPTOR=1\n");
    let err = parse_sph(&data, 100).unwrap_err();
    assert!(matches!(err, L2Error::InvalidHeader { block: "SPH", .. }));
}

#[test]
fn test_dsd_priority_and_missing() {
    let mut data = mph_text(&["PRODUCT=\"X\""]);
    let dsd = "DS_NAME=\"SIR_SAR_L2B \"\nDS_TYPE=M\nFILENAME=\"\"\nDS_OFFSET=+1<bytes>\n\
DS_SIZE=+0<bytes>\nNUM_DSR=+0\nDSR_SIZE=+980<bytes>\nBYTE_ORDER=0123\n";
    data.extend_from_slice(dsd.as_bytes());
    let block = parse_dsd(&data).unwrap();
    assert_eq!(block.value("DS_NAME"), Some("SIR_SAR_L2B"));
    assert_eq!(block.len(), 8);

    let bare = mph_text(&["PRODUCT=\"X\""]);
    assert!(matches!(
        parse_dsd(&bare),
        Err(L2Error::MissingDatasetDescriptor)
    ));
}

#[test]
fn test_decode_with_headers() {
    let layout = RecordLayout::for_baseline(Baseline::C).unwrap();
    let payload = synthetic_payload(&layout, &[20, 12, 20, 1]);
    let product = ProductHeaderBuilder::new(filenames::SIN_C, data_sets::SIN)
        .abs_orbit(20001)
        .ascending(false)
        .records(layout.record_size(), 4)
        .build_product(&payload);

    let decoded = decode_dbl(filenames::SIN_C, Bytes::from(product), &DecodeOptions::default())
        .expect("Failed to decode product with headers");

    let headers = decoded.headers.as_ref().expect("headers parsed");
    assert_eq!(headers.dsd.value("DS_NAME"), Some("SIR_SIN_L2"));
    assert_eq!(headers.dsd.numeric("NUM_DSR"), Some(4));
    assert!(headers.sph.group("SIR_L1B_PRODUCT").is_some());
    assert!(headers.sph.group("SIR_SIN_L2").is_some());

    assert_eq!(decoded.n_records(), 4);
    assert_eq!(decoded.records.record(1).unwrap().n_valid(), 12);
    assert_eq!(decoded.records.record(3).unwrap().n_valid(), 1);

    let orbit = decoded
        .records
        .column(FieldGroup::Data1Hz, "Abs_Orbit")
        .unwrap();
    assert_eq!(orbit.data, ColumnData::U32(vec![20001; 4]));
    let ascending = decoded
        .records
        .column(FieldGroup::Data1Hz, "Ascending_flag")
        .unwrap();
    assert_eq!(ascending.data, ColumnData::Bool(vec![false; 4]));
}

#[test]
fn test_ascending_flag_set() {
    let layout = RecordLayout::for_baseline(Baseline::A).unwrap();
    let payload = synthetic_payload(&layout, &[20, 20]);
    let product = ProductHeaderBuilder::new(filenames::SAR_A, data_sets::SAR)
        .records(layout.record_size(), 2)
        .build_product(&payload);

    let decoded =
        decode_dbl(filenames::SAR_A, Bytes::from(product), &DecodeOptions::unpacked()).unwrap();
    let ascending = decoded
        .records
        .column(FieldGroup::Data1Hz, "Ascending_flag")
        .unwrap();
    // Boolean columns survive unit scaling untouched
    assert_eq!(ascending.data, ColumnData::Bool(vec![true; 2]));
}

#[test]
fn test_payload_exceeding_file_is_rejected() {
    let layout = RecordLayout::for_baseline(Baseline::C).unwrap();
    let payload = synthetic_payload(&layout, &[20, 20]);
    // Header declares three records, file holds two
    let product = ProductHeaderBuilder::new(filenames::SIN_C, data_sets::SIN)
        .records(layout.record_size(), 3)
        .build_product(&payload);
    let size = product.len();

    let err = decode_dbl(filenames::SIN_C, Bytes::from(product), &DecodeOptions::default())
        .unwrap_err();
    match err {
        L2Error::PayloadOverflow { expected, actual } => {
            assert_eq!(actual, size as u64);
            assert_eq!(expected, actual + layout.record_size() as u64);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_zero_record_size_cannot_claim_records() {
    let layout = RecordLayout::for_baseline(Baseline::C).unwrap();
    let payload = synthetic_payload(&layout, &[20]);
    // DSR_SIZE=0 makes the declared payload empty whatever NUM_DSR says
    let product = ProductHeaderBuilder::new(filenames::SIN_C, data_sets::SIN)
        .records(0, 9_000_000_000)
        .build_product(&payload);

    let err = decode_dbl(filenames::SIN_C, Bytes::from(product), &DecodeOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        L2Error::Truncated {
            record: 1,
            needed: 1392,
            remaining: 0
        }
    ));
}

#[test]
fn test_record_size_mismatch_uses_layout_size() {
    let layout = RecordLayout::for_baseline(Baseline::C).unwrap();
    let payload = synthetic_payload(&layout, &[20, 20]);

    // Declared size is smaller than the layout, records still fit
    let product = ProductHeaderBuilder::new(filenames::SIN_C, data_sets::SIN)
        .records(980, 2)
        .build_product(&payload);
    let decoded =
        decode_dbl(filenames::SIN_C, Bytes::from(product), &DecodeOptions::default()).unwrap();
    assert_eq!(decoded.n_records(), 2);

    // Declared payload fits in the file, layout-sized records do not
    let product = ProductHeaderBuilder::new(filenames::SIN_C, data_sets::SIN)
        .records(100, 10)
        .build_product(&payload);
    let err = decode_dbl(filenames::SIN_C, Bytes::from(product), &DecodeOptions::default())
        .unwrap_err();
    assert!(matches!(err, L2Error::Truncated { record: 2, .. }));
}

#[test]
fn test_header_counts_near_i64_max() {
    let layout = RecordLayout::for_baseline(Baseline::C).unwrap();
    let payload = synthetic_payload(&layout, &[20]);
    let product = ProductHeaderBuilder::new(filenames::SIN_C, data_sets::SIN)
        .records(layout.record_size(), i64::MAX as usize)
        .build_product(&payload);
    let size = product.len();

    let err = decode_dbl(filenames::SIN_C, Bytes::from(product), &DecodeOptions::default())
        .unwrap_err();
    match err {
        L2Error::PayloadOverflow { expected, actual } => {
            assert_eq!(expected, u64::MAX);
            assert_eq!(actual, size as u64);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_headers_serialize_nested() {
    let product = ProductHeaderBuilder::new(filenames::SIN_C, data_sets::SIN)
        .records(1392, 0)
        .build();
    let headers = ProductHeaders::parse(&product).unwrap();
    let json = serde_json::to_value(&headers).unwrap();
    assert_eq!(json["mph"]["ABS_ORBIT"], "+19847");
    assert_eq!(json["sph"]["SIR_SIN_L2"]["DS_TYPE"], "M");
    assert_eq!(json["dsd"]["BYTE_ORDER"], "0123");
}
