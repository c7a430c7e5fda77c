//! Generators for synthetic Level-2 products.
//!
//! These generators create predictable, verifiable products: binary
//! payloads laid out by a [`RecordLayout`], ASCII MPH/SPH/DSD headers
//! pointing at them, and in-memory array sources shaped like baseline D
//! files.

use bytes::BufMut;
use l2_parser::columnar::tables::{
    ABS_ORBIT_ATTRIBUTE, ASCENDING_FLAG_ATTRIBUTE, FIRST_INDEX, MPH_ATTRIBUTES,
    SPH_ATTRIBUTES, TIME_HIGH_RATE, TIME_LOW_RATE, VALID_COUNT,
};
use l2_parser::{ArrayVariable, FieldSpec, FieldType, MemoryArraySource, RecordLayout};

/// Predictable value for a field of record `record`, slot `slot`.
///
/// Calculated as `record * 1000 + slot`; low-rate fields use slot 0.
/// Stays within `i16` for fewer than 32 records.
pub fn pattern_value(record: usize, slot: usize) -> i64 {
    (record * 1000 + slot) as i64
}

/// `Day` written for record `record`.
pub fn pattern_day(record: usize) -> i64 {
    5000 + record as i64
}

/// `Second` written for record `record`.
pub fn pattern_second(record: usize) -> i64 {
    3600 + record as i64
}

/// `D_time_mics` written for slot `slot`: 50 ms apart.
pub fn pattern_delta(slot: usize) -> i64 {
    50_000 * slot as i64
}

/// Append `value` as a big-endian `ty`.
pub fn encode_value(out: &mut Vec<u8>, ty: FieldType, value: i64) {
    match ty {
        FieldType::I8 => out.put_i8(value as i8),
        FieldType::U8 => out.put_u8(value as u8),
        FieldType::I16 => out.put_i16(value as i16),
        FieldType::U16 => out.put_u16(value as u16),
        FieldType::I32 => out.put_i32(value as i32),
        FieldType::U32 => out.put_u32(value as u32),
        FieldType::I64 => out.put_i64(value),
        FieldType::U64 => out.put_u64(value as u64),
    }
}

/// Append one record, asking `value` for every field.
///
/// `value` receives the field and `None` for low-rate fields or
/// `Some(slot)` for high-rate ones. Spare fields are written as zero.
pub fn encode_record<F>(layout: &RecordLayout, out: &mut Vec<u8>, mut value: F)
where
    F: FnMut(&FieldSpec, Option<usize>) -> i64,
{
    for field in layout.low_rate_fields() {
        let v = if field.spare { 0 } else { value(field, None) };
        encode_value(out, field.ty, v);
    }
    for slot in 0..layout.blocks() {
        for field in layout.high_rate_fields() {
            let v = if field.spare { 0 } else { value(field, Some(slot)) };
            encode_value(out, field.ty, v);
        }
    }
}

/// Binary payload of `n_valid.len()` records with pattern values.
///
/// Record `r` has `Day = pattern_day(r)`, `Second = pattern_second(r)`,
/// `Micsec = 0`, `N_valid = n_valid[r]`, `D_time_mics = pattern_delta(slot)`
/// and `pattern_value(r, slot)` everywhere else.
///
/// # Example
///
/// ```
/// use l2_parser::{Baseline, RecordLayout};
/// use test_utils::synthetic_payload;
///
/// let layout = RecordLayout::for_baseline(Baseline::C).unwrap();
/// let payload = synthetic_payload(&layout, &[20, 5]);
/// assert_eq!(payload.len(), 2 * 1392);
/// ```
pub fn synthetic_payload(layout: &RecordLayout, n_valid: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(layout.record_size() * n_valid.len());
    for (record, &count) in n_valid.iter().enumerate() {
        encode_record(layout, &mut out, |field, slot| match (field.name, slot) {
            ("Day", None) => pattern_day(record),
            ("Second", None) => pattern_second(record),
            ("Micsec", None) => 0,
            ("N_valid", None) => count as i64,
            ("D_time_mics", Some(slot)) => pattern_delta(slot),
            (_, slot) => pattern_value(record, slot.unwrap_or(0)),
        });
    }
    out
}

/// Builder for MPH + SPH + DSD product headers.
///
/// All numeric header fields are fixed width, so the header length does
/// not depend on the values written.
#[derive(Debug, Clone)]
pub struct ProductHeaderBuilder {
    product: String,
    ds_name: String,
    abs_orbit: u32,
    ascending: bool,
    record_size: usize,
    record_count: usize,
    auxiliary: Vec<String>,
}

impl ProductHeaderBuilder {
    /// Headers for a product named `product` whose measurement data set
    /// is `ds_name` (e.g. `SIR_SIN_L2`).
    pub fn new(product: &str, ds_name: &str) -> Self {
        Self {
            product: product.to_string(),
            ds_name: ds_name.to_string(),
            abs_orbit: 19847,
            ascending: true,
            record_size: 0,
            record_count: 0,
            auxiliary: vec!["SIR_L1B_PRODUCT".to_string()],
        }
    }

    pub fn abs_orbit(mut self, orbit: u32) -> Self {
        self.abs_orbit = orbit;
        self
    }

    pub fn ascending(mut self, ascending: bool) -> Self {
        self.ascending = ascending;
        self
    }

    /// Declared `DSR_SIZE` and `NUM_DSR`.
    pub fn records(mut self, record_size: usize, record_count: usize) -> Self {
        self.record_size = record_size;
        self.record_count = record_count;
        self
    }

    /// Replace the auxiliary data sets listed before the measurement one.
    pub fn auxiliary<I: IntoIterator<Item = S>, S: Into<String>>(mut self, names: I) -> Self {
        self.auxiliary = names.into_iter().map(Into::into).collect();
        self
    }

    /// Header bytes; the payload starts right after them.
    pub fn build(&self) -> Vec<u8> {
        // Two passes: the first fixes the lengths, the second the offsets.
        let sph_len = self.sph(0).len();
        let mph_len = self.mph(0, 0).len();
        let mut pad = 0;
        // A header that is a whole number of records would read as headerless.
        while self.record_size > 0 && (mph_len + sph_len + pad) % self.record_size == 0 {
            pad += 1;
        }
        let sph = format!("{}{}", self.sph(mph_len + sph_len + pad), "\n".repeat(pad));
        let mph = self.mph(sph.len(), mph_len + sph.len());
        let mut out = mph.into_bytes();
        out.extend(sph.into_bytes());
        out
    }

    /// Header followed by `payload`.
    pub fn build_product(&self, payload: &[u8]) -> Vec<u8> {
        let mut out = self.build();
        out.extend_from_slice(payload);
        out
    }

    fn mph(&self, sph_size: usize, ds_offset: usize) -> String {
        let total = self
            .record_size
            .saturating_mul(self.record_count)
            .saturating_add(ds_offset);
        let lines = [
            format!("PRODUCT=\"{:<62}\"", self.product),
            "PROC_STAGE=O".to_string(),
            "REF_DOC=\"CS-RS-ACS-GS-5106 5.0     \"".to_string(),
            String::new(),
            "ACQUISITION_STATION=\"CRYOSAT-FOS         \"".to_string(),
            "PROC_CENTER=\"PDS   \"".to_string(),
            "PROC_TIME=\"03-JAN-2014 12:00:00.000000\"".to_string(),
            "SOFTWARE_VER=\"SIR_L2/5.0     \"".to_string(),
            String::new(),
            "SENSING_START=\"01-JAN-2014 00:14:25.000000\"".to_string(),
            "SENSING_STOP=\"01-JAN-2014 00:18:53.000000\"".to_string(),
            String::new(),
            "PHASE=2".to_string(),
            "CYCLE=+017".to_string(),
            "REL_ORBIT=+01234".to_string(),
            format!("ABS_ORBIT=+{:05}", self.abs_orbit),
            "STATE_VECTOR_TIME=\"01-JAN-2014 00:10:00.000000\"".to_string(),
            "DELTA_UT1=+.000000<s>".to_string(),
            "X_POSITION=+1234567.890<m>".to_string(),
            "Y_POSITION=-1234567.890<m>".to_string(),
            "Z_POSITION=+7000000.000<m>".to_string(),
            "X_VELOCITY=+1234.567890<m/s>".to_string(),
            "Y_VELOCITY=-1234.567890<m/s>".to_string(),
            "Z_VELOCITY=+7000.000000<m/s>".to_string(),
            "VECTOR_SOURCE=\"00\"".to_string(),
            String::new(),
            "LEAP_UTC=\"30-JUN-2012 23:59:60.000000\"".to_string(),
            "LEAP_SIGN=+001".to_string(),
            "LEAP_ERR=0".to_string(),
            String::new(),
            "PRODUCT_ERR=0".to_string(),
            format!("TOT_SIZE=+{:020}<bytes>", total),
            format!("SPH_SIZE=+{:010}<bytes>", sph_size),
            format!("NUM_DSD=+{:010}", self.auxiliary.len() + 1),
            "DSD_SIZE=+0000000280<bytes>".to_string(),
            format!("NUM_DATA_SETS=+{:010}", self.auxiliary.len() + 1),
            String::new(),
            "CRC=-1".to_string(),
            String::new(),
            String::new(),
            String::new(),
        ];
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    fn sph(&self, ds_offset: usize) -> String {
        let flag = if self.ascending { "A" } else { "D" };
        let mut text = String::new();
        for line in [
            "SPH_DESCRIPTOR=\"SIR_SIN_L2 SPECIFIC HEADER \"".to_string(),
            "START_RECORD_TAI_TIME=\"01-JAN-2014 00:14:25.000000\"".to_string(),
            "STOP_RECORD_TAI_TIME=\"01-JAN-2014 00:18:53.000000\"".to_string(),
            format!("ABS_ORBIT_START=+{:05}", self.abs_orbit),
            format!("ASCENDING_FLAG={}", flag),
            "START_LAT=+0700000000<10-6degN>".to_string(),
            "START_LONG=-0450000000<10-6degE>".to_string(),
            String::new(),
        ] {
            text.push_str(&line);
            text.push('\n');
        }

        for name in &self.auxiliary {
            text.push_str(&dsd_text(name, "R", 0, 0, 0));
        }
        text.push_str(&dsd_text(
            &self.ds_name,
            "M",
            ds_offset,
            self.record_count,
            self.record_size,
        ));
        text
    }
}

fn dsd_text(name: &str, ds_type: &str, offset: usize, count: usize, size: usize) -> String {
    [
        format!("DS_NAME=\"{:<28}\"", name),
        format!("DS_TYPE={}", ds_type),
        format!("FILENAME=\"{:<62}\"", ""),
        format!("DS_OFFSET=+{:020}<bytes>", offset),
        format!("DS_SIZE=+{:020}<bytes>", count.saturating_mul(size)),
        format!("NUM_DSR=+{:010}", count),
        format!("DSR_SIZE=+{:010}<bytes>", size),
        "BYTE_ORDER=0123".to_string(),
        String::new(),
    ]
    .join("\n")
        + "\n"
}

/// Array source shaped like a baseline D file.
///
/// Record `r` has `counts[r]` high-rate samples, laid out back to back.
/// Low-rate time is `86400 * (5000 + r) + 10.25` s; sample `i` of a
/// record is `0.05 * i` s later. `lat_poca_20_ku` holds the flat sample
/// index and carries a `scale_factor` of `1e-7`; `lat_01` holds
/// `10 * r`. Every MPH and SPH attribute is present.
pub fn synthetic_array_source(counts: &[usize]) -> MemoryArraySource {
    let n = counts.len();
    let time_cor: Vec<f64> = (0..n)
        .map(|r| 86400.0 * (5000 + r) as f64 + 10.25)
        .collect();

    let mut starts = Vec::with_capacity(n);
    let mut time_20 = Vec::new();
    for (r, &count) in counts.iter().enumerate() {
        starts.push(time_20.len() as f64);
        time_20.extend((0..count).map(|i| time_cor[r] + 0.05 * i as f64));
    }
    let total = time_20.len();

    let mut source = MemoryArraySource::new()
        .with_variable(TIME_LOW_RATE, time_cor)
        .with_variable(FIRST_INDEX, starts)
        .with_variable(VALID_COUNT, counts.iter().map(|&c| c as f64).collect())
        .with_variable(TIME_HIGH_RATE, time_20)
        .with_variable("lat_01", (0..n).map(|r| 10.0 * r as f64).collect())
        .with_variable("height_1_20_ku", (0..total).map(|i| 2.0 * i as f64).collect());
    source.insert_variable(
        "lat_poca_20_ku",
        ArrayVariable::new((0..total).map(|i| i as f64).collect()).with_scale_factor(1e-7),
    );

    for &(key, attribute) in MPH_ATTRIBUTES.iter().chain(SPH_ATTRIBUTES) {
        source.insert_attribute(attribute, format!("{} value", key));
    }
    source.insert_attribute(ABS_ORBIT_ATTRIBUTE, "19847");
    source.insert_attribute(ASCENDING_FLAG_ATTRIBUTE, "A");
    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use l2_parser::{Baseline, ProductHeaders};

    #[test]
    fn test_pattern_values() {
        assert_eq!(pattern_value(0, 0), 0);
        assert_eq!(pattern_value(2, 7), 2007);
        assert_eq!(pattern_delta(3), 150_000);
    }

    #[test]
    fn test_synthetic_payload_sizes() {
        let ab = RecordLayout::for_baseline(Baseline::B).unwrap();
        assert_eq!(synthetic_payload(&ab, &[20, 20, 20]).len(), 3 * 980);
        let c = RecordLayout::for_baseline(Baseline::C).unwrap();
        assert_eq!(synthetic_payload(&c, &[1]).len(), 1392);
    }

    #[test]
    fn test_encode_value_big_endian() {
        let mut out = Vec::new();
        encode_value(&mut out, FieldType::I16, -2);
        encode_value(&mut out, FieldType::U32, 0x0102_0304);
        assert_eq!(out, vec![0xff, 0xfe, 0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_header_builder_offsets() {
        let builder = ProductHeaderBuilder::new("CS_TEST.DBL", "SIR_SIN_L2").records(1392, 2);
        let header = builder.build();
        assert_ne!(header.len() % 1392, 0);

        let product = builder.build_product(&vec![0; 2 * 1392]);
        let headers = ProductHeaders::parse(&product).unwrap();
        let payload = headers.payload(product.len()).unwrap();
        assert_eq!(payload.offset, header.len());
        assert_eq!(payload.record_count, 2);
        assert_eq!(payload.record_size, 1392);
    }

    #[test]
    fn test_synthetic_array_source_layout() {
        use l2_parser::ArraySource;
        let source = synthetic_array_source(&[3, 4]);
        assert_eq!(source.record_count().unwrap(), 2);
        assert_eq!(
            source.variable(FIRST_INDEX).unwrap().data,
            vec![0.0, 3.0]
        );
        assert_eq!(source.variable(TIME_HIGH_RATE).unwrap().len(), 7);
        assert_eq!(
            source.attribute(ASCENDING_FLAG_ATTRIBUTE).unwrap().as_deref(),
            Some("A")
        );
    }
}
