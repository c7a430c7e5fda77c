//! Record layouts for the binary baselines.
//!
//! A layout is the ordered list of big-endian fields making up one
//! low-rate (1 Hz) record followed by its block of twenty high-rate
//! (20 Hz) sub-records. The decoder is a single loop interpreting these
//! tables; adding a baseline is a new table, not new decode code.

use serde::Serialize;

use crate::error::{L2Error, L2Result};
use crate::identity::Baseline;

/// High-rate sub-records stored in every binary record.
pub const BLOCKS_PER_RECORD: usize = 20;

/// Record size of baselines A and B.
pub const RECORD_SIZE_AB: usize = 980;

/// Record size of baseline C.
pub const RECORD_SIZE_C: usize = 1392;

/// Sampling rate of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Rate {
    Low,
    High,
}

/// Field group, mirroring the product's dataset structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FieldGroup {
    /// Time, orbit and attitude (1 Hz)
    Data1Hz,
    /// External geophysical corrections (1 Hz)
    Corrections,
    /// Measurements (20 Hz)
    Data20Hz,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 3] = [Self::Data1Hz, Self::Corrections, Self::Data20Hz];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Data1Hz => "Data_1Hz",
            Self::Corrections => "Corrections",
            Self::Data20Hz => "Data_20Hz",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.name() == name)
    }

    pub fn rate(&self) -> Rate {
        match self {
            Self::Data1Hz | Self::Corrections => Rate::Low,
            Self::Data20Hz => Rate::High,
        }
    }
}

/// Primitive on-disk type of a field. All fields are big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
}

impl FieldType {
    /// Width in bytes.
    pub const fn width(&self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 => 4,
            Self::I64 | Self::U64 => 8,
        }
    }

    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }
}

/// One field of a record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub group: FieldGroup,
    pub ty: FieldType,
    /// Alignment padding: consumed on decode, never exposed.
    pub spare: bool,
}

const fn field(name: &'static str, group: FieldGroup, ty: FieldType) -> FieldSpec {
    FieldSpec {
        name,
        group,
        ty,
        spare: false,
    }
}

const fn spare(name: &'static str, group: FieldGroup, ty: FieldType) -> FieldSpec {
    FieldSpec {
        name,
        group,
        ty,
        spare: true,
    }
}

/// Validated layout of one binary record.
#[derive(Debug, Clone)]
pub struct RecordLayout {
    name: &'static str,
    record_size: usize,
    blocks: usize,
    low_rate: Vec<FieldSpec>,
    high_rate: Vec<FieldSpec>,
}

impl RecordLayout {
    /// Build a layout, checking that the fields fill exactly `record_size`
    /// bytes (low-rate fields plus `blocks` high-rate sub-records).
    pub fn new(
        name: &'static str,
        record_size: usize,
        blocks: usize,
        fields: &[FieldSpec],
    ) -> L2Result<Self> {
        let (low_rate, high_rate): (Vec<FieldSpec>, Vec<FieldSpec>) = fields
            .iter()
            .partition(|f| f.group.rate() == Rate::Low);

        let layout = Self {
            name,
            record_size,
            blocks,
            low_rate,
            high_rate,
        };

        let computed = layout.low_rate_width() + blocks * layout.high_rate_width();
        if computed != record_size {
            return Err(L2Error::InvalidLayout {
                layout: name,
                declared: record_size,
                computed,
            });
        }
        Ok(layout)
    }

    /// Layout registered for a binary baseline.
    pub fn for_baseline(baseline: Baseline) -> L2Result<Self> {
        match baseline {
            Baseline::A | Baseline::B => Self::new(
                "baseline A/B",
                RECORD_SIZE_AB,
                BLOCKS_PER_RECORD,
                BASELINE_AB_FIELDS,
            ),
            Baseline::C => Self::new(
                "baseline C",
                RECORD_SIZE_C,
                BLOCKS_PER_RECORD,
                BASELINE_C_FIELDS,
            ),
            Baseline::D => Err(L2Error::UnsupportedBaseline {
                baseline: 'D',
                encoding: "binary",
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    pub fn blocks(&self) -> usize {
        self.blocks
    }

    pub fn low_rate_fields(&self) -> &[FieldSpec] {
        &self.low_rate
    }

    pub fn high_rate_fields(&self) -> &[FieldSpec] {
        &self.high_rate
    }

    pub fn low_rate_width(&self) -> usize {
        self.low_rate.iter().map(|f| f.ty.width()).sum()
    }

    pub fn high_rate_width(&self) -> usize {
        self.high_rate.iter().map(|f| f.ty.width()).sum()
    }

    /// Non-spare field by group and name.
    pub fn field(&self, group: FieldGroup, name: &str) -> Option<&FieldSpec> {
        self.low_rate
            .iter()
            .chain(self.high_rate.iter())
            .find(|f| !f.spare && f.group == group && f.name == name)
    }
}

use FieldGroup::{Corrections, Data1Hz, Data20Hz};
use FieldType::{I16, I32, U16, U32, U64};

/// External corrections group, shared by baselines A, B and C.
const CORRECTIONS: [FieldSpec; 26] = [
    field("dryTrop", Corrections, I16),
    field("wetTrop", Corrections, I16),
    field("InvBar", Corrections, I16),
    field("DAC", Corrections, I16),
    field("Iono", Corrections, I16),
    field("SSB", Corrections, I16),
    field("ocTideElv", Corrections, I16),
    field("lpeTideElv", Corrections, I16),
    field("olTideElv", Corrections, I16),
    field("seTideElv", Corrections, I16),
    field("gpTideElv", Corrections, I16),
    spare("Spare1", Corrections, I16),
    field("Surf_type", Corrections, U64),
    field("MSS_Geoid", Corrections, I32),
    field("ODLE", Corrections, I32),
    field("Ice_conc", Corrections, I16),
    field("Snow_depth", Corrections, I16),
    field("Snow_density", Corrections, I16),
    spare("Spare2", Corrections, I16),
    field("C_status", Corrections, U32),
    field("SWH", Corrections, I16),
    field("Wind_speed", Corrections, U16),
    spare("Spare3", Corrections, I16),
    spare("Spare4", Corrections, I16),
    spare("Spare5", Corrections, I16),
    spare("Spare6", Corrections, I16),
];

const fn concat<const A: usize, const B: usize, const C: usize, const N: usize>(
    a: [FieldSpec; A],
    b: [FieldSpec; B],
    c: [FieldSpec; C],
) -> [FieldSpec; N] {
    let mut out = [a[0]; N];
    let mut i = 0;
    while i < A {
        out[i] = a[i];
        i += 1;
    }
    let mut j = 0;
    while j < B {
        out[A + j] = b[j];
        j += 1;
    }
    let mut k = 0;
    while k < C {
        out[A + B + k] = c[k];
        k += 1;
    }
    out
}

const AB_LOCATION: [FieldSpec; 9] = [
    field("Day", Data1Hz, I32),
    field("Second", Data1Hz, I32),
    field("Micsec", Data1Hz, I32),
    field("Siral_mode", Data1Hz, U64),
    field("Lat_1Hz", Data1Hz, I32),
    field("Lon_1Hz", Data1Hz, I32),
    field("Alt_1Hz", Data1Hz, I32),
    field("Mispointing", Data1Hz, I16),
    field("N_valid", Data1Hz, I16),
];

const AB_MEASUREMENTS: [FieldSpec; 17] = [
    field("D_time_mics", Data20Hz, I32),
    field("Lat", Data20Hz, I32),
    field("Lon", Data20Hz, I32),
    field("Elev", Data20Hz, I32),
    field("SSHA_interp", Data20Hz, I16),
    field("SSHA_interp_count", Data20Hz, I16),
    field("SSHA_interp_RMS", Data20Hz, I16),
    field("Sig0", Data20Hz, I16),
    field("Peakiness", Data20Hz, U16),
    field("Freeboard", Data20Hz, I16),
    field("N_avg", Data20Hz, I16),
    spare("Spare1", Data20Hz, I16),
    field("Quality_flag", Data20Hz, U32),
    spare("Spare2", Data20Hz, I16),
    spare("Spare3", Data20Hz, I16),
    spare("Spare4", Data20Hz, I16),
    spare("Spare5", Data20Hz, I16),
];

const C_LOCATION: [FieldSpec; 12] = [
    field("Day", Data1Hz, I32),
    field("Second", Data1Hz, I32),
    field("Micsec", Data1Hz, I32),
    field("Siral_mode", Data1Hz, U64),
    field("Lat_1Hz", Data1Hz, I32),
    field("Lon_1Hz", Data1Hz, I32),
    field("Alt_1Hz", Data1Hz, I32),
    field("Roll", Data1Hz, I32),
    field("Pitch", Data1Hz, I32),
    field("Yaw", Data1Hz, I32),
    spare("Spare", Data1Hz, I16),
    field("N_valid", Data1Hz, I16),
];

const C_MEASUREMENTS: [FieldSpec; 21] = [
    field("D_time_mics", Data20Hz, I32),
    field("Lat", Data20Hz, I32),
    field("Lon", Data20Hz, I32),
    field("Elev_1", Data20Hz, I32),
    field("Elev_2", Data20Hz, I32),
    field("Elev_3", Data20Hz, I32),
    field("Sig0_1", Data20Hz, I16),
    field("Sig0_2", Data20Hz, I16),
    field("Sig0_3", Data20Hz, I16),
    field("Freeboard", Data20Hz, I16),
    field("SSHA_interp", Data20Hz, I16),
    field("SSHA_interp_count", Data20Hz, I16),
    field("SSHA_interp_RMS", Data20Hz, I16),
    field("Peakiness", Data20Hz, U16),
    field("N_avg", Data20Hz, I16),
    spare("Spare1", Data20Hz, I16),
    field("Quality_flag", Data20Hz, U32),
    field("Corrections_flag", Data20Hz, U32),
    field("Quality_1", Data20Hz, I32),
    field("Quality_2", Data20Hz, I32),
    field("Quality_3", Data20Hz, I32),
];

/// Baselines A and B: 100-byte low-rate part, 20 x 44-byte sub-records.
pub const BASELINE_AB_FIELDS: &[FieldSpec] =
    &concat::<9, 26, 17, 52>(AB_LOCATION, CORRECTIONS, AB_MEASUREMENTS);

/// Baseline C: 112-byte low-rate part, 20 x 64-byte sub-records.
pub const BASELINE_C_FIELDS: &[FieldSpec] =
    &concat::<12, 26, 21, 59>(C_LOCATION, CORRECTIONS, C_MEASUREMENTS);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_ab_record_size() {
        let layout = RecordLayout::for_baseline(Baseline::A).unwrap();
        assert_eq!(layout.low_rate_width(), 100);
        assert_eq!(layout.high_rate_width(), 44);
        assert_eq!(
            layout.low_rate_width() + BLOCKS_PER_RECORD * layout.high_rate_width(),
            RECORD_SIZE_AB
        );
        assert_eq!(
            RecordLayout::for_baseline(Baseline::B).unwrap().record_size(),
            RECORD_SIZE_AB
        );
    }

    #[test]
    fn test_baseline_c_record_size() {
        let layout = RecordLayout::for_baseline(Baseline::C).unwrap();
        assert_eq!(layout.low_rate_width(), 112);
        assert_eq!(layout.high_rate_width(), 64);
        assert_eq!(layout.record_size(), RECORD_SIZE_C);
    }

    #[test]
    fn test_baseline_d_has_no_binary_layout() {
        assert!(matches!(
            RecordLayout::for_baseline(Baseline::D),
            Err(L2Error::UnsupportedBaseline { baseline: 'D', .. })
        ));
    }

    #[test]
    fn test_bad_layout_fails_construction() {
        let fields = [
            field("Day", Data1Hz, I32),
            field("N_valid", Data1Hz, I16),
            field("Lat", Data20Hz, I32),
        ];
        // 6 + 2 * 4 = 14, not 16
        let err = RecordLayout::new("broken", 16, 2, &fields).unwrap_err();
        assert!(matches!(
            err,
            L2Error::InvalidLayout {
                declared: 16,
                computed: 14,
                ..
            }
        ));
        assert!(RecordLayout::new("fixed", 14, 2, &fields).is_ok());
    }

    #[test]
    fn test_field_lookup_skips_spares() {
        let layout = RecordLayout::for_baseline(Baseline::C).unwrap();
        assert!(layout.field(Data20Hz, "Elev_2").is_some());
        assert!(layout.field(Data20Hz, "Elev").is_none());
        assert!(layout.field(Corrections, "Spare1").is_none());
        assert_eq!(layout.field(Data1Hz, "N_valid").unwrap().ty, I16);
    }

    #[test]
    fn test_field_type_widths() {
        assert_eq!(U64.width(), 8);
        assert_eq!(I16.width(), 2);
        assert!(I32.is_signed());
        assert!(!U32.is_signed());
    }
}
