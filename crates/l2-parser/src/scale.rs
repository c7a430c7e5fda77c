//! Packed-integer to physical-unit scaling.

use std::collections::BTreeMap;

use tracing::debug;

use crate::identity::Baseline;
use crate::layout::FieldGroup;
use crate::record::{ColumnData, RecordSet};

/// Multiplicative factor per (group, field).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScaleTable {
    factors: BTreeMap<(FieldGroup, String), f64>,
}

use FieldGroup::{Corrections, Data1Hz, Data20Hz};

/// Factors shared by the binary baselines.
const BINARY_FACTORS: &[(FieldGroup, &str, f64)] = &[
    (Data1Hz, "Day", 1.0),
    (Data1Hz, "Second", 1.0),
    (Data1Hz, "Micsec", 1.0),
    (Data1Hz, "Siral_mode", 1.0),
    // 0.1 micro-degree
    (Data1Hz, "Lat_1Hz", 1e-7),
    (Data1Hz, "Lon_1Hz", 1e-7),
    (Data1Hz, "Alt_1Hz", 1e-3),
    (Data1Hz, "Roll", 1e-7),
    (Data1Hz, "Pitch", 1e-7),
    (Data1Hz, "Yaw", 1e-7),
    (Data1Hz, "N_valid", 1.0),
    (Data1Hz, "Abs_Orbit", 1.0),
    // millimetres
    (Corrections, "dryTrop", 1e-3),
    (Corrections, "wetTrop", 1e-3),
    (Corrections, "InvBar", 1e-3),
    (Corrections, "DAC", 1e-3),
    (Corrections, "Iono", 1e-3),
    (Corrections, "SSB", 1e-3),
    (Corrections, "ocTideElv", 1e-3),
    (Corrections, "lpeTideElv", 1e-3),
    (Corrections, "olTideElv", 1e-3),
    (Corrections, "seTideElv", 1e-3),
    (Corrections, "gpTideElv", 1e-3),
    (Corrections, "Surf_type", 1.0),
    (Corrections, "MSS_Geoid", 1e-3),
    (Corrections, "ODLE", 1e-3),
    (Corrections, "Ice_conc", 1e-2),
    (Corrections, "Snow_depth", 1e-3),
    (Corrections, "Snow_density", 1.0),
    (Corrections, "C_status", 1.0),
    (Corrections, "SWH", 1e-3),
    (Corrections, "Wind_speed", 1e-3),
    (Data20Hz, "D_time_mics", 1.0),
    (Data20Hz, "Lat", 1e-7),
    (Data20Hz, "Lon", 1e-7),
    (Data20Hz, "Elev_1", 1e-3),
    (Data20Hz, "Elev_2", 1e-3),
    (Data20Hz, "Elev_3", 1e-3),
    // 1e-2 dB
    (Data20Hz, "Sig0_1", 1e-2),
    (Data20Hz, "Sig0_2", 1e-2),
    (Data20Hz, "Sig0_3", 1e-2),
    (Data20Hz, "Freeboard", 1e-3),
    (Data20Hz, "SSHA_interp", 1e-3),
    (Data20Hz, "SSHA_interp_count", 1.0),
    (Data20Hz, "SSHA_interp_RMS", 1e-3),
    (Data20Hz, "Peakiness", 1e-2),
    (Data20Hz, "N_avg", 1.0),
    (Data20Hz, "Quality_flag", 1.0),
    (Data20Hz, "Corrections_flag", 1.0),
    (Data20Hz, "Quality_1", 1.0),
    (Data20Hz, "Quality_2", 1.0),
    (Data20Hz, "Quality_3", 1.0),
];

/// Fields only baselines A and B carry.
const BASELINE_AB_FACTORS: &[(FieldGroup, &str, f64)] = &[
    // millidegrees
    (Data1Hz, "Mispointing", 1e-3),
    (Data20Hz, "Elev", 1e-3),
    (Data20Hz, "Sig0", 1e-2),
];

impl ScaleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factor table of a binary baseline.
    ///
    /// Baseline D has no fixed table; its factors come from the array
    /// file (see [`crate::columnar`]), so an empty table is returned.
    pub fn for_baseline(baseline: Baseline) -> Self {
        let mut table = Self::new();
        let extra: &[(FieldGroup, &str, f64)] = match baseline {
            Baseline::A | Baseline::B => BASELINE_AB_FACTORS,
            Baseline::C => &[],
            Baseline::D => return table,
        };
        for (group, name, factor) in BINARY_FACTORS.iter().chain(extra) {
            table.insert(*group, *name, *factor);
        }
        table
    }

    pub fn insert(&mut self, group: FieldGroup, name: impl Into<String>, factor: f64) {
        self.factors.insert((group, name.into()), factor);
    }

    pub fn factor(&self, group: FieldGroup, name: &str) -> Option<f64> {
        self.factors.get(&(group, name.to_string())).copied()
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Scale every column the table names. Boolean columns are skipped.
    ///
    /// Returns the number of columns scaled.
    pub fn apply(&self, records: &mut RecordSet) -> usize {
        let mut scaled = 0;
        for ((group, name), factor) in &self.factors {
            let Some(column) = records.column_mut(*group, name) else {
                continue;
            };
            if column.data.is_bool() {
                continue;
            }
            let data = std::mem::replace(&mut column.data, ColumnData::F64(Vec::new()));
            column.data = data.scaled(*factor);
            scaled += 1;
        }
        debug!(columns = scaled, "Applied unit scaling");
        scaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Column, RaggedMask};

    #[test]
    fn test_baseline_tables() {
        let ab = ScaleTable::for_baseline(Baseline::A);
        assert_eq!(ab.factor(Data1Hz, "Mispointing"), Some(1e-3));
        assert_eq!(ab.factor(Data20Hz, "Sig0"), Some(1e-2));

        let c = ScaleTable::for_baseline(Baseline::C);
        assert_eq!(c.factor(Data1Hz, "Mispointing"), None);
        assert_eq!(c.factor(Data1Hz, "Roll"), Some(1e-7));
        assert_eq!(c.factor(Corrections, "Wind_speed"), Some(1e-3));
        assert_eq!(c.factor(Corrections, "Ice_conc"), Some(1e-2));

        assert!(ScaleTable::for_baseline(Baseline::D).is_empty());
    }

    #[test]
    fn test_apply_scales_and_skips_bool() {
        let mut set = RecordSet::new(RaggedMask::empty(2, 1));
        set.insert(Column::new("Lat_1Hz", Data1Hz, ColumnData::I32(vec![700_000_000, -10])))
            .unwrap();
        set.insert(Column::new("Ascending_flag", Data1Hz, ColumnData::Bool(vec![true, false])))
            .unwrap();
        set.insert(Column::new("Unlisted", Data1Hz, ColumnData::I16(vec![3, 4])))
            .unwrap();

        let mut table = ScaleTable::for_baseline(Baseline::C);
        table.insert(Data1Hz, "Ascending_flag", 10.0);
        assert_eq!(table.apply(&mut set), 1);

        assert_eq!(
            set.column(Data1Hz, "Lat_1Hz").unwrap().data,
            ColumnData::F64(vec![700_000_000.0 * 1e-7, -10.0 * 1e-7])
        );
        assert_eq!(
            set.column(Data1Hz, "Ascending_flag").unwrap().data,
            ColumnData::Bool(vec![true, false])
        );
        assert_eq!(
            set.column(Data1Hz, "Unlisted").unwrap().data,
            ColumnData::I16(vec![3, 4])
        );
    }
}
