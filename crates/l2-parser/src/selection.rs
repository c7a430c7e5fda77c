//! Field selection, decode options and the table sink seam.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{L2Error, L2Result};
use crate::identity::Baseline;
use crate::record::ColumnData;

/// Group holding header metadata; selects no columns.
pub const METADATA_GROUP: &str = "METADATA";

/// Fields to extract, by group name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSelection {
    groups: BTreeMap<String, Vec<String>>,
}

const DEFAULT_1HZ: &[&str] = &[
    "Day", "Second", "Micsec", "Lat_1Hz", "Lon_1Hz", "Alt_1Hz", "Roll", "Pitch", "Yaw", "N_valid",
];

const DEFAULT_1HZ_AB: &[&str] = &[
    "Day",
    "Second",
    "Micsec",
    "Lat_1Hz",
    "Lon_1Hz",
    "Alt_1Hz",
    "Mispointing",
    "N_valid",
];

const DEFAULT_CORRECTIONS: &[&str] = &[
    "dryTrop",
    "wetTrop",
    "InvBar",
    "DAC",
    "Iono",
    "SSB",
    "ocTideElv",
    "lpeTideElv",
    "olTideElv",
    "seTideElv",
    "gpTideElv",
    "ODLE",
    "Ice_conc",
    "Snow_depth",
    "Snow_density",
    "C_status",
    "SWH",
    "Wind_speed",
];

const DEFAULT_20HZ: &[&str] = &[
    "days_J2k",
    "D_time_mics",
    "Lat",
    "Lon",
    "Elev_1",
    "Elev_2",
    "Elev_3",
    "Sig0_1",
    "Sig0_2",
    "Sig0_3",
    "Freeboard",
    "SSHA_interp",
    "SSHA_interp_count",
    "SSHA_interp_RMS",
    "Peakiness",
    "N_avg",
    "Quality_flag",
    "Corrections_flag",
    "Quality_1",
    "Quality_2",
    "Quality_3",
];

const DEFAULT_20HZ_AB: &[&str] = &[
    "days_J2k",
    "D_time_mics",
    "Lat",
    "Lon",
    "Elev",
    "Sig0",
    "Freeboard",
    "SSHA_interp",
    "SSHA_interp_count",
    "SSHA_interp_RMS",
    "Peakiness",
    "N_avg",
    "Quality_flag",
];

impl FieldSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default fields for a baseline.
    pub fn default_for(baseline: Baseline) -> Self {
        let (low, high) = match baseline {
            Baseline::A | Baseline::B => (DEFAULT_1HZ_AB, DEFAULT_20HZ_AB),
            Baseline::C | Baseline::D => (DEFAULT_1HZ, DEFAULT_20HZ),
        };
        Self::new()
            .with_group("Data_1Hz", low.iter().copied())
            .with_group("Corrections", DEFAULT_CORRECTIONS.iter().copied())
            .with_group("Data_20Hz", high.iter().copied())
            .with_group(METADATA_GROUP, ["MPH", "SPH"])
    }

    pub fn with_group<I, S>(mut self, group: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .insert(group.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(g, f)| (g.as_str(), f.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(|f| f.is_empty())
    }
}

/// Decode configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Fields to extract; the baseline default when absent.
    #[serde(default)]
    pub fields: Option<FieldSelection>,
    /// Convert packed integers to physical units.
    #[serde(default)]
    pub unpack: bool,
}

impl DecodeOptions {
    pub fn unpacked() -> Self {
        Self {
            fields: None,
            unpack: true,
        }
    }

    /// The configured selection, or the default for `baseline`.
    pub fn selection(&self, baseline: Baseline) -> FieldSelection {
        self.fields
            .clone()
            .unwrap_or_else(|| FieldSelection::default_for(baseline))
    }
}

/// Consumer of extracted columns.
///
/// Every column handed to a sink and the validity mask have the same
/// length: one element per (record, slot) pair.
pub trait TableSink {
    fn set_column(&mut self, name: &str, data: ColumnData) -> L2Result<()>;

    fn set_mask(&mut self, mask: Vec<bool>) -> L2Result<()>;
}

/// In-memory [`TableSink`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTable {
    len: Option<usize>,
    columns: Vec<(String, ColumnData)>,
    mask: Option<Vec<bool>>,
}

impl FieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows in the table, once anything has been added.
    pub fn len(&self) -> usize {
        self.len.unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn mask(&self) -> Option<&[bool]> {
        self.mask.as_deref()
    }

    fn check_len(&mut self, name: &str, len: usize) -> L2Result<()> {
        match self.len {
            Some(expected) if expected != len => Err(L2Error::InvalidFormat(format!(
                "{} has {} rows, table has {}",
                name, len, expected
            ))),
            _ => {
                self.len = Some(len);
                Ok(())
            }
        }
    }
}

impl TableSink for FieldTable {
    fn set_column(&mut self, name: &str, data: ColumnData) -> L2Result<()> {
        self.check_len(name, data.len())?;
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = data,
            None => self.columns.push((name.to_string(), data)),
        }
        Ok(())
    }

    fn set_mask(&mut self, mask: Vec<bool>) -> L2Result<()> {
        self.check_len("mask", mask.len())?;
        self.mask = Some(mask);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection_by_baseline() {
        let c = FieldSelection::default_for(Baseline::C);
        let groups: BTreeMap<_, _> = c.groups().collect();
        assert!(groups["Data_20Hz"].iter().any(|f| f == "Elev_1"));
        assert!(groups["Data_1Hz"].iter().any(|f| f == "Roll"));
        assert_eq!(groups[METADATA_GROUP], ["MPH", "SPH"]);

        let a = FieldSelection::default_for(Baseline::A);
        let groups: BTreeMap<_, _> = a.groups().collect();
        assert!(groups["Data_20Hz"].iter().any(|f| f == "Elev"));
        assert!(!groups["Data_20Hz"].iter().any(|f| f == "Quality_1"));
        assert!(groups["Data_1Hz"].iter().any(|f| f == "Mispointing"));
    }

    #[test]
    fn test_options_deserialize() {
        let options: DecodeOptions = serde_json::from_str(
            r#"{"unpack": true, "fields": {"Data_20Hz": ["Lat", "Lon"]}}"#,
        )
        .unwrap();
        assert!(options.unpack);
        let selection = options.selection(Baseline::C);
        assert_eq!(selection.groups().count(), 1);

        let empty: DecodeOptions = serde_json::from_str("{}").unwrap();
        assert!(!empty.unpack);
        assert_eq!(
            empty.selection(Baseline::D),
            FieldSelection::default_for(Baseline::D)
        );
    }

    #[test]
    fn test_field_table_checks_lengths() {
        let mut table = FieldTable::new();
        table.set_column("Lat", ColumnData::F64(vec![1.0, 2.0])).unwrap();
        assert!(table.set_column("Lon", ColumnData::F64(vec![1.0])).is_err());
        assert!(table.set_mask(vec![true]).is_err());
        table.set_mask(vec![true, false]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.mask(), Some(&[true, false][..]));
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["Lat"]);
    }
}
