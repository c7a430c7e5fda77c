//! Columnar-array decoder for baseline D.
//!
//! Baseline D products store every variable as a flat array. Low-rate
//! variables hold one value per record; high-rate variables hold all
//! samples back to back, and each record names its slice through
//! `(first index, count)`. This module reshapes such a source into the
//! same [`RecordSet`] the binary decoder produces and maps the file
//! attributes onto MPH and SPH header blocks.
//!
//! The array file itself is reached through the [`ArraySource`] trait so
//! the decoder stays independent of the storage library.

pub mod tables;

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{L2Error, L2Result};
use crate::header::{HeaderBlock, ProductHeaders};
use crate::layout::{FieldGroup, BLOCKS_PER_RECORD};
use crate::record::{Column, ColumnData, RaggedMask, RecordSet};
use crate::scale::ScaleTable;

use tables::*;

/// A flat variable read from an array file.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayVariable {
    /// Stored (packed) values.
    pub data: Vec<f64>,
    /// The variable's `scale_factor` attribute, if any.
    pub scale_factor: Option<f64>,
}

impl ArrayVariable {
    pub fn new(data: Vec<f64>) -> Self {
        Self {
            data,
            scale_factor: None,
        }
    }

    pub fn with_scale_factor(mut self, factor: f64) -> Self {
        self.scale_factor = Some(factor);
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Read access to a self-describing array file.
pub trait ArraySource {
    /// Whether the file holds a variable called `name`.
    fn has_variable(&self, name: &str) -> bool;

    /// Read a whole variable, flattened.
    fn variable(&self, name: &str) -> L2Result<ArrayVariable>;

    /// Global attribute as text, `None` when absent.
    fn attribute(&self, name: &str) -> L2Result<Option<String>>;

    /// Number of low-rate records.
    fn record_count(&self) -> L2Result<usize> {
        Ok(self.variable(TIME_LOW_RATE)?.len())
    }
}

/// In-memory [`ArraySource`].
#[derive(Debug, Clone, Default)]
pub struct MemoryArraySource {
    variables: HashMap<String, ArrayVariable>,
    attributes: HashMap<String, String>,
}

impl MemoryArraySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_variable(&mut self, name: impl Into<String>, variable: ArrayVariable) {
        self.variables.insert(name.into(), variable);
    }

    pub fn insert_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn with_variable(mut self, name: impl Into<String>, data: Vec<f64>) -> Self {
        self.insert_variable(name, ArrayVariable::new(data));
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_attribute(name, value);
        self
    }
}

impl ArraySource for MemoryArraySource {
    fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    fn variable(&self, name: &str) -> L2Result<ArrayVariable> {
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| L2Error::MissingData(format!("variable {}", name)))
    }

    fn attribute(&self, name: &str) -> L2Result<Option<String>> {
        Ok(self.attributes.get(name).cloned())
    }
}

/// Result of decoding an array source.
#[derive(Debug, Clone)]
pub struct ColumnarProduct {
    /// MPH and SPH rebuilt from file attributes. The DSD is empty.
    pub headers: ProductHeaders,
    pub records: RecordSet,
    /// Factors from the variables' `scale_factor` attributes.
    pub scales: ScaleTable,
}

/// Decode an array source into the common record model.
pub fn decode_arrays<S: ArraySource + ?Sized>(source: &S) -> L2Result<ColumnarProduct> {
    let n_records = source.record_count()?;
    let time_cor = source.variable(TIME_LOW_RATE)?.data;

    let starts = low_rate_values(source, FIRST_INDEX, n_records)?;
    let counts = low_rate_values(source, VALID_COUNT, n_records)?;
    let ranges = starts
        .iter()
        .zip(&counts)
        .enumerate()
        .map(|(r, (&start, &count))| {
            Ok((
                to_index(start, r, FIRST_INDEX)?,
                to_index(count, r, VALID_COUNT)?,
            ))
        })
        .collect::<L2Result<Vec<(usize, usize)>>>()?;

    let slots = ranges
        .iter()
        .map(|&(_, count)| count)
        .max()
        .unwrap_or(0)
        .max(BLOCKS_PER_RECORD);

    let mask = RaggedMask::from_counts(slots, ranges.iter().map(|&(_, count)| count));
    let mut records = RecordSet::new(mask);
    let mut scales = ScaleTable::new();

    insert_time_columns(&mut records, &time_cor)?;

    for &(group, field, variable) in LOW_RATE_VARIABLES {
        if !source.has_variable(variable) {
            debug!(variable, field, "Variable absent, skipping");
            continue;
        }
        let var = source.variable(variable)?;
        check_length(variable, var.len(), n_records)?;
        if let Some(factor) = var.scale_factor {
            scales.insert(group, field, factor);
        }
        records.insert(Column::new(field, group, ColumnData::F64(var.data)))?;
    }

    let headers = ProductHeaders {
        mph: attribute_block(source, MPH_ATTRIBUTES, &[])?,
        sph: attribute_block(source, SPH_ATTRIBUTES, OPTIONAL_SPH_ATTRIBUTES)?,
        dsd: HeaderBlock::new(),
    };

    insert_orbit_columns(&mut records, source)?;

    let time_20 = source.variable(TIME_HIGH_RATE)?;
    let time_20 = reconstruct(TIME_HIGH_RATE, &time_20.data, &ranges, slots)?;
    let delta = delta_microseconds(&time_20, &time_cor, &ranges, slots);
    records.insert(Column::new(
        "D_time_mics",
        FieldGroup::Data20Hz,
        ColumnData::F64(delta),
    ))?;

    for &(field, variable) in HIGH_RATE_VARIABLES {
        let data = if variable == TIME_HIGH_RATE {
            time_20.clone()
        } else if source.has_variable(variable) {
            let var = source.variable(variable)?;
            if let Some(factor) = var.scale_factor {
                scales.insert(FieldGroup::Data20Hz, field, factor);
            }
            reconstruct(variable, &var.data, &ranges, slots)?
        } else {
            debug!(variable, field, "Variable absent, skipping");
            continue;
        };
        records.insert(Column::new(field, FieldGroup::Data20Hz, ColumnData::F64(data)))?;
    }

    info!(
        records = n_records,
        slots,
        valid_sub_records = records.mask().total_valid(),
        columns = records.columns().len(),
        "Decoded columnar records"
    );

    Ok(ColumnarProduct {
        headers,
        records,
        scales,
    })
}

/// Copy each record's `[start, start + count)` slice into its first
/// `count` slots. Slots past `count` stay zero.
pub fn reconstruct(
    name: &str,
    data: &[f64],
    ranges: &[(usize, usize)],
    slots: usize,
) -> L2Result<Vec<f64>> {
    for (record, &(start, count)) in ranges.iter().enumerate() {
        if count > slots || start + count > data.len() {
            return Err(L2Error::InvalidFormat(format!(
                "{}: record {} reads samples {}..{} of {}",
                name,
                record,
                start,
                start + count,
                data.len()
            )));
        }
    }

    let mut out = vec![0.0; ranges.len() * slots];
    if slots == 0 {
        return Ok(out);
    }
    out.par_chunks_mut(slots)
        .zip(ranges.par_iter())
        .for_each(|(chunk, &(start, count))| {
            chunk[..count].copy_from_slice(&data[start..start + count]);
        });
    Ok(out)
}

/// Microseconds from each record's low-rate time to its samples.
fn delta_microseconds(
    time_20: &[f64],
    time_cor: &[f64],
    ranges: &[(usize, usize)],
    slots: usize,
) -> Vec<f64> {
    let mut delta = vec![0.0; time_20.len()];
    for (record, &(_, count)) in ranges.iter().enumerate() {
        for slot in 0..count {
            let index = record * slots + slot;
            delta[index] = 1e6 * (time_20[index] - time_cor[record]);
        }
    }
    delta
}

/// `Time` plus the `Day`, `Second`, `Micsec` split of `time_cor_01`.
fn insert_time_columns(records: &mut RecordSet, time_cor: &[f64]) -> L2Result<()> {
    let day: Vec<i32> = time_cor.iter().map(|t| (t / 86400.0) as i32).collect();
    let second: Vec<i32> = time_cor
        .iter()
        .zip(&day)
        .map(|(t, &d)| (t - d as f64 * 86400.0) as i32)
        .collect();
    let micsec: Vec<i32> = time_cor
        .iter()
        .zip(day.iter().zip(&second))
        .map(|(t, (&d, &s))| ((t - d as f64 * 86400.0 - s as f64) * 1e6) as i32)
        .collect();

    records.insert(Column::new(
        "Time",
        FieldGroup::Data1Hz,
        ColumnData::F64(time_cor.to_vec()),
    ))?;
    records.insert(Column::new("Day", FieldGroup::Data1Hz, ColumnData::I32(day)))?;
    records.insert(Column::new("Second", FieldGroup::Data1Hz, ColumnData::I32(second)))?;
    records.insert(Column::new("Micsec", FieldGroup::Data1Hz, ColumnData::I32(micsec)))
}

/// `Abs_Orbit` and `Ascending_flag`, repeated for every record.
fn insert_orbit_columns<S: ArraySource + ?Sized>(
    records: &mut RecordSet,
    source: &S,
) -> L2Result<()> {
    let n = records.n_records();
    let orbit_text = required_attribute(source, ABS_ORBIT_ATTRIBUTE)?;
    let orbit = parse_orbit(&orbit_text).ok_or_else(|| {
        L2Error::InvalidFormat(format!("{} = {:?}", ABS_ORBIT_ATTRIBUTE, orbit_text))
    })?;
    let ascending = required_attribute(source, ASCENDING_FLAG_ATTRIBUTE)?.trim() == "A";

    records.insert(Column::new(
        "Abs_Orbit",
        FieldGroup::Data1Hz,
        ColumnData::U32(vec![orbit; n]),
    ))?;
    records.insert(Column::new(
        "Ascending_flag",
        FieldGroup::Data1Hz,
        ColumnData::Bool(vec![ascending; n]),
    ))
}

/// Orbit number from attribute text, accepting `12345` and `12345.0`.
pub(crate) fn parse_orbit(text: &str) -> Option<u32> {
    let text = text.trim();
    if let Ok(n) = text.parse::<u32>() {
        return Some(n);
    }
    let value = text.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0 && value <= u32::MAX as f64 && value.fract() == 0.0)
        .then_some(value as u32)
}

fn attribute_block<S: ArraySource + ?Sized>(
    source: &S,
    required: &[(&str, &str)],
    optional: &[(&str, &str)],
) -> L2Result<HeaderBlock> {
    let mut block = HeaderBlock::new();
    for &(key, attribute) in required {
        block.insert_value(key, required_attribute(source, attribute)?);
    }
    for &(key, attribute) in optional {
        if let Some(value) = source.attribute(attribute)? {
            block.insert_value(key, value);
        }
    }
    Ok(block)
}

fn required_attribute<S: ArraySource + ?Sized>(source: &S, name: &str) -> L2Result<String> {
    source
        .attribute(name)?
        .ok_or_else(|| L2Error::MissingData(format!("attribute {}", name)))
}

fn low_rate_values<S: ArraySource + ?Sized>(
    source: &S,
    name: &str,
    n_records: usize,
) -> L2Result<Vec<f64>> {
    let var = source.variable(name)?;
    check_length(name, var.len(), n_records)?;
    Ok(var.data)
}

fn check_length(name: &str, actual: usize, expected: usize) -> L2Result<()> {
    if actual != expected {
        return Err(L2Error::InvalidFormat(format!(
            "{} has {} values, expected one per record ({})",
            name, actual, expected
        )));
    }
    Ok(())
}

fn to_index(value: f64, record: usize, name: &str) -> L2Result<usize> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Ok(value as usize)
    } else {
        Err(L2Error::InvalidFormat(format!(
            "{}[{}] = {} is not a valid index",
            name, record, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconstruct_ranges() {
        let data: Vec<f64> = (0..7).map(|v| v as f64).collect();
        let out = reconstruct("v", &data, &[(0, 3), (3, 4)], 5).unwrap();
        assert_eq!(
            out,
            vec![0.0, 1.0, 2.0, 0.0, 0.0, 3.0, 4.0, 5.0, 6.0, 0.0]
        );
    }

    #[test]
    fn test_reconstruct_rejects_overrun() {
        let data = vec![0.0; 7];
        let err = reconstruct("height_1_20_ku", &data, &[(0, 3), (5, 4)], 20).unwrap_err();
        assert!(matches!(err, L2Error::InvalidFormat(msg) if msg.contains("record 1")));
    }

    #[test]
    fn test_parse_orbit() {
        assert_eq!(parse_orbit("12345"), Some(12345));
        assert_eq!(parse_orbit(" 12345.0 "), Some(12345));
        assert_eq!(parse_orbit("-1"), None);
        assert_eq!(parse_orbit("12.5"), None);
    }

    #[test]
    fn test_index_conversion() {
        assert_eq!(to_index(3.0, 0, "x").unwrap(), 3);
        assert!(to_index(-1.0, 0, "x").is_err());
        assert!(to_index(f64::NAN, 0, "x").is_err());
    }
}
