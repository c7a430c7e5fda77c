//! Product reader: filename to decoded, optionally scaled, time-stamped records.

use std::path::Path;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::binary::decode_records;
use crate::columnar::{decode_arrays, ArraySource};
use crate::error::{L2Error, L2Result};
use crate::header::{has_header, ProductHeaders};
use crate::identity::{Baseline, ProductIdentity};
use crate::layout::{FieldGroup, Rate, RecordLayout};
use crate::record::{Column, ColumnData, RecordSet};
use crate::scale::ScaleTable;
use crate::selection::{DecodeOptions, FieldSelection, FieldTable, TableSink, METADATA_GROUP};
use crate::time::apply_time_model;

/// A decoded Level-2 product.
#[derive(Debug, Clone)]
pub struct L2Product {
    pub identity: ProductIdentity,
    /// MPH, SPH and DSD; `None` for headerless binary files.
    pub headers: Option<ProductHeaders>,
    pub records: RecordSet,
}

/// Decode a binary (baseline A, B or C) product held in memory.
pub fn decode_dbl(filename: &str, data: Bytes, options: &DecodeOptions) -> L2Result<L2Product> {
    let identity = ProductIdentity::from_filename(filename)?;
    let layout = RecordLayout::for_baseline(identity.baseline)?;
    let file_size = data.len();

    let (headers, mut records) = if has_header(file_size, layout.record_size()) {
        let headers = ProductHeaders::parse(&data)?;
        let payload = headers.payload(file_size)?;
        if payload.record_size != layout.record_size() {
            warn!(
                declared = payload.record_size,
                layout = layout.record_size(),
                "DSR_SIZE differs from the baseline record size"
            );
        }
        debug!(
            offset = payload.offset,
            records = payload.record_count,
            "Located payload from DSD"
        );
        let mut records = decode_records(
            data.slice(payload.offset..),
            &layout,
            payload.record_count,
        )?;
        insert_orbit_columns(&mut records, &headers)?;
        (Some(headers), records)
    } else {
        let count = file_size / layout.record_size();
        (None, decode_records(data, &layout, count)?)
    };

    if options.unpack {
        ScaleTable::for_baseline(identity.baseline).apply(&mut records);
    }
    apply_time_model(&mut records)?;

    info!(
        product = identity.product.code(),
        baseline = %identity.baseline.letter(),
        records = records.n_records(),
        headers = headers.is_some(),
        "Decoded binary product"
    );

    Ok(L2Product {
        identity,
        headers,
        records,
    })
}

/// Read and decode a binary product file.
///
/// Errors carry the file name.
pub fn read_dbl(path: impl AsRef<Path>, options: &DecodeOptions) -> L2Result<L2Product> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let data = std::fs::read(path).map_err(|e| L2Error::from(e).in_file(&name))?;
    decode_dbl(&name, Bytes::from(data), options).map_err(|e| e.in_file(&name))
}

/// Decode an array-file (baseline D) product through an [`ArraySource`].
pub fn decode_columnar<S: ArraySource + ?Sized>(
    filename: &str,
    source: &S,
    options: &DecodeOptions,
) -> L2Result<L2Product> {
    let identity = ProductIdentity::from_filename(filename)?;
    if identity.baseline != Baseline::D {
        warn!(
            baseline = %identity.baseline.letter(),
            "Array file named with a binary baseline"
        );
    }

    let product = decode_arrays(source)?;
    let mut records = product.records;
    if options.unpack {
        product.scales.apply(&mut records);
    }
    apply_time_model(&mut records)?;

    info!(
        product = identity.product.code(),
        records = records.n_records(),
        slots = records.slots(),
        "Decoded columnar product"
    );

    Ok(L2Product {
        identity,
        headers: Some(product.headers),
        records,
    })
}

/// `Abs_Orbit` from the MPH and `Ascending_flag` from the SPH, per record.
fn insert_orbit_columns(records: &mut RecordSet, headers: &ProductHeaders) -> L2Result<()> {
    let orbit = headers
        .mph
        .numeric("ABS_ORBIT")
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| L2Error::MissingHeaderField("ABS_ORBIT".to_string()))?;
    let ascending = headers.sph.value("ASCENDING_FLAG") == Some("A");
    let n = records.n_records();

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

impl L2Product {
    pub fn n_records(&self) -> usize {
        self.records.n_records()
    }

    /// Push the selected fields, then the validity mask, into `sink`.
    ///
    /// Every column is flattened to one value per (record, slot): low-rate
    /// values repeat across their record's slots. The `METADATA` group
    /// selects no columns.
    pub fn extract(&self, selection: &FieldSelection, sink: &mut dyn TableSink) -> L2Result<()> {
        let slots = self.records.slots();
        let mut extracted = 0;

        for (group_name, fields) in selection.groups() {
            if group_name == METADATA_GROUP {
                continue;
            }
            let group = FieldGroup::from_name(group_name).ok_or_else(|| L2Error::UnknownField {
                group: group_name.to_string(),
                field: fields.join(","),
            })?;

            for field in fields {
                let column =
                    self.records
                        .column(group, field)
                        .ok_or_else(|| L2Error::UnknownField {
                            group: group_name.to_string(),
                            field: field.clone(),
                        })?;
                let data = match group.rate() {
                    Rate::Low => column.data.broadcast(slots),
                    Rate::High => column.data.clone(),
                };
                sink.set_column(field, data)?;
                extracted += 1;
            }
        }

        sink.set_mask(self.records.mask().flat())?;
        debug!(columns = extracted, rows = self.n_records() * slots, "Extracted fields");
        Ok(())
    }

    /// Extract into a new [`FieldTable`].
    pub fn to_table(&self, selection: &FieldSelection) -> L2Result<FieldTable> {
        let mut table = FieldTable::new();
        self.extract(selection, &mut table)?;
        Ok(table)
    }
}
