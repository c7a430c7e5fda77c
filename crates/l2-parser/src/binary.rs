//! Binary record decoder for baselines A, B and C.
//!
//! A single loop walks the payload with a big-endian [`Buf`] cursor,
//! interpreting each record through its [`RecordLayout`]: the low-rate
//! fields in order, then `blocks` high-rate sub-records. Spare fields are
//! skipped. Values are stored raw; scaling happens later.

use bytes::{Buf, Bytes};
use tracing::{debug, info};

use crate::error::{L2Error, L2Result};
use crate::layout::{FieldSpec, RecordLayout};
use crate::record::{Column, ColumnData, RaggedMask, RecordSet};

/// Low-rate field holding the number of valid sub-records.
pub const N_VALID_FIELD: &str = "N_valid";

/// Decode `record_count` records from the start of `payload`.
///
/// Bytes past the last record are ignored. A payload shorter than
/// `record_count` records fails with [`L2Error::Truncated`].
pub fn decode_records(
    payload: Bytes,
    layout: &RecordLayout,
    record_count: usize,
) -> L2Result<RecordSet> {
    let blocks = layout.blocks();
    let record_size = layout.record_size();

    let n_valid_index = layout
        .low_rate_fields()
        .iter()
        .position(|f| !f.spare && f.name == N_VALID_FIELD)
        .ok_or_else(|| L2Error::MissingData(format!("{} in {}", N_VALID_FIELD, layout.name())))?;

    // Nothing is allocated for records the payload cannot hold.
    let available = payload.len() / record_size;
    if available < record_count {
        return Err(L2Error::Truncated {
            record: available,
            needed: record_size,
            remaining: payload.len() % record_size,
        });
    }

    let mut low = allocate(layout.low_rate_fields(), record_count);
    let mut high = allocate(layout.high_rate_fields(), record_count * blocks);
    let mut mask = RaggedMask::empty(record_count, blocks);

    debug!(
        layout = layout.name(),
        record_size,
        records = record_count,
        bytes = payload.len(),
        "Decoding binary records"
    );

    let mut buf = payload;
    for record in 0..record_count {
        for (spec, column) in layout.low_rate_fields().iter().zip(low.iter_mut()) {
            read_field(spec, column.as_mut(), record, &mut buf)?;
        }

        let n_valid = low[n_valid_index]
            .as_ref()
            .and_then(|c| c.get_f64(record))
            .unwrap_or(0.0);
        mask.set_count(record, n_valid.max(0.0) as usize);

        for slot in 0..blocks {
            let index = record * blocks + slot;
            for (spec, column) in layout.high_rate_fields().iter().zip(high.iter_mut()) {
                read_field(spec, column.as_mut(), index, &mut buf)?;
            }
        }
    }

    let mut records = RecordSet::new(mask);
    let fields = layout
        .low_rate_fields()
        .iter()
        .zip(low)
        .chain(layout.high_rate_fields().iter().zip(high));
    for (spec, data) in fields {
        if let Some(data) = data {
            records.insert(Column::new(spec.name, spec.group, data))?;
        }
    }

    info!(
        layout = layout.name(),
        records = record_count,
        valid_sub_records = records.mask().total_valid(),
        "Decoded binary records"
    );

    Ok(records)
}

fn allocate(fields: &[FieldSpec], len: usize) -> Vec<Option<ColumnData>> {
    fields
        .iter()
        .map(|f| (!f.spare).then(|| ColumnData::zeros(f.ty, len)))
        .collect()
}

/// Read one field into `column[index]`, or skip it when it is a spare.
fn read_field(
    spec: &FieldSpec,
    column: Option<&mut ColumnData>,
    index: usize,
    buf: &mut Bytes,
) -> L2Result<()> {
    let Some(column) = column else {
        buf.advance(spec.ty.width());
        return Ok(());
    };

    match column {
        ColumnData::I8(v) => v[index] = buf.get_i8(),
        ColumnData::U8(v) => v[index] = buf.get_u8(),
        ColumnData::I16(v) => v[index] = buf.get_i16(),
        ColumnData::U16(v) => v[index] = buf.get_u16(),
        ColumnData::I32(v) => v[index] = buf.get_i32(),
        ColumnData::U32(v) => v[index] = buf.get_u32(),
        ColumnData::I64(v) => v[index] = buf.get_i64(),
        ColumnData::U64(v) => v[index] = buf.get_u64(),
        ColumnData::F64(_) | ColumnData::Bool(_) => {
            return Err(L2Error::InvalidFormat(format!(
                "field {} has no on-disk representation",
                spec.name
            )))
        }
    }
    Ok(())
}
