//! Decoded record storage.
//!
//! Records are held column-wise: one typed column per field, `n_records`
//! long for low-rate fields and `n_records * slots` long (row-major) for
//! high-rate fields. A single [`RaggedMask`] states how many leading
//! slots of each record carry real sub-records. [`RecordView`] and
//! [`SubRecordView`] give the per-record picture on top of the columns.

use crate::error::{L2Error, L2Result};
use crate::layout::{FieldGroup, FieldType, Rate};

/// Typed column storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    U64(Vec<u64>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
}

/// Apply an expression to the vector inside any numeric variant.
macro_rules! with_numeric {
    ($data:expr, $v:ident => $body:expr, bool $b:ident => $bool_body:expr) => {
        match $data {
            ColumnData::I8($v) => $body,
            ColumnData::U8($v) => $body,
            ColumnData::I16($v) => $body,
            ColumnData::U16($v) => $body,
            ColumnData::I32($v) => $body,
            ColumnData::U32($v) => $body,
            ColumnData::I64($v) => $body,
            ColumnData::U64($v) => $body,
            ColumnData::F64($v) => $body,
            ColumnData::Bool($b) => $bool_body,
        }
    };
}

/// Rebuild the same variant from an expression over its vector.
macro_rules! map_variant {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ColumnData::I8($v) => ColumnData::I8($body),
            ColumnData::U8($v) => ColumnData::U8($body),
            ColumnData::I16($v) => ColumnData::I16($body),
            ColumnData::U16($v) => ColumnData::U16($body),
            ColumnData::I32($v) => ColumnData::I32($body),
            ColumnData::U32($v) => ColumnData::U32($body),
            ColumnData::I64($v) => ColumnData::I64($body),
            ColumnData::U64($v) => ColumnData::U64($body),
            ColumnData::F64($v) => ColumnData::F64($body),
            ColumnData::Bool($v) => ColumnData::Bool($body),
        }
    };
}

impl ColumnData {
    /// Zero-filled storage for an on-disk field type.
    pub fn zeros(ty: FieldType, len: usize) -> Self {
        match ty {
            FieldType::I8 => Self::I8(vec![0; len]),
            FieldType::U8 => Self::U8(vec![0; len]),
            FieldType::I16 => Self::I16(vec![0; len]),
            FieldType::U16 => Self::U16(vec![0; len]),
            FieldType::I32 => Self::I32(vec![0; len]),
            FieldType::U32 => Self::U32(vec![0; len]),
            FieldType::I64 => Self::I64(vec![0; len]),
            FieldType::U64 => Self::U64(vec![0; len]),
        }
    }

    pub fn len(&self) -> usize {
        with_numeric!(self, v => v.len(), bool b => b.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    /// Element as `f64`; booleans read as 0 or 1.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        with_numeric!(
            self,
            v => v.get(index).map(|x| *x as f64),
            bool b => b.get(index).map(|x| if *x { 1.0 } else { 0.0 })
        )
    }

    /// Multiply every element by `factor`, converting to `f64`.
    ///
    /// Boolean columns are returned unchanged.
    pub fn scaled(self, factor: f64) -> Self {
        match self {
            Self::Bool(b) => Self::Bool(b),
            Self::F64(mut v) => {
                v.iter_mut().for_each(|x| *x *= factor);
                Self::F64(v)
            }
            other => {
                let len = other.len();
                let scaled = (0..len)
                    .map(|i| other.get_f64(i).unwrap_or(f64::NAN) * factor)
                    .collect();
                Self::F64(scaled)
            }
        }
    }

    /// Repeat every element `times` times.
    pub fn broadcast(&self, times: usize) -> Self {
        map_variant!(self, v => v
            .iter()
            .flat_map(|x| std::iter::repeat(*x).take(times))
            .collect())
    }

    /// Copy of the elements selected by `indices`.
    pub fn gather(&self, indices: &[usize]) -> Self {
        map_variant!(self, v => indices.iter().map(|&i| v[i]).collect())
    }
}

/// A named, grouped column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub group: FieldGroup,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, group: FieldGroup, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            group,
            data,
        }
    }
}

/// Validity of high-rate slots: the first `counts[r]` slots of record `r`
/// are valid, the rest are padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaggedMask {
    slots: usize,
    counts: Vec<usize>,
}

impl RaggedMask {
    /// Mask with every slot invalid.
    pub fn empty(n_records: usize, slots: usize) -> Self {
        Self {
            slots,
            counts: vec![0; n_records],
        }
    }

    /// Mask from per-record valid counts, each clamped to `slots`.
    pub fn from_counts(slots: usize, counts: impl IntoIterator<Item = usize>) -> Self {
        Self {
            slots,
            counts: counts.into_iter().map(|c| c.min(slots)).collect(),
        }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn n_records(&self) -> usize {
        self.counts.len()
    }

    /// Valid slots of record `record`.
    pub fn count(&self, record: usize) -> usize {
        self.counts.get(record).copied().unwrap_or(0)
    }

    pub fn set_count(&mut self, record: usize, count: usize) {
        self.counts[record] = count.min(self.slots);
    }

    pub fn is_valid(&self, record: usize, slot: usize) -> bool {
        slot < self.count(record)
    }

    /// Validity of record `record`'s slots.
    pub fn record_mask(&self, record: usize) -> Vec<bool> {
        (0..self.slots).map(|s| self.is_valid(record, s)).collect()
    }

    /// Row-major validity of every slot.
    pub fn flat(&self) -> Vec<bool> {
        self.counts
            .iter()
            .flat_map(|&c| (0..self.slots).map(move |s| s < c))
            .collect()
    }

    /// Flat indices of valid slots, in record order.
    pub fn valid_indices(&self) -> Vec<usize> {
        self.counts
            .iter()
            .enumerate()
            .flat_map(|(r, &c)| (0..c).map(move |s| r * self.slots + s))
            .collect()
    }

    pub fn total_valid(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Decoded records of one product.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    mask: RaggedMask,
    columns: Vec<Column>,
}

impl RecordSet {
    pub fn new(mask: RaggedMask) -> Self {
        Self {
            mask,
            columns: Vec::new(),
        }
    }

    pub fn n_records(&self) -> usize {
        self.mask.n_records()
    }

    pub fn slots(&self) -> usize {
        self.mask.slots()
    }

    pub fn mask(&self) -> &RaggedMask {
        &self.mask
    }

    pub(crate) fn mask_mut(&mut self) -> &mut RaggedMask {
        &mut self.mask
    }

    /// Expected column length for a group.
    pub fn column_len(&self, group: FieldGroup) -> usize {
        match group.rate() {
            Rate::Low => self.n_records(),
            Rate::High => self.n_records() * self.slots(),
        }
    }

    /// Add a column, replacing any column with the same group and name.
    pub fn insert(&mut self, column: Column) -> L2Result<()> {
        let expected = self.column_len(column.group);
        if column.data.len() != expected {
            return Err(L2Error::InvalidFormat(format!(
                "column {}/{} has {} elements, expected {}",
                column.group.name(),
                column.name,
                column.data.len(),
                expected
            )));
        }
        match self
            .columns
            .iter_mut()
            .find(|c| c.group == column.group && c.name == column.name)
        {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, group: FieldGroup, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.group == group && c.name == name)
    }

    pub fn column_mut(&mut self, group: FieldGroup, name: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.group == group && c.name == name)
    }

    /// Per-record view.
    pub fn record(&self, index: usize) -> Option<RecordView<'_>> {
        (index < self.n_records()).then_some(RecordView { set: self, index })
    }

    pub fn records(&self) -> impl Iterator<Item = RecordView<'_>> {
        (0..self.n_records()).map(move |index| RecordView { set: self, index })
    }
}

/// One low-rate record and its sub-record slots.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    set: &'a RecordSet,
    index: usize,
}

impl<'a> RecordView<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of leading sub-record slots carrying data.
    pub fn n_valid(&self) -> usize {
        self.set.mask.count(self.index)
    }

    /// Low-rate field value.
    pub fn value(&self, group: FieldGroup, name: &str) -> Option<f64> {
        if group.rate() != Rate::Low {
            return None;
        }
        self.set.column(group, name)?.data.get_f64(self.index)
    }

    /// Sub-record slot, valid or not; `None` past the slot count.
    pub fn sub_record(&self, slot: usize) -> Option<SubRecordView<'a>> {
        (slot < self.set.slots()).then_some(SubRecordView {
            set: self.set,
            record: self.index,
            slot,
        })
    }

    /// Only the valid sub-records.
    pub fn valid_sub_records(&self) -> impl Iterator<Item = SubRecordView<'a>> {
        let set = self.set;
        let record = self.index;
        (0..self.n_valid()).map(move |slot| SubRecordView { set, record, slot })
    }

    pub fn validity(&self) -> Vec<bool> {
        self.set.mask.record_mask(self.index)
    }
}

/// One high-rate slot of a record.
#[derive(Debug, Clone, Copy)]
pub struct SubRecordView<'a> {
    set: &'a RecordSet,
    record: usize,
    slot: usize,
}

impl SubRecordView<'_> {
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn is_valid(&self) -> bool {
        self.set.mask.is_valid(self.record, self.slot)
    }

    /// Stored value of a high-rate field, including padding slots.
    pub fn value(&self, name: &str) -> Option<f64> {
        let column = self.set.column(FieldGroup::Data20Hz, name)?;
        column
            .data
            .get_f64(self.record * self.set.slots() + self.slot)
    }
}
