//! Decoder for CryoSat-2 Level-2 altimetry products.
//!
//! Three physical encodings share one record model:
//!
//! - Baselines A and B: 980-byte big-endian binary records
//! - Baseline C: 1392-byte big-endian binary records
//! - Baseline D: flat netCDF arrays indexed by per-record `(first, count)`
//!
//! Binary files may be prefixed by ASCII product headers (MPH, SPH, DSD)
//! whose size is only known once parsed. Decoded records carry typed
//! low-rate (1 Hz) and high-rate (20 Hz) columns plus a ragged validity
//! mask, optional unit scaling and a `days_J2k` UTC time column.
//!
//! # Example
//!
//! ```no_run
//! use l2_parser::{read_dbl, DecodeOptions, FieldSelection};
//!
//! let product = read_dbl(
//!     "CS_OFFL_SIR_SIN_2__20140101T001425_20140101T001853_C001.DBL",
//!     &DecodeOptions::unpacked(),
//! )?;
//! let table = product.to_table(&FieldSelection::default_for(product.identity.baseline))?;
//! println!("{} rows", table.len());
//! # Ok::<(), l2_parser::L2Error>(())
//! ```

pub mod binary;
pub mod columnar;
pub mod error;
pub mod header;
pub mod identity;
pub mod layout;
pub mod reader;
pub mod record;
pub mod scale;
pub mod selection;
pub mod time;

pub use binary::decode_records;
pub use columnar::{decode_arrays, ArraySource, ArrayVariable, MemoryArraySource};
pub use error::{L2Error, L2Result};
pub use header::{HeaderBlock, HeaderEntry, ProductHeaders};
pub use identity::{Baseline, FileClass, ProductIdentity, ProductType};
pub use layout::{FieldGroup, FieldSpec, FieldType, RecordLayout};
pub use reader::{decode_columnar, decode_dbl, read_dbl, L2Product};
pub use record::{Column, ColumnData, RaggedMask, RecordSet, RecordView, SubRecordView};
pub use scale::ScaleTable;
pub use selection::{DecodeOptions, FieldSelection, FieldTable, TableSink};
pub use time::{count_leap_seconds, days_to_datetime, gps_time, utc_days};
