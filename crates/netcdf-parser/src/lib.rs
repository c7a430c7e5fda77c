//! netCDF reader for baseline D CryoSat-2 Level-2 products.
//!
//! Baseline D products are netCDF-4 files holding flat 20 Hz arrays
//! indexed per 1 Hz record by `ind_first_meas_20hz_01` and
//! `num_valid_01`. This crate exposes them as an [`ArraySource`] so that
//! `l2-parser` rebuilds the same record model the binary baselines use.
//!
//! # Example
//!
//! ```no_run
//! use l2_parser::DecodeOptions;
//! use netcdf_parser::read_nc;
//!
//! let product = read_nc(
//!     "CS_OFFL_SIR_SIN_2__20190101T001425_20190101T001853_D001.nc",
//!     &DecodeOptions::default(),
//! )?;
//! println!("{} records", product.n_records());
//! # Ok::<(), netcdf_parser::NetCdfError>(())
//! ```
//!
//! [`ArraySource`]: l2_parser::ArraySource

mod error;
mod native;

pub use error::{NetCdfError, NetCdfResult};
pub use native::{silence_hdf5_errors, NetCdfSource};

use std::path::Path;

use l2_parser::{decode_columnar, DecodeOptions, L2Product};
use tracing::info;

/// Read and decode a baseline D product file.
///
/// The product identity comes from the file name.
pub fn read_nc(path: impl AsRef<Path>, options: &DecodeOptions) -> NetCdfResult<L2Product> {
    let path = path.as_ref();
    let name = file_name(path);
    let source = NetCdfSource::open(path)?;
    let product = decode_columnar(&name, &source, options)
        .map_err(|e| e.in_file(path.display().to_string()))?;
    info!(file = %name, records = product.n_records(), "Read netCDF product");
    Ok(product)
}

/// Decode a baseline D product held in memory.
///
/// `filename` supplies the product identity; `data` is written to a temp
/// file for libnetcdf and removed afterwards.
pub fn decode_nc_bytes(
    filename: &str,
    data: &[u8],
    options: &DecodeOptions,
) -> NetCdfResult<L2Product> {
    let temp = native::spill_to_temp_file(data)?;
    let source = NetCdfSource::open(temp.path())?;
    let product = decode_columnar(filename, &source, options)?;
    // libnetcdf must close the file before the temp file goes away.
    drop(source);
    drop(temp);
    Ok(product)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
