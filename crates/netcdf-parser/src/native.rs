//! Native netCDF reading using the netcdf library.
//!
//! The netcdf library requires a file path (it wraps libnetcdf/HDF5 which
//! need file handles). When decoding from bytes, we write to a temp file
//! first. On Linux that file goes to `/dev/shm` when it is writable.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;

use l2_parser::{ArraySource, ArrayVariable, L2Result};
use netcdf::AttributeValue;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};

/// Turn off HDF5's diagnostic stack dumps on stderr for this process.
///
/// libnetcdf reports failures through return codes, which [`NetCdfSource`]
/// already turns into errors. Call before the first file is opened.
pub fn silence_hdf5_errors() {
    static SILENCED: Once = Once::new();

    SILENCED.call_once(|| {
        // SAFETY: null handler and client data is the documented way to
        // disable automatic printing for the default error stack.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// [`ArraySource`] over an open netCDF file.
pub struct NetCdfSource {
    file: netcdf::File,
}

impl NetCdfSource {
    pub fn open(path: impl AsRef<Path>) -> NetCdfResult<Self> {
        silence_hdf5_errors();
        let path = path.as_ref();
        let file = netcdf::open(path).map_err(|e| {
            NetCdfError::Library(format!("Failed to open {}: {}", path.display(), e))
        })?;
        Ok(Self { file })
    }

    fn read_variable(&self, name: &str) -> NetCdfResult<ArrayVariable> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))?;

        let data: Vec<f64> = var
            .get_values(..)
            .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;

        let mut variable = ArrayVariable::new(data);
        // Probe the attribute list first; a failed open is logged by HDF5.
        if var.attributes().any(|attr| attr.name() == "scale_factor") {
            let factor = var
                .attribute_value("scale_factor")
                .transpose()?
                .and_then(|value| f64::try_from(value).ok())
                .ok_or_else(|| {
                    NetCdfError::InvalidFormat(format!("{}: scale_factor is not numeric", name))
                })?;
            variable = variable.with_scale_factor(factor);
        }
        debug!(variable = name, len = variable.len(), "Read netCDF variable");
        Ok(variable)
    }

    fn read_attribute(&self, name: &str) -> NetCdfResult<Option<String>> {
        // Probe first; opening a missing attribute trips HDF5 diagnostics.
        if !self.file.attributes().any(|attr| attr.name() == name) {
            return Ok(None);
        }
        let Some(attr) = self.file.attribute(name) else {
            return Ok(None);
        };
        let value = attr.value()?;
        attribute_to_string(value)
            .map(Some)
            .ok_or_else(|| NetCdfError::InvalidFormat(format!("attribute {} is not scalar", name)))
    }
}

impl ArraySource for NetCdfSource {
    fn has_variable(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }

    fn variable(&self, name: &str) -> L2Result<ArrayVariable> {
        Ok(self.read_variable(name)?)
    }

    fn attribute(&self, name: &str) -> L2Result<Option<String>> {
        Ok(self.read_attribute(name)?)
    }
}

/// Text form of a scalar or string-valued attribute.
fn attribute_to_string(value: AttributeValue) -> Option<String> {
    let text = match value {
        AttributeValue::Str(s) => s,
        AttributeValue::Strs(v) => v.join(" "),
        AttributeValue::Schar(v) => v.to_string(),
        AttributeValue::Uchar(v) => v.to_string(),
        AttributeValue::Short(v) => v.to_string(),
        AttributeValue::Ushort(v) => v.to_string(),
        AttributeValue::Int(v) => v.to_string(),
        AttributeValue::Uint(v) => v.to_string(),
        AttributeValue::Longlong(v) => v.to_string(),
        AttributeValue::Ulonglong(v) => v.to_string(),
        AttributeValue::Float(v) => v.to_string(),
        AttributeValue::Double(v) => v.to_string(),
        _ => return None,
    };
    Some(text.trim().to_string())
}

/// Write `data` to a temp file that libnetcdf can open.
///
/// The file lives in `/dev/shm` on Linux when that is writable, otherwise
/// in the system temp directory, and is removed when the handle drops.
pub(crate) fn spill_to_temp_file(data: &[u8]) -> NetCdfResult<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("cryosat_l2_")
        .suffix(".nc")
        .tempfile_in(spill_dir())?;
    file.write_all(data)?;
    file.flush()?;
    Ok(file)
}

fn spill_dir() -> PathBuf {
    let shm = Path::new("/dev/shm");
    if cfg!(target_os = "linux") && tempfile::tempfile_in(shm).is_ok() {
        return shm.to_path_buf();
    }
    std::env::temp_dir()
}
