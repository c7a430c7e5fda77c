//! Error types for netCDF product reading.

use l2_parser::L2Error;
use thiserror::Error;

/// Result type for netCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for netCDF reading.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// libnetcdf refused to open or read the file
    #[error("NetCDF library error: {0}")]
    Library(String),

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Decoding the arrays into records failed
    #[error(transparent)]
    Decode(#[from] L2Error),
}

impl From<netcdf::Error> for NetCdfError {
    fn from(e: netcdf::Error) -> Self {
        NetCdfError::Library(e.to_string())
    }
}

impl From<NetCdfError> for L2Error {
    fn from(e: NetCdfError) -> Self {
        match e {
            NetCdfError::IoError(e) => L2Error::IoError(e),
            NetCdfError::Library(msg) | NetCdfError::InvalidFormat(msg) => {
                L2Error::InvalidFormat(msg)
            }
            NetCdfError::MissingData(msg) => L2Error::MissingData(msg),
            NetCdfError::Decode(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_into_l2_error() {
        let err: L2Error = NetCdfError::MissingData("time_cor_01".to_string()).into();
        assert!(matches!(err, L2Error::MissingData(ref v) if v == "time_cor_01"));

        let err: L2Error = NetCdfError::Decode(L2Error::MissingDatasetDescriptor).into();
        assert!(matches!(err, L2Error::MissingDatasetDescriptor));

        let err: L2Error = NetCdfError::Library("not a netCDF file".to_string()).into();
        assert!(err.to_string().contains("not a netCDF file"));
    }
}
