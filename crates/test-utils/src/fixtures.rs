//! Common test fixtures for Level-2 decoder tests.
//!
//! Product filenames for each baseline and encoding, plus the names of
//! real products tests look for through `require_test_file!`.

/// Well-formed product filenames.
pub mod filenames {
    /// Baseline A SAR product
    pub const SAR_A: &str = "CS_OFFL_SIR_SAR_2__20110101T000000_20110101T000500_A001.DBL";

    /// Baseline B LRM product
    pub const LRM_B: &str = "CS_OFFL_SIR_LRM_2__20120301T101010_20120301T102010_B001.DBL";

    /// Baseline C SARIn product
    pub const SIN_C: &str = "CS_OFFL_SIR_SIN_2__20140101T001425_20140101T001853_C001.DBL";

    /// Baseline C in-depth SAR product, near real time
    pub const SARI_C_NRT: &str = "CS_NRT__SIR_SARI2__20150615T120000_20150615T120400_C002.DBL";

    /// Baseline D SARIn product (netCDF)
    pub const SIN_D: &str = "CS_OFFL_SIR_SIN_2__20190101T001425_20190101T001853_D001.nc";

    /// Not a product name
    pub const INVALID: &str = "gfs_20241201_00z_f003.grib2";
}

/// Measurement data set names used in product headers.
pub mod data_sets {
    pub const SIN: &str = "SIR_SIN_L2";
    pub const SAR: &str = "SIR_SAR_L2";
    pub const LRM: &str = "SIR_LRM_L2";
    pub const GDR: &str = "SIR_GDR_2_";
}

/// Real products, optional. Place them under a `testdata/` directory or
/// point `TEST_DATA_DIR` at them.
pub mod real_products {
    /// Baseline C SARIn product with headers
    pub const BASELINE_C: &str = "CS_OFFL_SIR_SIN_2__20140101T001425_20140101T001853_C001.DBL";

    /// Baseline D SARIn product
    pub const BASELINE_D: &str = "CS_OFFL_SIR_SIN_2__20190101T001425_20190101T001853_D001.nc";
}

#[cfg(test)]
mod tests {
    use super::*;
    use l2_parser::{Baseline, ProductIdentity};

    #[test]
    fn test_filenames_parse() {
        for (name, baseline) in [
            (filenames::SAR_A, Baseline::A),
            (filenames::LRM_B, Baseline::B),
            (filenames::SIN_C, Baseline::C),
            (filenames::SARI_C_NRT, Baseline::C),
            (filenames::SIN_D, Baseline::D),
        ] {
            let identity = ProductIdentity::from_filename(name).unwrap();
            assert_eq!(identity.baseline, baseline, "{}", name);
        }
        assert!(ProductIdentity::from_filename(filenames::INVALID).is_err());
    }
}
