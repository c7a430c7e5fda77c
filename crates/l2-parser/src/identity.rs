//! Product identity parsed from the product filename.
//!
//! Level-2 products follow a fixed naming rule:
//!
//! ```text
//! CS_OFFL_SIR_SIN_2__20140101T001425_20140101T001853_C001.DBL
//! |  |    |          |               |               ||
//! |  |    |          |               |               |version
//! |  |    |          |               |               baseline
//! |  |    |          |               validity stop
//! |  |    |          validity start
//! |  |    product type
//! |  file class
//! mission id
//! ```

use std::path::Path;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde::Serialize;

use crate::error::{L2Error, L2Result};

/// File class of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileClass {
    /// OFFL: off-line processing (systematic)
    OffLine,
    /// NRT_: near real time
    NearRealTime,
    /// RPRO: reprocessing
    Reprocessed,
    /// TEST: testing
    Test,
    /// LTA_: long term archive
    LongTermArchive,
}

impl FileClass {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "OFFL" => Some(Self::OffLine),
            "NRT_" => Some(Self::NearRealTime),
            "RPRO" => Some(Self::Reprocessed),
            "TEST" => Some(Self::Test),
            "LTA_" => Some(Self::LongTermArchive),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::OffLine => "OFFL",
            Self::NearRealTime => "NRT_",
            Self::Reprocessed => "RPRO",
            Self::Test => "TEST",
            Self::LongTermArchive => "LTA_",
        }
    }
}

/// Level-2 product type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProductType {
    /// SIR_LRM_2: Low Resolution Mode
    Lrm,
    /// SIR_FDM_2: Fast Delivery Marine Mode
    Fdm,
    /// SIR_SIN_2: SAR Interferometric
    Sin,
    /// SIR_SID_2: SIN Degraded
    Sid,
    /// SIR_SAR_2: SAR
    Sar,
    /// SIR_GDR_2: consolidated product
    Gdr,
    /// SIR_LRMI2: in-depth LRM
    LrmInDepth,
    /// SIR_SINI2: in-depth SIN
    SinInDepth,
    /// SIR_SIDI2: in-depth SIN degraded
    SidInDepth,
    /// SIR_SARI2: in-depth SAR
    SarInDepth,
}

impl ProductType {
    pub const ALL: [ProductType; 10] = [
        Self::Lrm,
        Self::Fdm,
        Self::Sin,
        Self::Sid,
        Self::Sar,
        Self::Gdr,
        Self::LrmInDepth,
        Self::SinInDepth,
        Self::SidInDepth,
        Self::SarInDepth,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Lrm => "SIR_LRM_2",
            Self::Fdm => "SIR_FDM_2",
            Self::Sin => "SIR_SIN_2",
            Self::Sid => "SIR_SID_2",
            Self::Sar => "SIR_SAR_2",
            Self::Gdr => "SIR_GDR_2",
            Self::LrmInDepth => "SIR_LRMI2",
            Self::SinInDepth => "SIR_SINI2",
            Self::SidInDepth => "SIR_SIDI2",
            Self::SarInDepth => "SIR_SARI2",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    /// Instrument mode the product was processed from.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Lrm | Self::LrmInDepth => "LRM",
            Self::Fdm => "FDM",
            Self::Sin | Self::SinInDepth => "SIN",
            Self::Sid | Self::SidInDepth => "SID",
            Self::Sar | Self::SarInDepth => "SAR",
            Self::Gdr => "GDR",
        }
    }

    pub fn is_in_depth(&self) -> bool {
        matches!(
            self,
            Self::LrmInDepth | Self::SinInDepth | Self::SidInDepth | Self::SarInDepth
        )
    }
}

/// Product format baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Baseline {
    A,
    B,
    C,
    D,
}

impl Baseline {
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }
}

/// Identity of a product, derived once from its filename.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductIdentity {
    pub mission: String,
    pub class: FileClass,
    pub product: ProductType,
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub baseline: Baseline,
    pub version: String,
}

fn filename_regex() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| {
        let classes = "OFFL|NRT_|RPRO|TEST|LTA_";
        let products = ProductType::ALL
            .iter()
            .map(|p| p.code())
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(
            r"(.*?)_({})_({})__(\d+T?\d+)_(\d+T?\d+)_(.*?)(\d+)",
            classes, products
        );
        Regex::new(&pattern).expect("product filename pattern is valid")
    })
}

impl ProductIdentity {
    /// Parse the identity from a file path or bare filename.
    pub fn from_filename(path: &str) -> L2Result<Self> {
        let stem = Path::new(path)
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| L2Error::InvalidFilename(path.to_string()))?;

        // Last match wins, which tolerates prefixes carrying underscores.
        let caps = filename_regex()
            .captures_iter(stem)
            .last()
            .ok_or_else(|| L2Error::InvalidFilename(stem.to_string()))?;

        let invalid = |what: &str| L2Error::InvalidFilename(format!("{}: bad {}", stem, what));

        let class = FileClass::from_code(&caps[2]).ok_or_else(|| invalid("file class"))?;
        let product = ProductType::from_code(&caps[3]).ok_or_else(|| invalid("product type"))?;
        let start = parse_validity_time(&caps[4]).ok_or_else(|| invalid("validity start"))?;
        let stop = parse_validity_time(&caps[5]).ok_or_else(|| invalid("validity stop"))?;
        let baseline = Baseline::from_letter(&caps[6]).ok_or_else(|| invalid("baseline"))?;

        Ok(Self {
            mission: caps[1].to_string(),
            class,
            product,
            start,
            stop,
            baseline,
            version: caps[7].to_string(),
        })
    }
}

/// Parse a validity timestamp: `YYYYMMDDTHHMMSS` or `YYYYMMDDHHMMSS`.
fn parse_validity_time(text: &str) -> Option<DateTime<Utc>> {
    let format = if text.contains('T') {
        "%Y%m%dT%H%M%S"
    } else {
        "%Y%m%d%H%M%S"
    };
    let naive = NaiveDateTime::parse_from_str(text, format).ok()?;
    Some(Utc.from_utc_datetime(&naive))
}
