//! ASCII product header parsing (MPH, SPH, DSD).
//!
//! Binary products may carry three text blocks ahead of the record
//! payload:
//!
//! - Main Product Header (MPH): 41 `KEY=value` lines
//! - Specific Product Header (SPH): variable length, `SPH_SIZE` bytes,
//!   with nested dataset descriptor groups opened by `DS_NAME` lines
//! - Data Set Descriptor (DSD) of the measurement dataset: 8 lines giving
//!   the payload offset, record count and record size
//!
//! None of the byte offsets are known until the text has been parsed, so
//! every parser works on line structure over the raw product bytes.

use std::sync::OnceLock;

use regex::bytes::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::error::{L2Error, L2Result};

/// Number of text lines in a Main Product Header.
pub const MPH_LINES: usize = 41;

/// Lines following a `DS_NAME` line that belong to its SPH group.
pub const DS_GROUP_LINES: usize = 6;

/// Lines in a Data Set Descriptor, including its `DS_NAME` line.
pub const DSD_LINES: usize = 8;

/// A header entry: either a scalar value or a named group of values.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderEntry {
    Value(String),
    Group(HeaderBlock),
}

impl Serialize for HeaderEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HeaderEntry::Value(v) => serializer.serialize_str(v),
            HeaderEntry::Group(block) => block.serialize(serializer),
        }
    }
}

/// Ordered mapping of header keys to entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderBlock {
    entries: Vec<(String, HeaderEntry)>,
}

impl HeaderBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. Re-inserting a key replaces its value in place.
    pub fn insert(&mut self, key: impl Into<String>, entry: HeaderEntry) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((key, entry)),
        }
    }

    pub fn insert_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, HeaderEntry::Value(value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&HeaderEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    /// Scalar value of a key, `None` for absent keys and groups.
    pub fn value(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            HeaderEntry::Value(v) => Some(v.as_str()),
            HeaderEntry::Group(_) => None,
        }
    }

    pub fn group(&self, name: &str) -> Option<&HeaderBlock> {
        match self.get(name)? {
            HeaderEntry::Group(block) => Some(block),
            HeaderEntry::Value(_) => None,
        }
    }

    /// Last signed integer found in a value.
    ///
    /// Header numbers carry signs, zero padding and unit suffixes, e.g.
    /// `+00000000000000001247<bytes>`.
    pub fn numeric(&self, key: &str) -> Option<i64> {
        let value = self.value(key)?;
        numeric_regex()
            .find_iter(value.as_bytes())
            .last()
            .and_then(|m| std::str::from_utf8(m.as_bytes()).ok())
            .and_then(|s| s.parse::<i64>().ok())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }
}

impl Serialize for HeaderBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

/// The three header blocks of a binary product.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ProductHeaders {
    pub mph: HeaderBlock,
    pub sph: HeaderBlock,
    pub dsd: HeaderBlock,
}

/// Location of the record payload within a product file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload {
    pub offset: usize,
    pub record_count: usize,
    pub record_size: usize,
}

/// Whether a file of `file_size` bytes must carry a header.
///
/// Headerless products are an exact multiple of the record size.
pub fn has_header(file_size: usize, record_size: usize) -> bool {
    (file_size / record_size) * record_size != file_size
}

impl ProductHeaders {
    /// Parse MPH, SPH and the measurement DSD from product bytes.
    pub fn parse(data: &[u8]) -> L2Result<Self> {
        let mph = parse_mph(data)?;
        let sph_size = mph
            .numeric("SPH_SIZE")
            .filter(|n| *n >= 0)
            .ok_or_else(|| L2Error::MissingHeaderField("SPH_SIZE".to_string()))?
            as usize;
        let sph = parse_sph(data, sph_size)?;

        // The DSDs live inside the SPH; keep the scan off the binary payload.
        let header_end = (mph_length(data)? + sph_size).min(data.len());
        let dsd = parse_dsd(&data[..header_end])?;

        debug!(
            mph_fields = mph.len(),
            sph_fields = sph.len(),
            sph_size = sph_size,
            "Parsed product headers"
        );

        Ok(Self { mph, sph, dsd })
    }

    /// Payload location declared by the DSD, checked against the file size.
    pub fn payload(&self, file_size: usize) -> L2Result<Payload> {
        let field = |key: &str| -> L2Result<usize> {
            self.dsd
                .numeric(key)
                .filter(|n| *n >= 0)
                .map(|n| n as usize)
                .ok_or_else(|| L2Error::MissingHeaderField(key.to_string()))
        };
        let offset = field("DS_OFFSET")?;
        let record_count = field("NUM_DSR")?;
        let record_size = field("DSR_SIZE")?;

        // Saturates on absurd header values; anything past the file fails.
        let expected = (record_size as u64)
            .checked_mul(record_count as u64)
            .and_then(|n| n.checked_add(offset as u64))
            .unwrap_or(u64::MAX);
        if expected > file_size as u64 {
            return Err(L2Error::PayloadOverflow {
                expected,
                actual: file_size as u64,
            });
        }

        Ok(Payload {
            offset,
            record_count,
            record_size,
        })
    }
}

// =============================================================================
// Block parsers
// =============================================================================

/// Parse the Main Product Header from the start of a product.
pub fn parse_mph(data: &[u8]) -> L2Result<HeaderBlock> {
    let lines: Vec<RawLine> = split_lines(data).take(MPH_LINES).collect();
    if lines.len() < MPH_LINES {
        return Err(L2Error::InvalidHeader {
            block: "MPH",
            line: lines.len(),
            reason: format!("expected {} lines, found {}", MPH_LINES, lines.len()),
        });
    }

    if !is_product_line(lines[0].text) {
        return Err(L2Error::InvalidHeader {
            block: "MPH",
            line: 0,
            reason: "file does not start with a valid PDS MPH".to_string(),
        });
    }

    let mut block = HeaderBlock::new();
    for line in &lines {
        if let Some((key, value)) = parse_key_value(line.text) {
            block.insert_value(key, value);
        }
    }
    Ok(block)
}

/// Parse the Specific Product Header following the MPH.
///
/// `sph_size` bounds the block in bytes, as declared by the MPH.
pub fn parse_sph(data: &[u8], sph_size: usize) -> L2Result<HeaderBlock> {
    let start = mph_length(data)?;
    let end = (start + sph_size).min(data.len());
    let region = &data[start..end];

    let mut raw = split_lines(region)
        .enumerate()
        .skip_while(|(_, l)| l.text.iter().all(|b| b.is_ascii_whitespace()));
    match raw.next() {
        Some((_, first)) if first.text.starts_with(b"SPH_DESCRIPTOR=") => {}
        Some((index, _)) => {
            return Err(L2Error::InvalidHeader {
                block: "SPH",
                line: MPH_LINES + index,
                reason: "expected SPH_DESCRIPTOR".to_string(),
            })
        }
        None => {
            return Err(L2Error::InvalidHeader {
                block: "SPH",
                line: MPH_LINES,
                reason: "empty SPH".to_string(),
            })
        }
    }

    // Binary noise can bleed into the tail of the block: keep only
    // printable key/value lines.
    let lines: Vec<&[u8]> = split_lines(region)
        .map(|l| l.text)
        .filter(|t| t.contains(&b'=') && t.iter().all(|b| (0x20..=0x7e).contains(b)))
        .collect();

    let mut block = HeaderBlock::new();
    let mut c = 0;
    while c < lines.len() {
        let line = lines[c];
        if line.starts_with(b"DS_NAME") {
            let name = parse_key_value(line)
                .map(|(_, v)| v)
                .unwrap_or_default();
            let mut group = HeaderBlock::new();
            for member in lines.iter().skip(c + 1).take(DS_GROUP_LINES) {
                if let Some((key, value)) = parse_key_value(member) {
                    group.insert_value(key, value);
                }
            }
            block.insert(name, HeaderEntry::Group(group));
            c += DS_GROUP_LINES + 1;
        } else {
            if let Some((key, value)) = parse_key_value(line) {
                block.insert_value(key, value);
            }
            c += 1;
        }
    }
    Ok(block)
}

/// Parse the measurement Data Set Descriptor.
///
/// Patterns are tried in priority order; the first line matching the
/// earliest pattern opens the 8-line descriptor.
pub fn parse_dsd(data: &[u8]) -> L2Result<HeaderBlock> {
    let lines: Vec<&[u8]> = split_lines(data).skip(MPH_LINES).map(|l| l.text).collect();

    let start = dsd_patterns()
        .iter()
        .find_map(|rx| lines.iter().position(|line| rx.is_match(line)))
        .ok_or(L2Error::MissingDatasetDescriptor)?;

    if start + DSD_LINES > lines.len() {
        return Err(L2Error::InvalidHeader {
            block: "DSD",
            line: MPH_LINES + start,
            reason: format!("descriptor truncated, expected {} lines", DSD_LINES),
        });
    }

    let mut block = HeaderBlock::new();
    for line in &lines[start..start + DSD_LINES] {
        if let Some((key, value)) = parse_key_value(line) {
            block.insert_value(key, value);
        }
    }
    Ok(block)
}

/// Byte length of the MPH, including line terminators.
pub fn mph_length(data: &[u8]) -> L2Result<usize> {
    split_lines(data)
        .take(MPH_LINES)
        .enumerate()
        .last()
        .filter(|(i, _)| *i + 1 == MPH_LINES)
        .map(|(_, line)| line.end)
        .ok_or_else(|| L2Error::InvalidHeader {
            block: "MPH",
            line: 0,
            reason: format!("expected {} lines", MPH_LINES),
        })
}

// =============================================================================
// Internal helpers
// =============================================================================

struct RawLine<'a> {
    /// Offset just past the line terminator
    end: usize,
    /// Line content without `\n` / `\r\n`
    text: &'a [u8],
}

fn split_lines(data: &[u8]) -> impl Iterator<Item = RawLine<'_>> {
    let mut start = 0;
    std::iter::from_fn(move || {
        if start >= data.len() {
            return None;
        }
        let rest = &data[start..];
        let (len, end) = match rest.iter().position(|&b| b == b'\n') {
            Some(i) => (i, start + i + 1),
            None => (rest.len(), data.len()),
        };
        let mut text = &rest[..len];
        if let Some(stripped) = text.strip_suffix(b"\r") {
            text = stripped;
        }
        start = end;
        Some(RawLine { end, text })
    })
}

fn is_product_line(line: &[u8]) -> bool {
    line.strip_prefix(b"PRODUCT=\"")
        .map(|rest| rest.contains(&b'"'))
        .unwrap_or(false)
}

/// Split a `KEY=value` line on its first `=`.
///
/// A value opening with `"` runs to the last quote on the line; values
/// lose trailing whitespace.
fn parse_key_value(line: &[u8]) -> Option<(String, String)> {
    let eq = line.iter().position(|&b| b == b'=')?;
    let key = &line[..eq];
    let rest = &line[eq + 1..];

    let value = match rest.strip_prefix(b"\"") {
        Some(inner) => match inner.iter().rposition(|&b| b == b'"') {
            Some(close) => &inner[..close],
            None => rest,
        },
        None => rest,
    };

    Some((
        String::from_utf8_lossy(key).into_owned(),
        String::from_utf8_lossy(value).trim_end().to_string(),
    ))
}

fn numeric_regex() -> &'static Regex {
    static RX: OnceLock<Regex> = OnceLock::new();
    RX.get_or_init(|| Regex::new(r"[-+]?\d+").expect("numeric pattern is valid"))
}

fn dsd_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r#"DS_NAME="SIR_LRM_L2(_I)?[\s+]*""#,
            r#"DS_NAME="SIR_LRMIL2[\s+]*""#,
            r#"DS_NAME="SIR_SAR_L2(A|B)?(_I)?[\s+]*""#,
            r#"DS_NAME="SIR_SARIL2(A|B)?[\s+]*""#,
            r#"DS_NAME="SIR_FDM_L2[\s+]*""#,
            r#"DS_NAME="SIR_SIN_L2(_I)?[\s+]*""#,
            r#"DS_NAME="SIR_SINIL2[\s+]*""#,
            r#"DS_NAME="SIR_SID_L2(_I)?[\s+]*""#,
            r#"DS_NAME="SIR_SIDIL2[\s+]*""#,
            r#"DS_NAME="SIR_GDR_2(A|B|_)?[\s+]*""#,
        ]
        .iter()
        .map(|p| Regex::new(p).expect("dataset descriptor pattern is valid"))
        .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value_quoted() {
        let (k, v) = parse_key_value(b"PRODUCT=\"CS_OFFL_SIR_SIN_2__X.DBL   \"").unwrap();
        assert_eq!(k, "PRODUCT");
        assert_eq!(v, "CS_OFFL_SIR_SIN_2__X.DBL");
    }

    #[test]
    fn test_parse_key_value_bare() {
        let (k, v) = parse_key_value(b"ABS_ORBIT=+19847   ").unwrap();
        assert_eq!(k, "ABS_ORBIT");
        assert_eq!(v, "+19847");
        assert!(parse_key_value(b"no separator here").is_none());
    }

    #[test]
    fn test_parse_key_value_unterminated_quote() {
        let (_, v) = parse_key_value(b"KEY=\"open").unwrap();
        assert_eq!(v, "\"open");
    }

    #[test]
    fn test_numeric_takes_last_integer() {
        let mut block = HeaderBlock::new();
        block.insert_value("DS_OFFSET", "+00000000000000005678<bytes>");
        block.insert_value("DSR_SIZE", "+00000000000000000980<bytes>");
        block.insert_value("SPH_SIZE", "abc");
        assert_eq!(block.numeric("DS_OFFSET"), Some(5678));
        assert_eq!(block.numeric("DSR_SIZE"), Some(980));
        assert_eq!(block.numeric("SPH_SIZE"), None);
        assert_eq!(block.numeric("MISSING"), None);
    }

    #[test]
    fn test_split_lines_strips_carriage_return() {
        let lines: Vec<_> = split_lines(b"A=1\r\nB=2\nC=3").collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, b"A=1");
        assert_eq!(lines[0].end, 5);
        assert_eq!(lines[2].text, b"C=3");
    }

    #[test]
    fn test_has_header() {
        assert!(!has_header(980 * 3, 980));
        assert!(has_header(980 * 3 + 1, 980));
        assert!(!has_header(0, 1392));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut block = HeaderBlock::new();
        block.insert_value("A", "1");
        block.insert_value("B", "2");
        block.insert_value("A", "3");
        let keys: Vec<_> = block.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(block.value("A"), Some("3"));
    }
}
