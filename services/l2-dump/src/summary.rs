//! JSON summary of a decoded product.

use l2_parser::{
    days_to_datetime, ColumnData, FieldTable, L2Product, ProductHeaders, ProductIdentity,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProductSummary<'a> {
    pub identity: &'a ProductIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<&'a ProductHeaders>,
    pub records: usize,
    pub slots: usize,
    pub valid_samples: usize,
    /// First and last valid sample times, RFC 3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_span: Option<(String, String)>,
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub preview: Vec<f64>,
}

impl<'a> ProductSummary<'a> {
    /// Summarize `table`, extracted from `product`, over its valid rows.
    pub fn build(product: &'a L2Product, table: &FieldTable, preview: usize) -> Self {
        let valid = product.records.mask().valid_indices();
        let columns = table
            .column_names()
            .filter_map(|name| table.column(name).map(|data| (name, data)))
            .map(|(name, data)| summarize(name, &data.gather(&valid), preview))
            .collect();

        Self {
            identity: &product.identity,
            headers: product.headers.as_ref(),
            records: product.n_records(),
            slots: product.records.slots(),
            valid_samples: valid.len(),
            time_span: time_span(table, &valid),
            columns,
        }
    }
}

fn summarize(name: &str, data: &ColumnData, preview: usize) -> ColumnSummary {
    let values: Vec<f64> = (0..data.len())
        .filter_map(|i| data.get_f64(i))
        .filter(|v| v.is_finite())
        .collect();
    ColumnSummary {
        name: name.to_string(),
        min: values.iter().copied().reduce(f64::min),
        max: values.iter().copied().reduce(f64::max),
        preview: values.iter().copied().take(preview).collect(),
    }
}

fn time_span(table: &FieldTable, valid: &[usize]) -> Option<(String, String)> {
    let days = table.column(l2_parser::time::DAYS_J2K_FIELD)?;
    let first = days_to_datetime(days.get_f64(*valid.first()?)?)?;
    let last = days_to_datetime(days.get_f64(*valid.last()?)?)?;
    Some((first.to_rfc3339(), last.to_rfc3339()))
}
