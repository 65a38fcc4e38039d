//! Fixed-stride scan over a flattened table.
//!
//! UNdata renders its result grid as one long run of `<td>` cells. Every
//! logical row is `stride` cells wide, so row `i` starts at `i * stride` and
//! each field sits at a fixed offset from there. The offsets live in a
//! [`StrideLayout`] table rather than in the scanning code.

use super::{RecordExtractor, digit_runs, recover};
use crate::error::ExtractionError;
use crate::index::{Document, Element, Predicate};
use crate::models::{COUNTRY_NAME, OTHER_ATTRIBUTE, Record, Schema, VALUE};
use std::sync::Arc;
use tracing::debug;

/// Where the fields of interest live inside one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrideLayout {
    /// Cells per logical row.
    pub stride: usize,
    /// Offset of the country name cell.
    pub name: usize,
    /// Offset of the secondary label cell.
    pub secondary: usize,
    /// Offset of the numeric value cell.
    pub value: usize,
    /// A row is kept only if each `(offset, label)` cell contains `label`.
    pub filters: &'static [(usize, &'static str)],
    /// Characters of markup before a label cell's text (`<td>`).
    pub trim_prefix: usize,
    /// Characters of markup after a label cell's text (`</td>`).
    pub trim_suffix: usize,
}

/// Foreign-born population, both sexes, all ages.
pub const UN_FOREIGN_BORN: StrideLayout = StrideLayout {
    stride: 11,
    name: 0,
    secondary: 1,
    value: 9,
    filters: &[(3, "Both Sexes"), (4, "Total"), (5, "Total Foreign-Born")],
    trim_prefix: 4,
    trim_suffix: 5,
};

#[derive(Debug, Clone)]
pub struct StrideTableExtractor {
    layout: StrideLayout,
    scope: Predicate,
    schema: Arc<Schema>,
}

impl StrideTableExtractor {
    pub fn new(layout: StrideLayout) -> Self {
        Self {
            layout,
            scope: Predicate::Class("DataContainer".to_string()),
            schema: Schema::population(),
        }
    }

    fn row_matches(&self, cells: &[Element], base: usize) -> bool {
        self.layout.filters.iter().all(|(offset, label)| {
            cells
                .get(base + offset)
                .is_some_and(|cell| cell.html.contains(label))
        })
    }

    fn parse_row(&self, cells: &[Element], base: usize) -> Result<Record, ExtractionError> {
        let cell = |offset: usize| {
            cells
                .get(base + offset)
                .ok_or(ExtractionError::CellOutOfRange {
                    index: base + offset,
                    len: cells.len(),
                })
        };

        let name = self.trim_markup(&cell(self.layout.name)?.html)?;
        let secondary = self.trim_markup(&cell(self.layout.secondary)?.html)?;
        let value_html = &cell(self.layout.value)?.html;
        let runs = digit_runs(value_html);
        if runs.is_empty() {
            return Err(ExtractionError::NoDigits(value_html.clone()));
        }

        Ok(Record::sentinel(&self.schema)
            .with(COUNTRY_NAME, name)
            .with(OTHER_ATTRIBUTE, secondary)
            .with(VALUE, runs.concat()))
    }

    /// Cut the fixed-width tag markup off both ends of a serialized cell.
    fn trim_markup(&self, html: &str) -> Result<String, ExtractionError> {
        let chars: Vec<char> = html.chars().collect();
        let (prefix, suffix) = (self.layout.trim_prefix, self.layout.trim_suffix);
        if chars.len() < prefix + suffix {
            return Err(ExtractionError::MarkupTooShort(html.to_string()));
        }
        Ok(chars[prefix..chars.len() - suffix].iter().collect())
    }
}

impl Default for StrideTableExtractor {
    fn default() -> Self {
        Self::new(UN_FOREIGN_BORN)
    }
}

impl RecordExtractor for StrideTableExtractor {
    fn schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// Cells of the first data container only.
    fn select(&self, document: &Document) -> Vec<Element> {
        document.select_within(&self.scope, &Predicate::tag("td"))
    }

    fn extract(&self, cells: &[Element]) -> Vec<Record> {
        let stride = self.layout.stride.max(1);
        let rows = cells.len() / stride;
        let records: Vec<Record> = (0..rows)
            .map(|row| row * stride)
            .filter(|&base| self.row_matches(cells, base))
            .map(|base| {
                recover(
                    &self.schema,
                    self.parse_row(cells, base),
                    &format!("table row at cell {base}"),
                )
            })
            .collect();
        debug!(cells = cells.len(), rows, matched = records.len(), "Scanned table");
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NA;
    use std::collections::BTreeMap;

    fn cell(text: &str) -> Element {
        Element {
            tag: "td".to_string(),
            attrs: BTreeMap::new(),
            text: text.to_string(),
            html: format!("<td>{text}</td>"),
        }
    }

    fn row(country: &str, sex: &str, area: &str, birth: &str, value: &str) -> Vec<Element> {
        [country, "Total", "2019", sex, area, birth, "Total", "Estimate", "2020", value, "1"]
            .iter()
            .map(|t| cell(t))
            .collect()
    }

    #[test]
    fn test_single_matching_row_in_three() {
        let mut cells = row("Albania", "Male", "Total", "Total Foreign-Born", "11");
        cells.extend(row("Andorra", "Both Sexes", "Total", "Total Foreign-Born", "45123"));
        cells.extend(row("Angola", "Both Sexes", "Urban", "Total Foreign-Born", "9"));
        assert_eq!(cells.len(), 33);

        let records = StrideTableExtractor::default().extract(&cells);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(COUNTRY_NAME), Some("Andorra"));
        assert_eq!(records[0].get(OTHER_ATTRIBUTE), Some("Total"));
        assert_eq!(records[0].get(VALUE), Some("45123"));
    }

    // Multi-run concatenation is kept as found; whether the site ever emits
    // separated values in this column is unverified.
    #[test]
    fn test_value_digit_runs_are_concatenated() {
        let cells = row("Chile", "Both Sexes", "Total", "Total Foreign-Born", "1,234,567");
        let records = StrideTableExtractor::default().extract(&cells);
        assert_eq!(records[0].get(VALUE), Some("1234567"));
    }

    #[test]
    fn test_value_without_digits_degrades_to_na() {
        let cells = row("Chile", "Both Sexes", "Total", "Total Foreign-Born", "n/a");
        let records = StrideTableExtractor::default().extract(&cells);
        assert_eq!(records.len(), 1);
        assert!(records[0].values().iter().all(|v| v == NA));
    }

    #[test]
    fn test_trailing_partial_row_is_ignored() {
        let mut cells = row("Chile", "Both Sexes", "Total", "Total Foreign-Born", "5");
        cells.extend(row("Peru", "Both Sexes", "Total", "Total Foreign-Born", "7").into_iter().take(10));
        let records = StrideTableExtractor::default().extract(&cells);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_select_reads_first_container() {
        let html = r#"<div class="DataContainer"><table><tr><td>Chile</td><td>Total</td></tr></table></div>
                      <div class="DataContainer"><table><tr><td>Other</td></tr></table></div>"#;
        let doc = Document::parse(html, None);
        let cells = StrideTableExtractor::default().select(&doc);
        assert_eq!(cells.len(), 2);
        assert!(StrideTableExtractor::default().extract(&cells).is_empty());
    }

    #[test]
    fn test_trim_markup() {
        let extractor = StrideTableExtractor::default();
        assert_eq!(extractor.trim_markup("<td>Côte d'Ivoire</td>").unwrap(), "Côte d'Ivoire");
        assert!(extractor.trim_markup("<td").is_err());
    }
}
