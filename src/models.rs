//! Record data model shared by every extraction strategy.
//!
//! - [`Schema`]: the ordered set of field names every record in a run shares
//! - [`Record`]: one row of string fields, defaulting to the [`NA`] sentinel
//! - [`RecordCollection`]: ordered records with a single schema
//!
//! Records are value objects. After extraction the only mutation is
//! [`Record::set`], used by the merge step to overwrite one field.

use std::sync::Arc;

/// Sentinel for a field whose extraction failed or is unavailable.
pub const NA: &str = "NA";

pub const TITLE: &str = "Title";
pub const AUTHOR: &str = "Author";
pub const LINK: &str = "Link";
pub const DAY: &str = "Day";
pub const DATE: &str = "Date";
pub const CONTENT: &str = "Content";
pub const COUNTRY_NAME: &str = "CountryName";
pub const OTHER_ATTRIBUTE: &str = "OtherAttribute";
pub const VALUE: &str = "Value";

/// Ordered list of field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<&'static str>,
}

impl Schema {
    pub fn new(fields: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            fields: fields.to_vec(),
        })
    }

    /// Listing pass of the news job.
    pub fn listing() -> Arc<Self> {
        Self::new(&[TITLE, AUTHOR, LINK])
    }

    /// Detail pass of the news job.
    pub fn detail() -> Arc<Self> {
        Self::new(&[LINK, DAY, DATE, AUTHOR, CONTENT])
    }

    /// Columns of the exported news file.
    pub fn article() -> Arc<Self> {
        Self::new(&[TITLE, AUTHOR, DAY, DATE, CONTENT])
    }

    pub fn population() -> Arc<Self> {
        Self::new(&[COUNTRY_NAME, OTHER_ATTRIBUTE, VALUE])
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.position(field).is_some()
    }
}

/// One extracted row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<String>,
}

impl Record {
    /// A record with every field set to [`NA`].
    pub fn sentinel(schema: &Arc<Schema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            values: vec![NA.to_string(); schema.fields().len()],
        }
    }

    /// Builder-style setter. Unknown fields are ignored.
    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Overwrite one field. Returns `false` if the schema has no such field.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self.schema.position(field) {
            Some(idx) => {
                self.values[idx] = value.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.schema
            .position(field)
            .map(|idx| self.values[idx].as_str())
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Values in schema order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Ordered records sharing one schema. Insertion order is discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCollection {
    schema: Arc<Schema>,
    records: Vec<Record>,
}

impl RecordCollection {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            records: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Append a record. Records with a different schema are rebuilt against
    /// this collection's schema, field by field.
    pub fn push(&mut self, record: Record) {
        if record.schema == self.schema {
            self.records.push(record);
            return;
        }
        let mut rebuilt = Record::sentinel(&self.schema);
        for (field, value) in record.schema.fields().iter().zip(record.values) {
            rebuilt.set(field, value);
        }
        self.records.push(rebuilt);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = Record>) {
        for record in records {
            self.push(record);
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl IntoIterator for RecordCollection {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_record_is_all_na() {
        let record = Record::sentinel(&Schema::detail());
        assert!(record.values().iter().all(|v| v == NA));
        assert_eq!(record.values().len(), 5);
    }

    #[test]
    fn test_set_and_get() {
        let mut record = Record::sentinel(&Schema::listing()).with(TITLE, "Ringgit firms");
        assert_eq!(record.get(TITLE), Some("Ringgit firms"));
        assert_eq!(record.get(AUTHOR), Some(NA));
        assert!(!record.set(CONTENT, "nope"));
        assert_eq!(record.get(CONTENT), None);
    }

    #[test]
    fn test_push_rebuilds_foreign_schema() {
        let mut collection = RecordCollection::new(Schema::article());
        let detail = Record::sentinel(&Schema::detail())
            .with(LINK, "https://example.com/a")
            .with(DAY, "Friday");
        collection.push(detail);

        let stored = &collection.records()[0];
        assert_eq!(stored.schema(), collection.schema());
        assert_eq!(stored.get(DAY), Some("Friday"));
        assert_eq!(stored.get(TITLE), Some(NA));
        assert_eq!(stored.get(LINK), None);
    }
}
