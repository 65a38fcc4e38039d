//! Merging and exporting record collections.

use crate::error::WriteError;
use crate::models::{NA, Record, RecordCollection, Schema};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// Left join `secondary` onto `primary` by `key`.
///
/// The result has one record per primary record, in primary order. Its schema
/// is the primary schema followed by the secondary fields it lacks. For a
/// matched record every secondary field overwrites the primary one, sentinel
/// values included. Unmatched records keep their primary values and get `NA`
/// for secondary-only fields. When the secondary holds several records for a
/// key, the first one is used.
///
/// # Arguments
///
/// * `primary` - Records that all appear in the result
/// * `secondary` - Records joined onto matching primary records
/// * `key` - Field both sides are matched on
///
/// # Returns
///
/// A collection with exactly `primary.len()` records.
#[instrument(level = "info", skip_all, fields(%key, primary = primary.len(), secondary = secondary.len()))]
pub fn merge(primary: &RecordCollection, secondary: &RecordCollection, key: &str) -> RecordCollection {
    let mut fields = primary.schema().fields().to_vec();
    fields.extend(
        secondary
            .schema()
            .fields()
            .iter()
            .filter(|f| !primary.schema().contains(f)),
    );
    let schema = Schema::new(&fields);

    let mut by_key: HashMap<&str, &Record> = HashMap::new();
    for record in secondary {
        if let Some(value) = record.get(key) {
            by_key.entry(value).or_insert(record);
        }
    }

    let mut merged = RecordCollection::new(Arc::clone(&schema));
    let mut matched = 0usize;
    for record in primary {
        let mut out = Record::sentinel(&schema);
        copy_fields(record, &mut out);
        if let Some(other) = record.get(key).and_then(|k| by_key.get(k)) {
            copy_fields(other, &mut out);
            matched += 1;
        }
        merged.push(out);
    }

    info!(matched, "Merged record sets");
    merged
}

fn copy_fields(from: &Record, to: &mut Record) {
    for (field, value) in from.schema().fields().iter().zip(from.values()) {
        to.set(field, value.clone());
    }
}

/// Keep only the fields of `schema`, in its order. Missing fields become `NA`.
pub fn project(collection: &RecordCollection, schema: Arc<Schema>) -> RecordCollection {
    let mut projected = RecordCollection::new(Arc::clone(&schema));
    for record in collection {
        let mut out = Record::sentinel(&schema);
        for field in schema.fields() {
            out.set(field, record.get(field).unwrap_or(NA));
        }
        projected.push(out);
    }
    projected
}

/// Write `collection` as CSV with a header row, columns in schema order.
///
/// An existing file at `path` is overwritten.
///
/// # Arguments
///
/// * `collection` - Records to write
/// * `path` - Destination file; its directory must already exist
///
/// # Errors
///
/// [`WriteError::Io`] if the file cannot be created, [`WriteError::Csv`] if
/// writing a row fails.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = collection.len()))]
pub fn export(collection: &RecordCollection, path: &Path) -> Result<(), WriteError> {
    let file = std::fs::File::create(path).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(collection, file).map_err(|source| WriteError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Exported records");
    Ok(())
}

/// Write `collection` as CSV to any writer.
///
/// # Errors
///
/// Any [`csv::Error`] raised while serializing or flushing.
pub fn write_csv<W: std::io::Write>(collection: &RecordCollection, out: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(collection.schema().fields())?;
    for record in collection {
        writer.write_record(record.values())?;
    }
    writer.flush()?;
    Ok(())
}

/// `DDMMYY.csv` for `date`.
pub fn dated_filename(date: NaiveDate) -> String {
    format!("{}.csv", date.format("%d%m%y"))
}
