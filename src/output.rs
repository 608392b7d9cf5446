use std::fs::{self, File};
use std::path::Path;

use csv::{Reader, WriterBuilder};

use crate::error::Result;
use crate::model::Recommendation;

pub const COLUMNS: [&str; 10] = [
    "name",
    "location_str",
    "latitude",
    "longitude",
    "price",
    "rating",
    "cuisine",
    "recommender",
    "date",
    "neighborhood",
];

/// Writes the table, header included even when there are no rows.
pub fn write_recommendations(path: &Path, records: &[Recommendation]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record(COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()?;

    Ok(())
}

pub fn read_recommendations(path: &Path) -> Result<Vec<Recommendation>> {
    let mut reader = Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}
