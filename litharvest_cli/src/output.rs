//! CSV writing for aggregated chunk records.

use litharvest_core::aggregate;
use litharvest_core::ChunkRecord;
use std::path::Path;

/// Write the records as CSV at `path`. An empty record set still produces
/// a file, with neither header nor rows.
pub fn write_csv(path: &Path, records: &[ChunkRecord]) -> crate::Result<usize> {
    let table = aggregate::project(records)?;
    let mut writer = csv::Writer::from_path(path)?;
    if !table.header.is_empty() {
        writer.write_record(&table.header)?;
    }
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(table.rows.len())
}
