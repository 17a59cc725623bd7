use crate::error::ReportResult;
use crate::result::QueryResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write the full result as CSV: UTF-8 with BOM, header row, no index column.
pub fn write_result_csv<P: AsRef<Path>>(result: &QueryResult, path: P) -> ReportResult<()> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(result.column_names())?;
    for row in result.text_rows() {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
