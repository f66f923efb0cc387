use std::path::{Path, PathBuf};

use log::debug;

use super::table::LogTable;
use super::LogCategory;

/// `<dir>/<category>_logs.csv`.
pub fn export_path(dir: &Path, category: LogCategory) -> PathBuf {
    dir.join(format!("{category}_logs.csv"))
}

/// Write the header row and every data row, replacing any existing file.
pub fn write_csv(table: &LogTable, path: &Path) -> Result<(), csv::Error> {
    debug!("writing {} rows to {}", table.rows.len(), path.display());
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::tempdir;

    use super::{export_path, write_csv};
    use crate::logs::table::LogTable;
    use crate::logs::LogCategory;

    #[test]
    fn path_is_named_after_category() {
        let path = export_path(Path::new("/tmp/out"), LogCategory::UserId);
        assert!(path.ends_with("user-id_logs.csv"));
    }

    #[test]
    fn overwrites_and_quotes_fields() {
        let dir = tempdir().expect("tempdir");
        let path = export_path(dir.path(), LogCategory::Threat);
        fs::write(&path, "stale contents\nmore\nlines\n").expect("seed");

        let table = LogTable {
            headers: vec!["misc".to_string(), "src".to_string()],
            rows: vec![vec!["a,b".to_string(), "10.0.0.1".to_string()]],
        };
        write_csv(&table, &path).expect("write");

        let written = fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines, vec!["misc,src", "\"a,b\",10.0.0.1"]);
    }
}
