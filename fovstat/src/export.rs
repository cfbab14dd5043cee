//! CSV export
//!
//! One file per image, `<dir>/<image id>.csv`, with the columns
//! `Number` and `Area fraction` and one row per window.

use crate::io::IoResult;
use crate::sampling::ResultSet;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path of the CSV file for `image_id` under `dir`
pub fn csv_path(dir: &Path, image_id: &str) -> PathBuf {
    dir.join(format!("{}.csv", image_id))
}

/// Write every table of `results` into `dir`, creating it if needed.
///
/// Returns the written paths in result order.
pub fn write_csv_tables(results: &ResultSet, dir: &Path) -> IoResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(results.len());
    for (id, table) in results.iter() {
        let path = csv_path(dir, id);
        table.write_csv(BufWriter::new(File::create(&path)?))?;
        debug!(path = %path.display(), rows = table.len(), "table written");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_path() {
        assert_eq!(
            csv_path(Path::new("out"), "500X-BSE_001"),
            PathBuf::from("out/500X-BSE_001.csv")
        );
    }
}
