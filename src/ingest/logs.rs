//! Ingestion from a local folder of gzip-compressed CloudTrail log files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use flate2::read::GzDecoder;
use tracing::warn;
use walkdir::WalkDir;

use crate::events::{EventBatch, TrailLog};

/// Recursively walk `folder` and append every decodable log file to the
/// batch. Returns the number of files successfully processed; unreadable
/// or undecodable files are logged and skipped.
pub fn load_folder(folder: &Path, batch: &mut EventBatch) -> Result<usize> {
    ensure!(
        folder.is_dir(),
        "log folder '{}' does not exist or is not a directory",
        folder.display()
    );

    let mut files = 0;
    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        match load_log_file(entry.path()) {
            Ok(log) => {
                batch.add_log(log);
                files += 1;
            }
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "failed to process log file");
            }
        }
    }
    Ok(files)
}

/// Decode one gzipped CloudTrail log file into its `Records` document.
pub fn load_log_file(path: &Path) -> Result<TrailLog> {
    let file =
        File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    let reader = GzDecoder::new(BufReader::new(file));
    let log: TrailLog = serde_json::from_reader(reader)
        .with_context(|| format!("failed to decode '{}'", path.display()))?;
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn write_gz(path: &Path, json: &str) {
        let file = File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(json.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    const LOG: &str = r#"{"Records": [
        {"eventName": "AssumeRole", "eventTime": "2020-01-01T00:00:01Z"},
        {"eventName": "DescribeInstances", "eventTime": "2020-01-01T00:00:02Z"}
    ]}"#;

    #[test]
    fn test_load_folder_recurses_and_skips_bad_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("2020/01/01");
        std::fs::create_dir_all(&nested).unwrap();

        write_gz(&dir.path().join("a.json.gz"), LOG);
        write_gz(&nested.join("b.json.gz"), LOG);
        // Not gzip at all; must be skipped, not abort the walk.
        std::fs::write(dir.path().join("garbage.txt"), "not a log").unwrap();

        let mut batch = EventBatch::new();
        let files = load_folder(dir.path(), &mut batch).unwrap();
        assert_eq!(files, 2);
        assert_eq!(batch.len(), 4);
    }

    #[test]
    fn test_load_folder_missing_is_an_error() {
        let mut batch = EventBatch::new();
        assert!(load_folder(Path::new("/nonexistent/logs"), &mut batch).is_err());
    }

    #[test]
    fn test_load_log_file_rejects_bad_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.json.gz");
        write_gz(&path, "{\"Records\": [{]}");
        assert!(load_log_file(&path).is_err());
    }
}
