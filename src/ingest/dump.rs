//! Export of local gzipped log files into one readable JSON dump.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{ensure, Context, Result};
use flate2::read::GzDecoder;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Decode every gzipped log file under `folder` and append its contents,
/// pretty-printed, to `outfile`. Returns the number of files exported.
pub fn export_logs(folder: &Path, outfile: &Path) -> Result<usize> {
    ensure!(
        folder.is_dir(),
        "log folder '{}' does not exist or is not a directory",
        folder.display()
    );

    let out = File::create(outfile)
        .with_context(|| format!("failed to create '{}'", outfile.display()))?;
    let mut writer = BufWriter::new(out);

    let mut count = 0;
    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        info!(path = %entry.path().display(), "reading");
        match dump_file(entry.path(), &mut writer) {
            Ok(()) => count += 1,
            Err(e) => warn!(path = %entry.path().display(), error = %e, "failed to export"),
        }
    }
    writer.flush().context("failed to flush dump file")?;

    info!(
        count,
        folder = %folder.display(),
        outfile = %outfile.display(),
        "log files saved"
    );
    Ok(count)
}

fn dump_file(path: &Path, out: &mut impl Write) -> Result<()> {
    let file =
        File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    let reader = GzDecoder::new(BufReader::new(file));
    let document: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("failed to decode '{}'", path.display()))?;

    serde_json::to_writer_pretty(&mut *out, &document)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    #[test]
    fn test_export_decodes_and_pretty_prints() {
        let dir = tempfile::TempDir::new().unwrap();
        let logs = dir.path().join("logs");
        std::fs::create_dir(&logs).unwrap();

        let gz = File::create(logs.join("one.json.gz")).unwrap();
        let mut encoder = GzEncoder::new(gz, Compression::default());
        encoder
            .write_all(br#"{"Records":[{"eventName":"AssumeRole"}]}"#)
            .unwrap();
        encoder.finish().unwrap();

        let outfile = dir.path().join("events.json");
        let count = export_logs(&logs, &outfile).unwrap();
        assert_eq!(count, 1);

        let dumped = std::fs::read_to_string(&outfile).unwrap();
        assert!(dumped.contains("\"eventName\": \"AssumeRole\""));
    }

    #[test]
    fn test_export_missing_folder_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let outfile = dir.path().join("events.json");
        assert!(export_logs(Path::new("/nonexistent/logs"), &outfile).is_err());
    }
}
