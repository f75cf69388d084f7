use atlas_logger::{LevelFilter, Logger, LoggerError};
use serial_test::serial;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
#[serial]
fn file_sink_writes_json_lines_and_blocks_second_install() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder("atlas-file-sink")
        .console(false)
        .file(&log_dir)
        .json(true)
        .level(LevelFilter::INFO)
        .init()?;
    assert!(logger.has_file_sink());

    tracing::info!(app = "catalog", "indexed application");

    let err = Logger::builder("atlas-file-sink-again").init().unwrap_err();
    assert!(matches!(err, LoggerError::Subscriber { .. }));

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(log_file)?;
    let line = contents.lines().find(|line| line.contains("indexed application")).unwrap();
    assert!(line.starts_with('{'), "file sink should emit JSON: {line}");
    assert!(line.contains("\"app\":\"catalog\""));

    Ok(())
}
