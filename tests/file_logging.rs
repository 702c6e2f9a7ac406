use std::{fs, path::Path, sync::Arc, thread};

use scopelog::{
    fields, Cause, Facility, JsonFormatter, Logger, Priority, SimpleFormatter, StreamFacility,
};

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

fn file_logger(path: &Path, level: Priority) -> (Logger, Arc<StreamFacility>) {
    let facility = Arc::new(StreamFacility::file(path));
    let logger = Logger::new(facility.clone(), level, Arc::new(SimpleFormatter), vec![]).unwrap();
    (logger, facility)
}

#[test]
fn test_lines_carry_tag_and_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let (logger, _) = file_logger(&path, Priority::INFO);

    logger.info().print("started", &fields!["port", 8080]).unwrap();
    logger.on(Cause::msg("refused")).print("connect", &[]).unwrap();
    logger.with(None).print("flushed", &[]).unwrap();
    logger.trace(1).print("hidden", &[]).unwrap();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 3);

    assert!(lines[0].starts_with("INFO "));
    assert!(lines[0].ends_with(" started port=8080"));
    assert!(lines[1].starts_with("ERROR "));
    assert!(lines[1].ends_with(" connect - error=refused"));
    assert!(lines[2].starts_with("NOTICE "));
    assert!(lines[2].ends_with(" flushed - success"));

    // "INFO 2026/01/02 03:04:05 started ..."
    let stamp = &lines[0]["INFO ".len().."INFO ".len() + 19];
    assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y/%m/%d %H:%M:%S").is_ok());
}

#[test]
fn test_trace_lines_carry_call_site() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let (logger, _) = file_logger(&path, Priority::trace(2));

    logger.trace(2).print("detail", &[]).unwrap();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("TRACE "));
    assert!(lines[0].contains(" file_logging.rs:"));
    assert!(lines[0].ends_with(": detail"));
}

#[test]
fn test_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let facility = Arc::new(StreamFacility::file(&path));
    let logger = Logger::new(
        facility,
        Priority::INFO,
        Arc::new(JsonFormatter::compact()),
        vec![],
    )
    .unwrap();

    logger
        .with([Cause::msg("first"), Cause::msg("second")])
        .print("batch", &fields!["size", 2])
        .unwrap();

    let lines = read_lines(&path);
    assert!(lines[0].ends_with(r#" batch {"errors":["first","second"],"size":2}"#));
}

#[test]
fn test_file_is_appended() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, "existing\n").unwrap();

    let (logger, _) = file_logger(&path, Priority::INFO);
    logger.warning().print("appended", &[]).unwrap();

    let lines = read_lines(&path);
    assert_eq!(lines[0], "existing");
    assert!(lines[1].ends_with(" appended"));
}

#[test]
fn test_reopen_after_rotation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let rotated = dir.path().join("app.log.1");
    let (logger, facility) = file_logger(&path, Priority::INFO);

    logger.info().print("before", &[]).unwrap();
    fs::rename(&path, &rotated).unwrap();
    facility.reopen().unwrap();
    logger.info().print("after", &[]).unwrap();

    let old = read_lines(&rotated);
    let new = read_lines(&path);
    assert_eq!(old.len(), 1);
    assert!(old[0].ends_with(" before"));
    assert_eq!(new.len(), 1);
    assert!(new[0].ends_with(" after"));
}

#[test]
fn test_concurrent_reopen_loses_no_writes() {
    const WRITERS: usize = 4;
    const LINES: usize = 250;
    const ROTATIONS: usize = 20;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let (logger, facility) = file_logger(&path, Priority::INFO);

    let writers: Vec<_> = (0..WRITERS)
        .map(|w| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..LINES {
                    logger
                        .info()
                        .print("tick", &fields!["writer", w, "i", i])
                        .unwrap();
                }
            })
        })
        .collect();

    let rotator = {
        let facility = facility.clone();
        let path = path.clone();
        let dir = dir.path().to_path_buf();
        thread::spawn(move || {
            for n in 0..ROTATIONS {
                fs::rename(&path, dir.join(format!("app.log.{}", n))).unwrap();
                facility.reopen().unwrap();
            }
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    rotator.join().unwrap();

    let mut total = 0;
    for entry in fs::read_dir(dir.path()).unwrap() {
        let lines = read_lines(&entry.unwrap().path());
        for line in &lines {
            assert!(line.starts_with("INFO "), "torn line: {:?}", line);
            assert!(line.contains(" tick writer="), "torn line: {:?}", line);
        }
        total += lines.len();
    }
    assert_eq!(total, WRITERS * LINES);
}

#[test]
fn test_unwritable_destination_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("app.log");
    let facility = Arc::new(StreamFacility::file(&path));

    let err = Logger::new(facility, Priority::INFO, Arc::new(SimpleFormatter), vec![]).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed opening or creating log file"));
}
