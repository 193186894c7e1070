#[cfg(test)]
mod tests {

    use cdbfile::{CdbError, CdbReader, CdbWriter};
    use std::path::PathBuf;
    use std::sync::Once;
    use tempfile::tempdir;

    /// Routes `RUST_LOG`-filtered engine logs through the test harness.
    fn init_tracing() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init()
                .ok();
        });
    }

    /// Helper to build a finalized database from a record list.
    fn build_db(records: &[(&[u8], &[u8])]) -> (tempfile::TempDir, PathBuf) {
        init_tracing();

        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("test.cdb");

        let mut writer = CdbWriter::create(&path).expect("Failed to create writer");
        for (key, value) in records {
            writer.put(key, value).expect("Failed to add record");
        }
        writer.finalize().expect("Failed to finalize database");

        (dir, path)
    }

    #[test]
    fn test_round_trip_single_record() {
        let (_dir, path) = build_db(&[(b"test_key", b"Hello, world!")]);

        let reader = CdbReader::open(&path).expect("Failed to open database");
        let value = reader
            .get(b"test_key")
            .expect("Lookup failed")
            .expect("Key should be found");

        assert_eq!(value, b"Hello, world!".as_slice());
    }

    #[test]
    fn test_lookup_scenario() {
        let (_dir, path) = build_db(&[
            (b"meow", b"0xdeadbeef"),
            (b"meow", b"0xbeefdead"),
            (b"abcd", b"test1"),
        ]);

        let reader = CdbReader::open(&path).expect("Failed to open database");

        assert_eq!(
            reader.get_nth(b"meow", 0).unwrap().unwrap(),
            b"0xdeadbeef".as_slice()
        );
        assert_eq!(
            reader.get_nth(b"meow", 1).unwrap().unwrap(),
            b"0xbeefdead".as_slice()
        );
        assert_eq!(
            reader.get(b"abcd").unwrap().unwrap(),
            b"test1".as_slice()
        );
        assert!(
            reader.get(b"nope").unwrap().is_none(),
            "Unknown key must be not-found, not an error"
        );
    }

    #[test]
    fn test_absent_key_is_not_found() {
        let (_dir, path) = build_db(&[(b"present", b"value")]);

        let reader = CdbReader::open(&path).expect("Failed to open database");
        assert!(reader.get(b"absent").unwrap().is_none());
        assert!(reader.get_nth(b"absent", 3).unwrap().is_none());
    }

    #[test]
    fn test_empty_database() {
        let (_dir, path) = build_db(&[]);

        let metadata = std::fs::metadata(&path).expect("Failed to stat database");
        assert_eq!(
            metadata.len(),
            2048,
            "An empty database is exactly the header region"
        );

        let reader = CdbReader::open(&path).expect("Failed to open database");
        assert!(reader.get(b"anything").unwrap().is_none());
    }

    #[test]
    fn test_empty_value_round_trip() {
        let (_dir, path) = build_db(&[(b"key", b""), (b"key", b"second")]);

        let reader = CdbReader::open(&path).expect("Failed to open database");
        let value = reader.get(b"key").unwrap().expect("Key should be found");
        assert!(value.is_empty());
        assert_eq!(
            reader.get_nth(b"key", 1).unwrap().unwrap(),
            b"second".as_slice()
        );
    }

    #[test]
    fn test_create_truncates_existing_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("test.cdb");

        let mut writer = CdbWriter::create(&path).expect("Failed to create writer");
        writer.put(b"old", b"old value").expect("Failed to add record");
        writer.finalize().expect("Failed to finalize");

        let mut writer = CdbWriter::create(&path).expect("Failed to recreate writer");
        writer.put(b"new", b"new value").expect("Failed to add record");
        writer.finalize().expect("Failed to finalize");

        let reader = CdbReader::open(&path).expect("Failed to open database");
        assert!(reader.get(b"old").unwrap().is_none());
        assert_eq!(
            reader.get(b"new").unwrap().unwrap(),
            b"new value".as_slice()
        );
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("does_not_exist.cdb");

        let err = CdbReader::open(&path).unwrap_err();
        assert!(matches!(err, CdbError::Io(_)));
    }

    #[test]
    fn test_value_handle_outlives_reader() {
        let (_dir, path) = build_db(&[(b"key", b"still here")]);

        let handle = {
            let reader = CdbReader::open(&path).expect("Failed to open database");
            reader.get(b"key").unwrap().expect("Key should be found")
        };

        // The handle keeps the mapping alive after the session is gone.
        assert_eq!(handle, b"still here".as_slice());
    }

    #[test]
    fn test_close_releases_session() {
        let (_dir, path) = build_db(&[(b"key", b"value")]);

        let reader = CdbReader::open(&path).expect("Failed to open database");
        reader.close();

        // The file stays readable by new sessions.
        let reader = CdbReader::open(&path).expect("Failed to reopen database");
        assert_eq!(reader.get(b"key").unwrap().unwrap(), b"value".as_slice());
    }
}
