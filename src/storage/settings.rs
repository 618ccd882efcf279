//! Key/value settings store.
//!
//! A small JSONL-backed table of string settings. The stats core reads
//! exactly one key from it (the competition start timestamp); the CLI
//! writes it.

use serde::{Deserialize, Serialize};

use super::{JsonlReader, JsonlWriter, StorageConfig, StorageError};

/// One settings row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

/// Read the value for a key. Returns `None` when the store or the key
/// does not exist. When a key appears more than once, the last write
/// wins.
pub fn read_setting(config: &StorageConfig, key: &str) -> Result<Option<String>, StorageError> {
    let reader: JsonlReader<Setting> = JsonlReader::new(config.settings_path());
    let settings = reader.read_all()?;
    Ok(settings
        .into_iter()
        .rev()
        .find(|s| s.key == key)
        .map(|s| s.value))
}

/// Write (or replace) the value for a key, compacting duplicates.
pub fn write_setting(config: &StorageConfig, key: &str, value: &str) -> Result<(), StorageError> {
    let reader: JsonlReader<Setting> = JsonlReader::new(config.settings_path());
    let mut settings = reader.read_all()?;

    settings.retain(|s| s.key != key);
    settings.push(Setting {
        key: key.to_string(),
        value: value.to_string(),
    });

    let writer: JsonlWriter<Setting> = JsonlWriter::new(config.settings_path());
    writer.write_all(&settings)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> StorageConfig {
        StorageConfig::new(temp_dir.path().to_path_buf())
    }

    #[test]
    fn test_read_missing_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        assert_eq!(read_setting(&config, "anything").unwrap(), None);
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        write_setting(&config, "competition_start_timestamp", "2025-01-01T00:00:00Z").unwrap();

        assert_eq!(
            read_setting(&config, "competition_start_timestamp").unwrap(),
            Some("2025-01-01T00:00:00Z".to_string())
        );
        assert_eq!(read_setting(&config, "other_key").unwrap(), None);
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        write_setting(&config, "k", "old").unwrap();
        write_setting(&config, "k", "new").unwrap();

        assert_eq!(read_setting(&config, "k").unwrap(), Some("new".to_string()));

        // Compacted: one row per key.
        let reader: JsonlReader<Setting> = JsonlReader::new(config.settings_path());
        assert_eq!(reader.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_last_write_wins_with_duplicate_rows() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        // Simulate an uncompacted store with duplicate keys.
        std::fs::write(
            config.settings_path(),
            r#"{"key":"k","value":"first"}
{"key":"k","value":"second"}
"#,
        )
        .unwrap();

        assert_eq!(
            read_setting(&config, "k").unwrap(),
            Some("second".to_string())
        );
    }

    #[test]
    fn test_multiple_keys() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        write_setting(&config, "a", "1").unwrap();
        write_setting(&config, "b", "2").unwrap();

        assert_eq!(read_setting(&config, "a").unwrap(), Some("1".to_string()));
        assert_eq!(read_setting(&config, "b").unwrap(), Some("2".to_string()));
    }
}
