use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::MonthlyTimings;

/// Name of the one cache entry
const CACHE_FILE: &str = "prayer_times.json";

#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE)
    }

    /// Load the cached month, if there is one.
    pub fn load(&self) -> Result<Option<MonthlyTimings>> {
        let path = self.cache_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", path.display()))?;

        let cached: MonthlyTimings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", path.display()))?;

        Ok(Some(cached))
    }

    /// Load the cached month, treating an unreadable entry as absent.
    pub fn load_or_none(&self) -> Option<MonthlyTimings> {
        match self.load() {
            Ok(cached) => cached,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable prayer time cache");
                None
            }
        }
    }

    /// Replace the cached month. Written via a temp file so readers never see half an entry.
    pub fn save(&self, entry: &MonthlyTimings) -> Result<()> {
        let path = self.cache_path();
        let contents = serde_json::to_string_pretty(entry)?;

        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create {}", temp_path.display()))?;
        file.write_all(contents.as_bytes())
            .context("Failed to write prayer time cache")?;
        file.sync_all().context("Failed to flush prayer time cache")?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!(
            month = entry.month,
            year = entry.year,
            days = entry.timings.len(),
            "Prayer times saved to cache"
        );
        Ok(())
    }

    /// Remove the cached month
    pub fn clear(&self) -> Result<()> {
        let path = self.cache_path();
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateInfo, DayTimings, Position, Timings};
    use chrono::{TimeZone, Utc};

    fn entry(month: u32) -> MonthlyTimings {
        let day = DayTimings {
            timings: Some(Timings {
                fajr: Some("05:12".to_string()),
                ..Timings::default()
            }),
            date: DateInfo {
                readable: "17 Oct 2026".to_string(),
                gregorian: None,
            },
        };
        MonthlyTimings::new(
            vec![day],
            Position::new(41.0, 29.0),
            month,
            2026,
            Utc.with_ymd_and_hms(2026, 10, 15, 8, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_load_missing_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        assert!(cache.load().unwrap().is_none());
        assert!(cache.load_or_none().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        cache.save(&entry(10)).unwrap();

        let loaded = cache.load().unwrap().expect("entry present");
        assert_eq!(loaded, entry(10));
        // No temp file left behind
        assert!(!dir.path().join("prayer_times.tmp").exists());
    }

    #[test]
    fn test_save_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        cache.save(&entry(9)).unwrap();
        cache.save(&entry(10)).unwrap();

        let loaded = cache.load().unwrap().expect("entry present");
        assert_eq!(loaded.month, 10);
        let files = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 1);
    }

    #[test]
    fn test_corrupt_cache_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join(CACHE_FILE), "{ not json").unwrap();

        assert!(cache.load().is_err());
        assert!(cache.load_or_none().is_none());
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        cache.save(&entry(10)).unwrap();
        cache.clear().unwrap();
        assert!(cache.load().unwrap().is_none());
        // Clearing twice is fine
        cache.clear().unwrap();
    }
}
