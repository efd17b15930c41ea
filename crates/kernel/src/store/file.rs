#![forbid(unsafe_code)]

use super::{SelectionStore, parse_selections, upsert};
use crate::{Error, domain::SelectionRecord};
use parking_lot::Mutex;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{debug, error, trace, warn};

/// Selections stored as one JSON array in a single file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serialises read-modify-write cycles.
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Vec<SelectionRecord> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => parse_selections(&raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                trace!(path = %self.path.display(), "no saved selections yet");
                Vec::new()
            }
            Err(err) => {
                error!(path = %self.path.display(), %err, "failed to read saved selections");
                Vec::new()
            }
        }
    }

    /// Write to a sibling temporary file, then rename over the target.
    fn write(&self, records: &[SelectionRecord]) -> Result<(), Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_vec_pretty(records)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, encoded)?;
        if let Err(err) = fs::rename(&tmp, &self.path) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!(path = %tmp.display(), %cleanup, "failed to remove temporary file");
            }
            return Err(err.into());
        }
        debug!(path = %self.path.display(), count = records.len(), "selections persisted");
        Ok(())
    }
}

impl SelectionStore for JsonFileStore {
    fn get_selections(&self) -> Vec<SelectionRecord> {
        let _guard = self.lock.lock();
        self.read()
    }

    fn save_selection(&self, record: SelectionRecord) {
        let _guard = self.lock.lock();
        let mut records = self.read();
        upsert(&mut records, record);
        if let Err(err) = self.write(&records) {
            error!(path = %self.path.display(), %err, "failed to save preset selection");
        }
    }
}
