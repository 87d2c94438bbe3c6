use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};


use crate::model::ReservationRecord;

use super::{ReservationStore, StoreError, note_corrupt_read};

/// Named string slots, the shape of a browser key-value store.
pub trait SlotBackend {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// In-process slots with an optional per-value byte quota.
#[derive(Debug, Clone, Default)]
pub struct MemorySlots {
    slots: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any write whose value exceeds `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            slots: HashMap::new(),
            quota: Some(bytes),
        }
    }
}

impl SlotBackend for MemorySlots {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        if let Some(quota) = self.quota
            && value.len() > quota
        {
            return Err(io::Error::other(format!(
                "storage quota exceeded: {} > {quota} bytes",
                value.len()
            )));
        }
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per slot under a directory. Writes go to a temp file that is
/// fsynced and renamed over the slot, so a crash never leaves half a value.
#[derive(Debug, Clone)]
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    pub fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, key: &str) -> io::Result<PathBuf> {
        if key.is_empty() || key.starts_with('.') || key.contains(['/', '\\']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid slot key {key:?}"),
            ));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SlotBackend for FileSlots {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.slot_path(key)?) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        let path = self.slot_path(key)?;
        let tmp_path = path.with_extension("json.tmp");
        let mut file = File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &path)
    }
}

/// The whole reservation list serialized as one JSON array in one slot.
pub struct SlotStore<B> {
    backend: B,
    key: String,
}

impl<B: SlotBackend> SlotStore<B> {
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn write(&mut self, records: &[ReservationRecord]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(records).map_err(|e| StoreError::Encode(e.to_string()))?;
        self.backend.set(&self.key, &raw)?;
        Ok(())
    }
}

impl<B: SlotBackend> ReservationStore for SlotStore<B> {
    fn list(&self) -> Vec<ReservationRecord> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                note_corrupt_read("slot", &e);
                return Vec::new();
            }
        };
        // A literal `null` is an empty slot, not corruption.
        match serde_json::from_str::<Option<Vec<ReservationRecord>>>(&raw) {
            Ok(records) => records.unwrap_or_default(),
            Err(e) => {
                note_corrupt_read("slot", &e);
                Vec::new()
            }
        }
    }

    fn append(&mut self, record: ReservationRecord) -> Result<(), StoreError> {
        let mut records = self.list();
        records.push(record);
        self.write(&records)
    }

    fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.list();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write(&records)?;
        Ok(true)
    }
}
