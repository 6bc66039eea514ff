// File-backed slot store
//
// One file per key, named `<key>.slot`. File format (binary):
// [magic: u32 LE] [version: u16 LE] [length: u32 LE] [payload: UTF-8] [crc32: u32 LE]
//
// Writes go to `<key>.slot.tmp` and are renamed into place, so a reader sees
// either the old slot or the new one.

use crate::kv::KvStore;
use campusdb_core::format_version::{magic, slot_version};
use campusdb_core::security::validate_slot_key;
use campusdb_core::{Error, Result};
use crc32fast::Hasher;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const SLOT_EXTENSION: &str = "slot";
const HEADER_LEN: usize = 4 + 2 + 4;
const TRAILER_LEN: usize = 4;

/// Slot store keeping each key in its own checksummed file.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "Opened file slot store");
        Ok(Self { dir })
    }

    /// Directory holding the slot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf> {
        validate_slot_key(key)?;
        Ok(self.dir.join(format!("{}.{}", key, SLOT_EXTENSION)))
    }
}

/// Length field for a payload, which must fit the frame's `u32`.
fn payload_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        Error::Storage(format!(
            "Slot payload of {} bytes exceeds the frame limit of {} bytes",
            len,
            u32::MAX
        ))
    })
}

/// Frames a slot payload with header and checksum.
///
/// # Errors
///
/// Returns `Error::Storage` when the payload is too large for one frame.
pub fn encode_slot(payload: &str) -> Result<Vec<u8>> {
    let bytes = payload.as_bytes();
    let len = payload_len(bytes.len())?;

    let mut hasher = Hasher::new();
    hasher.update(bytes);
    let crc = hasher.finalize();

    let mut frame = Vec::with_capacity(HEADER_LEN + bytes.len() + TRAILER_LEN);
    frame.extend_from_slice(&magic::SLOT.to_le_bytes());
    frame.extend_from_slice(&slot_version().current.to_le_bytes());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(bytes);
    frame.extend_from_slice(&crc.to_le_bytes());
    Ok(frame)
}

/// Validates a slot frame and returns its payload.
pub fn decode_slot(key: &str, data: &[u8]) -> Result<String> {
    let corrupt = |reason: String| Error::StorageDecode {
        key: key.to_string(),
        reason,
    };

    if data.len() < HEADER_LEN + TRAILER_LEN {
        return Err(corrupt(format!("Incomplete slot: {} bytes", data.len())));
    }

    let found_magic = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    if found_magic != magic::SLOT {
        return Err(corrupt(format!("Bad magic: {:#010x}", found_magic)));
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    if !slot_version().can_read(version) {
        return Err(corrupt(format!("Unsupported slot version {}", version)));
    }

    let length = u32::from_le_bytes([data[6], data[7], data[8], data[9]]) as usize;
    if data.len() != HEADER_LEN + length + TRAILER_LEN {
        return Err(corrupt(format!(
            "Length mismatch: header says {} payload bytes, file has {}",
            length,
            data.len() - HEADER_LEN - TRAILER_LEN
        )));
    }

    let payload = &data[HEADER_LEN..HEADER_LEN + length];
    let crc_offset = HEADER_LEN + length;
    let expected_crc = u32::from_le_bytes([
        data[crc_offset],
        data[crc_offset + 1],
        data[crc_offset + 2],
        data[crc_offset + 3],
    ]);

    let mut hasher = Hasher::new();
    hasher.update(payload);
    let actual_crc = hasher.finalize();

    if actual_crc != expected_crc {
        return Err(corrupt(format!(
            "CRC mismatch: expected {}, got {}",
            expected_crc, actual_crc
        )));
    }

    String::from_utf8(payload.to_vec()).map_err(|e| corrupt(e.to_string()))
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read(&path)?;
        decode_slot(key, &data).map(Some)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        let tmp_path = path.with_extension(format!("{}.tmp", SLOT_EXTENSION));

        let frame = encode_slot(value)?;
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&frame)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &path)?;

        debug!(key, bytes = frame.len(), "Wrote slot");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let path = self.slot_path(key)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SLOT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
