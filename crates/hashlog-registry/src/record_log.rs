use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use hashlog_types::Entry;
use tracing::{debug, error, info, warn};

use crate::config::SyncMode;
use crate::error::{RegistryError, RegistryResult};

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Bincode size of an `Entry`: index 8, digest 32, code 1, size 1, writer 32.
/// Every frame carries exactly this many payload bytes.
const PAYLOAD_SIZE: usize = 74;

const FRAME_SIZE: u64 = (HEADER_SIZE + PAYLOAD_SIZE) as u64;

struct RecordFile {
    file: File,
    /// Current end of the last complete record.
    offset: u64,
    /// A partial frame could not be cut back; the file end is unknown.
    failed: bool,
}

/// Result of reading a record log front-to-back.
#[derive(Debug)]
pub struct Scan {
    /// Complete records, in index order.
    pub entries: Vec<Entry>,
    /// Byte length covered by `entries`.
    pub valid_len: u64,
    /// A damaged or partial record was found at the end of the file.
    pub torn_tail: bool,
}

/// Append-only file of entry records.
///
/// On-disk format, one frame per entry:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized Entry)]
/// ```
///
/// The record count is the entry count; nothing else is stored. A frame is
/// either wholly present or treated as absent, so a crash can never leave a
/// count that disagrees with the records.
pub struct RecordLog {
    path: PathBuf,
    file: Mutex<RecordFile>,
    sync_mode: SyncMode,
}

impl RecordLog {
    /// Open (or create) a record log at the given path.
    pub fn open(path: &Path, sync_mode: SyncMode) -> RegistryResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let offset = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(RecordFile {
                file,
                offset,
                failed: false,
            }),
            sync_mode,
        })
    }

    /// Append one record. Returns the byte offset of its frame.
    ///
    /// If the write fails part-way the file is cut back to the previous
    /// frame boundary. If that also fails the log refuses every later
    /// append until it is reopened and recovered.
    pub fn append(&self, entry: &Entry) -> RegistryResult<u64> {
        let payload =
            bincode::serialize(entry).map_err(|e| RegistryError::Serialization(e.to_string()))?;
        if payload.len() != PAYLOAD_SIZE {
            return Err(RegistryError::Serialization(format!(
                "entry encodes to {} bytes, expected {PAYLOAD_SIZE}",
                payload.len()
            )));
        }
        let length = payload.len() as u32;
        let crc = crc32fast::hash(&payload);

        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
        frame.extend_from_slice(&length.to_le_bytes());
        frame.extend_from_slice(&crc.to_le_bytes());
        frame.extend_from_slice(&payload);

        let mut w = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if w.failed {
            return Err(RegistryError::Io(io::Error::other(format!(
                "record log {} has an uncut partial record; reopen to recover",
                self.path.display()
            ))));
        }
        let start = w.offset;

        if let Err(e) = write_frame(&mut w.file, &frame, self.sync_mode) {
            if let Err(cut) = w.file.set_len(start) {
                error!(offset = start, error = %cut, "could not cut back partial record");
                w.failed = true;
            }
            return Err(e.into());
        }
        w.offset += frame.len() as u64;

        debug!(offset = start, len = payload.len(), index = entry.index.0, "record append");
        Ok(start)
    }

    /// Read every complete record and cut away a damaged tail, if any.
    ///
    /// Damage anywhere but the final frame is an `IntegrityViolation`.
    pub fn recover(&self) -> RegistryResult<Vec<Entry>> {
        let scan = Self::scan(&self.path)?;

        if scan.torn_tail {
            let mut w = self.file.lock().unwrap_or_else(PoisonError::into_inner);
            w.file.set_len(scan.valid_len)?;
            w.file.sync_all()?;
            w.offset = scan.valid_len;
            warn!(valid_len = scan.valid_len, "truncated damaged tail record");
        }

        info!(recovered = scan.entries.len(), path = %self.path.display(), "record log recovered");
        Ok(scan.entries)
    }

    /// Read-only pass over the log at `path`.
    pub fn scan(path: &Path) -> RegistryResult<Scan> {
        let mut file = BufReader::new(File::open(path)?);
        let file_len = file.get_ref().metadata()?.len();
        let mut entries: Vec<Entry> = Vec::new();
        let mut offset: u64 = 0;
        let mut torn_tail = false;

        while offset < file_len {
            if offset + HEADER_SIZE as u64 > file_len {
                warn!(offset, file_len, "partial record header");
                torn_tail = true;
                break;
            }

            file.seek(SeekFrom::Start(offset))?;
            let mut header = [0u8; HEADER_SIZE];
            file.read_exact(&mut header)?;
            let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
            let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

            let remaining = file_len - offset;
            if length as usize != PAYLOAD_SIZE {
                if remaining <= FRAME_SIZE {
                    warn!(offset, length, "damaged final record header");
                    torn_tail = true;
                    break;
                }
                return Err(RegistryError::IntegrityViolation {
                    offset,
                    reason: format!("record length {length}, expected {PAYLOAD_SIZE}"),
                });
            }

            let frame_end = offset + FRAME_SIZE;
            if frame_end > file_len {
                warn!(offset, length, file_len, "truncated record");
                torn_tail = true;
                break;
            }

            let mut payload = [0u8; PAYLOAD_SIZE];
            file.read_exact(&mut payload)?;

            match decode_frame(&payload, expected_crc) {
                Ok(entry) => {
                    let expected = entries.len() as u64;
                    if entry.index.0 != expected {
                        return Err(RegistryError::IntegrityViolation {
                            offset,
                            reason: format!(
                                "record carries index {}, expected #{expected}",
                                entry.index
                            ),
                        });
                    }
                    entries.push(entry);
                }
                Err(reason) if frame_end == file_len => {
                    warn!(offset, %reason, "damaged final record");
                    torn_tail = true;
                    break;
                }
                Err(reason) => {
                    return Err(RegistryError::IntegrityViolation { offset, reason });
                }
            }

            offset = frame_end;
        }

        Ok(Scan {
            entries,
            valid_len: offset,
            torn_tail,
        })
    }

    /// Current end-of-log offset.
    pub fn offset(&self) -> u64 {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .offset
    }

    /// Path to the record log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn write_frame(file: &mut File, frame: &[u8], sync_mode: SyncMode) -> io::Result<()> {
    file.write_all(frame)?;
    file.flush()?;
    if matches!(sync_mode, SyncMode::EveryWrite) {
        file.sync_data()?;
    }
    Ok(())
}

fn decode_frame(payload: &[u8], expected_crc: u32) -> Result<Entry, String> {
    let actual_crc = crc32fast::hash(payload);
    if actual_crc != expected_crc {
        return Err(format!(
            "CRC mismatch: expected {expected_crc:#010x}, got {actual_crc:#010x}"
        ));
    }
    bincode::deserialize::<Entry>(payload).map_err(|e| format!("undecodable record: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashlog_types::{EntryIndex, Triple, WriterId};

    fn entry(index: u64) -> Entry {
        Entry {
            index: EntryIndex(index),
            triple: Triple::new([index as u8 + 1; 32], 0x12, 32),
            writer: WriterId::account("alice"),
        }
    }

    fn flip_byte(path: &Path, at: u64) {
        let mut file = OpenOptions::new().read(true).write(true).open(path).unwrap();
        file.seek(SeekFrom::Start(at)).unwrap();
        let mut buf = [0u8; 1];
        file.read_exact(&mut buf).unwrap();
        buf[0] ^= 0xFF;
        file.seek(SeekFrom::Start(at)).unwrap();
        file.write_all(&buf).unwrap();
        file.sync_all().unwrap();
    }

    #[test]
    fn append_and_recover_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.log");
        let log = RecordLog::open(&path, SyncMode::default()).unwrap();

        for i in 0..3 {
            log.append(&entry(i)).unwrap();
        }

        let recovered = log.recover().unwrap();
        assert_eq!(recovered, vec![entry(0), entry(1), entry(2)]);
    }

    #[test]
    fn recover_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = RecordLog::open(&dir.path().join("empty.log"), SyncMode::default()).unwrap();
        assert!(log.recover().unwrap().is_empty());
    }

    #[test]
    fn append_returns_increasing_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let log = RecordLog::open(&dir.path().join("offsets.log"), SyncMode::default()).unwrap();

        let off0 = log.append(&entry(0)).unwrap();
        let off1 = log.append(&entry(1)).unwrap();
        assert_eq!(off0, 0);
        assert!(off1 > off0);
        assert_eq!(log.offset(), 2 * off1);
    }

    #[test]
    fn truncated_tail_is_cut_away() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tail.log");
        let log = RecordLog::open(&path, SyncMode::default()).unwrap();
        log.append(&entry(0)).unwrap();
        let boundary = log.append(&entry(1)).unwrap();
        let total = log.offset();
        drop(log);

        OpenOptions::new()
            .write(true)
            .open(&path)
            .unwrap()
            .set_len(total - 4)
            .unwrap();

        let log = RecordLog::open(&path, SyncMode::default()).unwrap();
        assert_eq!(log.recover().unwrap(), vec![entry(0)]);
        assert_eq!(log.offset(), boundary);
        assert_eq!(fs::metadata(&path).unwrap().len(), boundary);

        // The next record lands on a clean frame boundary.
        log.append(&entry(1)).unwrap();
        assert_eq!(log.recover().unwrap().len(), 2);
    }

    #[test]
    fn corrupt_final_record_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final.log");
        let log = RecordLog::open(&path, SyncMode::default()).unwrap();
        log.append(&entry(0)).unwrap();
        let last = log.append(&entry(1)).unwrap();
        drop(log);

        flip_byte(&path, last + HEADER_SIZE as u64);

        let log = RecordLog::open(&path, SyncMode::default()).unwrap();
        assert_eq!(log.recover().unwrap(), vec![entry(0)]);
    }

    #[test]
    fn corrupt_middle_record_is_an_integrity_violation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("middle.log");
        let log = RecordLog::open(&path, SyncMode::default()).unwrap();
        log.append(&entry(0)).unwrap();
        log.append(&entry(1)).unwrap();
        drop(log);

        flip_byte(&path, HEADER_SIZE as u64);

        let err = RecordLog::scan(&path).unwrap_err();
        assert!(matches!(err, RegistryError::IntegrityViolation { offset: 0, .. }));
    }

    #[test]
    fn corrupt_middle_record_length_is_an_integrity_violation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("length.log");
        let log = RecordLog::open(&path, SyncMode::default()).unwrap();
        for i in 0..3 {
            log.append(&entry(i)).unwrap();
        }
        let total = log.offset();
        drop(log);

        {
            let mut file = OpenOptions::new().write(true).open(&path).unwrap();
            file.seek(SeekFrom::Start(3)).unwrap();
            file.write_all(&[0x7f]).unwrap();
        }

        let log = RecordLog::open(&path, SyncMode::default()).unwrap();
        assert!(matches!(
            log.recover(),
            Err(RegistryError::IntegrityViolation { offset: 0, .. })
        ));
        assert_eq!(fs::metadata(&path).unwrap().len(), total);
    }

    #[test]
    fn corrupt_final_record_length_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final-length.log");
        let log = RecordLog::open(&path, SyncMode::default()).unwrap();
        log.append(&entry(0)).unwrap();
        let last = log.append(&entry(1)).unwrap();
        drop(log);

        flip_byte(&path, last);

        let log = RecordLog::open(&path, SyncMode::default()).unwrap();
        assert_eq!(log.recover().unwrap(), vec![entry(0)]);
        assert_eq!(fs::metadata(&path).unwrap().len(), last);
    }

    #[test]
    fn entry_payload_has_fixed_size() {
        let payload = bincode::serialize(&entry(u64::MAX - 1)).unwrap();
        assert_eq!(payload.len(), PAYLOAD_SIZE);
    }

    #[test]
    fn uncut_partial_write_refuses_later_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.log");
        let log = RecordLog::open(&path, SyncMode::default()).unwrap();
        log.append(&entry(0)).unwrap();
        let boundary = log.offset();

        // A read-only handle fails both the write and the cut-back.
        log.file.lock().unwrap().file = File::open(&path).unwrap();
        assert!(matches!(log.append(&entry(1)), Err(RegistryError::Io(_))));

        log.file.lock().unwrap().file = OpenOptions::new().append(true).open(&path).unwrap();
        assert!(matches!(log.append(&entry(1)), Err(RegistryError::Io(_))));
        assert_eq!(log.offset(), boundary);
        assert_eq!(fs::metadata(&path).unwrap().len(), boundary);
        assert_eq!(RecordLog::scan(&path).unwrap().entries, vec![entry(0)]);
    }

    #[test]
    fn out_of_sequence_index_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gap.log");
        let log = RecordLog::open(&path, SyncMode::default()).unwrap();
        log.append(&entry(0)).unwrap();
        log.append(&entry(2)).unwrap();

        assert!(matches!(
            log.recover(),
            Err(RegistryError::IntegrityViolation { .. })
        ));
    }

    #[test]
    fn sync_every_write_mode() {
        let dir = tempfile::tempdir().unwrap();
        let log = RecordLog::open(&dir.path().join("sync.log"), SyncMode::EveryWrite).unwrap();
        log.append(&entry(0)).unwrap();
        assert_eq!(log.recover().unwrap().len(), 1);
    }
}
