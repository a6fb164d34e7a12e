//! Append-only journal of committed application state

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use asc_core::{AppId, GlobalState, StorageError};

/// One committed change to an application's global state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub app_id: AppId,
    /// State after the change; `None` when the application was deleted
    pub state: Option<GlobalState>,
    /// Round of the group that committed the change
    pub round: u64,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl JournalEntry {
    pub fn new(app_id: AppId, state: Option<GlobalState>, round: u64) -> Self {
        Self {
            app_id,
            state,
            round,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Every state change committed by one group. Written and replayed as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalBatch {
    pub round: u64,
    pub entries: Vec<JournalEntry>,
}

/// Durable record of committed state changes
pub trait StateJournal: Send + Sync {
    /// Append the changes of one group as a single record. On error nothing
    /// of the batch may be replayed.
    fn record_batch(&self, batch: &JournalBatch) -> Result<(), StorageError>;

    /// Replay every complete batch, oldest first
    fn iterate_batches(&self) -> Box<dyn Iterator<Item = Result<JournalBatch, StorageError>> + '_>;

    /// Append a single state change as a batch of its own
    fn record(&self, app_id: AppId, state: Option<&GlobalState>, round: u64) -> Result<(), StorageError> {
        self.record_batch(&JournalBatch {
            round,
            entries: vec![JournalEntry::new(app_id, state.cloned(), round)],
        })
    }

    /// Replay every recorded change, oldest first
    fn iterate_entries(&self) -> Box<dyn Iterator<Item = Result<JournalEntry, StorageError>> + '_> {
        Box::new(self.iterate_batches().flat_map(|batch| match batch {
            Ok(batch) => batch.entries.into_iter().map(Ok).collect::<Vec<_>>(),
            Err(e) => vec![Err(e)],
        }))
    }

    /// Fold the journal into the newest state of every live application
    fn latest_states(&self) -> Result<BTreeMap<AppId, GlobalState>, StorageError> {
        let mut states = BTreeMap::new();
        for batch in self.iterate_batches() {
            for entry in batch?.entries {
                match entry.state {
                    Some(state) => {
                        states.insert(entry.app_id, state);
                    }
                    None => {
                        states.remove(&entry.app_id);
                    }
                }
            }
        }
        Ok(states)
    }
}

/// Journal stored as length-prefixed bincode batches in a single file
pub struct FileStateJournal {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileStateJournal {
    /// Open the journal at `path`, creating it if needed. Existing batches are kept.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        // Create or open the journal file
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)
            .map_err(|e| StorageError::Journal(format!("Failed to open journal file: {}", e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateJournal for FileStateJournal {
    fn record_batch(&self, batch: &JournalBatch) -> Result<(), StorageError> {
        let mut file = self
            .file
            .lock()
            .map_err(|e| StorageError::Journal(format!("Failed to acquire lock: {}", e)))?;

        // Serialize the batch
        let serialized = bincode::serialize(batch)?;

        // Frame the batch length and data so they go out in one write
        let mut frame = Vec::with_capacity(8 + serialized.len());
        frame.extend_from_slice(&(serialized.len() as u64).to_le_bytes());
        frame.extend_from_slice(&serialized);

        // Remember where the batch starts so a failed write can be cut off
        let start = file.metadata()?.len();
        let written = file.write_all(&frame).and_then(|_| file.flush());
        if let Err(e) = written {
            if let Err(truncate) = file.set_len(start) {
                warn!("Failed to cut off partial journal batch: {}", truncate);
            }
            return Err(e.into());
        }

        Ok(())
    }

    fn iterate_batches(&self) -> Box<dyn Iterator<Item = Result<JournalBatch, StorageError>> + '_> {
        match File::open(&self.path) {
            Ok(file) => Box::new(JournalIterator {
                reader: BufReader::new(file),
            }),
            Err(e) => Box::new(std::iter::once(Err(StorageError::from(e)))),
        }
    }
}

struct JournalIterator {
    reader: BufReader<File>,
}

impl Iterator for JournalIterator {
    type Item = Result<JournalBatch, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        // Read the batch length
        let mut len_buf = [0u8; 8];
        match self.reader.read_exact(&mut len_buf) {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return None,
            Err(e) => return Some(Err(StorageError::from(e))),
        }

        // Read the batch data; a short read is a torn batch and is never applied
        let batch_len = u64::from_le_bytes(len_buf);
        let mut batch_data = vec![0u8; batch_len as usize];
        if let Err(e) = self.reader.read_exact(&mut batch_data) {
            return Some(Err(StorageError::Journal(format!(
                "Truncated journal batch: {}",
                e
            ))));
        }

        // Deserialize the batch
        Some(bincode::deserialize(&batch_data).map_err(StorageError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asc_core::{Address, BurnState, HoldingsState, StateView};
    use tempfile::tempdir;

    fn holdings_state(price: u64) -> GlobalState {
        let mut global = GlobalState::new();
        HoldingsState { token_id: 2, price }.store(&mut global);
        global
    }

    #[test]
    fn test_journal_replays_in_order() {
        let temp_dir = tempdir().unwrap();
        let journal = FileStateJournal::open(&temp_dir.path().join("state.journal")).unwrap();

        journal.record(3, Some(&holdings_state(5_000_000)), 1).unwrap();
        journal.record(3, Some(&holdings_state(6_000_000)), 2).unwrap();

        let entries: Vec<_> = journal
            .iterate_entries()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].round, 1);
        assert_eq!(entries[1].state, Some(holdings_state(6_000_000)));
    }

    #[test]
    fn test_latest_states_drops_deleted_applications() {
        let temp_dir = tempdir().unwrap();
        let journal = FileStateJournal::open(&temp_dir.path().join("state.journal")).unwrap();

        let mut burn = GlobalState::new();
        BurnState { token_id: 2 }.store(&mut burn);

        journal.record(3, Some(&holdings_state(5_000_000)), 1).unwrap();
        journal.record(4, Some(&burn), 1).unwrap();
        journal.record(3, Some(&holdings_state(7)), 2).unwrap();
        journal.record(4, None, 3).unwrap();

        let states = journal.latest_states().unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[&3], holdings_state(7));
    }

    #[test]
    fn test_reopen_keeps_entries() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("state.journal");

        {
            let journal = FileStateJournal::open(&path).unwrap();
            let mut global = GlobalState::new();
            global.put_bytes("HoldingsAddr", Address::from_seed(b"h").bytes().to_vec());
            journal.record(1, Some(&global), 1).unwrap();
        }

        let journal = FileStateJournal::open(&path).unwrap();
        journal.record(1, None, 2).unwrap();

        assert_eq!(journal.iterate_entries().count(), 2);
        assert!(journal.latest_states().unwrap().is_empty());
    }

    #[test]
    fn test_batch_is_one_record() {
        let temp_dir = tempdir().unwrap();
        let journal = FileStateJournal::open(&temp_dir.path().join("state.journal")).unwrap();

        journal.record(4, Some(&holdings_state(1)), 1).unwrap();
        journal
            .record_batch(&JournalBatch {
                round: 2,
                entries: vec![
                    JournalEntry::new(3, Some(holdings_state(9)), 2),
                    JournalEntry::new(4, None, 2),
                ],
            })
            .unwrap();

        let batches: Vec<_> = journal
            .iterate_batches()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].round, 2);
        assert_eq!(batches[1].entries.len(), 2);
        assert_eq!(journal.iterate_entries().count(), 3);

        let states = journal.latest_states().unwrap();
        assert_eq!(states.keys().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_torn_batch_is_never_replayed() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("state.journal");

        let journal = FileStateJournal::open(&path).unwrap();
        journal.record(1, Some(&holdings_state(1)), 1).unwrap();
        drop(journal);

        // Half of a two-entry batch, as left behind by a crash mid-write
        let torn = JournalBatch {
            round: 2,
            entries: vec![
                JournalEntry::new(2, Some(holdings_state(2)), 2),
                JournalEntry::new(3, Some(holdings_state(3)), 2),
            ],
        };
        let serialized = bincode::serialize(&torn).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&(serialized.len() as u64).to_le_bytes()).unwrap();
        file.write_all(&serialized[..serialized.len() / 2]).unwrap();
        drop(file);

        let journal = FileStateJournal::open(&path).unwrap();
        let batches: Vec<_> = journal.iterate_batches().collect();
        assert_eq!(batches.len(), 2);
        assert!(batches[0].is_ok());
        assert!(matches!(batches[1], Err(StorageError::Journal(_))));

        let replayed: Vec<_> = journal.iterate_entries().filter_map(Result::ok).collect();
        assert_eq!(replayed.len(), 1);
        assert_eq!(replayed[0].app_id, 1);
        assert!(journal.latest_states().is_err());
    }
}
