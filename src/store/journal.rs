use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::model::{JournalEvent, ReservationRecord};

use super::{ReservationStore, StoreError, note_corrupt_read};

/// Entries claiming more than this are treated as damage, not allocated.
const MAX_ENTRY_LEN: usize = 1 << 20;

/// Encode a single event to [len][bincode][crc32] format.
fn encode_event(event: &JournalEvent) -> io::Result<Vec<u8>> {
    let payload =
        bincode::serialize(event).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let mut entry = Vec::with_capacity(payload.len() + 8);
    entry.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    entry.extend_from_slice(&payload);
    entry.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    Ok(entry)
}

/// Where journal entries land: the open file, or a double in tests.
trait JournalFile: Write {
    fn sync(&mut self) -> io::Result<()>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl JournalFile for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Write one encoded entry at `end` and fsync it. On failure the sink is
/// cut back to `end`, so no part of a refused entry is left to replay.
fn write_entry(sink: &mut impl JournalFile, end: u64, entry: &[u8]) -> io::Result<()> {
    let Err(e) = sink.write_all(entry).and_then(|()| sink.sync()) else {
        return Ok(());
    };
    if let Err(undo) = sink.truncate(end).and_then(|()| sink.sync()) {
        tracing::error!("journal rollback to {end} bytes failed: {undo}");
    }
    Err(e)
}

/// Append-only reservation journal.
///
/// Format per entry: `[u32: len][bincode: JournalEvent][u32: crc32]`
/// - `len` is the byte length of the bincode payload (not including the CRC).
/// - A truncated or corrupt entry ends replay; everything before it is kept.
pub struct Journal {
    file: File,
    /// Length of the durable, fully written prefix.
    len: u64,
    path: PathBuf,
    appends_since_compact: u64,
}

impl Journal {
    /// Open (or create) the journal file at `path`.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file,
            len,
            path: path.to_path_buf(),
            appends_since_compact: 0,
        })
    }

    /// Append one event and fsync before returning. A failed append leaves
    /// the file as it was.
    pub fn append(&mut self, event: &JournalEvent) -> io::Result<()> {
        let entry = encode_event(event)?;
        let start = std::time::Instant::now();
        let result = write_entry(&mut self.file, self.len, &entry);
        metrics::histogram!(crate::observability::JOURNAL_FLUSH_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());
        result?;
        self.len += entry.len() as u64;
        self.appends_since_compact += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn appends_since_compact(&self) -> u64 {
        self.appends_since_compact
    }

    /// Replace the journal with `events`: write a temp file, fsync, rename
    /// it over the journal and reopen for appending.
    pub fn compact(&mut self, events: &[JournalEvent]) -> io::Result<()> {
        let tmp_path = self.path.with_extension("journal.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            for event in events {
                writer.write_all(&encode_event(event)?)?;
            }
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.len = self.file.metadata()?.len();
        self.appends_since_compact = 0;
        Ok(())
    }

    /// Replay the journal from disk, returning all valid events and whether
    /// replay stopped early on a damaged entry.
    pub fn replay(path: &Path) -> io::Result<(Vec<JournalEvent>, bool)> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok((Vec::new(), false)),
            Err(e) => return Err(e),
        };
        replay_from(BufReader::new(file))
    }
}

/// Decode entries until a clean end or the first damaged one.
fn replay_from(mut reader: impl Read) -> io::Result<(Vec<JournalEvent>, bool)> {
    let mut events = Vec::new();

    loop {
        let mut len_buf = [0u8; 4];
        match read_full(&mut reader, &mut len_buf)? {
            Fill::Full => {}
            Fill::Empty => return Ok((events, false)),
            Fill::Partial => return Ok((events, true)),
        }
        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_ENTRY_LEN {
            return Ok((events, true));
        }

        let mut payload = vec![0u8; len];
        if !matches!(read_full(&mut reader, &mut payload)?, Fill::Full) {
            return Ok((events, true));
        }

        let mut crc_buf = [0u8; 4];
        if !matches!(read_full(&mut reader, &mut crc_buf)?, Fill::Full) {
            return Ok((events, true));
        }
        if u32::from_le_bytes(crc_buf) != crc32fast::hash(&payload) {
            return Ok((events, true));
        }

        match bincode::deserialize::<JournalEvent>(&payload) {
            Ok(event) => events.push(event),
            Err(_) => return Ok((events, true)),
        }
    }
}

enum Fill {
    Full,
    Partial,
    Empty,
}

/// Like `read_exact`, but tells a clean end of file apart from a torn entry.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<Fill> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(match filled {
        n if n == buf.len() => Fill::Full,
        0 => Fill::Empty,
        _ => Fill::Partial,
    })
}

/// Fold events into the current reservation list.
fn materialize(events: Vec<JournalEvent>) -> Vec<ReservationRecord> {
    let mut records: Vec<ReservationRecord> = Vec::new();
    for event in events {
        match event {
            JournalEvent::ReservationCreated(record) => records.push(record),
            JournalEvent::ReservationRemoved { id } => records.retain(|r| r.id != id),
        }
    }
    records
}

/// Durable store backed by a [`Journal`]. The current list is kept in
/// memory and rebuilt from the journal on open.
pub struct JournalStore {
    journal: Journal,
    records: Vec<ReservationRecord>,
    compact_threshold: u64,
}

impl JournalStore {
    /// Replay `path` and open it for appending. A damaged tail is dropped
    /// and the journal rewritten from what survived. `compact_threshold`
    /// of 0 disables automatic compaction.
    pub fn open(path: &Path, compact_threshold: u64) -> io::Result<Self> {
        let (events, damaged) = Journal::replay(path)?;
        let records = materialize(events);
        let mut journal = Journal::open(path)?;
        if damaged {
            note_corrupt_read("journal", &format_args!("damaged entry in {}", path.display()));
            journal.compact(&snapshot(&records))?;
        }
        tracing::debug!("journal {} replayed: {} reservations", path.display(), records.len());
        Ok(Self {
            journal,
            records,
            compact_threshold,
        })
    }

    pub fn path(&self) -> &Path {
        self.journal.path()
    }

    /// Rewrite the journal as one creation event per live reservation.
    pub fn compact(&mut self) -> io::Result<()> {
        self.journal.compact(&snapshot(&self.records))?;
        tracing::info!(
            "compacted journal {} to {} reservations",
            self.journal.path().display(),
            self.records.len()
        );
        Ok(())
    }

    fn maybe_compact(&mut self) {
        if self.compact_threshold == 0 || self.journal.appends_since_compact() < self.compact_threshold {
            return;
        }
        // The triggering write is already durable; a failed compaction only
        // leaves a longer journal behind.
        if let Err(e) = self.compact() {
            tracing::warn!("journal compaction failed: {e}");
        }
    }
}

fn snapshot(records: &[ReservationRecord]) -> Vec<JournalEvent> {
    records
        .iter()
        .cloned()
        .map(JournalEvent::ReservationCreated)
        .collect()
}

impl ReservationStore for JournalStore {
    fn list(&self) -> Vec<ReservationRecord> {
        self.records.clone()
    }

    fn append(&mut self, record: ReservationRecord) -> Result<(), StoreError> {
        self.journal
            .append(&JournalEvent::ReservationCreated(record.clone()))?;
        self.records.push(record);
        self.maybe_compact();
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        if !self.records.iter().any(|r| r.id == id) {
            return Ok(false);
        }
        self.journal.append(&JournalEvent::ReservationRemoved { id: id.to_string() })?;
        self.records.retain(|r| r.id != id);
        self.maybe_compact();
        Ok(true)
    }
}
