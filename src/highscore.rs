//! High-score table and its binary file
//!
//! The file is a fixed header followed by ten records. Each record is the
//! player name terminated by a NUL byte, the score as a native-endian `i32`
//! and the Unix time of the game as a native-endian `i64`. A file that does
//! not follow this layout is treated as absent and gets replaced on save.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub const HEADER: &[u8] = b"Tint 0.02b (c) Abraham vd Merwe - Scores";
pub const NUM_SCORES: usize = 10;
/// Longest name a record may carry, in bytes
pub const MAX_NAME_LEN: usize = 18;

/// One row of the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub score: i32,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
}

impl Entry {
    pub fn new(name: &str, score: i32, timestamp: i64) -> Self {
        Self {
            name: clip_name(name),
            score,
            timestamp,
        }
    }

    /// Placeholder for an unused slot
    pub fn empty() -> Self {
        Self {
            name: "None".to_string(),
            score: -1,
            timestamp: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.score < 0
    }
}

/// The ten best games, best first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreTable {
    entries: Vec<Entry>,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            entries: vec![Entry::empty(); NUM_SCORES],
        }
    }
}

impl ScoreTable {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Lowest score kept in the table
    fn threshold(&self) -> i32 {
        self.entries.last().map_or(-1, |entry| entry.score)
    }

    /// Whether `score` would make it into the table
    pub fn qualifies(&self, score: i32) -> bool {
        score > self.threshold()
    }

    /// Put an entry in place of the lowest one if it beats it.
    /// Returns its rank (0 is best) when it was kept.
    pub fn insert(&mut self, entry: Entry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }
        if let Some(last) = self.entries.last_mut() {
            *last = entry.clone();
        }
        self.sort();
        self.entries.iter().position(|e| *e == entry)
    }

    /// Score descending, older games first on ties
    fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| b.score.cmp(&a.score).then(a.timestamp.cmp(&b.timestamp)));
    }

    /// Parse a table. `Ok(None)` means the data is not a score table.
    pub fn read_from<R: Read>(reader: R) -> io::Result<Option<Self>> {
        let mut reader = BufReader::new(reader);

        let mut header = [0u8; HEADER.len()];
        if !read_exact_or_eof(&mut reader, &mut header)? || header != HEADER {
            return Ok(None);
        }

        let mut entries = Vec::with_capacity(NUM_SCORES);
        for _ in 0..NUM_SCORES {
            let Some(name) = read_name(&mut reader)? else {
                return Ok(None);
            };
            let mut score = [0u8; 4];
            let mut timestamp = [0u8; 8];
            if !read_exact_or_eof(&mut reader, &mut score)?
                || !read_exact_or_eof(&mut reader, &mut timestamp)?
            {
                return Ok(None);
            }
            entries.push(Entry {
                name,
                score: i32::from_ne_bytes(score),
                timestamp: i64::from_ne_bytes(timestamp),
            });
        }

        Ok(Some(Self { entries }))
    }

    /// Serialize the table
    pub fn write_to<W: Write>(&self, writer: W) -> io::Result<()> {
        let mut writer = BufWriter::new(writer);
        writer.write_all(HEADER)?;
        for entry in &self.entries {
            writer.write_all(entry.name.as_bytes())?;
            writer.write_all(&[0])?;
            writer.write_all(&entry.score.to_ne_bytes())?;
            writer.write_all(&entry.timestamp.to_ne_bytes())?;
        }
        writer.flush()
    }

    /// Load the table from `path`. Missing and malformed files both give `None`.
    pub fn load(path: &Path) -> io::Result<Option<Self>> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let table = Self::read_from(file)?;
        if table.is_none() {
            tracing::warn!(path = %path.display(), "malformed score file, starting over");
        }
        Ok(table)
    }

    /// Write the table to `path`, creating its directory if needed
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        self.write_to(fs::File::create(path)?)?;
        tracing::info!(path = %path.display(), "score file written");
        Ok(())
    }

    /// Printable table; `marker` flags the row of the latest game
    pub fn format(&self, marker: Option<usize>) -> String {
        let mut out = String::from("\n\t   TINT HIGH SCORES\n\n\tRank   Score        Name\n\n");
        for (rank, entry) in self.entries.iter().enumerate() {
            if entry.is_empty() {
                break;
            }
            let flag = if marker == Some(rank) { '*' } else { ' ' };
            let _ = writeln!(
                out,
                "\t {:2}{} {:7}        {}",
                rank + 1,
                flag,
                entry.score,
                entry.name
            );
        }
        out.push('\n');
        out
    }
}

/// Fold the score of a finished game into the table read from disk.
///
/// `ask_name` is called only when the score earns a place. Returns the table to
/// write back and the rank of the new entry, or `None` when there is nothing
/// worth saving (no table yet and a zero score).
pub fn record(
    existing: Option<ScoreTable>,
    score: i32,
    timestamp: i64,
    ask_name: impl FnOnce() -> String,
) -> Option<(ScoreTable, Option<usize>)> {
    let mut table = match existing {
        Some(table) => table,
        None if score == 0 => return None,
        None => ScoreTable::default(),
    };
    let rank = if table.qualifies(score) {
        table.insert(Entry::new(&ask_name(), score, timestamp))
    } else {
        None
    };
    Some((table, rank))
}

/// Seconds since the Unix epoch
pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() as i64)
}

/// Shorten a name to [`MAX_NAME_LEN`] bytes without splitting a character
fn clip_name(name: &str) -> String {
    let name = name.replace('\0', "");
    let mut end = name.len().min(MAX_NAME_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

/// Fill `buf`; false if the input ends first
fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

/// Read a NUL-terminated name; `None` if it is too long or cut off
fn read_name<R: Read>(reader: &mut R) -> io::Result<Option<String>> {
    let mut name = Vec::with_capacity(MAX_NAME_LEN);
    let mut byte = [0u8; 1];
    loop {
        if !read_exact_or_eof(reader, &mut byte)? {
            return Ok(None);
        }
        if byte[0] == 0 {
            break;
        }
        if name.len() >= MAX_NAME_LEN {
            return Ok(None);
        }
        name.push(byte[0]);
    }
    Ok(Some(String::from_utf8_lossy(&name).into_owned()))
}
