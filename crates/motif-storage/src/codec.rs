//! Output encodings: JSON-lines records and plain text lines.

use motif_core::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Storage, StoragePath};

/// Write one JSON record per line
pub fn write_structured<T: Serialize>(
    storage: &dyn Storage,
    path: &StoragePath,
    records: &[T],
) -> Result<()> {
    let mut buf = Vec::new();
    for record in records {
        serde_json::to_writer(&mut buf, record)?;
        buf.push(b'\n');
    }
    storage.write(path, &buf)
}

/// Read records written by [`write_structured`]
pub fn read_structured<T: DeserializeOwned>(
    storage: &dyn Storage,
    path: &StoragePath,
) -> Result<Vec<T>> {
    let data = storage.read(path)?;
    let text = String::from_utf8_lossy(&data);
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).map_err(Into::into))
        .collect()
}

/// Write newline-delimited text. Returns the number of lines.
pub fn write_text_lines<I>(storage: &dyn Storage, path: &StoragePath, lines: I) -> Result<usize>
where
    I: IntoIterator<Item = String>,
{
    let mut buf = String::new();
    let mut count = 0;
    for line in lines {
        buf.push_str(&line);
        buf.push('\n');
        count += 1;
    }
    storage.write(path, buf.as_bytes())?;
    Ok(count)
}
