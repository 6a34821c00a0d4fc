//! Line-oriented persisted output.
//!
//! Everything the crate writes to storage is plain UTF-8 text, one item per
//! line, every line newline-terminated.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Write each item followed by `\n`. Returns the number of lines written.
pub fn write_lines<W, I, T>(writer: W, lines: I) -> std::io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut out = BufWriter::new(writer);
    let mut count = 0;
    for line in lines {
        out.write_all(line.as_ref().as_bytes())?;
        out.write_all(b"\n")?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

/// Create (or truncate) `path` and write `lines` to it.
pub fn write_lines_to_file<I, T>(path: impl AsRef<Path>, lines: I) -> Result<usize>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let file = File::create(path)?;
    Ok(write_lines(file, lines)?)
}
