//! Chunked text checkpoints for regret tables.
//!
//! A checkpoint is UTF-8, line-oriented, and split across parts of at most
//! 50 MiB. Part 0 is the base filename; part `n >= 1` appends `_n`. Every
//! part opens with a `REGRETS` header, carries one `key<TAB>r0 r1 ... rk-1`
//! line per infoset (keys sorted lexicographically across the whole
//! checkpoint), and closes with `CONTINUED` when another part follows or
//! `END` on the final part. The loader rejects anything else: a rejected or
//! half-written checkpoint means the next run starts from an empty table.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::cfr::table::RegretTable;

/// Maximum bytes per checkpoint part.
pub const MAX_PART_BYTES: u64 = 50 * 1024 * 1024;

const HEADER: &str = "REGRETS";
const FOOTER_MORE: &str = "CONTINUED";
const FOOTER_END: &str = "END";

/// Errors raised while saving or loading a checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Underlying filesystem failure.
    #[error("checkpoint I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A part did not open with the `REGRETS` header.
    #[error("{}: bad checkpoint header {found:?}", .path.display())]
    BadHeader {
        /// Offending part file.
        path: PathBuf,
        /// First line actually found.
        found: String,
    },

    /// A part announced a successor with `CONTINUED` but the file is absent.
    #[error("{}: missing checkpoint continuation part", .path.display())]
    MissingPart {
        /// Part file that could not be opened.
        path: PathBuf,
    },

    /// A part ended without a `CONTINUED` or `END` footer.
    #[error("{}: checkpoint truncated before its footer", .path.display())]
    Truncated {
        /// Truncated part file.
        path: PathBuf,
    },

    /// A regret line did not match `key<TAB>values`.
    #[error("{}:{line}: malformed regret line", .path.display())]
    MalformedLine {
        /// Part file holding the line.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
    },

    /// A regret value failed to parse as a finite float.
    #[error("{}:{line}: bad regret value {value:?}", .path.display())]
    BadValue {
        /// Part file holding the line.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Token that failed to parse.
        value: String,
    },
}

/// Path of part `n` of the checkpoint rooted at `base`.
pub fn part_path(base: &Path, n: usize) -> PathBuf {
    if n == 0 {
        base.to_path_buf()
    } else {
        let mut name = base.as_os_str().to_owned();
        name.push(format!("_{}", n));
        PathBuf::from(name)
    }
}

/// Write the table to `base`, splitting into parts of at most
/// [`MAX_PART_BYTES`].
pub fn save(base: &Path, table: &RegretTable) -> Result<(), CheckpointError> {
    write_parts(base, &table.export_sorted(), MAX_PART_BYTES)
}

pub(crate) fn write_parts(
    base: &Path,
    entries: &[(String, Vec<f64>)],
    max_part_bytes: u64,
) -> Result<(), CheckpointError> {
    let mut part = 0usize;
    let mut writer = BufWriter::new(File::create(part_path(base, part))?);
    writeln!(writer, "{}", HEADER)?;
    let mut written = (HEADER.len() + 1) as u64;

    let mut line = String::new();
    for (key, regrets) in entries {
        line.clear();
        line.push_str(key);
        line.push('\t');
        for (i, r) in regrets.iter().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            write!(line, "{}", r).expect("write to String");
        }
        line.push('\n');

        // Roll to the next part rather than exceed the size cap. A fresh
        // part always accepts at least one line.
        if written + line.len() as u64 > max_part_bytes {
            writeln!(writer, "{}", FOOTER_MORE)?;
            writer.flush()?;
            part += 1;
            writer = BufWriter::new(File::create(part_path(base, part))?);
            writeln!(writer, "{}", HEADER)?;
            written = (HEADER.len() + 1) as u64;
        }

        writer.write_all(line.as_bytes())?;
        written += line.len() as u64;
    }

    writeln!(writer, "{}", FOOTER_END)?;
    writer.flush()?;
    Ok(())
}

/// Read a checkpoint rooted at `base`, following `CONTINUED` chains until
/// `END`.
pub fn load(base: &Path) -> Result<Vec<(String, Vec<f64>)>, CheckpointError> {
    let mut entries = Vec::new();
    let mut part = 0usize;

    loop {
        let path = part_path(base, part);
        let file = File::open(&path).map_err(|e| {
            if part > 0 && e.kind() == ErrorKind::NotFound {
                CheckpointError::MissingPart { path: path.clone() }
            } else {
                CheckpointError::Io(e)
            }
        })?;
        match read_part(&path, file, &mut entries)? {
            Footer::End => return Ok(entries),
            Footer::More => part += 1,
        }
    }
}

enum Footer {
    More,
    End,
}

fn read_part(
    path: &Path,
    file: File,
    entries: &mut Vec<(String, Vec<f64>)>,
) -> Result<Footer, CheckpointError> {
    let mut lines = BufReader::new(file).lines();

    let header = lines.next().transpose()?.ok_or_else(|| CheckpointError::Truncated {
        path: path.to_path_buf(),
    })?;
    if header != HEADER {
        return Err(CheckpointError::BadHeader {
            path: path.to_path_buf(),
            found: header,
        });
    }

    for (index, line) in lines.enumerate() {
        let line = line?;
        let line_no = index + 2;
        match line.as_str() {
            FOOTER_MORE => return Ok(Footer::More),
            FOOTER_END => return Ok(Footer::End),
            _ => {}
        }

        let (key, values) = line.split_once('\t').ok_or_else(|| CheckpointError::MalformedLine {
            path: path.to_path_buf(),
            line: line_no,
        })?;
        if key.is_empty() || values.is_empty() {
            return Err(CheckpointError::MalformedLine {
                path: path.to_path_buf(),
                line: line_no,
            });
        }

        let mut regrets = Vec::new();
        for token in values.split(' ') {
            let value: f64 = token.parse().map_err(|_| CheckpointError::BadValue {
                path: path.to_path_buf(),
                line: line_no,
                value: token.to_owned(),
            })?;
            if !value.is_finite() {
                return Err(CheckpointError::BadValue {
                    path: path.to_path_buf(),
                    line: line_no,
                    value: token.to_owned(),
                });
            }
            regrets.push(value);
        }
        entries.push((key.to_owned(), regrets));
    }

    Err(CheckpointError::Truncated {
        path: path.to_path_buf(),
    })
}
