//! Loading PLY documents from files, streams and memory.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use memmap2::Mmap;
use tracing::{debug, info};

use crate::body::read_body;
use crate::document::Ply;
use crate::header::parse_header;
use crate::util::{Error, Result};

/// How binary list lengths are read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListCountMode {
    /// Use the count type declared in the header (`property list uchar ...`).
    #[default]
    Declared,
    /// Always read a 4-byte unsigned count, whatever the header declares.
    /// Matches files written by tools with that quirk.
    Fixed32,
}

/// What to do with an ASCII body line that holds no values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyLinePolicy {
    /// Fail the load with [`Error::EmptyRow`].
    #[default]
    Error,
    /// Consume the row and leave every property of it unset (empty buffer).
    Skip,
}

/// Options controlling how a document is loaded.
#[derive(Clone, Debug)]
pub struct ReadOptions {
    /// Memory-map files instead of buffered reads.
    pub use_mmap: bool,
    pub list_counts: ListCountMode,
    pub empty_lines: EmptyLinePolicy,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            use_mmap: true,
            list_counts: ListCountMode::default(),
            empty_lines: EmptyLinePolicy::default(),
        }
    }
}

impl ReadOptions {
    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn with_list_counts(mut self, mode: ListCountMode) -> Self {
        self.list_counts = mode;
        self
    }

    pub fn with_empty_lines(mut self, policy: EmptyLinePolicy) -> Self {
        self.empty_lines = policy;
        self
    }
}

impl Ply {
    /// Open and decode a PLY file with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, &ReadOptions::default())
    }

    /// Open and decode a PLY file.
    pub fn open_opts(path: impl AsRef<Path>, opts: &ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let size = file.metadata()?.len();
        info!("Opening {} ({} bytes)", name, size);

        if opts.use_mmap && size > 0 {
            // Safety: the map is read-only and dropped before this call returns.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
            Self::from_reader(Cursor::new(&mmap[..]), &name, opts)
        } else {
            Self::from_reader(BufReader::new(file), &name, opts)
        }
    }

    /// Decode a document held in memory.
    pub fn from_bytes(data: &[u8], name: &str) -> Result<Self> {
        Self::from_reader(Cursor::new(data), name, &ReadOptions::default())
    }

    /// Decode a document from any buffered stream: header first, then body.
    ///
    /// `name` identifies the source in error messages.
    #[tracing::instrument(skip_all, fields(source = %name))]
    pub fn from_reader<R: BufRead>(mut reader: R, name: &str, opts: &ReadOptions) -> Result<Self> {
        let mut header = parse_header(&mut reader, name)?;
        debug!(
            "header: {} encoding, {} elements",
            header.encoding,
            header.elements.len()
        );

        read_body(&mut reader, &mut header, opts)?;
        Ok(Ply::new(name, header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = ReadOptions::default();
        assert!(opts.use_mmap);
        assert_eq!(opts.list_counts, ListCountMode::Declared);
        assert_eq!(opts.empty_lines, EmptyLinePolicy::Error);

        let opts = opts
            .with_mmap(false)
            .with_list_counts(ListCountMode::Fixed32)
            .with_empty_lines(EmptyLinePolicy::Skip);
        assert!(!opts.use_mmap);
        assert_eq!(opts.list_counts, ListCountMode::Fixed32);
        assert_eq!(opts.empty_lines, EmptyLinePolicy::Skip);
    }

    #[test]
    fn test_from_bytes_minimal() {
        let ply = Ply::from_bytes(
            b"ply\nformat ascii 1.0\nelement vertex 1\nproperty float32 x\nproperty float32 y\nproperty float32 z\nend_header\n1.0 2.0 3.0\n",
            "mem.ply",
        )
        .unwrap();
        assert_eq!(ply.source(), "mem.ply");
        assert_eq!(ply.vertex_count(), 1);
        assert_eq!(ply.vertex_columns(), Some([vec![1.0], vec![2.0], vec![3.0]]));
    }

    #[test]
    fn test_missing_file() {
        let err = Ply::open("/definitely/not/here.ply").unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
