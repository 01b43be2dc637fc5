//! Reading export files from disk, compressed or not.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Compression format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("gz" | "gzip") => Compression::Gzip,
            Some("bz2" | "bzip2") => Compression::Bzip2,
            Some("xz" | "lzma") => Compression::Xz,
            Some("zst" | "zstd") => Compression::Zstd,
            _ => Compression::None,
        }
    }

    /// Wrap a reader with the matching decompressor
    pub fn wrap_reader<'a>(&self, reader: Box<dyn Read + 'a>) -> io::Result<Box<dyn Read + 'a>> {
        Ok(match self {
            Compression::None => reader,
            Compression::Gzip => Box::new(flate2::read::GzDecoder::new(reader)),
            Compression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(reader)),
            Compression::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
            Compression::Zstd => Box::new(zstd::stream::read::Decoder::new(reader)?),
        })
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Bzip2 => write!(f, "bzip2"),
            Compression::Xz => write!(f, "xz"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}

/// Counts compressed bytes as they are read, for progress display
pub struct CountingReader<R: Read> {
    inner: R,
    on_read: Box<dyn Fn(u64)>,
    total: u64,
}

impl<R: Read> CountingReader<R> {
    pub fn new<F>(inner: R, on_read: F) -> Self
    where
        F: Fn(u64) + 'static,
    {
        Self {
            inner,
            on_read: Box::new(on_read),
            total: 0,
        }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.total += n as u64;
        (self.on_read)(self.total);
        Ok(n)
    }
}

/// Read a whole dump into memory, decompressing by extension.
///
/// Invalid UTF-8 is replaced rather than rejected: exports occasionally
/// carry broken bytes inside free-text columns.
pub fn read_dump(path: &Path) -> Result<String> {
    read_dump_with(path, |_| {})
}

/// [`read_dump`] reporting compressed bytes read so far
pub fn read_dump_with<F>(path: &Path, on_read: F) -> Result<String>
where
    F: Fn(u64) + 'static,
{
    let file =
        File::open(path).with_context(|| format!("Failed to open dump: {}", path.display()))?;
    let compression = Compression::from_path(path);
    let counted: Box<dyn Read> = Box::new(CountingReader::new(BufReader::new(file), on_read));
    let mut reader = compression
        .wrap_reader(counted)
        .with_context(|| format!("Failed to open {} stream: {}", compression, path.display()))?;

    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read dump: {}", path.display()))?;

    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("{}: invalid UTF-8 replaced", path.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    })
}
