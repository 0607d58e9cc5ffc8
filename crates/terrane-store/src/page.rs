//! On-disk page format for persisted properties.
//!
//! A page holds exactly one property array:
//!
//! ```text
//! magic    4 bytes   b"TRPG"
//! version  u8        PAGE_FORMAT_VERSION
//! count    u64 LE    number of values
//! values   count * 4 bytes, f32 bit patterns, LE
//! checksum u64 LE    FNV-1a over the value bit patterns
//! ```
//!
//! Values are stored as raw bit patterns, so no-data markers and NaN
//! payloads round-trip exactly.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StoreError;

/// Magic bytes identifying a page file.
pub const PAGE_MAGIC: &[u8; 4] = b"TRPG";

/// Current page format version.
pub const PAGE_FORMAT_VERSION: u8 = 1;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001B3;

/// FNV-1a over the little-endian bit patterns of `values`.
pub fn checksum(values: &[f32]) -> u64 {
    let mut hash = FNV_OFFSET;
    for v in values {
        for &b in &v.to_bits().to_le_bytes() {
            hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

// ── Encoding ────────────────────────────────────────────────────

/// Encode `values` as a page into `w`.
pub fn encode(w: &mut dyn Write, values: &[f32]) -> Result<(), StoreError> {
    w.write_all(PAGE_MAGIC)?;
    w.write_all(&[PAGE_FORMAT_VERSION])?;
    w.write_all(&(values.len() as u64).to_le_bytes())?;
    for v in values {
        w.write_all(&v.to_bits().to_le_bytes())?;
    }
    w.write_all(&checksum(values).to_le_bytes())?;
    Ok(())
}

/// Decode a page from `r`, expecting exactly `expected_len` values.
pub fn decode(r: &mut dyn Read, expected_len: usize) -> Result<Vec<f32>, StoreError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if &magic != PAGE_MAGIC {
        return Err(StoreError::CorruptPage {
            detail: format!("bad magic {magic:?}"),
        });
    }
    let mut version = [0u8; 1];
    r.read_exact(&mut version)?;
    if version[0] != PAGE_FORMAT_VERSION {
        return Err(StoreError::CorruptPage {
            detail: format!("unsupported format version {}", version[0]),
        });
    }
    let count = read_u64_le(r)?;
    if count != expected_len as u64 {
        return Err(StoreError::CorruptPage {
            detail: format!("page holds {count} values, expected {expected_len}"),
        });
    }
    let mut values = Vec::with_capacity(expected_len);
    let mut buf = [0u8; 4];
    for _ in 0..expected_len {
        r.read_exact(&mut buf)?;
        values.push(f32::from_bits(u32::from_le_bytes(buf)));
    }
    let stored = read_u64_le(r)?;
    let computed = checksum(&values);
    if stored != computed {
        return Err(StoreError::CorruptPage {
            detail: format!("checksum mismatch: stored={stored:#018x}, computed={computed:#018x}"),
        });
    }
    Ok(values)
}

fn read_u64_le(r: &mut dyn Read) -> Result<u64, StoreError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

// ── Page files ──────────────────────────────────────────────────

/// An owned page on disk. The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct PageFile {
    path: PathBuf,
}

impl PageFile {
    /// Write `values` to a new page at `path`, replacing any existing file.
    pub fn create(path: PathBuf, values: &[f32]) -> Result<Self, StoreError> {
        let mut w = BufWriter::new(File::create(&path)?);
        // Own the path before the first fallible write so a partial
        // page is cleaned up on error.
        let page = Self { path };
        encode(&mut w, values)?;
        w.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        Ok(page)
    }

    /// Read the page back, validating it against `expected_len`.
    pub fn load(&self, expected_len: usize) -> Result<Vec<f32>, StoreError> {
        let mut r = BufReader::new(File::open(&self.path)?);
        decode(&mut r, expected_len)
    }

    /// Location of the page on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PageFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed page file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove page file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use terrane_core::NO_DATA_VALUE;

    fn encoded(values: &[f32]) -> Vec<u8> {
        let mut buf = Vec::new();
        encode(&mut buf, values).unwrap();
        buf
    }

    #[test]
    fn header_layout() {
        let buf = encoded(&[1.0, 2.0]);
        assert_eq!(&buf[0..4], b"TRPG");
        assert_eq!(buf[4], PAGE_FORMAT_VERSION);
        assert_eq!(u64::from_le_bytes(buf[5..13].try_into().unwrap()), 2);
        assert_eq!(buf.len(), 4 + 1 + 8 + 2 * 4 + 8);
    }

    #[test]
    fn special_values_survive_bit_exact() {
        let nan_payload = f32::from_bits(0x7fc0_1234);
        let values = [NO_DATA_VALUE, -0.0, nan_payload, f32::INFINITY, f32::MIN_POSITIVE];
        let decoded = decode(&mut encoded(&values).as_slice(), values.len()).unwrap();
        let bits: Vec<u32> = decoded.iter().map(|v| v.to_bits()).collect();
        let expected: Vec<u32> = values.iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits, expected);
    }

    #[test]
    fn flipped_value_byte_fails_checksum() {
        let mut buf = encoded(&[1.0, 2.0, 3.0]);
        buf[14] ^= 0x01;
        let err = decode(&mut buf.as_slice(), 3).unwrap_err();
        assert!(matches!(err, StoreError::CorruptPage { .. }), "{err}");
    }

    #[test]
    fn wrong_magic_version_or_length_rejected() {
        let good = encoded(&[1.0]);

        let mut bad_magic = good.clone();
        bad_magic[0] = b'X';
        assert!(matches!(
            decode(&mut bad_magic.as_slice(), 1),
            Err(StoreError::CorruptPage { .. })
        ));

        let mut bad_version = good.clone();
        bad_version[4] = 99;
        assert!(matches!(
            decode(&mut bad_version.as_slice(), 1),
            Err(StoreError::CorruptPage { .. })
        ));

        assert!(matches!(
            decode(&mut good.as_slice(), 2),
            Err(StoreError::CorruptPage { .. })
        ));
    }

    #[test]
    fn truncated_page_is_io_error() {
        let buf = encoded(&[1.0, 2.0]);
        let err = decode(&mut &buf[..buf.len() - 3], 2).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn page_file_removes_itself() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.page");
        let page = PageFile::create(path.clone(), &[4.0, 5.0]).unwrap();
        assert_eq!(page.load(2).unwrap(), vec![4.0, 5.0]);
        assert!(path.exists());
        drop(page);
        assert!(!path.exists());
    }

    proptest! {
        #[test]
        fn arbitrary_bits_round_trip(bits in prop::collection::vec(any::<u32>(), 0..256)) {
            let values: Vec<f32> = bits.iter().map(|&b| f32::from_bits(b)).collect();
            let decoded = decode(&mut encoded(&values).as_slice(), values.len()).unwrap();
            let out: Vec<u32> = decoded.iter().map(|v| v.to_bits()).collect();
            prop_assert_eq!(out, bits);
        }
    }
}
