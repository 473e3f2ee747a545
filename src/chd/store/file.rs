use crate::chd::models::ChdHeader;
use crate::chd::store::HunkStore;
use crate::chd::store::error::{StoreError, StoreResult};
use binrw::BinRead;
use byteorder::{BigEndian, ReadBytesExt};
use log::debug;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

const V5_HEADER_LENGTH: u32 = 124;
const NO_COMPRESSOR: [u8; 4] = [0; 4];

/// On-disk layout of a version 5 container header. Big-endian, 124 bytes
/// including the magic.
#[derive(Debug, BinRead)]
#[br(big, magic = b"MComprHD")]
struct RawHeaderV5 {
    length: u32,
    version: u32,
    compressor_0: [u8; 4],
    compressor_1: [u8; 4],
    compressor_2: [u8; 4],
    compressor_3: [u8; 4],
    logical_bytes: u64,
    map_offset: u64,
    meta_offset: u64,
    hunk_bytes: u32,
    unit_bytes: u32,
    raw_sha1: [u8; 20],
    sha1: [u8; 20],
    parent_sha1: [u8; 20],
}

/// File-backed store for self-contained version 5 containers.
///
/// Parses the header and walks the metadata chain directly; hunk reads are
/// served from the raw map, which only exists in uncompressed containers.
/// Compressed containers still open fine for header and metadata access
/// (enough to classify a disc), but `read_hunk` reports the codec as
/// unsupported; decoding those requires injecting a codec-capable
/// [`HunkStore`] implementation instead.
#[derive(Debug)]
pub struct ChdFileStore {
    reader: BufReader<File>,
    header: ChdHeader,
    meta_offset: u64,
    /// Raw hunk map of an uncompressed container; `None` when hunks are
    /// compressed. An entry of 0 is a sparse all-zero hunk.
    map: Option<Vec<u32>>,
    compression: String,
}

impl ChdFileStore {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StoreError::NotFound(path.to_path_buf())
            } else {
                StoreError::IoError(e)
            }
        })?;
        let mut reader = BufReader::new(file);

        let raw = RawHeaderV5::read(&mut reader).map_err(|e| match e {
            binrw::Error::BadMagic { .. } => {
                StoreError::CorruptOrUnsupportedVersion("missing MComprHD magic".to_string())
            }
            other => StoreError::BinRwError(other),
        })?;

        if raw.version != 5 {
            return Err(StoreError::CorruptOrUnsupportedVersion(format!(
                "version {} (the built-in store only reads version 5 containers)",
                raw.version
            )));
        }
        if raw.length != V5_HEADER_LENGTH {
            return Err(StoreError::CorruptOrUnsupportedVersion(format!(
                "header length {} instead of {}",
                raw.length, V5_HEADER_LENGTH
            )));
        }
        if raw.hunk_bytes == 0 {
            return Err(StoreError::CorruptOrUnsupportedVersion(
                "hunk size is zero".to_string(),
            ));
        }
        if raw.parent_sha1 != [0u8; 20] {
            return Err(StoreError::RequiresParent);
        }

        let total_hunks = raw.logical_bytes.div_ceil(raw.hunk_bytes as u64) as u32;
        let compressors = [
            raw.compressor_0,
            raw.compressor_1,
            raw.compressor_2,
            raw.compressor_3,
        ];

        let map = if compressors.iter().all(|c| *c == NO_COMPRESSOR) {
            reader.seek(SeekFrom::Start(raw.map_offset))?;
            let mut entries = Vec::with_capacity(total_hunks as usize);
            for _ in 0..total_hunks {
                entries.push(reader.read_u32::<BigEndian>()?);
            }
            Some(entries)
        } else {
            None
        };

        let compression = compressors
            .iter()
            .filter(|c| **c != NO_COMPRESSOR)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        debug!(
            "opened {:?}: v{}, {} hunks of {} bytes, codecs [{}], sha1 {:02x?} (raw {:02x?})",
            path, raw.version, total_hunks, raw.hunk_bytes, compression, raw.sha1, raw.raw_sha1
        );

        Ok(Self {
            reader,
            header: ChdHeader {
                version: raw.version,
                hunk_bytes: raw.hunk_bytes,
                total_hunks,
                logical_bytes: raw.logical_bytes,
                unit_bytes: raw.unit_bytes,
            },
            meta_offset: raw.meta_offset,
            map,
            compression,
        })
    }
}

impl HunkStore for ChdFileStore {
    fn header(&self) -> &ChdHeader {
        &self.header
    }

    fn metadata(&mut self, tag: [u8; 4], index: u32) -> StoreResult<Option<String>> {
        // Metadata entries form a chain: 4-byte tag, 1-byte flags plus
        // 24-bit length, 8-byte offset of the next entry, then the payload.
        let mut offset = self.meta_offset;
        let mut seen = 0u32;

        while offset != 0 {
            self.reader.seek(SeekFrom::Start(offset))?;

            let mut entry_tag = [0u8; 4];
            self.reader.read_exact(&mut entry_tag)?;
            let flags_and_length = self.reader.read_u32::<BigEndian>()?;
            let length = flags_and_length & 0x00ff_ffff;
            let next = self.reader.read_u64::<BigEndian>()?;

            if entry_tag == tag {
                if seen == index {
                    let mut data = vec![0u8; length as usize];
                    self.reader.read_exact(&mut data)?;
                    let text = String::from_utf8_lossy(&data);
                    return Ok(Some(text.trim_end_matches('\0').to_string()));
                }
                seen += 1;
            }

            offset = next;
        }

        Ok(None)
    }

    fn read_hunk(&mut self, hunk: u32, buf: &mut [u8]) -> StoreResult<()> {
        if hunk >= self.header.total_hunks {
            return Err(StoreError::HunkOutOfRange(hunk));
        }
        debug_assert_eq!(buf.len(), self.header.hunk_bytes as usize);

        let Some(map) = &self.map else {
            return Err(StoreError::UnsupportedCompression(self.compression.clone()));
        };

        match map[hunk as usize] {
            0 => buf.fill(0),
            entry => {
                let offset = entry as u64 * self.header.hunk_bytes as u64;
                self.reader.seek(SeekFrom::Start(offset))?;
                self.reader.read_exact(buf)?;
            }
        }

        Ok(())
    }
}
