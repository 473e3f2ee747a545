use crate::cd::{FRAME_SIZE, SECTOR_SIZE};
use crate::chd::error::{ChdError, ChdResult};
use crate::chd::layout;
use crate::chd::metadata;
use crate::chd::models::{ChdHeader, ChdTrack, DiscKind};
use crate::chd::store::{ChdFileStore, HunkStore, StoreError};
use log::debug;
use std::path::Path;

/// An opened CHD disc image.
///
/// Owns its [`HunkStore`] exclusively; header, track list and classification
/// live exactly as long as the reader, and the store's decode context is
/// released when the reader drops. Not safe for concurrent use, confine one
/// reader to one task.
pub struct ChdReader {
    store: Box<dyn HunkStore>,
    header: ChdHeader,
    tracks: Vec<ChdTrack>,
    kind: DiscKind,
    frames_per_hunk: u64,
    hunk_buf: Vec<u8>,
    cached_hunk: Option<u32>,
}

impl std::fmt::Debug for ChdReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChdReader")
            .field("header", &self.header)
            .field("tracks", &self.tracks)
            .field("kind", &self.kind)
            .field("frames_per_hunk", &self.frames_per_hunk)
            .field("cached_hunk", &self.cached_hunk)
            .finish_non_exhaustive()
    }
}

impl ChdReader {
    /// Open a container file with the built-in store.
    pub fn open(path: impl AsRef<Path>) -> ChdResult<Self> {
        let store = ChdFileStore::open(path)?;
        Self::with_store(Box::new(store))
    }

    /// Open against an injected store, e.g. a codec-capable decoder or an
    /// in-memory fixture.
    pub fn with_store(mut store: Box<dyn HunkStore>) -> ChdResult<Self> {
        let header = store.header().clone();

        if !(1..=5).contains(&header.version) {
            return Err(StoreError::CorruptOrUnsupportedVersion(format!(
                "version {}",
                header.version
            ))
            .into());
        }
        if header.hunk_bytes == 0 {
            return Err(
                StoreError::CorruptOrUnsupportedVersion("hunk size is zero".to_string()).into(),
            );
        }

        let (tracks, kind) = metadata::discover_tracks(store.as_mut())?;

        // Disc hunks hold whole raw frames; anything else cannot carry the
        // track layout we just parsed.
        if header.hunk_bytes as usize % FRAME_SIZE != 0 {
            return Err(ChdError::InvalidHunkSize(header.hunk_bytes));
        }

        let stored = layout::total_stored_frames(&tracks);
        let implied = header.logical_bytes / FRAME_SIZE as u64;
        if stored != implied {
            debug!(
                "track spans cover {} frames but the container declares {}",
                stored, implied
            );
        }

        Ok(Self {
            frames_per_hunk: (header.hunk_bytes as usize / FRAME_SIZE) as u64,
            hunk_buf: vec![0u8; header.hunk_bytes as usize],
            cached_hunk: None,
            store,
            header,
            tracks,
            kind,
        })
    }

    pub fn header(&self) -> &ChdHeader {
        &self.header
    }

    pub fn tracks(&self) -> &[ChdTrack] {
        &self.tracks
    }

    pub fn kind(&self) -> DiscKind {
        self.kind
    }

    pub fn is_gd_rom(&self) -> bool {
        self.kind == DiscKind::GdRom
    }

    /// Audio payloads are stored big-endian from container version 5 on and
    /// need byte-swapping for BIN/RAW output.
    pub fn swaps_audio(&self) -> bool {
        self.header.version >= 5
    }

    /// Read `count` contiguous 2352-byte sector payloads starting at the
    /// absolute container-stream sector `start_sector` into `out`
    /// (replacing its contents).
    ///
    /// Each distinct hunk is decoded at most once per run of sectors, and
    /// the last decoded hunk stays cached across calls, so batched
    /// extraction never re-decodes a hunk shared between batches.
    pub fn read_sectors(
        &mut self,
        start_sector: u64,
        count: usize,
        out: &mut Vec<u8>,
    ) -> ChdResult<()> {
        out.clear();
        out.reserve(count * SECTOR_SIZE);

        for i in 0..count {
            let sector = start_sector + i as u64;
            let hunk = (sector / self.frames_per_hunk) as u32;
            let offset = (sector % self.frames_per_hunk) as usize * FRAME_SIZE;

            if self.cached_hunk != Some(hunk) {
                self.store.read_hunk(hunk, &mut self.hunk_buf)?;
                self.cached_hunk = Some(hunk);
            }

            out.extend_from_slice(&self.hunk_buf[offset..offset + SECTOR_SIZE]);
        }

        Ok(())
    }

    /// Read a single sector payload.
    pub fn read_sector(&mut self, sector: u64) -> ChdResult<Vec<u8>> {
        let mut out = Vec::with_capacity(SECTOR_SIZE);
        self.read_sectors(sector, 1, &mut out)?;
        Ok(out)
    }

    /// Container-stream sector where track `index`'s stored span begins.
    pub fn track_start_sector(&self, index: usize) -> u64 {
        layout::track_start_sector(&self.tracks, index)
    }

    /// Container-stream sector of the boot sector (IP.BIN).
    pub fn ip_bin_sector(&self) -> ChdResult<u64> {
        layout::ip_bin_sector(&self.tracks, self.kind)
    }

    /// Read the raw 2352-byte boot sector.
    pub fn ip_bin(&mut self) -> ChdResult<Vec<u8>> {
        let sector = self.ip_bin_sector()?;
        self.read_sector(sector)
    }
}
