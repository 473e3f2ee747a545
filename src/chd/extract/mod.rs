use crate::cd::SECTOR_SIZE;
use crate::chd::error::{ChdError, ChdResult};
use crate::chd::progress::CancelToken;
use crate::chd::reader::ChdReader;
use log::debug;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Sectors pulled per batch while streaming a track out (~588 KiB), bounding
/// peak memory while amortizing per-read overhead.
pub const SECTORS_PER_BATCH: usize = 256;

/// Byte-swap every 16-bit sample in place. Containers store audio
/// big-endian from version 5 on; BIN/RAW output wants little-endian.
/// Applying the swap twice restores the input.
pub fn swap_audio_endianness(data: &mut [u8]) {
    for sample in data.chunks_exact_mut(2) {
        sample.swap(0, 1);
    }
}

/// Stream `frames` sector payloads starting at the absolute container
/// sector `start_sector` into `output_path`.
///
/// Cancellation is honoured between batches; a cancelled run returns
/// [`ChdError::Cancelled`] and leaves the partially written file behind for
/// the caller to clean up.
pub async fn extract_track(
    chd: &mut ChdReader,
    start_sector: u64,
    frames: u32,
    output_path: &Path,
    swap_audio: bool,
    cancel: &CancelToken,
) -> ChdResult<()> {
    let file = File::create(output_path).await?;
    let mut writer = BufWriter::new(file);

    let mut batch = Vec::with_capacity(SECTORS_PER_BATCH * SECTOR_SIZE);
    let mut sector = start_sector;
    let mut remaining = frames as usize;

    debug!(
        "extracting {} frames from sector {} to {:?}",
        frames, start_sector, output_path
    );

    while remaining > 0 {
        if cancel.is_cancelled() {
            return Err(ChdError::Cancelled);
        }

        let count = remaining.min(SECTORS_PER_BATCH);
        chd.read_sectors(sector, count, &mut batch)?;

        if swap_audio {
            swap_audio_endianness(&mut batch);
        }

        writer.write_all(&batch).await?;
        sector += count as u64;
        remaining -= count;
    }

    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cd::FRAME_SIZE;
    use crate::chd::metadata::CDROM_TRACK_TAG2;
    use crate::chd::models::ChdHeader;
    use crate::chd::store::MemoryHunkStore;

    #[test]
    fn endian_swap_is_an_involution() {
        let original: Vec<u8> = (0..SECTOR_SIZE).map(|i| (i % 256) as u8).collect();
        let mut data = original.clone();

        swap_audio_endianness(&mut data);
        assert_ne!(data, original);
        swap_audio_endianness(&mut data);
        assert_eq!(data, original);
    }

    #[test]
    fn endian_swap_exchanges_sample_bytes() {
        let mut data = vec![0x12, 0x34, 0xAB, 0xCD];
        swap_audio_endianness(&mut data);
        assert_eq!(data, [0x34, 0x12, 0xCD, 0xAB]);
    }

    fn reader_with_frames(total_frames: u32) -> ChdReader {
        let frames_per_hunk = 2usize;
        let hunk_bytes = frames_per_hunk * FRAME_SIZE;
        let hunk_count = (total_frames as usize).div_ceil(frames_per_hunk);

        let mut store = MemoryHunkStore::new(ChdHeader {
            version: 5,
            hunk_bytes: hunk_bytes as u32,
            total_hunks: hunk_count as u32,
            logical_bytes: (hunk_count * hunk_bytes) as u64,
            unit_bytes: FRAME_SIZE as u32,
        });
        store.push_metadata(
            CDROM_TRACK_TAG2,
            format!("TRACK:1 TYPE:MODE1_RAW FRAMES:{total_frames}"),
        );
        for h in 0..hunk_count {
            store.push_hunk(vec![(h % 256) as u8; hunk_bytes]);
        }

        ChdReader::with_store(Box::new(store)).unwrap()
    }

    #[tokio::test]
    async fn extracts_exactly_the_requested_frames() {
        let mut chd = reader_with_frames(600);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track01.bin");

        // 600 frames crosses two full batches plus a remainder.
        extract_track(&mut chd, 0, 600, &path, false, &CancelToken::new())
            .await
            .unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written.len(), 600 * SECTOR_SIZE);
        assert_eq!(written[0], 0); // first hunk pattern
        assert_eq!(*written.last().unwrap(), (599 / 2 % 256) as u8);
    }

    #[tokio::test]
    async fn zero_frames_writes_an_empty_file() {
        let mut chd = reader_with_frames(4);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");

        extract_track(&mut chd, 0, 0, &path, false, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(std::fs::read(&path).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn cancellation_stops_at_a_batch_boundary() {
        let mut chd = reader_with_frames(600);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("torn.bin");

        let cancel = CancelToken::new();
        cancel.cancel();

        let err = extract_track(&mut chd, 0, 600, &path, false, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ChdError::Cancelled));

        // The partial file is left behind, cleanup is the caller's duty.
        assert!(path.exists());
    }

    #[tokio::test]
    async fn audio_swap_applies_to_written_bytes() {
        let frames_per_hunk = 2usize;
        let hunk_bytes = frames_per_hunk * FRAME_SIZE;
        let mut store = MemoryHunkStore::new(ChdHeader {
            version: 5,
            hunk_bytes: hunk_bytes as u32,
            total_hunks: 1,
            logical_bytes: hunk_bytes as u64,
            unit_bytes: FRAME_SIZE as u32,
        });
        store.push_metadata(CDROM_TRACK_TAG2, "TRACK:1 TYPE:AUDIO FRAMES:2");
        let mut hunk = vec![0u8; hunk_bytes];
        hunk[0] = 0x12;
        hunk[1] = 0x34;
        store.push_hunk(hunk);

        let mut chd = ChdReader::with_store(Box::new(store)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track01.raw");

        extract_track(&mut chd, 0, 2, &path, true, &CancelToken::new())
            .await
            .unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written[0], 0x34);
        assert_eq!(written[1], 0x12);
    }
}
