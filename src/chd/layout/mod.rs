use crate::chd::error::{ChdError, ChdResult};
use crate::chd::models::{ChdTrack, DiscKind};

/// chdman rounds every track's stored span up to this many frames.
pub const TRACK_ALIGNMENT: u32 = 4;

/// Fixed start LBA of the high-density area (tracks 3+) on a GD-ROM.
pub const HIGH_DENSITY_AREA_LBA: u32 = 45000;

/// Zero-filled frames appended after a track to reach the next 4-frame
/// boundary. These frames are stored in the container but never emitted.
/// Always in `0..TRACK_ALIGNMENT`.
pub fn alignment_frames(frames: u32) -> u32 {
    ((frames + TRACK_ALIGNMENT - 1) / TRACK_ALIGNMENT) * TRACK_ALIGNMENT - frames
}

/// Full span a track occupies in the container stream: pregap, frames
/// (which already include PAD) and trailing alignment.
pub fn stored_frames(track: &ChdTrack) -> u64 {
    track.pregap as u64 + track.frames as u64 + alignment_frames(track.frames) as u64
}

/// Absolute container-stream sector where `tracks[index]`'s span begins.
pub fn track_start_sector(tracks: &[ChdTrack], index: usize) -> u64 {
    tracks[..index].iter().map(stored_frames).sum()
}

/// Total sectors stored in the container for a track list. Matches
/// `logical_bytes / frame_size` for a consistent container.
pub fn total_stored_frames(tracks: &[ChdTrack]) -> u64 {
    tracks.iter().map(stored_frames).sum()
}

/// Container-stream sector of the boot sector (IP.BIN), past the owning
/// track's pregap. On a GD-ROM it lives in the first data track of the
/// high-density area (number >= 3); on a CD-ROM in the first data track.
pub fn ip_bin_sector(tracks: &[ChdTrack], kind: DiscKind) -> ChdResult<u64> {
    let mut sector = 0u64;

    for track in tracks {
        let holds_boot_sector = match kind {
            DiscKind::GdRom => track.is_data() && track.number >= 3,
            DiscKind::CdRom => track.is_data(),
        };
        if holds_boot_sector {
            return Ok(sector + track.pregap as u64);
        }
        sector += stored_frames(track);
    }

    Err(ChdError::NoDataTrackFound)
}
