use crate::chd::cue::CueSheet;
use crate::chd::error::{ChdError, ChdResult};
use crate::chd::extract::extract_track;
use crate::chd::gdi::GdiSheet;
use crate::chd::layout::{HIGH_DENSITY_AREA_LBA, alignment_frames};
use crate::chd::progress::{CancelToken, ProgressCallback};
use crate::chd::reader::ChdReader;
use log::debug;
use std::path::{Path, PathBuf};
use tokio::fs;

pub mod cue;
pub mod error;
pub mod extract;
pub mod gdi;
pub mod layout;
pub mod metadata;
pub mod models;
pub mod progress;
pub mod reader;
pub mod store;

/// Convert a GD-ROM CHD into a GDI manifest plus track files and return the
/// path of the written `disc.gdi`.
pub async fn convert_to_gdi(
    chd_path: &Path,
    output_dir: &Path,
    progress: Option<ProgressCallback>,
    cancel: &CancelToken,
) -> ChdResult<PathBuf> {
    debug!("converting {:?} to GDI in {:?}", chd_path, output_dir);
    let mut chd = ChdReader::open(chd_path)?;
    convert_reader_to_gdi(&mut chd, output_dir, progress, cancel).await
}

/// GDI conversion against an already opened reader. Fails with
/// [`ChdError::NotGdRom`] before touching the output directory when the
/// source is not dual-density.
pub async fn convert_reader_to_gdi(
    chd: &mut ChdReader,
    output_dir: &Path,
    progress: Option<ProgressCallback>,
    cancel: &CancelToken,
) -> ChdResult<PathBuf> {
    if !chd.is_gd_rom() {
        return Err(ChdError::NotGdRom);
    }

    fs::create_dir_all(output_dir).await?;

    let tracks = chd.tracks().to_vec();
    let track_count = tracks.len();
    let swap_audio = chd.swaps_audio();

    let mut sheet = GdiSheet::new(track_count);
    let mut lba: u32 = 0;
    let mut stream_sector: u64 = 0;

    for (t, track) in tracks.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(ChdError::Cancelled);
        }

        // The pregap occupies disc space and container stream alike, but
        // its sectors are never written out.
        lba += track.pregap;
        stream_sector += track.pregap as u64;

        let filename = gdi::track_filename(track);
        sheet.push_track(track, lba, &filename);

        let output_path = output_dir.join(&filename);
        extract_track(
            chd,
            stream_sector,
            track.data_frames(),
            &output_path,
            swap_audio && track.is_audio(),
            cancel,
        )
        .await?;

        // FRAMES includes PAD, which fills the layout up to the next track,
        // so the LBA advances by the full span. The stream additionally
        // carries the 4-frame alignment.
        lba += track.frames;
        stream_sector += track.frames as u64 + alignment_frames(track.frames) as u64;

        // The high-density area starts at a fixed LBA after the last
        // low-density track.
        if track.number < 3 {
            let next_is_high_density = tracks.get(t + 1).is_some_and(|next| next.number >= 3);
            if next_is_high_density && lba < HIGH_DENSITY_AREA_LBA {
                lba = HIGH_DENSITY_AREA_LBA;
            }
        }

        if let Some(report) = &progress {
            report(((t + 1) * 100 / track_count) as u32);
        }
    }

    let gdi_path = output_dir.join(gdi::GDI_FILENAME);
    fs::write(&gdi_path, sheet.finish()).await?;

    Ok(gdi_path)
}

/// Convert a CHD into a cue sheet plus per-track binaries and return the
/// path of the written cue file. Valid for any classification; the usual
/// route for single-density sources headed to a further conversion step.
pub async fn convert_to_cue_bin(
    chd_path: &Path,
    output_dir: &Path,
    progress: Option<ProgressCallback>,
    cancel: &CancelToken,
) -> ChdResult<PathBuf> {
    debug!("converting {:?} to CUE/BIN in {:?}", chd_path, output_dir);
    let base_name = chd_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("disc")
        .to_string();
    let mut chd = ChdReader::open(chd_path)?;
    convert_reader_to_cue_bin(&mut chd, &base_name, output_dir, progress, cancel).await
}

/// CUE/BIN conversion against an already opened reader; the cue file is
/// named `{base_name}.cue`.
pub async fn convert_reader_to_cue_bin(
    chd: &mut ChdReader,
    base_name: &str,
    output_dir: &Path,
    progress: Option<ProgressCallback>,
    cancel: &CancelToken,
) -> ChdResult<PathBuf> {
    fs::create_dir_all(output_dir).await?;

    let tracks = chd.tracks().to_vec();
    let track_count = tracks.len();
    let swap_audio = chd.swaps_audio();

    let mut sheet = CueSheet::new();
    let mut stream_sector: u64 = 0;

    for (t, track) in tracks.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(ChdError::Cancelled);
        }

        let filename = cue::bin_filename(track);
        sheet.push_track(track, &filename);

        // Skip the pregap in the stream; it is declared in the sheet
        // instead of being materialized.
        stream_sector += track.pregap as u64;

        extract_track(
            chd,
            stream_sector,
            track.data_frames(),
            &output_dir.join(&filename),
            swap_audio && track.is_audio(),
            cancel,
        )
        .await?;

        stream_sector += track.frames as u64 + alignment_frames(track.frames) as u64;

        if let Some(report) = &progress {
            report(((t + 1) * 100 / track_count) as u32);
        }
    }

    let cue_path = output_dir.join(format!("{base_name}.cue"));
    fs::write(&cue_path, sheet.finish()).await?;

    Ok(cue_path)
}

/// Classification probe: does this CHD hold a GD-ROM image?
///
/// Opens the container read-only, inspects the winning metadata family and
/// closes it again. Every failure collapses to `false`, so callers cannot
/// distinguish a single-density disc from an unreadable file.
pub fn is_gd_rom_chd(chd_path: &Path) -> bool {
    ChdReader::open(chd_path)
        .map(|chd| chd.is_gd_rom())
        .unwrap_or(false)
}
