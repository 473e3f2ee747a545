use crate::cd::SECTOR_SIZE;
use crate::chd::models::ChdTrack;

/// Fixed manifest filename expected by GDI loaders.
pub const GDI_FILENAME: &str = "disc.gdi";

/// `trackNN.bin` for data tracks, `trackNN.raw` for audio.
pub fn track_filename(track: &ChdTrack) -> String {
    let extension = if track.is_audio() { "raw" } else { "bin" };
    format!("track{:02}.{}", track.number, extension)
}

/// Builds the `disc.gdi` manifest: a track count line followed by one line
/// per track, `{number} {lba} {type} 2352 {filename} 0` with type 4 for
/// data and 0 for audio.
pub struct GdiSheet {
    content: String,
}

impl GdiSheet {
    pub fn new(track_count: usize) -> Self {
        Self {
            content: format!("{track_count}\n"),
        }
    }

    /// `lba` is the manifest LBA at the moment of emission, before the
    /// post-track advance.
    pub fn push_track(&mut self, track: &ChdTrack, lba: u32, filename: &str) {
        self.content.push_str(&format!(
            "{} {} {} {} {} 0\n",
            track.number,
            lba,
            if track.is_audio() { 0 } else { 4 },
            SECTOR_SIZE,
            filename
        ));
    }

    pub fn finish(self) -> String {
        self.content
    }
}
