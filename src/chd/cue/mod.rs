use crate::chd::cue::models::Msf;
use crate::chd::models::ChdTrack;

pub mod models;

/// `Track NN.bin`, one binary per track on the cue path.
pub fn bin_filename(track: &ChdTrack) -> String {
    format!("Track {:02}.bin", track.number)
}

/// Builds a cue sheet as tracks are emitted.
///
/// Every data track is declared `MODE1/2352` regardless of its source
/// sub-mode; downstream converters only need a valid 2352-byte-sector
/// placeholder. Pregaps become `PREGAP` directives on non-first tracks,
/// their sectors are never materialized in the BIN files.
#[derive(Default)]
pub struct CueSheet {
    content: String,
}

impl CueSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_track(&mut self, track: &ChdTrack, filename: &str) {
        let track_type = if track.is_audio() { "AUDIO" } else { "MODE1/2352" };
        self.content.push_str(&format!("FILE \"{filename}\" BINARY\n"));
        self.content
            .push_str(&format!("  TRACK {:02} {}\n", track.number, track_type));
        if track.pregap > 0 && track.number > 1 {
            self.content
                .push_str(&format!("    PREGAP {}\n", Msf::from_frames(track.pregap)));
        }
        self.content.push_str("    INDEX 01 00:00:00\n");
    }

    pub fn finish(self) -> String {
        self.content
    }
}
