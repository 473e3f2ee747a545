/// Size of the sector payload stored in BIN/RAW output files.
pub const SECTOR_SIZE: usize = 2352;
pub const SUBCODE_SIZE: usize = 96;
/// Raw frame slot inside a CHD: payload plus subcode.
pub const FRAME_SIZE: usize = SECTOR_SIZE + SUBCODE_SIZE;

/// Disc timecode clock, frames per second.
pub const FRAMES_PER_SECOND: u32 = 75;

/// Track mode as recorded in CHD track metadata.
///
/// chdman writes several spellings for the same mode (`MODE1` vs
/// `MODE1/2048`); parsing folds them into one variant each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackMode {
    Audio,
    Mode1,
    Mode1Raw,
    Mode2,
    Mode2Raw,
    Mode2Form1,
    Mode2Form2,
    Mode2Form2Cooked,
}

impl TrackMode {
    /// Parse a TYPE value from track metadata. Unknown strings fall back to
    /// a raw 2352-byte mode, matching how downstream consumers treat them.
    pub fn from_metadata(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "AUDIO" => TrackMode::Audio,
            "MODE1" | "MODE1/2048" => TrackMode::Mode1,
            "MODE1_RAW" | "MODE1/2352" => TrackMode::Mode1Raw,
            "MODE2" | "MODE2/2336" => TrackMode::Mode2,
            "MODE2_RAW" | "MODE2/2352" => TrackMode::Mode2Raw,
            "MODE2_FORM1" | "MODE2/2048" => TrackMode::Mode2Form1,
            "MODE2_FORM2" => TrackMode::Mode2Form2,
            "MODE2/2324" => TrackMode::Mode2Form2Cooked,
            _ => TrackMode::Mode1Raw,
        }
    }

    /// Payload bytes carried per sector for this mode.
    pub fn sector_data_size(&self) -> usize {
        match self {
            TrackMode::Audio => 2352,
            TrackMode::Mode1 => 2048,
            TrackMode::Mode1Raw => 2352,
            TrackMode::Mode2 => 2336,
            TrackMode::Mode2Raw => 2352,
            TrackMode::Mode2Form1 => 2048,
            TrackMode::Mode2Form2 => 2328,
            TrackMode::Mode2Form2Cooked => 2324,
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, TrackMode::Audio)
    }
}

/// Subcode layout accompanying a track in CHD metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubcodeMode {
    None,
    Raw,
    RawInterleaved,
}

impl SubcodeMode {
    pub fn from_metadata(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "RW" => SubcodeMode::Raw,
            "RW_RAW" => SubcodeMode::RawInterleaved,
            _ => SubcodeMode::None,
        }
    }
}
