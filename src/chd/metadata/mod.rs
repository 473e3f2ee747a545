use crate::cd::{SubcodeMode, TrackMode};
use crate::chd::error::{ChdError, ChdResult};
use crate::chd::models::{ChdTrack, DiscKind};
use crate::chd::store::HunkStore;
use log::debug;

/// GD-ROM track metadata, current and legacy tag.
pub const GDROM_TRACK_TAG: [u8; 4] = *b"CHGD";
pub const GDROM_OLD_TRACK_TAG: [u8; 4] = *b"CHGT";
/// CD-ROM track metadata: v2, v1 and legacy tag.
pub const CDROM_TRACK_TAG2: [u8; 4] = *b"CHT2";
pub const CDROM_TRACK_TAG: [u8; 4] = *b"CHTR";
pub const CDROM_OLD_TRACK_TAG: [u8; 4] = *b"CHCD";

/// Discovery order. The first family yielding at least one parseable record
/// fixes the disc classification; families are never merged.
const TAG_PRIORITY: [([u8; 4], DiscKind); 5] = [
    (GDROM_TRACK_TAG, DiscKind::GdRom),
    (GDROM_OLD_TRACK_TAG, DiscKind::GdRom),
    (CDROM_TRACK_TAG2, DiscKind::CdRom),
    (CDROM_TRACK_TAG, DiscKind::CdRom),
    (CDROM_OLD_TRACK_TAG, DiscKind::CdRom),
];

/// Enumerate track metadata and classify the disc.
///
/// The returned list is stably sorted by track number. Duplicate track
/// numbers are rejected; gaps in numbering are tolerated (GD-ROM discs
/// number the high-density area from 3).
pub fn discover_tracks(store: &mut dyn HunkStore) -> ChdResult<(Vec<ChdTrack>, DiscKind)> {
    for (tag, kind) in TAG_PRIORITY {
        let mut tracks = read_tracks_with_tag(store, tag)?;
        if tracks.is_empty() {
            continue;
        }

        tracks.sort_by_key(|track| track.number);
        for pair in tracks.windows(2) {
            if pair[0].number == pair[1].number {
                return Err(ChdError::DuplicateTrackNumber(pair[0].number));
            }
        }

        debug!(
            "tag {} yielded {} tracks, classified as {:?}",
            String::from_utf8_lossy(&tag),
            tracks.len(),
            kind
        );
        return Ok((tracks, kind));
    }

    Err(ChdError::NoTrackMetadataFound)
}

fn read_tracks_with_tag(store: &mut dyn HunkStore, tag: [u8; 4]) -> ChdResult<Vec<ChdTrack>> {
    let mut tracks = Vec::new();

    for index in 0u32.. {
        let Some(record) = store.metadata(tag, index)? else {
            break;
        };
        if let Some(track) = parse_track_record(&record) {
            tracks.push(track);
        }
    }

    Ok(tracks)
}

/// Parse one whitespace-separated `KEY:VALUE` record, e.g.
/// `TRACK:3 TYPE:MODE1_RAW SUBTYPE:NONE FRAMES:300 PAD:0 PREGAP:0`.
///
/// Unknown keys are ignored and unparseable numerics default to 0. Records
/// without a positive track number or a type are discarded.
pub fn parse_track_record(record: &str) -> Option<ChdTrack> {
    let mut number = 0u32;
    let mut mode = None;
    let mut sub = SubcodeMode::None;
    let mut frames = 0u32;
    let mut pad = 0u32;
    let mut pregap = 0u32;
    let mut pregap_mode = String::new();
    let mut pregap_sub = String::new();
    let mut postgap = 0u32;

    for token in record.trim_end_matches('\0').split_whitespace() {
        let Some((key, value)) = token.split_once(':') else {
            continue;
        };
        match key {
            "TRACK" => number = value.parse().unwrap_or(0),
            "TYPE" if !value.is_empty() => mode = Some(TrackMode::from_metadata(value)),
            "SUBTYPE" => sub = SubcodeMode::from_metadata(value),
            "FRAMES" => frames = value.parse().unwrap_or(0),
            "PAD" => pad = value.parse().unwrap_or(0),
            "PREGAP" => pregap = value.parse().unwrap_or(0),
            "PGTYPE" => pregap_mode = value.to_string(),
            "PGSUB" => pregap_sub = value.to_string(),
            "POSTGAP" => postgap = value.parse().unwrap_or(0),
            _ => {}
        }
    }

    if number == 0 {
        return None;
    }

    Some(ChdTrack {
        number,
        mode: mode?,
        sub,
        frames,
        pad,
        pregap,
        pregap_mode,
        pregap_sub,
        postgap,
    })
}
