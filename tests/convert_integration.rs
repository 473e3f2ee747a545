//! End-to-end conversion against a synthetic, self-contained v5 container
//! written to disk: open through the built-in file store, convert, and
//! compare the emitted manifests and track binaries byte for byte.

use byteorder::{BigEndian, WriteBytesExt};
use disc_converto::chd::error::ChdError;
use disc_converto::chd::layout::alignment_frames;
use disc_converto::chd::progress::CancelToken;
use disc_converto::chd::reader::ChdReader;
use disc_converto::chd::store::StoreError;
use disc_converto::chd::{convert_to_cue_bin, convert_to_gdi, is_gd_rom_chd};
use std::io::Write;
use std::path::Path;

const SECTOR_SIZE: usize = 2352;
const FRAME_SIZE: usize = 2448;
const FRAMES_PER_HUNK: usize = 2;
const HUNK_BYTES: usize = FRAMES_PER_HUNK * FRAME_SIZE;
const V5_HEADER_LENGTH: u32 = 124;

struct TrackSpec {
    number: u32,
    mode: &'static str,
    frames: u32,
    pad: u32,
    pregap: u32,
    fill: u8,
}

impl TrackSpec {
    fn metadata(&self) -> String {
        format!(
            "TRACK:{} TYPE:{} SUBTYPE:NONE FRAMES:{} PAD:{} PREGAP:{} \
             PGTYPE:MODE1_RAW PGSUB:NONE POSTGAP:0",
            self.number, self.mode, self.frames, self.pad, self.pregap
        )
    }
}

/// Frame stream the way the source compressor stores it: per track, pregap
/// frames (zero), content frames (fill byte), then zero frames up to the
/// 4-frame boundary.
fn frame_stream(specs: &[TrackSpec]) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    for spec in specs {
        for _ in 0..spec.pregap {
            frames.push(vec![0u8; FRAME_SIZE]);
        }
        for _ in 0..spec.frames {
            frames.push(vec![spec.fill; FRAME_SIZE]);
        }
        for _ in 0..alignment_frames(spec.frames) {
            frames.push(vec![0u8; FRAME_SIZE]);
        }
    }
    frames
}

/// Serialize an uncompressed v5 container: header, metadata chain, raw hunk
/// map, then hunk data in hunk-aligned slots.
fn write_chd(path: &Path, tag: [u8; 4], specs: &[TrackSpec], parent_sha1: [u8; 20]) {
    let frames = frame_stream(specs);
    let hunk_count = frames.len().div_ceil(FRAMES_PER_HUNK);

    let mut meta = Vec::new();
    let mut cursor = V5_HEADER_LENGTH as u64;
    for (i, spec) in specs.iter().enumerate() {
        let mut payload = spec.metadata().into_bytes();
        payload.push(0);
        let next = if i + 1 == specs.len() {
            0
        } else {
            cursor + 16 + payload.len() as u64
        };
        meta.write_all(&tag).unwrap();
        meta.write_u32::<BigEndian>(0x0100_0000 | payload.len() as u32)
            .unwrap();
        meta.write_u64::<BigEndian>(next).unwrap();
        meta.write_all(&payload).unwrap();
        cursor += 16 + payload.len() as u64;
    }

    let map_offset = V5_HEADER_LENGTH as u64 + meta.len() as u64;
    let map_end = map_offset + hunk_count as u64 * 4;
    let first_slot = map_end.div_ceil(HUNK_BYTES as u64);

    let mut out = Vec::new();
    out.write_all(b"MComprHD").unwrap();
    out.write_u32::<BigEndian>(V5_HEADER_LENGTH).unwrap();
    out.write_u32::<BigEndian>(5).unwrap();
    out.write_all(&[0u8; 16]).unwrap(); // four empty compressor slots
    out.write_u64::<BigEndian>((hunk_count * HUNK_BYTES) as u64)
        .unwrap();
    out.write_u64::<BigEndian>(map_offset).unwrap();
    out.write_u64::<BigEndian>(V5_HEADER_LENGTH as u64).unwrap();
    out.write_u32::<BigEndian>(HUNK_BYTES as u32).unwrap();
    out.write_u32::<BigEndian>(FRAME_SIZE as u32).unwrap();
    out.write_all(&[0u8; 40]).unwrap(); // raw sha1 + sha1
    out.write_all(&parent_sha1).unwrap();
    assert_eq!(out.len() as u32, V5_HEADER_LENGTH);

    out.extend_from_slice(&meta);
    for slot in 0..hunk_count {
        out.write_u32::<BigEndian>((first_slot + slot as u64) as u32)
            .unwrap();
    }

    out.resize(first_slot as usize * HUNK_BYTES, 0);
    for chunk in frames.chunks(FRAMES_PER_HUNK) {
        let start = out.len();
        for frame in chunk {
            out.extend_from_slice(frame);
        }
        out.resize(start + HUNK_BYTES, 0);
    }

    std::fs::write(path, out).unwrap();
}

fn gd_rom_specs() -> Vec<TrackSpec> {
    vec![
        TrackSpec { number: 1, mode: "AUDIO", frames: 6, pad: 0, pregap: 0, fill: 0x11 },
        TrackSpec { number: 2, mode: "AUDIO", frames: 6, pad: 0, pregap: 0, fill: 0x22 },
        TrackSpec { number: 3, mode: "MODE1_RAW", frames: 8, pad: 2, pregap: 0, fill: 0x33 },
    ]
}

#[tokio::test]
async fn gd_rom_container_converts_to_gdi_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let chd_path = dir.path().join("game.chd");
    write_chd(&chd_path, *b"CHGD", &gd_rom_specs(), [0; 20]);

    let out = dir.path().join("out");
    let gdi_path = convert_to_gdi(&chd_path, &out, None, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(&gdi_path).unwrap(),
        "3\n\
         1 0 0 2352 track01.raw 0\n\
         2 6 0 2352 track02.raw 0\n\
         3 45000 4 2352 track03.bin 0\n"
    );

    let t2 = std::fs::read(out.join("track02.raw")).unwrap();
    assert_eq!(t2.len(), 6 * SECTOR_SIZE);
    assert!(t2.iter().all(|b| *b == 0x22));

    // PAD frames are dropped from the data track.
    let t3 = std::fs::read(out.join("track03.bin")).unwrap();
    assert_eq!(t3.len(), 6 * SECTOR_SIZE);
    assert!(t3.iter().all(|b| *b == 0x33));
}

#[tokio::test]
async fn cd_rom_container_converts_to_cue_bin_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let chd_path = dir.path().join("my game.chd");
    write_chd(
        &chd_path,
        *b"CHT2",
        &[
            TrackSpec { number: 1, mode: "MODE1_RAW", frames: 4, pad: 0, pregap: 0, fill: 0xAB },
            TrackSpec { number: 2, mode: "AUDIO", frames: 4, pad: 0, pregap: 150, fill: 0xCD },
        ],
        [0; 20],
    );

    let out = dir.path().join("out");
    let cue_path = convert_to_cue_bin(&chd_path, &out, None, &CancelToken::new())
        .await
        .unwrap();

    // The cue file carries the source's base name.
    assert_eq!(cue_path.file_name().unwrap(), "my game.cue");
    assert_eq!(
        std::fs::read_to_string(&cue_path).unwrap(),
        "FILE \"Track 01.bin\" BINARY\n\
         \x20 TRACK 01 MODE1/2352\n\
         \x20   INDEX 01 00:00:00\n\
         FILE \"Track 02.bin\" BINARY\n\
         \x20 TRACK 02 AUDIO\n\
         \x20   PREGAP 00:02:00\n\
         \x20   INDEX 01 00:00:00\n"
    );

    let t2 = std::fs::read(out.join("Track 02.bin")).unwrap();
    assert_eq!(t2.len(), 4 * SECTOR_SIZE);
    assert!(t2.iter().all(|b| *b == 0xCD));
}

#[tokio::test]
async fn gdi_conversion_of_a_cd_rom_fails_with_a_classification_error() {
    let dir = tempfile::tempdir().unwrap();
    let chd_path = dir.path().join("cd.chd");
    write_chd(
        &chd_path,
        *b"CHT2",
        &[TrackSpec { number: 1, mode: "MODE1_RAW", frames: 4, pad: 0, pregap: 0, fill: 0x01 }],
        [0; 20],
    );

    let err = convert_to_gdi(&chd_path, &dir.path().join("out"), None, &CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ChdError::NotGdRom));
}

#[test]
fn containers_with_a_parent_dependency_are_rejected_at_open() {
    let dir = tempfile::tempdir().unwrap();
    let chd_path = dir.path().join("delta.chd");
    write_chd(&chd_path, *b"CHGD", &gd_rom_specs(), [0x42; 20]);

    let err = ChdReader::open(&chd_path).unwrap_err();
    assert!(matches!(
        err,
        ChdError::StoreError(StoreError::RequiresParent)
    ));
}

#[test]
fn probe_reports_gd_rom_and_swallows_all_errors() {
    let dir = tempfile::tempdir().unwrap();

    let gd_path = dir.path().join("gd.chd");
    write_chd(&gd_path, *b"CHGD", &gd_rom_specs(), [0; 20]);
    assert!(is_gd_rom_chd(&gd_path));

    let cd_path = dir.path().join("cd.chd");
    write_chd(
        &cd_path,
        *b"CHT2",
        &[TrackSpec { number: 1, mode: "AUDIO", frames: 4, pad: 0, pregap: 0, fill: 0x01 }],
        [0; 20],
    );
    assert!(!is_gd_rom_chd(&cd_path));

    // Unreadable files collapse to false, indistinguishable from CD-ROM.
    assert!(!is_gd_rom_chd(Path::new("/nonexistent/disc.chd")));

    let delta_path = dir.path().join("delta.chd");
    write_chd(&delta_path, *b"CHGD", &gd_rom_specs(), [0x42; 20]);
    assert!(!is_gd_rom_chd(&delta_path));
}

#[test]
fn boot_sector_is_read_from_the_high_density_data_track() {
    let dir = tempfile::tempdir().unwrap();
    let chd_path = dir.path().join("gd.chd");
    write_chd(&chd_path, *b"CHGD", &gd_rom_specs(), [0; 20]);

    let mut chd = ChdReader::open(&chd_path).unwrap();
    // Tracks 1 and 2 each span 6 frames plus 2 alignment frames.
    assert_eq!(chd.ip_bin_sector().unwrap(), 16);

    let ip_bin = chd.ip_bin().unwrap();
    assert_eq!(ip_bin.len(), SECTOR_SIZE);
    assert!(ip_bin.iter().all(|b| *b == 0x33));
}
