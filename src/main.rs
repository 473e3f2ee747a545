use anyhow::Result;
use clap::Parser;
use disc_converto::chd::error::ChdError;
use disc_converto::chd::progress::{CancelToken, ProgressCallback};
use disc_converto::chd::reader::ChdReader;
use disc_converto::chd::{convert_to_cue_bin, convert_to_gdi, is_gd_rom_chd};
use disc_converto::commands::{Cli, Commands};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use log::{info, warn};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let logger = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .build();

    let level = logger.filter();
    let pb = MultiProgress::new();

    LogWrapper::new(pb.clone(), logger).try_init()?;
    log::set_max_level(level);

    let cli = Cli::parse();

    match cli.command {
        Commands::Gdi(cmd) => {
            let cancel = cancel_on_ctrl_c();
            let bar = pb.add(ProgressBar::new(100));
            let result =
                convert_to_gdi(&cmd.input, &cmd.output, Some(percent_sink(&bar)), &cancel).await;
            bar.finish_and_clear();

            match result {
                Ok(gdi_path) => info!("Wrote {}", gdi_path.display()),
                Err(ChdError::Cancelled) => {
                    warn!(
                        "Conversion cancelled, partial output left in {}",
                        cmd.output.display()
                    )
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Cue(cmd) => {
            let cancel = cancel_on_ctrl_c();
            let bar = pb.add(ProgressBar::new(100));
            let result =
                convert_to_cue_bin(&cmd.input, &cmd.output, Some(percent_sink(&bar)), &cancel)
                    .await;
            bar.finish_and_clear();

            match result {
                Ok(cue_path) => info!("Wrote {}", cue_path.display()),
                Err(ChdError::Cancelled) => {
                    warn!(
                        "Conversion cancelled, partial output left in {}",
                        cmd.output.display()
                    )
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Probe(cmd) => {
            if is_gd_rom_chd(&cmd.input) {
                println!("GD-ROM");
            } else {
                println!("not a GD-ROM (or not readable)");
            }
        }
        Commands::Info(cmd) => {
            let chd = ChdReader::open(&cmd.input)?;
            let header = chd.header();
            println!("version:       {}", header.version);
            println!("hunk bytes:    {}", header.hunk_bytes);
            println!("total hunks:   {}", header.total_hunks);
            println!("logical bytes: {}", header.logical_bytes);
            println!("unit bytes:    {}", header.unit_bytes);
            println!("layout:        {:?}", chd.kind());
            for track in chd.tracks() {
                println!(
                    "track {:02}: {:?} frames={} pad={} pregap={} postgap={}",
                    track.number, track.mode, track.frames, track.pad, track.pregap, track.postgap
                );
            }
        }
    }

    Ok(())
}

/// Progress callback driving an indicatif bar from integer percentages.
fn percent_sink(bar: &ProgressBar) -> ProgressCallback {
    let bar = bar.clone();
    Arc::new(move |percent| bar.set_position(percent as u64))
}

/// Token flipped by the first Ctrl-C, so conversions stop at the next
/// track or batch boundary instead of tearing mid-write.
fn cancel_on_ctrl_c() -> CancelToken {
    let cancel = CancelToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
    cancel
}
