// SPDX-License-Identifier: MPL-2.0
//! Demo driver: loads `.y4m` streams into videos and plays them in lockstep.

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use playback_core::config::{self, Config};
use playback_core::error::{Error, Result};
use playback_core::infrastructure::{build_adapter, Y4mBuilder, Y4mDecoder};
use playback_core::video_player::{Scheduler, Video};

const USAGE: &str = "\
Usage: playback_core [OPTIONS] FILE...

Plays YUV4MPEG2 (.y4m) files in lockstep and logs progress.

Options:
  --hz N          Scheduler tick rate (default from config, 90)
  --rate R        Playback rate (0.1 - 8.0)
  --loop          Loop every video at end-of-stream
  --config PATH   Read settings from PATH instead of the config dir
  --seconds S     Stop after S seconds of wall-clock time
  --synthetic     Add a generated 2 s, 64x48 test stream
  -h, --help      Print this help
";

/// Runs for this long when looping and no `--seconds` is given.
const DEFAULT_LOOP_SECONDS: f64 = 10.0;

struct Args {
    hz: Option<f64>,
    rate: Option<f64>,
    looping: bool,
    config: Option<PathBuf>,
    seconds: Option<f64>,
    synthetic: bool,
    files: Vec<PathBuf>,
}

fn parse_args() -> Result<Option<Args>> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{USAGE}");
        return Ok(None);
    }

    let invalid = |err: pico_args::Error| Error::Config(format!("invalid arguments: {err}"));
    let parsed = Args {
        hz: args.opt_value_from_str("--hz").map_err(invalid)?,
        rate: args.opt_value_from_str("--rate").map_err(invalid)?,
        looping: args.contains("--loop"),
        config: args.opt_value_from_str("--config").map_err(invalid)?,
        seconds: args.opt_value_from_str("--seconds").map_err(invalid)?,
        synthetic: args.contains("--synthetic"),
        files: args.finish().into_iter().map(PathBuf::from).collect(),
    };

    if parsed.files.is_empty() && !parsed.synthetic {
        return Err(Error::Config(format!("no input files\n\n{USAGE}")));
    }
    Ok(Some(parsed))
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => config::load_from_path(path)?,
        None => config::load().0,
    };

    if let Some(hz) = args.hz {
        config.playback.tick_rate_hz = Some(hz);
    }
    if let Some(rate) = args.rate {
        config.playback.default_rate = Some(rate);
    }
    if args.looping {
        config.playback.loop_enabled = Some(true);
    }
    Ok(config)
}

fn sources(args: &Args) -> Result<Vec<(String, Bytes)>> {
    let mut sources = Vec::with_capacity(args.files.len() + 1);
    for path in &args.files {
        let bytes = std::fs::read(path)?;
        sources.push((path.display().to_string(), Bytes::from(bytes)));
    }
    if args.synthetic {
        let stream = Y4mBuilder::new(64, 48)
            .frame_rate(30, 1)
            .duration_secs(2.0)
            .build();
        sources.push(("<synthetic>".to_string(), stream));
    }
    Ok(sources)
}

fn checksum(video: &Video) -> Option<u32> {
    let frame = video.data().ok()?;
    let head = frame.slice(..frame.len().min(16));
    Some(head.iter().map(|&b| u32::from(b)).sum())
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    if !Scheduler::init_global(&config.playback) {
        log::warn!("global scheduler was already initialised");
    }
    let scheduler = Scheduler::global();

    let mut videos = Vec::new();
    for (name, bytes) in sources(args)? {
        let adapter = build_adapter(Y4mDecoder::new(), &config.decoder)?;
        let video = Video::with_config(adapter, scheduler, &config);
        match video.load(bytes) {
            Ok(metadata) => {
                log::info!(
                    "{name}: {}x{} {} {:.2}s @ {:.2} fps",
                    metadata.width,
                    metadata.height,
                    metadata.codec,
                    metadata.duration_secs,
                    metadata.fps
                );
                video.play();
                videos.push((name, video));
            }
            Err(err) => log::warn!("{name}: skipped: {err}"),
        }
    }
    if videos.is_empty() {
        return Err(Error::Config("nothing to play".into()));
    }

    let limit = args
        .seconds
        .or_else(|| config.playback.loop_enabled.unwrap_or(false).then_some(DEFAULT_LOOP_SECONDS))
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64);
    let interval = Duration::from_secs_f64(scheduler.tick_interval_secs());
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let report_every = (1.0 / scheduler.tick_interval_secs()).round().max(1.0) as u64;

    let started = Instant::now();
    let mut next_tick = started;
    let mut ticks: u64 = 0;

    while videos.iter().any(|(_, video)| video.is_playing()) {
        if limit.is_some_and(|limit| started.elapsed() >= limit) {
            log::info!("time limit reached");
            break;
        }

        let report = scheduler.tick();
        ticks += 1;
        if report.finished > 0 || report.looped > 0 {
            log::debug!("tick {ticks}: {report:?}");
        }

        if ticks % report_every == 0 {
            for (name, video) in &videos {
                match checksum(video) {
                    Some(sum) => log::info!("{name}: t={:.3}s frame sum {sum}", video.current_time()),
                    None => log::info!("{name}: t={:.3}s no frame", video.current_time()),
                }
            }
        }

        next_tick += interval;
        thread::sleep(next_tick.saturating_duration_since(Instant::now()));
    }

    for (name, video) in &videos {
        let stats = video.cache_stats();
        log::info!(
            "{name}: stopped at {:.3}s, {} decodes, {:.1}% cache hits",
            video.current_time(),
            stats.decodes,
            stats.hit_rate()
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
