mod audio;
mod autopilot;
mod backend;

use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use instant::Instant;
use wisteria_core::stages::ending::CLOSING_MESSAGE;
use wisteria_core::{Experience, ExperienceParams};

use crate::autopilot::Autopilot;
use crate::backend::NativeBackend;

const FRAME: Duration = Duration::from_millis(16);
// five stages finish in well under this when played by the autopilot
const MAX_RUN_SEC: f64 = 600.0;

#[derive(Debug)]
struct Options {
    seed: u64,
    bpm: f64,
    headless: bool,
}

fn parse_args() -> anyhow::Result<Options> {
    let mut options = Options {
        seed: rand::random(),
        bpm: wisteria_core::DEFAULT_BPM,
        headless: false,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = args.next().ok_or_else(|| anyhow!("--seed needs a value"))?;
                options.seed = value.parse().with_context(|| format!("bad seed {value}"))?;
            }
            "--bpm" => {
                let value = args.next().ok_or_else(|| anyhow!("--bpm needs a value"))?;
                options.bpm = value.parse().with_context(|| format!("bad bpm {value}"))?;
            }
            "--headless" => options.headless = true,
            other => bail!("unknown argument {other} (expected --seed N, --bpm N, --headless)"),
        }
    }
    Ok(options)
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let options = parse_args()?;
    log::info!("[native] {options:?}");

    // the stream must outlive the run
    let (_stream, mixer) = if options.headless {
        (None, None)
    } else {
        match audio::start_output() {
            Ok((stream, mixer)) => (Some(stream), Some(mixer)),
            Err(e) => {
                log::warn!("[native] no audio output, running silent: {e:#}");
                (None, None)
            }
        }
    };

    let backend = NativeBackend::new(mixer, options.bpm);
    let stats = backend.stats();
    let mut params = ExperienceParams::default();
    params.transport.bpm = options.bpm;
    let mut experience = Experience::new(params, Box::new(backend), options.seed)?;
    let mut autopilot = Autopilot::new();

    let start = Instant::now();
    let mut frames: u64 = 0;
    while !experience.is_finished() {
        let now = if options.headless {
            frames as f64 * FRAME.as_secs_f64()
        } else {
            start.elapsed().as_secs_f64()
        };
        if now > MAX_RUN_SEC {
            bail!(
                "gave up in stage {} after {MAX_RUN_SEC}s",
                experience.stage_id().number()
            );
        }
        autopilot.drive(&mut experience)?;
        experience.frame(now);
        frames += 1;
        if !options.headless {
            thread::sleep(FRAME);
        }
    }

    log::info!(
        "[native] {} notes and {} drum hits over {:.1}s ({frames} frames)",
        stats.notes(),
        stats.hits(),
        experience.now()
    );
    log::info!("[native] {CLOSING_MESSAGE}");
    Ok(())
}
