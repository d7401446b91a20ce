//! Entry point: parses CLI flags, loads configuration, installs the
//! process-wide PRNG, and runs the `init -> commands -> deinit` read/dispatch/
//! write loop spec §5 describes over stdin/stdout.

use clap::Parser;
use ecc_lab_device::config::{load, Cli};
use ecc_lab_device::prng::{SharedPrng, SpongePrng};
use ecc_lab_device::{commands::Device, framing, hal};
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};
use tracing_subscriber::filter::EnvFilter;

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .init();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "failed to load configuration");
            std::process::exit(1);
        }
    };

    hal::platform_init();
    hal::trigger_setup();

    let prng = Arc::new(Mutex::new(SpongePrng::new()));
    if ecc_lab_core::rng::install_rng(Box::new(SharedPrng::new(prng.clone()))).is_err() {
        warn!("process-wide RNG was already installed; continuing with the existing one");
    }

    let mut device = Device::new(config, prng);
    info!("ecc-lab-device ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                error!(%err, "failed to read a line from stdin");
                break;
            }
        };
        if line.is_empty() {
            continue;
        }

        let status = run_one(&mut device, &line, &mut stdout);
        let _ = stdout.write_all(framing::encode_status(status).as_bytes());
        let _ = stdout.flush();
    }
}

/// Decodes and dispatches one request line, writing any payload replies
/// before returning the status byte the caller appends as the final `z`
/// frame. Never panics: malformed frames and handler failures both resolve
/// to a non-zero status (spec §7).
fn run_one(device: &mut Device, line: &str, out: &mut impl Write) -> u8 {
    let request = match framing::decode_request(line) {
        Ok(request) => request,
        Err(err) => {
            warn!(%err, "malformed request frame");
            return err.status();
        }
    };

    hal::trigger_high(hal::TriggerBitmap::default());
    let outcome = device.dispatch(request.command, &request.payload);
    hal::trigger_low(hal::TriggerBitmap::default());

    match outcome {
        Ok(replies) => {
            for (letter, payload) in replies {
                let _ = out.write_all(framing::encode_reply(letter, &payload).as_bytes());
            }
            0
        }
        Err(err) => {
            warn!(command = request.command, %err, "command failed");
            err.status()
        }
    }
}
