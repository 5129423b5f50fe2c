#![forbid(unsafe_code)]

use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use sentinel_adapter::{HttpAlertTransport, HttpTransportConfig, MicCapture, SubmitWorker, WatchConfig};
use sentinel_contracts::alert::{AlertRequest, SensorUnavailable};
use sentinel_contracts::{LocalHour, MonotonicTimeNs};
use sentinel_os::kernel::{KernelConfig, SentinelKernel, TickOutput};
use sentinel_os::transport::AlertTransport;

const TICK_INTERVAL: Duration = Duration::from_millis(200);
const SPECTRUM_BINS: usize = 64;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = WatchConfig::from_env()?;
    let mut transport = HttpAlertTransport::new(HttpTransportConfig::mvp_v1(
        config.api_base_url.clone(),
        config.auth_token.clone(),
    ));

    let mut kernel =
        SentinelKernel::new(KernelConfig::mvp_v1()).map_err(|err| format!("{err:?}"))?;
    kernel.set_presentation_mode(config.presentation_mode);
    kernel.start_sensors();

    // Startup-only blocking call; after this the transport lives on the
    // submit worker thread and the tick loop never touches the network.
    match transport.fetch_zones() {
        Ok(zones) => {
            let total = zones.len();
            let skipped = kernel.load_zones(zones);
            eprintln!("sentinel_watch: loaded {} zone(s), skipped {skipped}", total - skipped);
        }
        Err(err) => {
            eprintln!("sentinel_watch: zone fetch failed ({}): running without zones", err.detail);
        }
    }
    kernel.on_location_update(config.fixed_position);
    let submitter = SubmitWorker::spawn(transport);

    let mic = match MicCapture::start(SPECTRUM_BINS) {
        Ok(mic) => Some(mic),
        Err(err) => {
            eprintln!("sentinel_watch: {err}");
            None
        }
    };
    // No platform motion source is wired on this host; the fusion runs
    // with a permanently zero motion contribution.
    eprintln!(
        "sentinel_watch: {}",
        SensorUnavailable {
            sensor: "motion",
            reason: "no platform motion source; motion risk contributes zero".to_string(),
        }
    );

    let commands = spawn_stdin_reader();
    let origin = Instant::now();
    eprintln!("sentinel_watch: monitoring (commands: sos | now | cancel | sense on|off | quit)");

    loop {
        let now = MonotonicTimeNs(origin.elapsed().as_nanos() as u64);
        let hour = local_hour(config.utc_offset_hours);
        let frame = mic.as_ref().and_then(|m| m.capture_frame());

        for output in kernel.tick(now, hour, frame.as_ref()) {
            match output {
                TickOutput::AutoArmed { .. } => {
                    eprintln!("sentinel_watch: risk HIGH, auto countdown armed");
                    for line in kernel.explanation() {
                        eprintln!("  - {line}");
                    }
                }
                TickOutput::FireAlert(request) => {
                    enqueue_submission(&submitter, &mut kernel, now, request);
                }
                TickOutput::LiveFeed(feed) => {
                    if let Some(secs) = kernel.remaining_secs(now) {
                        eprintln!("sentinel_watch: countdown {secs}s (cancel to abort)");
                    } else {
                        eprintln!(
                            "sentinel_watch: risk {:.1} rms {:.2} stress {:.2}",
                            feed.total_risk, feed.rms, feed.stress
                        );
                    }
                }
            }
        }

        // Finished background submissions resolve the fire latch here,
        // never inline with the HTTP call.
        while let Some(outcome) = submitter.try_outcome() {
            let now = MonotonicTimeNs(origin.elapsed().as_nanos() as u64);
            match outcome.result {
                Ok(id) => {
                    eprintln!(
                        "sentinel_watch: alert {} submitted (score {:.1})",
                        id.as_str(),
                        outcome.request.risk_score
                    );
                    kernel.resolve_submission(now, true);
                }
                Err(err) => {
                    eprintln!("sentinel_watch: alert submission failed: {}", err.detail);
                    kernel.resolve_submission(now, false);
                }
            }
        }

        while let Ok(line) = commands.try_recv() {
            let now = MonotonicTimeNs(origin.elapsed().as_nanos() as u64);
            match line.trim() {
                "sos" => {
                    eprintln!("sentinel_watch: manual countdown armed");
                    kernel.arm_manual(now);
                }
                "now" => {
                    if let Some(request) = kernel.send_now(now) {
                        enqueue_submission(&submitter, &mut kernel, now, request);
                    } else {
                        eprintln!("sentinel_watch: nothing armed");
                    }
                }
                "cancel" => {
                    kernel.cancel(now);
                    eprintln!("sentinel_watch: countdown cancelled");
                }
                "sense on" => kernel.set_heightened_sensitivity(true),
                "sense off" => kernel.set_heightened_sensitivity(false),
                "quit" => return Ok(()),
                "" => {}
                other => eprintln!("sentinel_watch: unknown command {other:?}"),
            }
        }

        thread::sleep(TICK_INTERVAL);
    }
}

fn enqueue_submission(
    submitter: &SubmitWorker,
    kernel: &mut SentinelKernel,
    now: MonotonicTimeNs,
    request: AlertRequest,
) {
    eprintln!(
        "sentinel_watch: submitting alert (score {:.1})",
        request.risk_score
    );
    if !submitter.enqueue(request) {
        // Worker gone; release the latch so a retry stays possible.
        eprintln!("sentinel_watch: alert submission failed: submit worker unavailable");
        kernel.resolve_submission(now, false);
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        return;
                    }
                }
                Err(_) => return,
            }
        }
    });
    rx
}

fn local_hour(utc_offset_hours: i8) -> LocalHour {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let hour = ((secs / 3_600) as i64 + i64::from(utc_offset_hours)).rem_euclid(24) as u8;
    LocalHour::new(hour).unwrap_or_default()
}
