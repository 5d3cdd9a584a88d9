use polygrow::render::CpuRenderer;
use polygrow::settings::{GrowSettings, DEFAULT_SETTINGS_PATH};
use polygrow::{AutoRunner, Preset, Result, Scheduler, TickOutcome};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // configure Rayon's global thread pool once at startup so worker threads get nice names like "rayon-0".
    let _ = rayon::ThreadPoolBuilder::new()
        .thread_name(|i| format!("rayon-{i}"))
        .build_global();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_owned());
    let settings = GrowSettings::load(&path);
    let (w, h) = settings.canvas_size()?;
    info!(settings = %path, preset = %settings.preset, policy = ?settings.policy, "polygrow starting");

    let mut scheduler = Scheduler::new(settings.bounds(), Vec::new(), settings.rng_seed)
        .with_candidate_limit(settings.candidate_limit);
    Preset::load(&settings.preset, settings.canvas_width, settings.canvas_height)?.install(&mut scheduler);

    let runner = AutoRunner::spawn(scheduler, settings.tick_interval())?;
    runner.start(settings.policy);

    // an update per tick
    loop {
        let update = match runner.updates().recv_timeout(Duration::from_secs(1)) {
            Ok(update) => update,
            Err(RecvTimeoutError::Timeout) if runner.is_alive() => continue,
            Err(_) => break,
        };
        match &update.outcome {
            TickOutcome::Applied(report) => debug!(polygons = update.polygon_count, "{report}"),
            TickOutcome::Exhausted => break,
            TickOutcome::Idle => {}
        }
        if settings.max_steps.is_some_and(|max| update.ticks >= max) {
            runner.stop();
            info!(ticks = update.ticks, "step limit reached");
            break;
        }
    }
    runner.stop();

    let pix = runner.with_scheduler(|s| {
        if settings.draw_previews {
            s.set_show_previews(true);
        }
        info!(polygons = s.store().len(), ticks = s.ticks(), "growth finished");
        CpuRenderer::render(s.store().all(), s.previews(), w, h)
    })?;
    CpuRenderer::save_png(&pix, &settings.output_png)?;
    info!(path = %settings.output_png, "wrote {w}x{h} png");

    runner.shutdown();
    Ok(())
}
