//! feedback — closed-loop PI control of a second-order plant.
//!
//! ```text
//!  setpoint ──►(+)──► error ──► kp ─────────►(+)──► plant ──┬──► y
//!               ▲ -           └─► ∫ ki ─────►                │
//!               └────────────────────────────────────────────┘
//! ```
//!
//! Usage: `feedback [config.json] [output_dir]`.  The config is an
//! `EngineConfig`; its `parameters` may set `kp`, `ki`, `setpoint`, and
//! `duration` (sync steps).  Writes `trace.csv` and `scheme.c` to the
//! output directory (default `output/feedback`).

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use bd_blocks::BlockSpec;
use bd_core::{BlockId, BlockLink, EngineConfig};
use bd_output::{CsvTraceWriter, TraceObserver};
use bd_scheme::{Scheme, SchemeBuilder};

// ── Defaults ──────────────────────────────────────────────────────────────────

const DEFAULT_KP:       f64 = 2.0;
const DEFAULT_KI:       f64 = 1.0;
const DEFAULT_SETPOINT: f64 = 1.0;
const DEFAULT_DURATION: f64 = 10.0;
const DEFAULT_OUTPUT:   &str = "output/feedback";

// Block ids in creation order.
const SETPOINT: u32 = 0;
const ERROR:    u32 = 1;
const GAIN:     u32 = 2;
const INTEGRAL: u32 = 3;
const CONTROL:  u32 = 4;
const PLANT:    u32 = 5;
const MONITOR:  u32 = 6;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bd_scheme=info,bd_assembly=warn"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("reading config {}", p.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", p.display()))?
        }
        None => EngineConfig::with_step(0.01),
    };
    for (name, value) in [
        ("kp", DEFAULT_KP),
        ("ki", DEFAULT_KI),
        ("setpoint", DEFAULT_SETPOINT),
        ("duration", DEFAULT_DURATION),
    ] {
        config.parameters.entry(name.to_string()).or_insert(value);
    }
    Ok(config)
}

fn build(config: EngineConfig) -> Result<Scheme> {
    let param = |name: &str| config.parameters.get(name).copied().unwrap_or_default();
    let (kp, ki, setpoint) = (param("kp"), param("ki"), param("setpoint"));

    let scheme = SchemeBuilder::new(config)
        .blocks([
            BlockSpec::Step { at: 0.5, value: setpoint, initial: 0.0 },
            BlockSpec::Summator { coeffs: vec![1.0, -1.0] },
            BlockSpec::Summator { coeffs: vec![kp] },
            BlockSpec::Integrator { k: ki, y0: 0.0 },
            BlockSpec::Summator { coeffs: vec![1.0, 1.0] },
            BlockSpec::Oscillatory { k: 1.0, t: 0.5, b: 0.3, y0: 0.0, dy0: 0.0 },
            BlockSpec::ExtOutSignal,
        ])
        .links(vec![
            BlockLink::new(SETPOINT, 0, ERROR, 0),
            BlockLink::new(PLANT, 0, ERROR, 1),
            BlockLink::new(ERROR, 0, GAIN, 0),
            BlockLink::new(ERROR, 0, INTEGRAL, 0),
            BlockLink::new(GAIN, 0, CONTROL, 0),
            BlockLink::new(INTEGRAL, 0, CONTROL, 1),
            BlockLink::new(CONTROL, 0, PLANT, 0),
            BlockLink::new(PLANT, 0, MONITOR, 0),
        ])
        .build()?;
    Ok(scheme)
}

/// Absolute output number of output 0 of `block`.
fn first_output(scheme: &Scheme, block: u32) -> Option<usize> {
    (0..scheme.port_index().output_count())
        .find(|&i| scheme.absolute_output(i).map(|o| o.block) == Some(BlockId(block)))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let out_dir = args.next().map_or_else(|| PathBuf::from(DEFAULT_OUTPUT), PathBuf::from);

    let config = load_config(config_path.as_deref())?;
    let mut scheme = build(config)?;
    let duration = scheme.parameter("duration")?.max(0.0) as u64;
    info!(
        blocks = scheme.block_count(),
        compute = ?scheme.compute_blocks(),
        "closed loop built"
    );

    std::fs::create_dir_all(&out_dir)?;
    std::fs::write(out_dir.join("scheme.c"), scheme.emit_source()?.to_string())?;

    let ports: Vec<usize> = [SETPOINT, CONTROL, PLANT]
        .into_iter()
        .filter_map(|b| first_output(&scheme, b))
        .collect();
    let writer = CsvTraceWriter::new(&out_dir)?;
    let mut obs = TraceObserver::new(writer, ports).with_stride(10);

    let t0 = Instant::now();
    let mut y = [0.0];
    println!("{:<8} {:<12}", "t [s]", "y");
    println!("{}", "-".repeat(20));
    for _ in 0..duration {
        scheme.compute_sync_observed(1, &mut obs)?;
        scheme.get_outputs(&mut y)?;
        println!("{:<8.2} {:<12.6}", scheme.time().as_secs(), y[0]);
    }
    obs.finish();
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        eprintln!("trace error: {e}");
    }
    println!();
    println!(
        "{} steps in {:.3} ms, trace in {}",
        scheme.step_count(),
        elapsed.as_secs_f64() * 1e3,
        out_dir.display()
    );
    Ok(())
}
