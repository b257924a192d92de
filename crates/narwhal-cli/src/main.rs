use narwhal::{
    LayoutConfig, ManualTicker, Planner, ScreenViewport, Snapshot, StepOutcome, TickSource,
};
use serde::Serialize;
use std::io::Read;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "NARWHAL_LOG";
const DEFAULT_MAX_TICKS: usize = 10_000;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Layout(narwhal::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<narwhal::Error> for CliError {
    fn from(value: narwhal::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Default)]
struct Args {
    pretty: bool,
    config: Option<String>,
    viewport_width: f64,
    viewport_height: f64,
    max_ticks: usize,
    input: Option<String>,
}

#[derive(Serialize)]
struct LayoutOut {
    converged: bool,
    ticks: u64,
    preview: bool,
    snapshot: Snapshot,
}

fn usage() -> &'static str {
    "narwhal-cli\n\
\n\
USAGE:\n\
  narwhal-cli [--pretty] [--config <path>] [--viewport-width <w>] [--viewport-height <h>] [--max-ticks <n>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', relation text is read from stdin.\n\
  - Each input line is one relation, `Left => Right`; other lines are ignored.\n\
  - --config reads a JSON layout config; missing keys keep their defaults.\n\
  - Prints {\"converged\", \"ticks\", \"preview\", \"snapshot\"} as JSON.\n\
  - In preview mode the seeded layout is printed without running the solver.\n\
  - Log verbosity follows the NARWHAL_LOG env var (default: warn).\n\
"
}

fn parse_positive(value: &str) -> Result<f64, CliError> {
    let v = value.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if !(v.is_finite() && v > 0.0) {
        return Err(CliError::Usage(usage()));
    }
    Ok(v)
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        viewport_width: 800.0,
        viewport_height: 600.0,
        max_ticks: DEFAULT_MAX_TICKS,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--pretty" => args.pretty = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--viewport-width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.viewport_width = parse_positive(w)?;
            }
            "--viewport-height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.viewport_height = parse_positive(h)?;
            }
            "--max-ticks" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.max_ticks = n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn load_config(path: Option<&str>) -> Result<LayoutConfig, CliError> {
    match path {
        None => Ok(LayoutConfig::default()),
        Some(path) => Ok(LayoutConfig::from_json_str(&std::fs::read_to_string(path)?)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let text = read_input(args.input.as_deref())?;
    let preview = config.preview;

    let ticker = ManualTicker::new();
    let ticks: Rc<dyn TickSource> = Rc::new(ticker.clone());
    let viewport = ScreenViewport::new(args.viewport_width, args.viewport_height);
    let mut planner = Planner::new(config, ticks, Box::new(viewport))?;

    let report = planner.set_relations(&text);
    tracing::debug!(rooms = report.added.len(), "relations loaded");

    let delivered = ticker.run(args.max_ticks) as u64;
    let (converged, ticks) = match planner.last_outcome() {
        Some(StepOutcome::Converged { ticks }) => (true, ticks),
        Some(StepOutcome::Empty) => (true, 0),
        Some(StepOutcome::Continue) => (false, delivered),
        // No tick ran (preview mode or `--max-ticks 0`): judge the seeded layout as is.
        None => {
            let settled = planner.settle(0);
            (settled.converged, settled.ticks)
        }
    };
    if !converged && planner.is_running() {
        tracing::warn!(max_ticks = args.max_ticks, "layout did not settle");
    }

    let out = LayoutOut {
        converged,
        ticks,
        preview,
        snapshot: planner.snapshot(),
    };
    planner.teardown();
    write_json(&out, args.pretty)
}

fn main() {
    init_logging();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
