use std::path::PathBuf;

use clap::Args;
use fadewrite_core::simulation::script_from_gaps;
use fadewrite_core::{Config, Easing, Simulation, Step, TimeoutSeconds};

#[derive(Args)]
pub struct SimulateArgs {
    /// Decay timeout in seconds (1-30). Defaults to the config value.
    #[arg(long)]
    timeout: Option<u32>,
    /// Easing curve: linear, quadratic or cubic
    #[arg(long)]
    easing: Option<Easing>,
    /// Seconds between keystrokes; the last gap is a trailing pause
    #[arg(long, value_delimiter = ',', conflicts_with = "script")]
    gaps: Vec<f64>,
    /// Words typed one per keystroke, cycled
    #[arg(long, default_value = "word")]
    text: String,
    /// JSON file with a list of steps (start, type, wait, reset, set_timeout)
    #[arg(long)]
    script: Option<PathBuf>,
    /// Omit per-sample decay ticks from the output
    #[arg(long)]
    no_ticks: bool,
}

fn load_script(args: &SimulateArgs) -> Result<Vec<Step>, Box<dyn std::error::Error>> {
    if let Some(path) = &args.script {
        let content = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&content)?);
    }
    if args.gaps.is_empty() {
        return Err("either --gaps or --script is required".into());
    }
    if let Some(bad) = args.gaps.iter().find(|g| !g.is_finite() || **g < 0.0) {
        return Err(format!("gap {bad} is not a non-negative number of seconds").into());
    }
    let words: Vec<&str> = args.text.split_whitespace().collect();
    Ok(script_from_gaps(&args.gaps, &words))
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let timeout = match args.timeout {
        Some(secs) => TimeoutSeconds::new(secs)?,
        None => config.timeout(),
    };
    let easing = args.easing.unwrap_or_else(|| config.easing());
    let steps = load_script(&args)?;

    let mut sim =
        Simulation::new(timeout, easing).with_min_archive_words(config.history.min_words);
    let report = sim.run(&steps);

    for reason in &report.rejected {
        eprintln!("rejected: {reason}");
    }
    if args.no_ticks {
        for event in report.discrete() {
            println!("{}", serde_json::to_string(event)?);
        }
    } else {
        for event in &report.events {
            println!("{}", serde_json::to_string(event)?);
        }
    }
    Ok(())
}
