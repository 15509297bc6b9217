//! Leak page context generator.
//!
//! Usage: pagegen [OPTIONS]
//!
//! Options:
//!   -g, --generate       Print a default configuration file
//!   -c, --config <FILE>  Path to configuration file
//!   -h, --help           Print help information

use std::env;
use std::time::Duration;

use fontsift::{generate, ConfigFile, GenerationMode, LeakState, LeakStore, Settings};

const DEFAULT_FONT_PATH: &str = "fonts/probe.woff";

fn main() -> anyhow::Result<()> {
    // Initialize tracing; respects RUST_LOG env var (e.g. RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    match args[1].as_str() {
        "-h" | "--help" => {
            print_usage();
        }
        "-g" | "--generate" => {
            generate_config()?;
        }
        "-c" | "--config" => {
            if args.len() < 3 {
                eprintln!("Error: --config requires a file path");
                return Ok(());
            }
            run(&args[2], &args[3..])?;
        }
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
        }
    }

    Ok(())
}

fn print_usage() {
    println!(
        r#"pagegen - leak page context generator

USAGE:
    pagegen [OPTIONS]

OPTIONS:
    -g, --generate          Print a default configuration file
    -c, --config <FILE>     Path to configuration file
    -h, --help              Print help information

CONTEXT OPTIONS (after --config <FILE>):
    --mode <MODE>           single | staging | batched | animated (default: single)
    --step <N>              Step to encode (default: 0)
    --idx-max <N>           Meaningful positions / steps for batched and
                            animated pages (default: 1)
    --id <ID>               Session id (default: freshly minted)
    --font <PATH>           Probe font path (default: {DEFAULT_FONT_PATH})

EXAMPLES:
    Generate a configuration:
        pagegen --generate > leak.toml

    Print the first single-step context:
        pagegen --config leak.toml --mode single --step 0

    Print a self-advancing page covering eight steps:
        pagegen --config leak.toml --mode animated --idx-max 8
"#
    );
}

fn generate_config() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    let file = ConfigFile::from_parts(&settings, &Default::default());

    println!("# fontsift configuration");
    println!();
    println!("{}", toml::to_string_pretty(&file)?);

    Ok(())
}

struct ContextArgs {
    mode: String,
    step: usize,
    idx_max: usize,
    id: Option<String>,
    font_path: String,
}

fn parse_context_args(rest: &[String]) -> anyhow::Result<ContextArgs> {
    let mut parsed = ContextArgs {
        mode: "single".into(),
        step: 0,
        idx_max: 1,
        id: None,
        font_path: DEFAULT_FONT_PATH.into(),
    };

    let mut iter = rest.iter();
    while let Some(flag) = iter.next() {
        let mut value = || {
            iter.next()
                .ok_or_else(|| anyhow::anyhow!("{flag} requires a value"))
        };
        match flag.as_str() {
            "--mode" => parsed.mode = value()?.clone(),
            "--step" => parsed.step = value()?.parse()?,
            "--idx-max" => parsed.idx_max = value()?.parse()?,
            "--id" => parsed.id = Some(value()?.clone()),
            "--font" => parsed.font_path = value()?.clone(),
            other => anyhow::bail!("unknown option: {other}"),
        }
    }

    Ok(parsed)
}

fn run(config_path: &str, rest: &[String]) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(config_path)?;
    let file: ConfigFile = toml::from_str(&content)?;
    let (settings, setup) = file.to_parts()?;

    let args = parse_context_args(rest)?;

    let mode = match args.mode.as_str() {
        "single" => GenerationMode::SingleStep { step: args.step },
        "staging" => GenerationMode::Staging { step: args.step },
        "batched" => GenerationMode::Batched {
            step: args.step,
            idx_max: args.idx_max,
        },
        "animated" => GenerationMode::Animated {
            idx_max: args.idx_max,
        },
        other => anyhow::bail!("unknown mode: {other}"),
    };

    tracing::info!(
        "loaded setup: {} candidates, length {}, browser {}",
        setup.alphabet.len(),
        setup.length,
        setup.browser
    );

    let store = LeakStore::new(1024, Duration::from_secs(3600));
    let state = match args.id {
        Some(id) => store.insert(LeakState::new(id, setup, args.font_path)),
        None => store.create(setup, args.font_path),
    };
    tracing::info!("session {} at step {}", state.id, state.step);

    let context = generate(mode, &state, &settings)?;
    store.metrics().increment_pages_generated();

    println!("{}", serde_json::to_string_pretty(&context)?);

    Ok(())
}
