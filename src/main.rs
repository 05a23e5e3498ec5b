use anyhow::{Context, Result};
use clap::Parser;
use geostyle::{config, csv_reader, graph, parser, runtime, style};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "geostyle")]
#[command(about = "Classify attribute data, build color ramps and simplify paths", long_about = None)]
struct Args {
    /// Styling command, e.g. graduated(field: pop, method: "quantile", classes: 5)
    #[arg(value_name = "COMMAND")]
    command: String,

    #[arg(long = "png", help = "Write a PNG chart instead of a text report")]
    png: bool,

    #[arg(long = "width", default_value = "800", help = "Output width in pixels")]
    width: u32,

    #[arg(long = "height", default_value = "600", help = "Output height in pixels")]
    height: u32,

    #[arg(short = 't', long = "title", help = "Chart title")]
    title: Option<String>,

    #[arg(short = 'c', long = "config", help = "TOML file with default palette, classes, method and tolerance")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .try_init();

    let args = Args::parse();

    let (_, command) = parser::parse_command(&args.command)
        .map_err(|e| anyhow::anyhow!("Parse error: {:?}", e))?;

    let defaults = config::load(args.config.as_deref())?;

    let csv_data = if command.requires_data() {
        Some(csv_reader::read_csv_from_stdin().context("Failed to read CSV from stdin")?)
    } else {
        None
    };

    let report = runtime::execute(&command, csv_data.as_ref(), &defaults)
        .with_context(|| format!("Failed to run '{}'", command.name()))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if args.png {
        let graph_config = graph::GraphConfig {
            title: args.title,
            width: args.width,
            height: args.height,
            original_dash: style::parse_dash_array(&defaults.original_dash)
                .context("Invalid original_dash in config")?,
        };
        let png_bytes = graph::render_report(&report, &graph_config)
            .context("Failed to generate graph")?;
        handle
            .write_all(&png_bytes)
            .context("Failed to write PNG to stdout")?;
    } else {
        write!(handle, "{}", report).context("Failed to write report to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
