use anyhow::{Context, Result};
use clap::Parser;
use dominant_colors::{InitialSelection, Options, cluster_image};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Print the dominant colors of images, most prominent first.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Number of colors to extract
    #[arg(short = 'k', long, default_value_t = 5)]
    count: usize,

    /// Sample one pixel every N pixels (0 = longer side reduced to ~64 samples)
    #[arg(short, long)]
    sampling: Option<u32>,

    /// Only report colors that occur in the image
    #[arg(short, long)]
    exact: bool,

    /// Pick initial centroids at random instead of uniformly
    #[arg(long)]
    random: bool,

    /// Seed for --random, makes the output reproducible
    #[arg(long, requires = "random")]
    seed: Option<u64>,

    /// Upper bound on K-means iterations
    #[arg(long)]
    max_iterations: Option<usize>,

    /// JSON file with extraction options; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn options(&self) -> Result<Options> {
        let mut options = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => Options::default(),
        };

        if let Some(interval) = self.sampling {
            options.sampling_interval = interval;
        }
        if self.exact {
            options.exact_match = true;
        }
        if self.random {
            options.initial_selection = InitialSelection::Random { seed: self.seed };
        }
        if let Some(max) = self.max_iterations {
            options.max_iterations = max;
        }
        Ok(options)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dominant_colors=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let options = args.options()?;
    tracing::debug!(?options, "Resolved options");

    let mut reports = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        let img = image::open(input).with_context(|| format!("opening {}", input.display()))?;
        let clustering = cluster_image(&img, args.count, &options)
            .with_context(|| format!("extracting colors from {}", input.display()))?;

        if args.json {
            let colors: Vec<_> = clustering
                .colors
                .iter()
                .zip(&clustering.counts)
                .map(|(color, pixels)| {
                    json!({
                        "hex": color.hex(),
                        "rgb": color.rgb(),
                        "pixels": pixels,
                    })
                })
                .collect();
            reports.push(json!({
                "file": input.display().to_string(),
                "colors": colors,
                "iterations": clustering.iterations,
                "status": clustering.status,
            }));
        } else {
            let hexes: Vec<String> = clustering.colors.iter().map(|c| c.hex()).collect();
            println!("{}: {}", input.display(), hexes.join(" "));
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}
