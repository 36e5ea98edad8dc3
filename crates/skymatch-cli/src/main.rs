use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skymatch_core::SkyPosition;
use skymatch_data::{
    average_photometry, group_by_filter, FailurePolicy, PipelineConfig, RunManifest, SyntheticField,
    UnmatchedPolicy,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skymatch")]
#[command(about = "Cross-match repeated photometric catalogs and average per object")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match and merge every catalog of each filter band
    Group {
        /// Directory (or path prefix) holding the catalogs
        source: String,
        /// Object name used for output files, e.g. "M71"
        object: String,
        /// Filter bands, comma separated
        #[arg(long, value_delimiter = ',')]
        filters: Option<Vec<String>>,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Match radius (arcsec)
        #[arg(long)]
        radius: Option<f64>,
        /// Keep going when a band fails
        #[arg(long, default_value = "false")]
        keep_going: bool,
        /// Also write the averaged catalog of each merged band
        #[arg(long, default_value = "false")]
        average: bool,
        /// Leave DataNum 0 rows out of the averages
        #[arg(long, default_value = "false")]
        exclude_unmatched: bool,
        /// JSON pipeline configuration; flags override it
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the run manifest as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Average a merged catalog per DataNum into Avg<name>
    Average {
        /// Merged catalogs
        #[arg(required = true)]
        merged: Vec<PathBuf>,
        /// Leave DataNum 0 rows out of the averages
        #[arg(long, default_value = "false")]
        exclude_unmatched: bool,
    },

    /// Generate a synthetic multi-exposure star field
    Synthetic {
        #[arg(short, long, default_value = "data/synthetic")]
        output: PathBuf,
        /// File name prefix
        #[arg(long, default_value = "SYN")]
        prefix: String,
        #[arg(long, default_value = "200")]
        stars: usize,
        #[arg(long, default_value = "4")]
        exposures: usize,
        #[arg(long, value_delimiter = ',', default_value = "I,R,V,B")]
        filters: Vec<String>,
        /// Field center RA (degrees)
        #[arg(long, default_value = "298.4438")]
        ra: f64,
        /// Field center Dec (degrees)
        #[arg(long, default_value = "18.7792")]
        dec: f64,
        /// Per-axis position jitter (arcsec)
        #[arg(long, default_value = "0.3")]
        jitter: f64,
        /// Probability a star is missing from an exposure
        #[arg(long, default_value = "0.05")]
        dropout: f64,
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Print the default pipeline configuration as JSON
    DefaultConfig,
}

fn unmatched_policy(exclude: bool) -> UnmatchedPolicy {
    if exclude {
        UnmatchedPolicy::Exclude
    } else {
        UnmatchedPolicy::Include
    }
}

fn print_manifest(manifest: &RunManifest) {
    println!("\n{} ({} of {} bands)", manifest.object, manifest.succeeded(), manifest.bands.len());
    for band in &manifest.bands {
        match &band.error {
            Some(err) => println!("  {}: FAILED ({})", band.filter, err),
            None => println!(
                "  {}: {} files, {} rows, {} matched, reference {}",
                band.filter,
                band.inputs.len(),
                band.rows,
                band.matched_rows,
                band.reference.as_deref().unwrap_or("-")
            ),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Group {
            source,
            object,
            filters,
            output,
            radius,
            keep_going,
            average,
            exclude_unmatched,
            config,
            json,
        } => {
            let mut pipeline_config = match &config {
                Some(path) => PipelineConfig::load(path)
                    .with_context(|| format!("Failed to load config: {}", path.display()))?,
                None => PipelineConfig::default(),
            };
            if let Some(filters) = filters {
                pipeline_config.filters = filters;
            }
            if let Some(output) = output {
                pipeline_config.target_dir = output;
            }
            if let Some(radius) = radius {
                pipeline_config.match_radius_arcsec = radius;
            }
            if keep_going {
                pipeline_config.failure_policy = FailurePolicy::Continue;
            }
            if exclude_unmatched {
                pipeline_config.unmatched = UnmatchedPolicy::Exclude;
            }
            let unmatched = pipeline_config.unmatched;
            tracing::info!("Grouping {} from {} ({:?})", object, source, pipeline_config.filters);

            let manifest = group_by_filter(&source, &object, pipeline_config)
                .with_context(|| format!("Grouping {} from {} failed", object, source))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            } else {
                print_manifest(&manifest);
            }

            if average {
                for output in manifest.bands.iter().filter_map(|b| b.output.as_ref()) {
                    let averaged = average_photometry(output, unmatched)
                        .with_context(|| format!("Averaging failed: {}", output.display()))?;
                    println!("  averaged -> {}", averaged.display());
                }
            }
        }

        Commands::Average {
            merged,
            exclude_unmatched,
        } => {
            let policy = unmatched_policy(exclude_unmatched);
            for path in merged {
                let averaged = average_photometry(&path, policy)
                    .with_context(|| format!("Averaging failed: {}", path.display()))?;
                println!("{} -> {}", path.display(), averaged.display());
            }
        }

        Commands::Synthetic {
            output,
            prefix,
            stars,
            exposures,
            filters,
            ra,
            dec,
            jitter,
            dropout,
            seed,
        } => {
            let center = SkyPosition::new(ra, dec);
            if !center.is_valid() {
                anyhow::bail!("Field center out of range: RA {} Dec {}", ra, dec);
            }
            if !(0.0..1.0).contains(&dropout) {
                anyhow::bail!("Dropout must be in [0, 1): {}", dropout);
            }

            let field = SyntheticField {
                stars,
                exposures,
                center,
                jitter_arcsec: jitter,
                dropout,
                seed,
                ..Default::default()
            };
            let written = field.write(&output, &prefix, &filters)?;

            println!("Generated {} catalogs in {}", written.len(), output.display());
            println!("  {} stars x {} exposures x {} filters", stars, exposures, filters.len());
            println!("\nNext: skymatch group {} {}", output.display(), prefix);
        }

        Commands::DefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&PipelineConfig::default())?);
        }
    }

    Ok(())
}
