use std::path::PathBuf;

use clap::{Parser, Subcommand};
use core_llmx::{
    FilterRule, PipelineConfig, ReqwestTransport, common::logging::setup_logging, discover, preset_names,
    preset_rules, run_pipeline, validate_manifest,
};

#[derive(Parser)]
#[command(name = "llmx")]
#[command(about = "The llms.txt Generation Toolkit", long_about = None)]
struct LlmxCli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe a domain for its conventional sitemap locations
    Discover {
        /// The domain to probe (scheme optional, https assumed)
        #[arg(short, long)]
        domain: String,
    },

    /// Generate an llms.txt manifest from a website
    Generate {
        /// Domain or explicit sitemap URL to generate from
        #[arg(short, long)]
        target: String,

        /// Named preset rule set applied before any --include/--exclude
        #[arg(short, long)]
        preset: Option<String>,

        /// Regex pattern URLs must match (repeatable)
        #[arg(short, long)]
        include: Vec<String>,

        /// Regex pattern whose matches are dropped (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Maximum number of URLs carried through the pipeline
        #[arg(short, long)]
        max_urls: Option<usize>,

        /// Output file path for the generated llms.txt (stdout when omitted)
        #[arg(short, long, value_parser = validate_output_file)]
        output: Option<PathBuf>,
    },

    /// Validate that a file is a well-formed llms.txt
    Validate {
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn validate_output_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if path.exists() && path.is_dir() {
        return Err(format!("Output path is a directory: {}", path.display()));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        return Err(format!(
            "Output file parent directory does not exist: {}",
            parent.display()
        ));
    }

    Ok(path)
}

#[tokio::main]
async fn main() {
    setup_logging("info");

    let cli = LlmxCli::parse();

    match &cli.command {
        Commands::Discover { domain } => {
            let config = PipelineConfig::default();
            let transport = build_transport(&config);

            match discover(&transport, domain).await {
                Ok(found) if found.is_empty() => {
                    println!("No sitemap found for {domain}");
                    std::process::exit(1)
                }
                Ok(found) => {
                    for candidate in found {
                        println!("{candidate}");
                    }
                }
                Err(e) => {
                    println!("ERROR: Cannot probe {domain}: {e}");
                    std::process::exit(1)
                }
            }
        }

        Commands::Generate {
            target,
            preset,
            include,
            exclude,
            max_urls,
            output,
        } => {
            let mut rules: Vec<FilterRule> = Vec::new();
            if let Some(name) = preset {
                match preset_rules(name) {
                    Some(preset) => rules.extend(preset),
                    None => {
                        println!("Unknown preset '{}'. Available presets: {}", name, preset_names().join(", "));
                        std::process::exit(1)
                    }
                }
            }
            rules.extend(include.iter().map(|pattern| FilterRule::include(pattern.clone())));
            rules.extend(exclude.iter().map(|pattern| FilterRule::exclude(pattern.clone())));

            let mut builder = PipelineConfig::builder();
            if let Some(max_urls) = max_urls {
                builder = builder.max_urls(*max_urls);
            }
            let config = builder.build();
            let transport = build_transport(&config);

            match run_pipeline(&transport, target, &rules, &config).await {
                Ok(outcome) => {
                    match output {
                        Some(path) => {
                            if let Err(e) = std::fs::write(path, &outcome.manifest.full_text) {
                                println!("ERROR: Cannot write {path:?}: {e}");
                                std::process::exit(1)
                            }
                            println!("Wrote {} ({} URLs)", path.display(), outcome.entries.len());
                        }
                        None => println!("{}", outcome.manifest.full_text),
                    }

                    let summary = outcome.report.summary;
                    println!(
                        "AI readiness score: {}/100 ({} errors, {} warnings, {} info)",
                        outcome.report.score, summary.errors, summary.warnings, summary.info
                    );
                    for warning in &outcome.analysis.warnings {
                        println!("warning: {warning}");
                    }
                }
                Err(e) => {
                    println!("ERROR: {e}");
                    std::process::exit(1)
                }
            }
        }

        Commands::Validate { file } => match std::fs::read_to_string(file) {
            Ok(content) => {
                let check = validate_manifest(&content);
                if check.is_valid {
                    println!("Valid llms.txt file: {file:?}");
                } else {
                    println!("Invalid llms.txt file ({file:?}):");
                    for problem in &check.problems {
                        println!("  - {problem}");
                    }
                    std::process::exit(1)
                }
            }
            Err(e) => {
                println!("Cannot read file ({file:?}) due to: {e:?}");
                std::process::exit(1)
            }
        },
    }
}

fn build_transport(config: &PipelineConfig) -> ReqwestTransport {
    match ReqwestTransport::new(config) {
        Ok(transport) => transport,
        Err(e) => {
            println!("ERROR: Cannot build HTTP client: {e}");
            std::process::exit(1)
        }
    }
}
