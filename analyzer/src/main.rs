use anyhow::Context;
use clap::Parser;
use generator::demo::demo_model;
use generator::random::{random_model, GeneratorConfig};
use log::info;
use std::fs;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Demographic analyses over matrix population models")]
struct Args {
    /// Load models and analyses from a YAML workflow
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Analyse the built-in five-stage perennial plant model
    #[arg(long, default_value_t = false)]
    demo: bool,
    /// Stage count of the generated model when no workflow is given
    #[arg(long, default_value_t = 5)]
    stages: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Starting stage (0-based) for age-based analyses
    #[arg(long, default_value_t = 0)]
    start: usize,
    #[arg(long, default_value_t = 1000)]
    xmax: usize,
    #[arg(long, default_value_t = 0.01)]
    lx_crit: f64,
    /// Write the JSON report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        let model = if args.demo {
            demo_model()
        } else {
            random_model(&GeneratorConfig {
                stages: args.stages,
                seed: args.seed,
                ..Default::default()
            })
        };
        WorkflowConfig::from_args(args.start, args.xmax, args.lx_crit, vec![model])
    };

    let runner = Runner::new(workflow_config);
    let result = runner.execute()?;
    info!(
        "analysed {} models: {} analyses completed, {} failed",
        result.metrics.models, result.metrics.completed, result.metrics.failed
    );

    let report = serde_json::to_string_pretty(&result).context("serializing report")?;
    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            fs::write(&path, report).with_context(|| format!("writing {}", path.display()))?;
            println!(
                "Report for {} models written to {}",
                result.reports.len(),
                path.display()
            );
        }
        None => println!("{}", report),
    }

    Ok(())
}
