//! Plot CPI or throughput against the swept parameter
use clap::Parser;
use pipeline_throughput::{Metric, ParameterArgs, Part, SweepArgs, render, run_sweep};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Part A (no prediction) or part B (with prediction)
    #[arg(short, long, value_enum, default_value = "a")]
    part: Part,

    #[command(flatten)]
    params: ParameterArgs,

    #[command(flatten)]
    sweep: SweepArgs,

    /// Quantity on the y-axis
    #[arg(short, long, value_enum, default_value = "throughput")]
    metric: Metric,

    /// Plot the other metric as well, to {output}-cpi.png and {output}-throughput.png
    #[arg(short, long)]
    both: bool,

    /// Path to png output, or its prefix with --both
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let mut config = args.params.load(args.part)?;
    args.sweep.apply(&mut config, args.part);
    let series = run_sweep(&config, args.part, args.sweep.all)?;

    if args.both {
        for metric in [args.metric, args.metric.toggle()] {
            let path = format!(
                "{}-{}.png",
                args.output.display(),
                metric.to_string().to_lowercase()
            );
            render(&series, metric, &path)?;
            println!("Visualization generated to {}", path);
        }
    } else {
        render(&series, args.metric, &args.output)?;
        println!("Visualization generated to {}", args.output.display());
    }

    Ok(())
}
