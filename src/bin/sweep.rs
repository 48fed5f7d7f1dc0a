//! Sweep one parameter and tabulate CPI and throughput
use clap::Parser;
use pipeline_throughput::{
    ParameterArgs, Part, SweepArgs, export_csv, export_json, print_table, run_sweep,
};
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

    /// Path to csv export
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Path to json export
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let mut config = args.params.load(args.part)?;
    args.sweep.apply(&mut config, args.part);
    let series = run_sweep(&config, args.part, args.sweep.all)?;

    for s in &series {
        println!(
            "{}: {} samples of {} in [{}, {}]",
            s.label,
            s.result.samples.len(),
            s.result.parameter,
            s.result.samples.first().map(|sample| sample.x).unwrap_or_default(),
            s.result.samples.last().map(|sample| sample.x).unwrap_or_default(),
        );
    }
    print_table(&series)?;

    if let Some(path) = &args.csv {
        export_csv(path, &series)?;
        println!("Table written to {}", path.display());
    }
    if let Some(path) = &args.json {
        export_json(path, &series)?;
        println!("Result written to {}", path.display());
    }

    Ok(())
}
