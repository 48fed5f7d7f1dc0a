//! Compute CPI and throughput for a single set of parameters
use clap::Parser;
use cli_table::{Cell, Table, print_stdout};
use log::info;
use pipeline_throughput::{ParameterArgs, Part};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Part A (no prediction) or part B (with prediction)
    #[arg(short, long, value_enum, default_value = "a")]
    part: Part,

    #[command(flatten)]
    params: ParameterArgs,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let config = args.params.load(args.part)?;
    let params = config.params(args.part)?;
    info!("Evaluating {:?}", params);

    let mut table = vec![];
    for parameter in params.parameters() {
        table.push(vec![
            format!("{} ({})", parameter, parameter.description()).cell(),
            format!("{}", params.get(*parameter)?).cell(),
        ]);
    }
    table.push(vec!["Base CPI".cell(), format!("{}", params.base_cpi()).cell()]);
    table.push(vec!["CPI".cell(), format!("{:.4}", params.cpi()).cell()]);
    table.push(vec![
        "Throughput".cell(),
        format!("{:.4}", params.throughput()).cell(),
    ]);

    println!("{}:", params.title());
    let table = table.table().title(vec!["Quantity".cell(), "Value".cell()]);
    print_stdout(table)?;

    Ok(())
}
