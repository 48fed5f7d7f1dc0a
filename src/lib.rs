mod cli;
mod config;
mod error;
mod model;
mod plot;
mod report;
mod sweep;

pub use cli::*;
pub use config::*;
pub use error::*;
pub use model::*;
pub use plot::*;
pub use report::*;
pub use sweep::*;

/// Run the configured sweep of `part`, with or without its series axes
pub fn run_sweep(config: &CalculatorConfig, part: Part, all: bool) -> anyhow::Result<Vec<Series>> {
    let params = config.params(part)?;
    let model = config.model(part);
    let range = model.sweep.range.range()?;
    let axes = if all { model.axes()? } else { vec![] };
    Ok(sweep_grid(&params, model.sweep.parameter, &range, &axes)?)
}
