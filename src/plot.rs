use crate::{Metric, Series, SweepParameter};
use anyhow::Context;
use matplotlib::{Matplotlib, MatplotlibOpts, Mpl, Run, commands as c, serde_json::Value};
use std::path::Path;

const LINE_STYLES: [&str; 4] = ["-", "--", "-.", ":"];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HeadlessPrelude;

impl Matplotlib for HeadlessPrelude {
    fn is_prelude(&self) -> bool {
        true
    }

    fn data(&self) -> Option<Value> {
        None
    }

    fn py_cmd(&self) -> String {
        "\
import matplotlib
matplotlib.use(\"Agg\")
import matplotlib.pyplot as plt
"
        .into()
    }
}

/// Lines for every series; each distinct branch penalty gets its own line style
pub fn lines(series: &[Series], metric: Metric) -> Vec<c::Plot> {
    let mut penalties: Vec<f64> = vec![];
    series
        .iter()
        .map(|s| {
            let b = s
                .result
                .params
                .get(SweepParameter::BranchPenalty)
                .unwrap_or_default();
            let style = match penalties.iter().position(|p| *p == b) {
                Some(index) => index,
                None => {
                    penalties.push(b);
                    penalties.len() - 1
                }
            };
            c::plot(s.result.xs(), s.result.ys(metric))
                .o("label", s.label.as_str())
                .o("linestyle", LINE_STYLES[style % LINE_STYLES.len()])
        })
        .collect()
}

/// Title and axis labels of a plot
#[derive(Clone, Debug, PartialEq)]
pub struct Decorations {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
}

impl Decorations {
    /// Title, axis labels, legend and grid
    pub fn commands(&self) -> Mpl {
        Mpl::new()
            & c::title(&self.title)
            & c::xlabel(&self.xlabel)
            & c::ylabel(&self.ylabel)
            & c::legend().o("loc", "upper left").o("fontsize", "small")
            & c::grid(true)
    }
}

pub fn decorations(series: &[Series], metric: Metric) -> Decorations {
    let (parameter, title) = match series.first() {
        Some(s) => (s.result.parameter, s.result.params.title()),
        None => (SweepParameter::BranchProbability, "No Prediction"),
    };
    Decorations {
        title: format!("{} vs {} ({})", metric, parameter, title),
        xlabel: format!("{} ({})", parameter, parameter.description()),
        ylabel: metric.to_string(),
    }
}

/// The whole figure: one line per series plus decorations
pub fn figure(series: &[Series], metric: Metric) -> Mpl {
    let mut mpl = Mpl::new() & HeadlessPrelude & c::DefInit;
    for line in lines(series, metric) {
        mpl &= line;
    }
    mpl & decorations(series, metric).commands()
}

/// Render `metric` of every series against the swept parameter into a PNG
pub fn render<P: AsRef<Path>>(series: &[Series], metric: Metric, path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    figure(series, metric)
        .run(Run::Save(path.to_path_buf()))
        .with_context(|| format!("Failed to render {}", path.display()))?;
    Ok(())
}
