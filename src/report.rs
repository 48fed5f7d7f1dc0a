use crate::{Series, SweepParameter, ValidationError};
use chrono::{DateTime, Local};
use cli_table::{Cell, Table, print_stdout};
use log::info;
use serde::Serialize;
use std::{fs::File, io::Write, path::Path};

/// One table/export row, derived from a sample of a sweep
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub series: String,
    #[serde(rename = "Pb")]
    pub pb: f64,
    #[serde(rename = "Pt")]
    pub pt: f64,
    pub b: f64,
    #[serde(rename = "Pc")]
    pub pc: Option<f64>,
    pub c: Option<f64>,
    #[serde(rename = "CPI")]
    pub cpi: f64,
    #[serde(rename = "Throughput")]
    pub throughput: f64,
}

/// Flatten every series into rows, series after series
pub fn rows(series: &[Series]) -> Result<Vec<Row>, ValidationError> {
    let mut rows = vec![];
    for s in series {
        for point in s.result.points() {
            let (params, sample) = point?;
            let optional = |parameter: SweepParameter| params.get(parameter).ok();
            rows.push(Row {
                series: s.label.clone(),
                pb: params.get(SweepParameter::BranchProbability)?,
                pt: params.get(SweepParameter::TakenProbability)?,
                b: params.get(SweepParameter::BranchPenalty)?,
                pc: optional(SweepParameter::PredictionAccuracy),
                c: optional(SweepParameter::ReducedPenalty),
                cpi: sample.cpi,
                throughput: sample.throughput,
            });
        }
    }
    Ok(rows)
}

fn format_param(parameter: SweepParameter, value: f64) -> String {
    if parameter.is_probability() {
        format!("{:.3}", value)
    } else {
        format!("{}", value)
    }
}

/// Header and body of the terminal table, values rounded to 3 decimals
pub fn table_cells(series: &[Series]) -> Result<(Vec<String>, Vec<Vec<String>>), ValidationError> {
    let Some(first) = series.first() else {
        return Ok((vec![], vec![]));
    };
    let parameters = first.result.params.parameters();

    let mut header: Vec<String> = parameters.iter().map(|p| p.to_string()).collect();
    header.push("CPI".to_string());
    header.push("Throughput".to_string());

    let mut body = vec![];
    for s in series {
        for point in s.result.points() {
            let (params, sample) = point?;
            let mut line = vec![];
            for parameter in parameters {
                line.push(format_param(*parameter, params.get(*parameter)?));
            }
            line.push(format!("{:.3}", sample.cpi));
            line.push(format!("{:.3}", sample.throughput));
            body.push(line);
        }
    }
    Ok((header, body))
}

pub fn print_table(series: &[Series]) -> anyhow::Result<()> {
    let (header, body) = table_cells(series)?;
    let table = body
        .into_iter()
        .map(|line| line.into_iter().map(|value| value.cell()).collect::<Vec<_>>())
        .collect::<Vec<_>>()
        .table()
        .title(header.into_iter().map(|name| name.cell()).collect::<Vec<_>>());
    print_stdout(table)?;
    Ok(())
}

pub fn write_csv<W: Write>(writer: W, series: &[Series]) -> anyhow::Result<usize> {
    let rows = rows(series)?;
    let mut wtr = csv::Writer::from_writer(writer);
    for row in &rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

/// Spreadsheet-compatible export, full precision
pub fn export_csv<P: AsRef<Path>>(path: P, series: &[Series]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let count = write_csv(File::create(path)?, series)?;
    info!("Wrote {} rows to {}", count, path.display());
    Ok(())
}

#[derive(Serialize)]
pub struct Report<'a> {
    pub generated_at: DateTime<Local>,
    pub title: String,
    pub series: &'a [Series],
}

impl<'a> Report<'a> {
    pub fn new(series: &'a [Series]) -> Self {
        let title = series
            .first()
            .map(|s| format!("{} sweep ({})", s.result.parameter, s.result.params.title()))
            .unwrap_or_default();
        Report {
            generated_at: Local::now(),
            title,
            series,
        }
    }
}

pub fn export_json<P: AsRef<Path>>(path: P, series: &[Series]) -> anyhow::Result<()> {
    let path = path.as_ref();
    std::fs::write(path, serde_json::to_vec_pretty(&Report::new(series))?)?;
    info!("Result written to {}", path.display());
    Ok(())
}
