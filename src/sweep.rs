use crate::{ParameterSet, SweepParameter, ValidationError};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on the number of values in one sweep
pub const MAX_SAMPLES: usize = 100_000;

/// Inclusive, linearly spaced range of `count` values
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepRange {
    start: f64,
    end: f64,
    count: usize,
}

impl SweepRange {
    pub fn new(start: f64, end: f64, count: usize) -> Result<Self, ValidationError> {
        if count < 2 {
            return Err(ValidationError::TooFewSamples { count });
        }
        if count > MAX_SAMPLES {
            return Err(ValidationError::TooManySamples { count });
        }
        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(ValidationError::DegenerateRange { start, end });
        }
        let range = Self { start, end, count };
        // too narrow for `count` distinct floats
        if !range.values().zip(range.values().skip(1)).all(|(a, b)| a < b) {
            return Err(ValidationError::DegenerateRange { start, end });
        }
        Ok(range)
    }

    /// Range stepping from `start` by `resolution` up to and including `end`.
    /// A trailing partial step is absorbed by spacing the points evenly.
    pub fn with_resolution(start: f64, end: f64, resolution: f64) -> Result<Self, ValidationError> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(ValidationError::NonPositiveResolution { resolution });
        }
        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(ValidationError::DegenerateRange { start, end });
        }
        // tolerate representation error, e.g. (0.3 - 0.2) / 0.01 = 9.999999999999998
        let steps = ((end - start) / resolution - 1e-9).ceil().max(1.0);
        if steps >= MAX_SAMPLES as f64 {
            return Err(ValidationError::TooManySamples {
                count: (steps as usize).saturating_add(1),
            });
        }
        Self::new(start, end, steps as usize + 1)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        let last = self.count - 1;
        (0..self.count).map(move |i| {
            if i == last {
                self.end
            } else {
                self.start + (self.end - self.start) * i as f64 / last as f64
            }
        })
    }
}

/// One point of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// value of the swept parameter
    pub x: f64,
    pub cpi: f64,
    pub throughput: f64,
}

/// Which quantity is plotted on the y-axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Metric {
    #[serde(rename = "CPI")]
    #[value(name = "cpi")]
    Cpi,
    #[default]
    Throughput,
}

impl Metric {
    pub fn of(&self, sample: &Sample) -> f64 {
        match self {
            Metric::Cpi => sample.cpi,
            Metric::Throughput => sample.throughput,
        }
    }

    pub fn toggle(&self) -> Metric {
        match self {
            Metric::Cpi => Metric::Throughput,
            Metric::Throughput => Metric::Cpi,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Cpi => f.write_str("CPI"),
            Metric::Throughput => f.write_str("Throughput"),
        }
    }
}

/// Samples of one parameter swept while the others stay at `params`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepResult {
    pub parameter: SweepParameter,
    pub params: ParameterSet,
    pub samples: Vec<Sample>,
}

impl SweepResult {
    /// The full parameter set behind each sample
    pub fn points(
        &self,
    ) -> impl Iterator<Item = Result<(ParameterSet, &Sample), ValidationError>> + '_ {
        self.samples.iter().map(|sample| {
            self.params
                .with(self.parameter, sample.x)
                .map(|params| (params, sample))
        })
    }

    pub fn xs(&self) -> Vec<f64> {
        self.samples.iter().map(|sample| sample.x).collect()
    }

    pub fn ys(&self, metric: Metric) -> Vec<f64> {
        self.samples.iter().map(|sample| metric.of(sample)).collect()
    }
}

fn check_applicable(params: &ParameterSet, parameter: SweepParameter) -> Result<(), ValidationError> {
    if parameter.needs_prediction() && matches!(params, ParameterSet::NoPrediction(_)) {
        return Err(ValidationError::NotApplicable { parameter });
    }
    Ok(())
}

/// Evaluate the model at every value of `range` for `parameter`
pub fn sweep(
    params: &ParameterSet,
    parameter: SweepParameter,
    range: &SweepRange,
) -> Result<SweepResult, ValidationError> {
    check_applicable(params, parameter)?;
    // both ends inside the domain implies every point in between is
    parameter.validate(range.start)?;
    parameter.validate(range.end)?;

    let mut samples = Vec::with_capacity(range.count);
    for x in range.values() {
        let point = params.with(parameter, x).map_err(|e| e.at(parameter, x))?;
        samples.push(Sample {
            x,
            cpi: point.cpi(),
            throughput: point.throughput(),
        });
    }

    Ok(SweepResult {
        parameter,
        params: *params,
        samples,
    })
}

/// Extra parameter varied across series, e.g. one line per branch penalty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesAxis {
    pub parameter: SweepParameter,
    pub values: Vec<f64>,
}

impl SeriesAxis {
    pub fn new(parameter: SweepParameter, values: Vec<f64>) -> Self {
        Self { parameter, values }
    }

    /// Axis over every value of a range
    pub fn from_range(parameter: SweepParameter, range: &SweepRange) -> Self {
        Self {
            parameter,
            values: range.values().collect(),
        }
    }
}

/// A labelled sweep, one line of a plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub result: SweepResult,
}

fn format_value(parameter: SweepParameter, value: f64) -> String {
    if parameter.is_probability() {
        format!("{}={:.2}", parameter, value)
    } else {
        format!("{}={}", parameter, value)
    }
}

/// Sweep `parameter` once per combination of axis values, first axis outermost
pub fn sweep_grid(
    params: &ParameterSet,
    parameter: SweepParameter,
    range: &SweepRange,
    axes: &[SeriesAxis],
) -> Result<Vec<Series>, ValidationError> {
    for (i, axis) in axes.iter().enumerate() {
        if axis.parameter == parameter || axes[..i].iter().any(|a| a.parameter == axis.parameter) {
            return Err(ValidationError::DuplicateAxis {
                parameter: axis.parameter,
            });
        }
        check_applicable(params, axis.parameter)?;
    }

    let mut combinations: Vec<(ParameterSet, Vec<String>)> = vec![(*params, vec![])];
    for axis in axes {
        let mut next = Vec::with_capacity(combinations.len() * axis.values.len());
        for (base, labels) in &combinations {
            for value in &axis.values {
                let mut labels = labels.clone();
                labels.push(format_value(axis.parameter, *value));
                let point = base
                    .with(axis.parameter, *value)
                    .map_err(|e| e.at(axis.parameter, *value))?;
                next.push((point, labels));
            }
        }
        combinations = next;
    }

    let mut series = vec![];
    for (base, labels) in combinations {
        // label the fixed parameters when there is nothing varied
        let label = if labels.is_empty() {
            base.parameters()
                .iter()
                .filter(|p| **p != parameter)
                .map(|p| base.get(*p).map(|v| format_value(*p, v)))
                .collect::<Result<Vec<_>, _>>()?
                .join(", ")
        } else {
            labels.join(", ")
        };
        series.push(Series {
            label,
            result: sweep(&base, parameter, range)?,
        });
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoPrediction, WithPrediction};

    fn part_a() -> ParameterSet {
        NoPrediction::new(1.0, 0.2, 0.6, 3.0).unwrap().into()
    }

    fn part_b() -> ParameterSet {
        WithPrediction::new(1.0, 0.25, 0.6, 0.9, 4.0, 1.0)
            .unwrap()
            .into()
    }

    #[test]
    fn test_sweep_spacing() {
        let range = SweepRange::new(0.2, 0.3, 11).unwrap();
        let result = sweep(&part_a(), SweepParameter::BranchProbability, &range).unwrap();
        assert_eq!(result.samples.len(), 11);
        assert_eq!(result.samples[0].x, 0.2);
        assert_eq!(result.samples[10].x, 0.3);
        for pair in result.samples.windows(2) {
            assert!(pair[1].x > pair[0].x);
            assert!(((pair[1].x - pair[0].x) - 0.01).abs() < 1e-9);
        }
        for sample in &result.samples {
            let expected = 1.0 + sample.x * 0.6 * 3.0;
            assert!((sample.cpi - expected).abs() < 1e-9);
            assert!((sample.throughput - 1.0 / expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sweep_deterministic() {
        let range = SweepRange::new(0.4, 0.8, 5).unwrap();
        let first = sweep(&part_b(), SweepParameter::PredictionAccuracy, &range).unwrap();
        let second = sweep(&part_b(), SweepParameter::PredictionAccuracy, &range).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sweep_penalty_is_unbounded_above() {
        let range = SweepRange::new(0.0, 10.0, 3).unwrap();
        let result = sweep(&part_a(), SweepParameter::BranchPenalty, &range).unwrap();
        assert_eq!(result.xs(), vec![0.0, 5.0, 10.0]);
        assert_eq!(result.samples[0].cpi, 1.0);
    }

    #[test]
    fn test_sweep_rejects_invalid() {
        assert_eq!(
            SweepRange::new(0.2, 0.3, 1),
            Err(ValidationError::TooFewSamples { count: 1 })
        );
        assert_eq!(
            SweepRange::new(0.8, 0.2, 5),
            Err(ValidationError::DegenerateRange {
                start: 0.8,
                end: 0.2
            })
        );
        assert!(SweepRange::new(0.5, 0.5, 5).is_err());
        assert!(SweepRange::new(0.0, f64::INFINITY, 5).is_err());

        let range = SweepRange::new(0.5, 1.2, 8).unwrap();
        assert!(matches!(
            sweep(&part_a(), SweepParameter::TakenProbability, &range),
            Err(ValidationError::ProbabilityOutOfRange { name: "Pt", .. })
        ));
        let range = SweepRange::new(-0.1, 0.5, 7).unwrap();
        assert!(sweep(&part_a(), SweepParameter::BranchProbability, &range).is_err());
        let range = SweepRange::new(-1.0, 3.0, 5).unwrap();
        assert!(sweep(&part_a(), SweepParameter::BranchPenalty, &range).is_err());

        let range = SweepRange::new(0.4, 0.8, 5).unwrap();
        assert_eq!(
            sweep(&part_a(), SweepParameter::PredictionAccuracy, &range),
            Err(ValidationError::NotApplicable {
                parameter: SweepParameter::PredictionAccuracy
            })
        );
    }

    #[test]
    fn test_resolution() {
        let range = SweepRange::with_resolution(0.2, 0.3, 0.01).unwrap();
        assert_eq!(range.count(), 11);
        let range = SweepRange::with_resolution(0.4, 0.8, 0.1).unwrap();
        assert_eq!(range.count(), 5);
        let range = SweepRange::with_resolution(0.5, 0.7, 0.1).unwrap();
        assert_eq!(range.count(), 3);
        // 0.0, 0.3, 0.6, 0.9 plus a partial step to 1.0
        let range = SweepRange::with_resolution(0.0, 1.0, 0.3).unwrap();
        assert_eq!(range.count(), 5);
        // a step larger than the range still yields both ends
        let range = SweepRange::with_resolution(0.2, 0.3, 0.5).unwrap();
        assert_eq!(range.values().collect::<Vec<_>>(), vec![0.2, 0.3]);
        assert!(SweepRange::with_resolution(0.2, 0.3, 0.0).is_err());
    }

    #[test]
    fn test_sample_count_is_bounded() {
        assert_eq!(
            SweepRange::with_resolution(0.0, 1.0, 1e-300),
            Err(ValidationError::TooManySamples { count: usize::MAX })
        );
        assert!(matches!(
            SweepRange::with_resolution(0.0, 1.0, 1e-12),
            Err(ValidationError::TooManySamples { .. })
        ));
        assert!(matches!(
            SweepRange::with_resolution(-1e308, 1e308, 1.0),
            Err(ValidationError::TooManySamples { .. })
        ));
        assert_eq!(
            SweepRange::new(0.0, 1.0, usize::MAX),
            Err(ValidationError::TooManySamples { count: usize::MAX })
        );
        let range = SweepRange::new(0.0, 1.0, MAX_SAMPLES).unwrap();
        assert_eq!(range.values().count(), MAX_SAMPLES);
    }

    #[test]
    fn test_values_strictly_increase() {
        let end = 1.0 + 4.0 * f64::EPSILON;
        assert_eq!(
            SweepRange::new(1.0, end, 10),
            Err(ValidationError::DegenerateRange { start: 1.0, end })
        );
        let range = SweepRange::new(1.0, end, 5).unwrap();
        let values: Vec<f64> = range.values().collect();
        assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(values[4], end);
    }

    #[test]
    fn test_invalid_point_names_the_value() {
        let params = part_b();
        let range = SweepRange::new(0.0, 4.0, 5).unwrap();
        let err = sweep(&params, SweepParameter::BranchPenalty, &range).unwrap_err();
        assert_eq!(
            err,
            ValidationError::PenaltyNotReduced { c: 1.0, b: 0.0 }
                .at(SweepParameter::BranchPenalty, 0.0)
        );
        assert_eq!(
            err.to_string(),
            "at b=0: reduced penalty c=1 must not exceed branch penalty b=0"
        );
    }

    #[test]
    fn test_metric_toggle() {
        let sample = Sample {
            x: 0.2,
            cpi: 1.25,
            throughput: 0.8,
        };
        assert_eq!(Metric::default(), Metric::Throughput);
        assert_eq!(Metric::Throughput.toggle(), Metric::Cpi);
        assert_eq!(Metric::Cpi.of(&sample), 1.25);
        assert_eq!(Metric::Cpi.toggle().of(&sample), 0.8);
        assert_eq!(Metric::Cpi.to_string(), "CPI");
    }

    #[test]
    fn test_points_rebuild_parameters() {
        let range = SweepRange::new(0.4, 0.8, 5).unwrap();
        let result = sweep(&part_b(), SweepParameter::PredictionAccuracy, &range).unwrap();
        for point in result.points() {
            let (params, sample) = point.unwrap();
            assert_eq!(params.get(SweepParameter::PredictionAccuracy), Ok(sample.x));
            assert_eq!(params.cpi(), sample.cpi);
        }
    }

    #[test]
    fn test_grid_order_and_labels() {
        let range = SweepRange::new(0.2, 0.3, 11).unwrap();
        let axes = [
            SeriesAxis::new(SweepParameter::BranchPenalty, vec![3.0, 4.0]),
            SeriesAxis::from_range(
                SweepParameter::TakenProbability,
                &SweepRange::new(0.5, 0.7, 3).unwrap(),
            ),
        ];
        let series =
            sweep_grid(&part_a(), SweepParameter::BranchProbability, &range, &axes).unwrap();
        let labels: Vec<&str> = series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "b=3, Pt=0.50",
                "b=3, Pt=0.60",
                "b=3, Pt=0.70",
                "b=4, Pt=0.50",
                "b=4, Pt=0.60",
                "b=4, Pt=0.70",
            ]
        );
        assert!(series.iter().all(|s| s.result.samples.len() == 11));
        assert_eq!(
            series[4].result.params.get(SweepParameter::BranchPenalty),
            Ok(4.0)
        );
    }

    #[test]
    fn test_grid_without_axes_labels_fixed_values() {
        let range = SweepRange::new(0.4, 0.8, 5).unwrap();
        let series =
            sweep_grid(&part_b(), SweepParameter::PredictionAccuracy, &range, &[]).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label, "Pb=0.25, Pt=0.60, b=4, c=1");
    }

    #[test]
    fn test_grid_rejects_invalid_axes() {
        let range = SweepRange::new(0.4, 0.8, 5).unwrap();
        let axes = [SeriesAxis::new(SweepParameter::PredictionAccuracy, vec![0.5])];
        assert_eq!(
            sweep_grid(&part_b(), SweepParameter::PredictionAccuracy, &range, &axes),
            Err(ValidationError::DuplicateAxis {
                parameter: SweepParameter::PredictionAccuracy
            })
        );
        let axes = [SeriesAxis::new(SweepParameter::ReducedPenalty, vec![1.0, 5.0])];
        assert!(
            sweep_grid(&part_b(), SweepParameter::PredictionAccuracy, &range, &axes).is_err()
        );
        let axes = [SeriesAxis::new(SweepParameter::ReducedPenalty, vec![1.0])];
        let range = SweepRange::new(0.2, 0.3, 3).unwrap();
        assert!(
            sweep_grid(&part_a(), SweepParameter::BranchProbability, &range, &axes).is_err()
        );
    }
}
