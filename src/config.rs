use crate::{
    DEFAULT_BASE_CPI, NoPrediction, ParameterSet, SeriesAxis, SweepParameter, SweepRange,
    WithPrediction,
};
use anyhow::{Context, bail};
use clap::ValueEnum;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which half of the calculator to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Part {
    /// Part A: no branch prediction
    #[value(name = "a", alias = "no-prediction")]
    NoPrediction,
    /// Part B: with branch prediction
    #[value(name = "b", alias = "with-prediction")]
    WithPrediction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    pub start: f64,
    pub end: f64,
    /// Step between consecutive values
    pub resolution: f64,
}

impl RangeConfig {
    pub fn range(&self) -> Result<SweepRange, crate::ValidationError> {
        SweepRange::with_resolution(self.start, self.end, self.resolution)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Parameter on the x-axis
    pub parameter: SweepParameter,
    #[serde(flatten)]
    pub range: RangeConfig,
}

/// Extra lines of a "calculate all" plot: either listed values or a range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub parameter: SweepParameter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeConfig>,
}

impl SeriesConfig {
    pub fn axis(&self) -> anyhow::Result<SeriesAxis> {
        match (&self.values, &self.range) {
            (Some(values), None) => Ok(SeriesAxis::new(self.parameter, values.clone())),
            (None, Some(range)) => Ok(SeriesAxis::from_range(self.parameter, &range.range()?)),
            _ => bail!(
                "series over {} needs exactly one of `values` or `range`",
                self.parameter
            ),
        }
    }
}

/// Fixed values and sweep setup of one part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub pb: f64,
    pub pt: f64,
    pub b: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<f64>,
    pub sweep: SweepConfig,
    #[serde(default)]
    pub series: Vec<SeriesConfig>,
}

impl ModelConfig {
    pub fn set(&mut self, parameter: SweepParameter, value: f64) {
        match parameter {
            SweepParameter::BranchProbability => self.pb = value,
            SweepParameter::TakenProbability => self.pt = value,
            SweepParameter::BranchPenalty => self.b = value,
            SweepParameter::PredictionAccuracy => self.pc = Some(value),
            SweepParameter::ReducedPenalty => self.c = Some(value),
        }
    }

    pub fn axes(&self) -> anyhow::Result<Vec<SeriesAxis>> {
        self.series.iter().map(SeriesConfig::axis).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Cycles per instruction when no branch stalls
    #[serde(default = "default_base_cpi")]
    pub base_cpi: f64,
    pub no_prediction: ModelConfig,
    pub with_prediction: ModelConfig,
}

fn default_base_cpi() -> f64 {
    DEFAULT_BASE_CPI
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        CalculatorConfig {
            base_cpi: DEFAULT_BASE_CPI,
            no_prediction: ModelConfig {
                pb: 0.2,
                pt: 0.6,
                b: 3.0,
                pc: None,
                c: None,
                sweep: SweepConfig {
                    parameter: SweepParameter::BranchProbability,
                    range: RangeConfig {
                        start: 0.2,
                        end: 0.3,
                        resolution: 0.01,
                    },
                },
                series: vec![
                    SeriesConfig {
                        parameter: SweepParameter::BranchPenalty,
                        values: Some(vec![3.0, 4.0]),
                        range: None,
                    },
                    SeriesConfig {
                        parameter: SweepParameter::TakenProbability,
                        values: None,
                        range: Some(RangeConfig {
                            start: 0.5,
                            end: 0.7,
                            resolution: 0.1,
                        }),
                    },
                ],
            },
            with_prediction: ModelConfig {
                pb: 0.25,
                pt: 0.6,
                b: 4.0,
                pc: Some(0.6),
                c: Some(1.0),
                sweep: SweepConfig {
                    parameter: SweepParameter::PredictionAccuracy,
                    range: RangeConfig {
                        start: 0.4,
                        end: 0.8,
                        resolution: 0.1,
                    },
                },
                series: vec![SeriesConfig {
                    parameter: SweepParameter::ReducedPenalty,
                    values: Some(vec![0.0, 1.0, 2.0]),
                    range: None,
                }],
            },
        }
    }
}

impl CalculatorConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<CalculatorConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: CalculatorConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        debug!("{:?}", config);
        Ok(config)
    }

    /// Read `path` if given, built-in defaults otherwise
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> anyhow::Result<CalculatorConfig> {
        match path {
            Some(path) => Self::new(path),
            None => Ok(Self::default()),
        }
    }

    pub fn model(&self, part: Part) -> &ModelConfig {
        match part {
            Part::NoPrediction => &self.no_prediction,
            Part::WithPrediction => &self.with_prediction,
        }
    }

    pub fn model_mut(&mut self, part: Part) -> &mut ModelConfig {
        match part {
            Part::NoPrediction => &mut self.no_prediction,
            Part::WithPrediction => &mut self.with_prediction,
        }
    }

    /// Validated parameter set for `part`
    pub fn params(&self, part: Part) -> anyhow::Result<ParameterSet> {
        let model = self.model(part);
        let params: ParameterSet = match part {
            Part::NoPrediction => {
                NoPrediction::new(self.base_cpi, model.pb, model.pt, model.b)?.into()
            }
            Part::WithPrediction => {
                let (Some(pc), Some(c)) = (model.pc, model.c) else {
                    bail!("with_prediction needs both `pc` and `c`");
                };
                WithPrediction::new(self.base_cpi, model.pb, model.pt, pc, model.b, c)?.into()
            }
        };
        Ok(params)
    }
}
