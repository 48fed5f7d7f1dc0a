use crate::{CalculatorConfig, Part, SweepParameter, ValidationError};
use clap::Args;
use log::debug;
use std::path::PathBuf;

/// Config file and per-parameter overrides shared by all binaries
#[derive(Args, Debug, Clone, Default)]
pub struct ParameterArgs {
    /// Path to TOML config, built-in defaults when absent
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Cycles per instruction without branch stalls
    #[arg(long)]
    pub base_cpi: Option<f64>,

    /// Pb: branch probability
    #[arg(long)]
    pub pb: Option<f64>,

    /// Pt: branch taken probability
    #[arg(long)]
    pub pt: Option<f64>,

    /// b: branch penalty in cycles
    #[arg(long)]
    pub b: Option<f64>,

    /// Pc: prediction accuracy
    #[arg(long)]
    pub pc: Option<f64>,

    /// c: penalty of a correctly predicted branch in cycles
    #[arg(long)]
    pub c: Option<f64>,
}

impl ParameterArgs {
    pub fn load(&self, part: Part) -> anyhow::Result<CalculatorConfig> {
        let mut config = CalculatorConfig::load(self.config.as_ref())?;
        if let Some(base_cpi) = self.base_cpi {
            config.base_cpi = base_cpi;
        }
        let overrides = [
            (SweepParameter::BranchProbability, self.pb),
            (SweepParameter::TakenProbability, self.pt),
            (SweepParameter::BranchPenalty, self.b),
            (SweepParameter::PredictionAccuracy, self.pc),
            (SweepParameter::ReducedPenalty, self.c),
        ];
        for (parameter, value) in overrides {
            if let Some(value) = value {
                if part == Part::NoPrediction && parameter.needs_prediction() {
                    return Err(ValidationError::NotApplicable { parameter }.into());
                }
                debug!("Override {} = {}", parameter, value);
                config.model_mut(part).set(parameter, value);
            }
        }
        Ok(config)
    }
}

/// Which parameter to sweep and over which range
#[derive(Args, Debug, Clone, Default)]
pub struct SweepArgs {
    /// Swept parameter, defaults to the configured one
    #[arg(short = 'x', long, value_enum)]
    pub parameter: Option<SweepParameter>,

    /// First swept value
    #[arg(long)]
    pub start: Option<f64>,

    /// Last swept value
    #[arg(long)]
    pub end: Option<f64>,

    /// Step between swept values
    #[arg(short, long)]
    pub resolution: Option<f64>,

    /// Calculate all: one series per combination of configured series values
    #[arg(short, long)]
    pub all: bool,
}

impl SweepArgs {
    pub fn apply(&self, config: &mut CalculatorConfig, part: Part) {
        let sweep = &mut config.model_mut(part).sweep;
        if let Some(parameter) = self.parameter {
            sweep.parameter = parameter;
        }
        if let Some(start) = self.start {
            sweep.range.start = start;
        }
        if let Some(end) = self.end {
            sweep.range.end = end;
        }
        if let Some(resolution) = self.resolution {
            sweep.range.resolution = resolution;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_sweep;

    #[test]
    fn test_overrides() {
        let args = ParameterArgs {
            pt: Some(0.5),
            b: Some(4.0),
            ..Default::default()
        };
        let mut config = args.load(Part::NoPrediction).unwrap();
        assert_eq!(config.no_prediction.pt, 0.5);
        assert_eq!(config.with_prediction.pt, 0.6);

        let sweep = SweepArgs {
            parameter: Some(SweepParameter::BranchPenalty),
            start: Some(0.0),
            end: Some(8.0),
            resolution: Some(2.0),
            all: false,
        };
        sweep.apply(&mut config, Part::NoPrediction);
        let series = run_sweep(&config, Part::NoPrediction, sweep.all).unwrap();
        assert_eq!(series[0].label, "Pb=0.20, Pt=0.50");
        assert_eq!(series[0].result.xs(), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_invalid_override_surfaces_on_use() {
        let args = ParameterArgs {
            pb: Some(1.5),
            ..Default::default()
        };
        let config = args.load(Part::NoPrediction).unwrap();
        assert!(config.params(Part::NoPrediction).is_err());
    }

    #[test]
    fn test_prediction_overrides_need_part_b() {
        let args = ParameterArgs {
            pc: Some(0.9),
            ..Default::default()
        };
        let err = args.load(Part::NoPrediction).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::NotApplicable {
                parameter: SweepParameter::PredictionAccuracy
            })
        );
        let config = args.load(Part::WithPrediction).unwrap();
        assert_eq!(config.with_prediction.pc, Some(0.9));
    }
}
