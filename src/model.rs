use crate::ValidationError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cycles per instruction of a pipeline that never stalls on a branch
pub const DEFAULT_BASE_CPI: f64 = 1.0;

/// The scalar inputs of the CPI model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum SweepParameter {
    /// Pb: fraction of instructions that are branches
    #[serde(rename = "Pb")]
    #[value(name = "pb")]
    BranchProbability,
    /// Pt: fraction of branches that are taken
    #[serde(rename = "Pt")]
    #[value(name = "pt")]
    TakenProbability,
    /// b: cycles lost on a taken branch without prediction, or on a misprediction
    #[serde(rename = "b")]
    #[value(name = "b")]
    BranchPenalty,
    /// Pc: fraction of branches predicted correctly
    #[serde(rename = "Pc")]
    #[value(name = "pc")]
    PredictionAccuracy,
    /// c: cycles lost on a correctly predicted taken branch
    #[serde(rename = "c")]
    #[value(name = "c")]
    ReducedPenalty,
}

impl SweepParameter {
    pub fn symbol(&self) -> &'static str {
        match self {
            SweepParameter::BranchProbability => "Pb",
            SweepParameter::TakenProbability => "Pt",
            SweepParameter::BranchPenalty => "b",
            SweepParameter::PredictionAccuracy => "Pc",
            SweepParameter::ReducedPenalty => "c",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SweepParameter::BranchProbability => "Branch Probability",
            SweepParameter::TakenProbability => "Branch Taken Probability",
            SweepParameter::BranchPenalty => "Branch Penalty",
            SweepParameter::PredictionAccuracy => "Prediction Accuracy",
            SweepParameter::ReducedPenalty => "Prediction Penalty",
        }
    }

    pub fn is_probability(&self) -> bool {
        matches!(
            self,
            SweepParameter::BranchProbability
                | SweepParameter::TakenProbability
                | SweepParameter::PredictionAccuracy
        )
    }

    /// Only meaningful once a branch predictor is modelled
    pub fn needs_prediction(&self) -> bool {
        matches!(
            self,
            SweepParameter::PredictionAccuracy | SweepParameter::ReducedPenalty
        )
    }

    /// Check that `value` lies in this parameter's domain
    pub fn validate(&self, value: f64) -> Result<(), ValidationError> {
        let name = self.symbol();
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { name, value });
        }
        if self.is_probability() {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::ProbabilityOutOfRange { name, value });
            }
        } else if value < 0.0 {
            return Err(ValidationError::NegativePenalty { name, value });
        }
        Ok(())
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

fn validate_base_cpi(base_cpi: f64) -> Result<(), ValidationError> {
    if !base_cpi.is_finite() {
        return Err(ValidationError::NotFinite {
            name: "base CPI",
            value: base_cpi,
        });
    }
    if base_cpi <= 0.0 {
        return Err(ValidationError::NonPositiveBaseCpi { value: base_cpi });
    }
    Ok(())
}

/// Part A: branches stall the pipeline whenever they are taken
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoPrediction {
    base_cpi: f64,
    pb: f64,
    pt: f64,
    b: f64,
}

impl NoPrediction {
    pub fn new(base_cpi: f64, pb: f64, pt: f64, b: f64) -> Result<Self, ValidationError> {
        validate_base_cpi(base_cpi)?;
        SweepParameter::BranchProbability.validate(pb)?;
        SweepParameter::TakenProbability.validate(pt)?;
        SweepParameter::BranchPenalty.validate(b)?;
        Ok(Self {
            base_cpi,
            pb,
            pt,
            b,
        })
    }

    pub fn base_cpi(&self) -> f64 {
        self.base_cpi
    }

    pub fn pb(&self) -> f64 {
        self.pb
    }

    pub fn pt(&self) -> f64 {
        self.pt
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    /// CPI = base + Pb * Pt * b
    pub fn cpi(&self) -> f64 {
        self.base_cpi + self.pb * self.pt * self.b
    }

    pub fn throughput(&self) -> f64 {
        1.0 / self.cpi()
    }
}

/// Part B: taken branches cost `c` cycles when predicted correctly and `b` otherwise
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WithPrediction {
    #[serde(flatten)]
    branch: NoPrediction,
    pc: f64,
    c: f64,
}

impl WithPrediction {
    pub fn new(
        base_cpi: f64,
        pb: f64,
        pt: f64,
        pc: f64,
        b: f64,
        c: f64,
    ) -> Result<Self, ValidationError> {
        let branch = NoPrediction::new(base_cpi, pb, pt, b)?;
        SweepParameter::PredictionAccuracy.validate(pc)?;
        SweepParameter::ReducedPenalty.validate(c)?;
        if c > b {
            return Err(ValidationError::PenaltyNotReduced { c, b });
        }
        Ok(Self { branch, pc, c })
    }

    /// Parameters of the misprediction path
    pub fn branch(&self) -> &NoPrediction {
        &self.branch
    }

    pub fn pc(&self) -> f64 {
        self.pc
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    /// CPI = base + Pb * (Pc * Pt * c + (1 - Pc) * Pt * b)
    pub fn cpi(&self) -> f64 {
        let NoPrediction {
            base_cpi, pb, pt, b, ..
        } = self.branch;
        base_cpi + pb * ((1.0 - self.pc) * pt * b + self.pc * pt * self.c)
    }

    pub fn throughput(&self) -> f64 {
        1.0 / self.cpi()
    }
}

/// A validated set of model inputs, with or without branch prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ParameterSet {
    NoPrediction(NoPrediction),
    WithPrediction(WithPrediction),
}

impl ParameterSet {
    pub fn title(&self) -> &'static str {
        match self {
            ParameterSet::NoPrediction(_) => "No Prediction",
            ParameterSet::WithPrediction(_) => "With Prediction",
        }
    }

    /// Parameters this model reads, in table column order
    pub fn parameters(&self) -> &'static [SweepParameter] {
        use SweepParameter::*;
        match self {
            ParameterSet::NoPrediction(_) => &[BranchProbability, TakenProbability, BranchPenalty],
            ParameterSet::WithPrediction(_) => &[
                BranchProbability,
                TakenProbability,
                PredictionAccuracy,
                BranchPenalty,
                ReducedPenalty,
            ],
        }
    }

    fn branch(&self) -> &NoPrediction {
        match self {
            ParameterSet::NoPrediction(params) => params,
            ParameterSet::WithPrediction(params) => params.branch(),
        }
    }

    pub fn base_cpi(&self) -> f64 {
        self.branch().base_cpi()
    }

    pub fn get(&self, parameter: SweepParameter) -> Result<f64, ValidationError> {
        let branch = self.branch();
        match (parameter, self) {
            (SweepParameter::BranchProbability, _) => Ok(branch.pb()),
            (SweepParameter::TakenProbability, _) => Ok(branch.pt()),
            (SweepParameter::BranchPenalty, _) => Ok(branch.b()),
            (SweepParameter::PredictionAccuracy, ParameterSet::WithPrediction(params)) => {
                Ok(params.pc())
            }
            (SweepParameter::ReducedPenalty, ParameterSet::WithPrediction(params)) => {
                Ok(params.c())
            }
            (_, ParameterSet::NoPrediction(_)) => Err(ValidationError::NotApplicable { parameter }),
        }
    }

    /// Copy of this set with one parameter replaced, validated again
    pub fn with(&self, parameter: SweepParameter, value: f64) -> Result<Self, ValidationError> {
        match self {
            ParameterSet::NoPrediction(params) => {
                let NoPrediction {
                    base_cpi,
                    mut pb,
                    mut pt,
                    mut b,
                } = *params;
                match parameter {
                    SweepParameter::BranchProbability => pb = value,
                    SweepParameter::TakenProbability => pt = value,
                    SweepParameter::BranchPenalty => b = value,
                    _ => return Err(ValidationError::NotApplicable { parameter }),
                }
                Ok(ParameterSet::NoPrediction(NoPrediction::new(
                    base_cpi, pb, pt, b,
                )?))
            }
            ParameterSet::WithPrediction(params) => {
                let NoPrediction {
                    base_cpi,
                    mut pb,
                    mut pt,
                    mut b,
                } = params.branch;
                let (mut pc, mut c) = (params.pc, params.c);
                match parameter {
                    SweepParameter::BranchProbability => pb = value,
                    SweepParameter::TakenProbability => pt = value,
                    SweepParameter::BranchPenalty => b = value,
                    SweepParameter::PredictionAccuracy => pc = value,
                    SweepParameter::ReducedPenalty => c = value,
                }
                Ok(ParameterSet::WithPrediction(WithPrediction::new(
                    base_cpi, pb, pt, pc, b, c,
                )?))
            }
        }
    }

    pub fn cpi(&self) -> f64 {
        match self {
            ParameterSet::NoPrediction(params) => params.cpi(),
            ParameterSet::WithPrediction(params) => params.cpi(),
        }
    }

    pub fn throughput(&self) -> f64 {
        1.0 / self.cpi()
    }
}

impl From<NoPrediction> for ParameterSet {
    fn from(params: NoPrediction) -> Self {
        ParameterSet::NoPrediction(params)
    }
}

impl From<WithPrediction> for ParameterSet {
    fn from(params: WithPrediction) -> Self {
        ParameterSet::WithPrediction(params)
    }
}

/// CPI without branch prediction
pub fn cpi_no_prediction(base_cpi: f64, pb: f64, pt: f64, b: f64) -> Result<f64, ValidationError> {
    Ok(NoPrediction::new(base_cpi, pb, pt, b)?.cpi())
}

/// CPI with a branch predictor of accuracy `pc`
pub fn cpi_with_prediction(
    base_cpi: f64,
    pb: f64,
    pt: f64,
    pc: f64,
    b: f64,
    c: f64,
) -> Result<f64, ValidationError> {
    Ok(WithPrediction::new(base_cpi, pb, pt, pc, b, c)?.cpi())
}

/// Instructions completed per cycle at a clock rate of one
pub fn throughput(cpi: f64) -> Result<f64, ValidationError> {
    if !cpi.is_finite() {
        return Err(ValidationError::NotFinite {
            name: "CPI",
            value: cpi,
        });
    }
    if cpi <= 0.0 {
        return Err(ValidationError::NonPositiveCpi { value: cpi });
    }
    Ok(1.0 / cpi)
}
