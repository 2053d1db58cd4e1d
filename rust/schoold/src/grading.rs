use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const TP_WEIGHT: f64 = 0.20;
pub const CONTINUOUS_ASSESSMENT_WEIGHT: f64 = 0.30;
pub const EXAM_WEIGHT: f64 = 0.50;

/// General average at or above this value validates the year.
pub const PASS_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Validated,
    NotValidated,
}

impl Decision {
    pub fn from_average(average: f64) -> Self {
        if average >= PASS_THRESHOLD {
            Decision::Validated
        } else {
            Decision::NotValidated
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Validated => "validated",
            Decision::NotValidated => "not_validated",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "validated" => Some(Decision::Validated),
            "not_validated" => Some(Decision::NotValidated),
            _ => None,
        }
    }
}

/// Final score of one subject.
///
/// With a retake the weighted formula is dropped entirely: the student keeps
/// the better of the exam alone and the exam averaged with the retake.
/// Otherwise TP, continuous assessment and exam are combined with fixed
/// 20/30/50 weights. No rounding is applied.
pub fn compute_final_score(
    tp: f64,
    continuous_assessment: f64,
    exam_score: f64,
    retake_score: f64,
    has_retake: bool,
) -> f64 {
    if has_retake && retake_score > 0.0 {
        ((exam_score + retake_score) / 2.0).max(exam_score)
    } else {
        tp * TP_WEIGHT + continuous_assessment * CONTINUOUS_ASSESSMENT_WEIGHT + exam_score * EXAM_WEIGHT
    }
}

/// Raw components submitted for one (student, subject) pair.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponents {
    pub coefficient: f64,
    pub tp_score: f64,
    pub continuous_assessment_score: f64,
    pub final_exam_score: f64,
    #[serde(default)]
    pub retake_score: f64,
}

impl ScoreComponents {
    pub fn validate(&self) -> Result<(), DomainError> {
        let scores = [
            ("tpScore", self.tp_score),
            ("continuousAssessmentScore", self.continuous_assessment_score),
            ("finalExamScore", self.final_exam_score),
            ("retakeScore", self.retake_score),
        ];
        for (field, value) in scores {
            if !value.is_finite() {
                return Err(DomainError::invalid(field, "must be a finite number"));
            }
            if value < 0.0 {
                return Err(DomainError::invalid(field, "negative scores are not allowed"));
            }
        }
        if !self.coefficient.is_finite() || self.coefficient <= 0.0 {
            return Err(DomainError::invalid("coefficient", "must be > 0"));
        }
        Ok(())
    }

    pub fn has_retake(&self) -> bool {
        self.retake_score > 0.0
    }

    pub fn final_score(&self) -> f64 {
        compute_final_score(
            self.tp_score,
            self.continuous_assessment_score,
            self.final_exam_score,
            self.retake_score,
            self.has_retake(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedScore {
    pub final_score: f64,
    pub coefficient: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralAverage {
    pub average: f64,
    pub decision: Decision,
    pub total_coefficient: f64,
}

/// Coefficient-weighted mean of per-subject final scores.
///
/// An empty input (or one whose coefficients sum to zero) has no average and
/// is reported as `NoResultsToAggregate` instead of yielding NaN.
pub fn compute_general_average(results: &[WeightedScore]) -> Result<GeneralAverage, DomainError> {
    let mut weighted_sum = 0.0_f64;
    let mut total_coefficient = 0.0_f64;
    for r in results {
        weighted_sum += r.final_score * r.coefficient;
        total_coefficient += r.coefficient;
    }

    if total_coefficient <= 0.0 {
        return Err(DomainError::NoResultsToAggregate);
    }

    let average = weighted_sum / total_coefficient;
    Ok(GeneralAverage {
        average,
        decision: Decision::from_average(average),
        total_coefficient,
    })
}

/// Half-up rounding to 2 decimals, for display payloads only.
pub fn round_for_display(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}
