//! Domain models: missions, difficulty levels, generated problems, tutor messages.

use serde::{Deserialize, Serialize};

/// Topic category for generated problems. Fixed set, defined at startup.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Mission {
  /// Common difference, general term, partial sums.
  Arithmetic,
  /// Common ratio, multiplicative growth.
  Geometric,
  /// Infinite series, convergence and limits.
  Infinite,
  /// Sigma notation and summation.
  Sigma,
}

impl Mission {
  /// Human-readable topic label embedded in the generation request.
  pub fn topic_label(&self) -> &'static str {
    match self {
      Mission::Arithmetic => "Arithmetic Series (อนุกรมเลขคณิต)",
      Mission::Geometric => "Geometric Series (อนุกรมเรขาคณิต)",
      Mission::Infinite => "Infinite Series & Convergence (อนุกรมอนันต์และลิมิต)",
      Mission::Sigma => "Sigma Notation & Summation (สัญลักษณ์แทนการบวก)",
    }
  }

  pub const ALL: [Mission; 4] =
    [Mission::Arithmetic, Mission::Geometric, Mission::Infinite, Mission::Sigma];
}

/// Challenge level attached to a generation request. Fixed set of three.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  /// Display label sent verbatim to the generator (bilingual, as shown in the UI).
  pub fn label(&self) -> &'static str {
    match self {
      Difficulty::Easy => "Easy (พื้นฐาน)",
      Difficulty::Medium => "Medium (ปานกลาง)",
      Difficulty::Hard => "Hard (ท้าทาย)",
    }
  }

  pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

/// One practice problem. Created fresh per generation call, owned by the
/// current session, replaced wholesale on the next load, never mutated.
///
/// `question`, `correct_answer`, `explanation_steps` and `hint` are mandatory
/// in the model's reply; the rest are optional.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MathProblem {
  pub question: String,
  #[serde(default)]
  pub sequence_data: Option<String>,
  pub correct_answer: f64,
  /// Ordered, one step of working per entry.
  pub explanation_steps: Vec<String>,
  pub hint: String,
  #[serde(default)]
  pub variable_unit: Option<String>,
  #[serde(default)]
  pub choices: Option<Vec<f64>>,
}

/// Who wrote a tutor-log entry.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TutorRole {
  User,
  Ai,
}

/// One entry in the per-problem tutor conversation log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TutorMessage {
  pub role: TutorRole,
  pub text: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mission_labels_are_bilingual_topic_names() {
    assert_eq!(Mission::Arithmetic.topic_label(), "Arithmetic Series (อนุกรมเลขคณิต)");
    assert_eq!(Mission::Sigma.topic_label(), "Sigma Notation & Summation (สัญลักษณ์แทนการบวก)");
  }

  #[test]
  fn problem_decodes_with_optional_fields_missing() {
    let p: MathProblem = serde_json::from_str(
      r#"{"question":"q","correctAnswer":42,"explanationSteps":["s1","s2"],"hint":"h"}"#,
    )
    .unwrap();
    assert_eq!(p.correct_answer, 42.0);
    assert_eq!(p.explanation_steps.len(), 2);
    assert!(p.sequence_data.is_none());
    assert!(p.variable_unit.is_none());
    assert!(p.choices.is_none());
  }

  #[test]
  fn problem_decode_rejects_missing_mandatory_fields() {
    let r = serde_json::from_str::<MathProblem>(
      r#"{"question":"q","explanationSteps":[],"hint":"h"}"#,
    );
    assert!(r.is_err());
  }
}
