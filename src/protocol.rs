//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Difficulty, MathProblem, Mission, TutorMessage};
use crate::session::{Phase, Session};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
  Ping,
  SelectMission {
    mission: Mission,
  },
  SelectDifficulty {
    difficulty: Difficulty,
  },
  BackToHome,
  BackToDifficulty,
  NextProblem,
  SubmitAnswer {
    answer: String,
  },
  AskTutor {
    question: String,
    /// Current contents of the answer field, possibly empty or invalid.
    #[serde(default)]
    answer_field: String,
  },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
  Pong,
  /// Snapshot of the session after a navigation transition.
  Session {
    view: SessionView,
  },
  /// A freshly loaded (possibly fallback) problem.
  Problem {
    problem: MathProblem,
  },
  AnswerResult {
    correct: bool,
    /// True once the problem is answered correctly; input is immutable then.
    locked: bool,
  },
  /// Submission was a silent no-op (non-numeric input or locked problem).
  AnswerIgnored,
  TutorReply {
    text: String,
  },
  Error {
    message: String,
  },
}

/// Public view of session state, sent after every navigation transition.
#[derive(Debug, Serialize)]
pub struct SessionView {
  pub phase: Phase,
  pub mission: Option<Mission>,
  pub difficulty: Option<Difficulty>,
  pub is_correct: Option<bool>,
  pub tutor_log: Vec<TutorMessage>,
}

pub fn session_view(s: &Session) -> SessionView {
  SessionView {
    phase: s.phase(),
    mission: s.mission,
    difficulty: s.difficulty,
    is_correct: s.is_correct,
    tutor_log: s.tutor_log.clone(),
  }
}

//
// HTTP request/response DTOs (stateless surface)
//

#[derive(Debug, Deserialize)]
pub struct ProblemQuery {
  pub mission: Mission,
  pub difficulty: Difficulty,
}

#[derive(Deserialize)]
pub struct AnswerIn {
  pub answer: String,
  #[serde(rename = "correctAnswer")]
  pub correct_answer: f64,
}
#[derive(Serialize)]
pub struct AnswerOut {
  /// None when the input was not a parseable number (check did not run).
  pub correct: Option<bool>,
}

#[derive(Deserialize)]
pub struct TutorIn {
  pub question: String,
  #[serde(default)]
  pub context: String,
}
#[derive(Serialize)]
pub struct TutorOut {
  pub text: String,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn client_messages_decode_from_tagged_json() {
    let m: ClientWsMessage =
      serde_json::from_str(r#"{"type":"select_mission","mission":"arithmetic"}"#).unwrap();
    assert!(matches!(m, ClientWsMessage::SelectMission { mission: Mission::Arithmetic }));

    let m: ClientWsMessage =
      serde_json::from_str(r#"{"type":"select_difficulty","difficulty":"hard"}"#).unwrap();
    assert!(matches!(m, ClientWsMessage::SelectDifficulty { difficulty: Difficulty::Hard }));

    let m: ClientWsMessage = serde_json::from_str(r#"{"type":"next_problem"}"#).unwrap();
    assert!(matches!(m, ClientWsMessage::NextProblem));

    // answer_field is optional on the wire
    let m: ClientWsMessage =
      serde_json::from_str(r#"{"type":"ask_tutor","question":"สูตรคืออะไร"}"#).unwrap();
    assert!(matches!(m, ClientWsMessage::AskTutor { answer_field, .. } if answer_field.is_empty()));
  }

  #[test]
  fn unknown_mission_value_is_rejected() {
    let r = serde_json::from_str::<ClientWsMessage>(r#"{"type":"select_mission","mission":"calculus"}"#);
    assert!(r.is_err());
  }

  #[test]
  fn server_messages_encode_with_snake_case_tags() {
    let s = serde_json::to_string(&ServerWsMessage::AnswerResult { correct: true, locked: true })
      .unwrap();
    assert!(s.contains(r#""type":"answer_result""#));
    let s = serde_json::to_string(&ServerWsMessage::AnswerIgnored).unwrap();
    assert!(s.contains(r#""type":"answer_ignored""#));
  }
}
