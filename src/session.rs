//! Per-connection session state machine.
//!
//! Home → DifficultySelect → Solving, driven by explicit transitions. Each
//! WebSocket connection owns exactly one `Session`, mutated only by its own
//! message loop, so no locking is needed. Problem loads are async side
//! effects sequenced by the caller: a transition that needs a fresh problem
//! reports so via `Transition::LoadProblem`, the caller awaits the generator
//! (which never fails outwardly) and installs the result.

use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{Difficulty, MathProblem, Mission, TutorMessage, TutorRole};
use crate::verify::check_answer;

/// Which view the client should show. Derived from which fields are set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Home,
  DifficultySelect,
  Solving,
}

/// Result of a transition request.
#[derive(Debug, PartialEq, Eq)]
pub enum Transition {
  /// State updated; no side effect needed.
  Done,
  /// State updated and a fresh problem must be loaded for (mission, difficulty).
  LoadProblem(Mission, Difficulty),
  /// The transition is not legal from the current phase; nothing changed.
  Rejected(&'static str),
}

/// Outcome of an answer submission.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
  /// Input was not a number (or no problem is loaded): silent no-op.
  Ignored,
  /// The problem was already answered correctly; input is immutable.
  Locked,
  /// Verified against the correct answer.
  Evaluated(bool),
}

pub struct Session {
  pub id: Uuid,
  pub mission: Option<Mission>,
  pub difficulty: Option<Difficulty>,
  pub problem: Option<MathProblem>,
  /// None = not yet answered, Some(true) is terminal for the current problem.
  pub is_correct: Option<bool>,
  /// Append-only, scoped to the current problem.
  pub tutor_log: Vec<TutorMessage>,
}

impl Session {
  pub fn new() -> Self {
    Self {
      id: Uuid::new_v4(),
      mission: None,
      difficulty: None,
      problem: None,
      is_correct: None,
      tutor_log: Vec::new(),
    }
  }

  /// Invariants: difficulty only with a mission, problem only with both.
  pub fn phase(&self) -> Phase {
    match (self.mission, self.difficulty) {
      (None, _) => Phase::Home,
      (Some(_), None) => Phase::DifficultySelect,
      (Some(_), Some(_)) => Phase::Solving,
    }
  }

  /// Home|Solving → DifficultySelect. Sets mission, clears difficulty and
  /// everything downstream of it.
  #[instrument(level = "debug", skip(self), fields(session = %self.id))]
  pub fn select_mission(&mut self, mission: Mission) -> Transition {
    self.mission = Some(mission);
    self.difficulty = None;
    self.clear_problem_state();
    Transition::Done
  }

  /// DifficultySelect → Solving. Triggers a problem load as a side effect.
  #[instrument(level = "debug", skip(self), fields(session = %self.id))]
  pub fn select_difficulty(&mut self, difficulty: Difficulty) -> Transition {
    let Some(mission) = self.mission else {
      return Transition::Rejected("select a mission first");
    };
    self.difficulty = Some(difficulty);
    self.clear_problem_state();
    Transition::LoadProblem(mission, difficulty)
  }

  /// Any state → Home.
  pub fn back_to_home(&mut self) -> Transition {
    self.mission = None;
    self.difficulty = None;
    self.clear_problem_state();
    Transition::Done
  }

  /// Solving → DifficultySelect; mission retained. Idempotent: calling it
  /// again from DifficultySelect changes nothing further.
  pub fn back_to_difficulty(&mut self) -> Transition {
    if self.mission.is_none() {
      return Transition::Rejected("not in a mission");
    }
    self.difficulty = None;
    self.clear_problem_state();
    Transition::Done
  }

  /// Re-load a problem in place. Callable only from Solving.
  #[instrument(level = "debug", skip(self), fields(session = %self.id))]
  pub fn request_next_problem(&mut self) -> Transition {
    match (self.mission, self.difficulty) {
      (Some(m), Some(d)) => {
        self.clear_problem_state();
        Transition::LoadProblem(m, d)
      }
      _ => Transition::Rejected("no active problem to replace"),
    }
  }

  /// Install the resolved (possibly fallback) problem. The machine never
  /// observes a load error; the generator always hands back a problem.
  pub fn install_problem(&mut self, problem: MathProblem) {
    info!(target: "problem", session = %self.id, steps = problem.explanation_steps.len(), "Problem installed");
    self.problem = Some(problem);
    self.is_correct = None;
    self.tutor_log.clear();
  }

  /// Verify an answer against the active problem.
  pub fn submit_answer(&mut self, raw: &str) -> SubmitOutcome {
    let Some(problem) = &self.problem else {
      return SubmitOutcome::Ignored;
    };
    if self.is_correct == Some(true) {
      return SubmitOutcome::Locked;
    }
    match check_answer(raw, problem.correct_answer) {
      None => SubmitOutcome::Ignored,
      Some(correct) => {
        self.is_correct = Some(correct);
        SubmitOutcome::Evaluated(correct)
      }
    }
  }

  /// Append one entry to the per-problem tutor log.
  pub fn push_tutor_message(&mut self, role: TutorRole, text: impl Into<String>) {
    self.tutor_log.push(TutorMessage { role, text: text.into() });
  }

  fn clear_problem_state(&mut self) {
    self.problem = None;
    self.is_correct = None;
    self.tutor_log.clear();
  }
}

impl Default for Session {
  fn default() -> Self {
    Self::new()
  }
}
