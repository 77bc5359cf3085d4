//! Core behaviors shared by the HTTP and WebSocket handlers.
//!
//! This is where "never fails outwardly" is enforced: every model error is
//! logged and converted to its safe default — the fixed fallback problem for
//! generation, a fixed Thai sentence for the tutor. Handlers only ever see
//! renderable values.

use tracing::{error, info, instrument, warn};

use crate::domain::{Difficulty, MathProblem, Mission};
use crate::fallback::{
  fallback_problem, TUTOR_EMPTY_REPLY_TEXT, TUTOR_ERROR_TEXT, TUTOR_OFFLINE_TEXT,
};
use crate::state::AppState;

/// Generate one problem, always resolving to something presentable.
///
/// No credential → fallback fast-path (deliberate offline mode, not an
/// error). Any model failure → log, fallback. No retries, no partial results.
#[instrument(level = "info", skip(state, mission, difficulty), fields(?mission, ?difficulty))]
pub async fn generate_problem(
  state: &AppState,
  mission: Mission,
  difficulty: Difficulty,
) -> MathProblem {
  let Some(gemini) = &state.gemini else {
    warn!(target: "problem", ?mission, "No API key configured; serving offline fallback problem");
    return fallback_problem(mission);
  };

  match gemini.generate_problem(&state.prompts, mission, difficulty).await {
    Ok(p) => {
      info!(target: "problem", ?mission, ?difficulty, source = "gemini", "Problem served");
      p
    }
    Err(e) => {
      error!(target: "problem", ?mission, ?difficulty, error = %e, "Generation failed; serving fallback problem");
      fallback_problem(mission)
    }
  }
}

/// Ask the tutor. Always returns a sentence, never an error.
#[instrument(level = "info", skip(state, question, context), fields(question_len = question.len(), context_len = context.len()))]
pub async fn ask_tutor(state: &AppState, question: &str, context: &str) -> String {
  let Some(gemini) = &state.gemini else {
    return TUTOR_OFFLINE_TEXT.to_string();
  };

  match gemini.tutor_reply(&state.prompts, question, context).await {
    Ok(text) if text.is_empty() => TUTOR_EMPTY_REPLY_TEXT.to_string(),
    Ok(text) => text,
    Err(e) => {
      error!(target: "mathquest_backend", error = %e, "Tutor call failed; serving fixed error sentence");
      TUTOR_ERROR_TEXT.to_string()
    }
  }
}

/// Context string handed to the tutor alongside a question: the problem
/// text, its correct answer, and whatever sits in the answer field (possibly
/// empty or invalid).
pub fn tutor_context(problem: &MathProblem, user_answer: &str) -> String {
  format!(
    "Problem: {}. Correct Answer: {}. User's input so far: {}",
    problem.question, problem.correct_answer, user_answer
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn offline_generation_serves_the_fixed_fallback_for_every_mission() {
    let state = AppState::offline();
    for m in Mission::ALL {
      for d in Difficulty::ALL {
        let p = generate_problem(&state, m, d).await;
        assert_eq!(p.correct_answer, 110.0);
        assert_eq!(p.sequence_data.as_deref(), Some("2, 4, 6, ..."));
        assert_eq!(p.explanation_steps.len(), 10);
        assert_eq!(p.variable_unit.as_deref(), Some("หน่วย"));
      }
    }
  }

  #[tokio::test]
  async fn offline_tutor_serves_the_configure_key_sentence() {
    let state = AppState::offline();
    let a = ask_tutor(&state, "สูตรคืออะไร", "Problem: x").await;
    let b = ask_tutor(&state, "", "").await;
    assert_eq!(a, TUTOR_OFFLINE_TEXT);
    assert_eq!(b, TUTOR_OFFLINE_TEXT);
  }

  #[tokio::test]
  async fn unreachable_service_converges_to_the_same_fallback() {
    // A client pointed at a refused port fails the call; the logic layer
    // must absorb it into the identical fallback the offline path serves.
    let gemini = crate::gemini::Gemini {
      client: reqwest::Client::new(),
      api_key: "test-key".into(),
      base_url: "http://127.0.0.1:9".into(),
      model: "gemini-2.5-flash".into(),
    };
    let state = AppState {
      gemini: Some(gemini),
      prompts: crate::config::Prompts::default(),
    };

    let p = generate_problem(&state, Mission::Geometric, Difficulty::Hard).await;
    let offline = fallback_problem(Mission::Geometric);
    assert_eq!(p.question, offline.question);
    assert_eq!(p.correct_answer, offline.correct_answer);
    assert_eq!(p.explanation_steps, offline.explanation_steps);

    let t = ask_tutor(&state, "q", "ctx").await;
    assert_eq!(t, TUTOR_ERROR_TEXT);
  }

  #[test]
  fn tutor_context_includes_question_answer_and_input() {
    let p = fallback_problem(Mission::Arithmetic);
    let ctx = tutor_context(&p, "108");
    assert!(ctx.contains(&p.question));
    assert!(ctx.contains("110"));
    assert!(ctx.ends_with("User's input so far: 108"));
  }
}
