//! HTTP endpoint handlers. These are thin stateless wrappers over core logic
//! for clients that keep their own session state. Each handler is
//! instrumented and logs parameters plus basic result info.

use axum::{
  extract::{Query, State},
  response::IntoResponse,
  Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::logic::{ask_tutor, generate_problem};
use crate::protocol::*;
use crate::state::AppState;
use crate::verify::check_answer;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state), fields(mission = ?q.mission, difficulty = ?q.difficulty))]
pub async fn http_get_problem(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ProblemQuery>,
) -> impl IntoResponse {
  let problem = generate_problem(&state, q.mission, q.difficulty).await;
  info!(target: "problem", mission = ?q.mission, difficulty = ?q.difficulty, "HTTP problem served");
  Json(problem)
}

#[instrument(level = "info", skip(body), fields(answer_len = body.answer.len()))]
pub async fn http_post_answer(Json(body): Json<AnswerIn>) -> impl IntoResponse {
  let correct = check_answer(&body.answer, body.correct_answer);
  info!(target: "problem", ?correct, "HTTP answer checked");
  Json(AnswerOut { correct })
}

#[instrument(level = "info", skip(state, body), fields(question_len = body.question.len()))]
pub async fn http_post_tutor(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TutorIn>,
) -> impl IntoResponse {
  let text = ask_tutor(&state, &body.question, &body.context).await;
  Json(TutorOut { text })
}
