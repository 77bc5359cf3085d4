//! WebSocket upgrade + message loop. Each connection owns one `Session`,
//! mutated only by its own loop, so session state needs no locking. Client
//! messages are parsed as JSON and dispatched; a request may produce more
//! than one reply (a navigation snapshot followed by a freshly loaded
//! problem).
//!
//! Requests on one connection are handled strictly in order, so an older
//! problem load cannot resolve after a newer navigation on the same socket.

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::domain::TutorRole;
use crate::logic::{ask_tutor, generate_problem, tutor_context};
use crate::protocol::{session_view, ClientWsMessage, ServerWsMessage};
use crate::session::{Session, SubmitOutcome, Transition};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "mathquest_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let mut session = Session::new();
  info!(target: "mathquest_backend", session = %session.id, "WebSocket connected");

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let replies = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "mathquest_backend", session = %session.id, "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, &mut session).await
          }
          Err(e) => vec![ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }],
        };

        for reply in replies {
          let out = serde_json::to_string(&reply).unwrap_or_else(|e| {
            serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) })
              .to_string()
          });
          if let Err(e) = socket.send(Message::Text(out)).await {
            error!(target: "mathquest_backend", session = %session.id, error = %e, "WS send error");
            return;
          }
        }
      }
      Message::Ping(payload) => {
        let _ = socket.send(Message::Pong(payload)).await;
      }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "mathquest_backend", session = %session.id, "WebSocket disconnected");
}

/// Dispatch one client message against the connection's session.
#[instrument(level = "info", skip(state, session), fields(session = %session.id))]
async fn handle_client_ws(
  msg: ClientWsMessage,
  state: &AppState,
  session: &mut Session,
) -> Vec<ServerWsMessage> {
  match msg {
    ClientWsMessage::Ping => vec![ServerWsMessage::Pong],

    ClientWsMessage::SelectMission { mission } => {
      session.select_mission(mission);
      vec![ServerWsMessage::Session { view: session_view(session) }]
    }

    ClientWsMessage::SelectDifficulty { difficulty } => {
      apply_transition(session.select_difficulty(difficulty), state, session).await
    }

    ClientWsMessage::BackToHome => {
      session.back_to_home();
      vec![ServerWsMessage::Session { view: session_view(session) }]
    }

    ClientWsMessage::BackToDifficulty => {
      apply_transition(session.back_to_difficulty(), state, session).await
    }

    ClientWsMessage::NextProblem => {
      apply_transition(session.request_next_problem(), state, session).await
    }

    ClientWsMessage::SubmitAnswer { answer } => match session.submit_answer(&answer) {
      SubmitOutcome::Evaluated(correct) => {
        info!(target: "problem", session = %session.id, %correct, "WS answer evaluated");
        vec![ServerWsMessage::AnswerResult { correct, locked: correct }]
      }
      SubmitOutcome::Locked | SubmitOutcome::Ignored => vec![ServerWsMessage::AnswerIgnored],
    },

    ClientWsMessage::AskTutor { question, answer_field } => {
      let Some(problem) = session.problem.clone() else {
        return vec![ServerWsMessage::Error { message: "No active problem to ask about.".into() }];
      };
      session.push_tutor_message(TutorRole::User, question.clone());
      let context = tutor_context(&problem, &answer_field);
      let reply = ask_tutor(state, &question, &context).await;
      session.push_tutor_message(TutorRole::Ai, reply.clone());
      vec![ServerWsMessage::TutorReply { text: reply }]
    }
  }
}

/// Run the load side effect a transition asks for, then report the new state.
async fn apply_transition(
  t: Transition,
  state: &AppState,
  session: &mut Session,
) -> Vec<ServerWsMessage> {
  match t {
    Transition::Done => vec![ServerWsMessage::Session { view: session_view(session) }],
    Transition::LoadProblem(mission, difficulty) => {
      let problem = generate_problem(state, mission, difficulty).await;
      session.install_problem(problem.clone());
      vec![
        ServerWsMessage::Session { view: session_view(session) },
        ServerWsMessage::Problem { problem },
      ]
    }
    Transition::Rejected(reason) => vec![ServerWsMessage::Error { message: reason.into() }],
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Difficulty, Mission};

  #[tokio::test]
  async fn select_difficulty_produces_snapshot_then_problem() {
    let state = AppState::offline();
    let mut session = Session::new();

    let replies =
      handle_client_ws(ClientWsMessage::SelectMission { mission: Mission::Arithmetic }, &state, &mut session)
        .await;
    assert!(matches!(replies.as_slice(), [ServerWsMessage::Session { .. }]));

    let replies = handle_client_ws(
      ClientWsMessage::SelectDifficulty { difficulty: Difficulty::Easy },
      &state,
      &mut session,
    )
    .await;
    assert!(matches!(
      replies.as_slice(),
      [ServerWsMessage::Session { .. }, ServerWsMessage::Problem { .. }]
    ));
    assert!(session.problem.is_some());
  }

  #[tokio::test]
  async fn submit_before_any_problem_is_ignored() {
    let state = AppState::offline();
    let mut session = Session::new();
    let replies =
      handle_client_ws(ClientWsMessage::SubmitAnswer { answer: "110".into() }, &state, &mut session).await;
    assert!(matches!(replies.as_slice(), [ServerWsMessage::AnswerIgnored]));
  }

  #[tokio::test]
  async fn offline_tutor_round_trip_appends_both_log_entries() {
    let state = AppState::offline();
    let mut session = Session::new();
    session.select_mission(Mission::Sigma);
    session.select_difficulty(Difficulty::Medium);
    session.install_problem(crate::fallback::fallback_problem(Mission::Sigma));

    let replies =
      handle_client_ws(
        ClientWsMessage::AskTutor { question: "ขอคำใบ้หน่อย".into(), answer_field: "55".into() },
        &state,
        &mut session,
      )
      .await;
    match replies.as_slice() {
      [ServerWsMessage::TutorReply { text }] => {
        assert_eq!(text, crate::fallback::TUTOR_OFFLINE_TEXT);
      }
      other => panic!("unexpected replies: {:?}", other),
    }
    assert_eq!(session.tutor_log.len(), 2);
    assert_eq!(session.tutor_log[0].role, TutorRole::User);
    assert_eq!(session.tutor_log[1].role, TutorRole::Ai);
  }
}
