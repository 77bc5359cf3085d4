//! Shared application state: prompt config and the optional Gemini client.
//!
//! Built once at startup from the environment and injected into handlers;
//! no ambient globals beyond this. Per-learner session state is NOT here —
//! each WebSocket connection owns its own `Session`.

use tracing::{info, instrument};

use crate::config::{load_tutor_config_from_env, Prompts};
use crate::gemini::Gemini;

#[derive(Clone)]
pub struct AppState {
  pub gemini: Option<Gemini>,
  pub prompts: Prompts,
}

impl AppState {
  /// Build state from env: load prompt overrides, init the Gemini client.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Self {
    let prompts = load_tutor_config_from_env()
      .map(|c| c.prompts)
      .unwrap_or_default();

    let gemini = Gemini::from_env();
    if let Some(g) = &gemini {
      info!(target: "mathquest_backend", base_url = %g.base_url, model = %g.model, "Gemini enabled.");
    } else {
      info!(target: "mathquest_backend", "Gemini disabled (no GEMINI_API_KEY). Offline fallback mode.");
    }

    Self { gemini, prompts }
  }

  /// State with no model client, regardless of environment. Test seam.
  #[cfg(test)]
  pub fn offline() -> Self {
    Self { gemini: None, prompts: Prompts::default() }
  }
}
