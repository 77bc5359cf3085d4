//! Prompt configuration loaded from TOML (optional).
//!
//! Defaults reproduce the built-in Thai math-teacher prompts; a TOML file at
//! TUTOR_CONFIG_PATH can override any of them to tune tone/structure.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TutorConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompts used by the Gemini client.
/// Templates use `{topic}` and `{difficulty}` placeholders.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  // Problem generation (strict-JSON path)
  pub problem_system_template: String,
  pub problem_user_template: String,
  // Tutor replies (plain-text path)
  pub tutor_system: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      problem_system_template: "You are a strict mathematics teacher generator. \
Generate a math problem about '{topic}' with '{difficulty}' difficulty level. \
The problem must be clear and solvable. \
The answer must be a number (integer or decimal). \
Language: Thai (ภาษาไทย). \
Ensure the question is formatted nicely. \
If it's a sequence, provide the first few terms.\n\n\
IMPORTANT: Provide the 'explanationSteps' as an array of strings. Each string represents ONE step \
of the calculation or logic. Break it down line-by-line so it is easy to read."
        .into(),
      problem_user_template: "Create a unique math problem about {topic}.".into(),
      tutor_system: "You are a helpful Thai math tutor. Explain clearly, encourage the student. \
Do not just give the answer directly, guide them to it. Keep it concise."
        .into(),
    }
  }
}

/// Attempt to load `TutorConfig` from TUTOR_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_tutor_config_from_env() -> Option<TutorConfig> {
  let path = std::env::var("TUTOR_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<TutorConfig>(&s) {
      Ok(cfg) => {
        info!(target: "mathquest_backend", %path, "Loaded tutor config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "mathquest_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "mathquest_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_prompts_carry_topic_and_difficulty_placeholders() {
    let p = Prompts::default();
    assert!(p.problem_system_template.contains("{topic}"));
    assert!(p.problem_system_template.contains("{difficulty}"));
    assert!(p.problem_user_template.contains("{topic}"));
  }

  #[test]
  fn toml_overrides_only_named_prompts() {
    let cfg: TutorConfig = toml::from_str(
      r#"
[prompts]
problem_system_template = "sys {topic} {difficulty}"
problem_user_template = "user {topic}"
tutor_system = "tutor"
"#,
    )
    .unwrap();
    assert_eq!(cfg.prompts.tutor_system, "tutor");
    assert_eq!(cfg.prompts.problem_user_template, "user {topic}");
  }
}
