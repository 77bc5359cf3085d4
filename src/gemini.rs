//! Minimal Gemini client for our two use-cases.
//!
//! We only call `generateContent` and request either plain text or a strict
//! JSON object constrained by a response schema. Calls are instrumented and
//! log model name, latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{Difficulty, MathProblem, Mission};
use crate::util::fill_template;

/// Placeholder value some deployments ship instead of a real key.
/// Treated exactly like an absent key: offline mode.
const SENTINEL_KEY: &str = "dummy-key";

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl Gemini {
  /// Construct the client if GEMINI_API_KEY holds a usable value; otherwise None.
  /// An empty key or the sentinel placeholder selects offline mode, not an error.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("GEMINI_API_KEY").ok()?;
    if api_key.is_empty() || api_key == SENTINEL_KEY {
      return None;
    }
    let base_url = std::env::var("GEMINI_BASE_URL")
      .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// One `generateContent` round-trip. Returns the first candidate's text.
  #[instrument(level = "info", skip(self, system, user, generation_config), fields(model = %self.model))]
  async fn generate_content(
    &self,
    system: &str,
    user: &str,
    generation_config: Option<serde_json::Value>,
  ) -> Result<String, String> {
    let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
    let req = GenerateContentRequest {
      system_instruction: ContentReq { role: None, parts: vec![PartReq { text: system.into() }] },
      contents: vec![ContentReq {
        role: Some("user".into()),
        parts: vec![PartReq { text: user.into() }],
      }],
      generation_config,
    };

    let res = self
      .client
      .post(&url)
      .header(CONTENT_TYPE, "application/json")
      .header("x-goog-api-key", &self.api_key)
      .json(&req)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_gemini_error(&body).unwrap_or(body);
      return Err(format!("Gemini HTTP {}: {}", status, msg));
    }

    let body: GenerateContentResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage_metadata {
      info!(
        prompt_tokens = ?usage.prompt_token_count,
        candidate_tokens = ?usage.candidates_token_count,
        total_tokens = ?usage.total_token_count,
        "Gemini usage"
      );
    }

    let text = body
      .candidates
      .first()
      .and_then(|c| c.content.as_ref())
      .and_then(|c| c.parts.first())
      .and_then(|p| p.text.clone())
      .unwrap_or_default();

    Ok(text.trim().to_string())
  }

  /// Plain-text completion. Used for tutor replies.
  async fn generate_plain(&self, system: &str, user: &str) -> Result<String, String> {
    self.generate_content(system, user, None).await
  }

  /// Schema-constrained JSON completion, decoded strictly into T.
  async fn generate_json<T: for<'a> Deserialize<'a>>(
    &self,
    system: &str,
    user: &str,
    schema: serde_json::Value,
  ) -> Result<T, String> {
    let cfg = json!({
      "responseMimeType": "application/json",
      "responseSchema": schema,
    });
    let text = self.generate_content(system, user, Some(cfg)).await?;
    if text.is_empty() {
      return Err("No data returned from AI".into());
    }
    serde_json::from_str::<T>(&text).map_err(|e| format!("JSON parse error: {}", e))
  }

  // --- High-level helpers (domain-specialized) ---

  /// Generate one problem for the given mission + difficulty.
  /// Errors here are absorbed by the caller into the fixed fallback problem.
  #[instrument(level = "info", skip(self, prompts, mission, difficulty), fields(?mission, ?difficulty, model = %self.model))]
  pub async fn generate_problem(
    &self,
    prompts: &Prompts,
    mission: Mission,
    difficulty: Difficulty,
  ) -> Result<MathProblem, String> {
    let topic = mission.topic_label();
    let system = fill_template(
      &prompts.problem_system_template,
      &[("topic", topic), ("difficulty", difficulty.label())],
    );
    let user = fill_template(&prompts.problem_user_template, &[("topic", topic)]);

    let start = std::time::Instant::now();
    let result = self
      .generate_json::<MathProblem>(&system, &user, problem_response_schema())
      .await;
    let elapsed = start.elapsed();

    match &result {
      Ok(p) => info!(
        ?elapsed,
        steps = p.explanation_steps.len(),
        question_preview = %crate::util::trunc_for_log(&p.question, 60),
        "Problem generated"
      ),
      Err(e) => error!(?elapsed, error = %e, "Model call failed during problem generation"),
    }
    result
  }

  /// Tutor reply: free-text question plus caller-assembled problem context.
  #[instrument(level = "info", skip(self, prompts, question, context), fields(question_len = question.len(), context_len = context.len()))]
  pub async fn tutor_reply(
    &self,
    prompts: &Prompts,
    question: &str,
    context: &str,
  ) -> Result<String, String> {
    let user = format!("Context Problem: {}\n\nUser Question: {}", context, question);
    self.generate_plain(&prompts.tutor_system, &user).await
  }
}

/// Response schema constraining the problem reply (Gemini structured output).
/// Mirrors `MathProblem`; question/correctAnswer/explanationSteps/hint required.
fn problem_response_schema() -> serde_json::Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "question": { "type": "STRING", "description": "The text of the math problem in Thai" },
      "sequenceData": { "type": "STRING", "description": "The sequence numbers if applicable (e.g., '2, 5, 8, ...'), else empty string" },
      "correctAnswer": { "type": "NUMBER", "description": "The numeric answer" },
      "hint": { "type": "STRING", "description": "A helpful hint without giving the answer" },
      "explanationSteps": {
        "type": "ARRAY",
        "items": { "type": "STRING" },
        "description": "An ordered list of steps to solve the problem. Each item is one line of explanation."
      },
      "variableUnit": { "type": "STRING", "description": "Unit of the answer if any (e.g. 'หน่วย', 'บาท', 'พจน์')" }
    },
    "required": ["question", "correctAnswer", "explanationSteps", "hint"]
  })
}

// --- Wire DTOs ---

#[derive(Serialize)]
struct GenerateContentRequest {
  #[serde(rename = "system_instruction")]
  system_instruction: ContentReq,
  contents: Vec<ContentReq>,
  #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
  generation_config: Option<serde_json::Value>,
}
#[derive(Serialize)]
struct ContentReq {
  #[serde(skip_serializing_if = "Option::is_none")]
  role: Option<String>,
  parts: Vec<PartReq>,
}
#[derive(Serialize)]
struct PartReq {
  text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  #[serde(rename = "usageMetadata", default)]
  usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
struct Candidate {
  #[serde(default)]
  content: Option<ContentResp>,
}
#[derive(Deserialize)]
struct ContentResp {
  #[serde(default)]
  parts: Vec<PartResp>,
}
#[derive(Deserialize)]
struct PartResp {
  #[serde(default)]
  text: Option<String>,
}
#[derive(Deserialize)]
struct UsageMetadata {
  #[serde(rename = "promptTokenCount", default)]
  prompt_token_count: Option<u32>,
  #[serde(rename = "candidatesTokenCount", default)]
  candidates_token_count: Option<u32>,
  #[serde(rename = "totalTokenCount", default)]
  total_token_count: Option<u32>,
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn schema_requires_the_four_mandatory_fields() {
    let s = problem_response_schema();
    let required: Vec<&str> = s["required"]
      .as_array()
      .unwrap()
      .iter()
      .map(|v| v.as_str().unwrap())
      .collect();
    assert_eq!(required, vec!["question", "correctAnswer", "explanationSteps", "hint"]);
  }

  #[test]
  fn error_body_extraction() {
    let body = r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
    assert_eq!(extract_gemini_error(body).as_deref(), Some("quota exceeded"));
    assert!(extract_gemini_error("not json").is_none());
  }

  #[test]
  fn candidate_text_decodes_from_wire_shape() {
    let raw = r#"{"candidates":[{"content":{"parts":[{"text":"hello"}]}}],
      "usageMetadata":{"promptTokenCount":10,"candidatesTokenCount":5,"totalTokenCount":15}}"#;
    let resp: GenerateContentResponse = serde_json::from_str(raw).unwrap();
    let text = resp
      .candidates
      .first()
      .and_then(|c| c.content.as_ref())
      .and_then(|c| c.parts.first())
      .and_then(|p| p.text.clone());
    assert_eq!(text.as_deref(), Some("hello"));
    assert_eq!(resp.usage_metadata.unwrap().total_token_count, Some(15));
  }
}
