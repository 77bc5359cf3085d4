//! Hardcoded fallback content served when the Gemini path is unavailable
//! or fails. Guarantees the app always reaches a renderable state.

use crate::domain::{MathProblem, Mission};

/// Fixed Thai sentence returned by the tutor when no API key is configured.
/// User-visible guidance, not an error.
pub const TUTOR_OFFLINE_TEXT: &str =
  "กรุณาตั้งค่า API Key เพื่อใช้งานระบบ AI Tutor (Offline Mode)";

/// Fixed Thai sentence returned when the model replies with an empty body.
pub const TUTOR_EMPTY_REPLY_TEXT: &str = "ขออภัย ครูไม่สามารถตอบได้ในขณะนี้";

/// Fixed Thai sentence returned when the tutor call fails outright.
pub const TUTOR_ERROR_TEXT: &str = "เกิดข้อผิดพลาดในการเชื่อมต่อกับครู AI";

/// The single hardcoded problem used whenever generation is impossible.
///
/// Deliberately ignores the requested mission and always returns the same
/// arithmetic-series example. Flagged as a possible defect upstream; kept
/// as-is here. The `_mission` parameter stays so every generation path has
/// the same signature.
pub fn fallback_problem(_mission: Mission) -> MathProblem {
  MathProblem {
    question: "ระบบ AI กำลังปิดปรับปรุงหรือไม่มี API Key กรุณาลองใหม่ภายหลัง (โจทย์ตัวอย่าง: จงหาผลบวก 10 พจน์แรก)"
      .into(),
    sequence_data: Some("2, 4, 6, ...".into()),
    correct_answer: 110.0,
    hint: "ใช้สูตร Sn = n/2 * (2a1 + (n-1)d)".into(),
    explanation_steps: vec![
      "นี่คือโหมด Offline (เนื่องจากไม่พบ API Key หรือเกิดข้อผิดพลาด)".into(),
      "จากโจทย์ ลำดับคือ 2, 4, 6, ...".into(),
      "จะได้พจน์แรก a1 = 2".into(),
      "ผลต่างร่วม d = 4 - 2 = 2".into(),
      "ต้องการหาผลบวก 10 พจน์แรก (S10)".into(),
      "จากสูตร Sn = n/2 * (2a1 + (n-1)d)".into(),
      "แทนค่าลงในสูตร: S10 = 10/2 * (2(2) + (10-1)(2))".into(),
      "S10 = 5 * (4 + 9(2))".into(),
      "S10 = 5 * 22".into(),
      "S10 = 110".into(),
    ],
    variable_unit: Some("หน่วย".into()),
    choices: None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fallback_is_identical_across_missions() {
    let base = fallback_problem(Mission::Arithmetic);
    for m in Mission::ALL {
      let p = fallback_problem(m);
      assert_eq!(p.question, base.question);
      assert_eq!(p.correct_answer, 110.0);
      assert_eq!(p.sequence_data.as_deref(), Some("2, 4, 6, ..."));
      assert_eq!(p.explanation_steps.len(), 10);
      assert_eq!(p.variable_unit.as_deref(), Some("หน่วย"));
    }
  }
}
