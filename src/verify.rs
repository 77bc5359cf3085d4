//! Answer verification: absolute-tolerance comparison of the user's numeric input.

/// Allowed absolute deviation from the correct answer. Absolute, not relative.
pub const ANSWER_TOLERANCE: f64 = 0.01;

/// Parse the leading numeric portion of `raw` and compare against `correct`.
///
/// Input is read `parseFloat`-style: a valid float prefix followed by
/// trailing text (a unit, stray characters) still counts, e.g. "110 หน่วย"
/// reads as 110. Returns None when no prefix parses (empty, non-numeric):
/// the check simply does not run and no state changes. Otherwise
/// Some(|parsed - correct| < ANSWER_TOLERANCE).
pub fn check_answer(raw: &str, correct: f64) -> Option<bool> {
  let parsed = leading_float(raw)?;
  Some((parsed - correct).abs() < ANSWER_TOLERANCE)
}

/// Longest valid float prefix of the trimmed input, if any.
/// Textual forms ("inf", "NaN") are not accepted as answers.
fn leading_float(s: &str) -> Option<f64> {
  let s = s.trim();
  let mut end = 0;
  for (i, c) in s.char_indices() {
    match c {
      '0'..='9' | '+' | '-' | '.' | 'e' | 'E' => end = i + 1,
      _ => break,
    }
  }
  // The scanned region is ASCII, so shrinking by one byte stays on a char
  // boundary. Handles prefixes like "12e" where only "12" parses.
  while end > 0 {
    if let Ok(v) = s[..end].parse::<f64>() {
      return if v.is_finite() { Some(v) } else { None };
    }
    end -= 1;
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn within_tolerance_is_correct() {
    assert_eq!(check_answer("110.005", 110.0), Some(true));
    assert_eq!(check_answer("110", 110.0), Some(true));
    assert_eq!(check_answer(" 110.0 ", 110.0), Some(true));
  }

  #[test]
  fn outside_tolerance_is_incorrect() {
    assert_eq!(check_answer("109.98", 110.0), Some(false));
    assert_eq!(check_answer("110.01", 110.0), Some(false));
    assert_eq!(check_answer("-110", 110.0), Some(false));
  }

  #[test]
  fn numeric_prefix_with_trailing_text_still_counts() {
    assert_eq!(check_answer("110.005abc", 110.0), Some(true));
    assert_eq!(check_answer("110 หน่วย", 110.0), Some(true));
    assert_eq!(check_answer("109.98 คะแนน", 110.0), Some(false));
    // Dangling exponent: only the "12" parses.
    assert_eq!(check_answer("12e", 12.0), Some(true));
    assert_eq!(check_answer("1e3x", 1000.0), Some(true));
  }

  #[test]
  fn non_numeric_input_is_a_no_op() {
    assert_eq!(check_answer("abc", 110.0), None);
    assert_eq!(check_answer("abc110", 110.0), None);
    assert_eq!(check_answer("", 110.0), None);
    assert_eq!(check_answer("NaN", 110.0), None);
    assert_eq!(check_answer("inf", 110.0), None);
  }

  #[test]
  fn tolerance_is_absolute_not_relative() {
    // 0.009 off a tiny answer passes, 0.011 off a huge one fails.
    assert_eq!(check_answer("0.109", 0.1), Some(true));
    assert_eq!(check_answer("100000.011", 100000.0), Some(false));
  }
}
