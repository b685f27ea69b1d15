//! Best-effort parsing of an LLM reply into a structured record.

use serde_json::Value;

use crate::extraction::{ExtractionError, StructuredRecord};
use crate::llm_client::strip_json_fences;

/// Strips a code fence if present, parses JSON, then validates leniently.
pub fn parse_record<R: StructuredRecord>(reply: &str) -> Result<R, ExtractionError> {
    let body = strip_json_fences(reply);
    let value: Value = serde_json::from_str(body).map_err(ExtractionError::InvalidJson)?;

    if !value.is_object() {
        return Err(ExtractionError::Validation(
            "expected a JSON object at the top level".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| ExtractionError::Validation(e.to_string()))
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::CvData;
    use crate::models::job::JobData;

    #[test]
    fn test_fenced_json_reply() {
        let job: JobData = parse_record("```json\n{\"title\":\"Engineer\"}\n```").unwrap();
        assert_eq!(job.title.as_deref(), Some("Engineer"));
        assert!(job.company.is_none());
        assert!(job.required_skills.is_empty());
        assert!(job.seniority.is_none());
    }

    #[test]
    fn test_untagged_fence_and_bare_json() {
        let cv: CvData = parse_record("```\n{\"full_name\": \"Ada\"}\n```").unwrap();
        assert_eq!(cv.full_name.as_deref(), Some("Ada"));

        let cv: CvData = parse_record("  {\"full_name\": \"Ada\", \"hobby\": \"chess\"} ").unwrap();
        assert_eq!(cv.extra["hobby"], "chess");
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = parse_record::<CvData>("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidJson(_)));
        assert!(err.to_string().starts_with("LLM returned invalid JSON:"));
    }

    #[test]
    fn test_non_object_fails_validation() {
        let err = parse_record::<CvData>("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ExtractionError::Validation(_)));
    }

    #[test]
    fn test_wrong_field_shape_fails_validation() {
        let err = parse_record::<CvData>(r#"{"full_name": {"first": "Ada"}}"#).unwrap_err();
        assert!(matches!(err, ExtractionError::Validation(_)));
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }
}
