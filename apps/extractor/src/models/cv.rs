use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::extraction::lenient::{opt_string, string_list};
use crate::extraction::prompts::CV_FIELD_GUIDE;
use crate::extraction::StructuredRecord;

/// Flat CV record extracted from a profile or resume page.
///
/// Every field is optional; fields the model adds beyond these are kept in
/// `extra` and returned to the caller untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvData {
    #[serde(default, deserialize_with = "opt_string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub contact_info: Option<String>,

    #[serde(default, deserialize_with = "string_list")]
    pub job_titles: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub companies: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub experience_details: Vec<String>,

    #[serde(default, deserialize_with = "string_list")]
    pub technical_skills: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub languages: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub frameworks: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub tools: Vec<String>,

    #[serde(default, deserialize_with = "string_list")]
    pub degrees: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub institutions: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StructuredRecord for CvData {
    const KIND: &'static str = "cv";
    const SUBJECT: &'static str = "professional CV information";
    const FIELD_GUIDE: &'static str = CV_FIELD_GUIDE;

    fn json_schema() -> Value {
        let list = json!({ "type": "array", "items": { "type": "string" } });
        let text = json!({ "type": ["string", "null"] });
        json!({
            "type": "object",
            "properties": {
                "full_name": text,
                "summary": text,
                "contact_info": text,
                "job_titles": list,
                "companies": list,
                "experience_details": list,
                "technical_skills": list,
                "languages": list,
                "frameworks": list,
                "tools": list,
                "degrees": list,
                "institutions": list,
            },
            "required": ["full_name"],
        })
    }

    fn label(&self) -> Option<&str> {
        self.full_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cv_full_deserializes() {
        let json = r#"{
            "full_name": "Grace Hopper",
            "summary": "Computer scientist and naval officer.",
            "contact_info": "grace@example.com",
            "job_titles": ["Rear Admiral", "Senior Mathematician"],
            "companies": ["US Navy", "Remington Rand"],
            "experience_details": ["Led development of COBOL"],
            "technical_skills": ["Compilers"],
            "languages": ["COBOL", "FLOW-MATIC"],
            "frameworks": [],
            "tools": ["UNIVAC I"],
            "degrees": ["PhD Mathematics"],
            "institutions": ["Yale University", "Vassar College"]
        }"#;

        let cv: CvData = serde_json::from_str(json).unwrap();
        assert_eq!(cv.label(), Some("Grace Hopper"));
        assert_eq!(cv.companies.len(), 2);
        assert_eq!(cv.languages, vec!["COBOL", "FLOW-MATIC"]);
        assert!(cv.frameworks.is_empty());
        assert!(cv.extra.is_empty());
    }

    #[test]
    fn test_cv_keeps_unknown_fields() {
        let cv: CvData =
            serde_json::from_str(r#"{"full_name": "Ada", "github": "ada-l", "awards": ["Medal"]}"#)
                .unwrap();
        assert_eq!(cv.extra["github"], "ada-l");

        let out = serde_json::to_value(&cv).unwrap();
        assert_eq!(out["awards"][0], "Medal");
        assert_eq!(out["job_titles"], json!([]));
    }

    #[test]
    fn test_cv_schema_lists_every_field() {
        let schema = CvData::json_schema();
        let properties = schema["properties"].as_object().unwrap();
        assert_eq!(properties.len(), 12);
        assert_eq!(properties["tools"]["type"], "array");
    }
}
