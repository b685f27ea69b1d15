use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use crate::extraction::lenient::{opt_string, opt_years, string_list};
use crate::extraction::prompts::JOB_FIELD_GUIDE;
use crate::extraction::StructuredRecord;

/// Seniority level of a posting. Drives the `enum` in the extraction schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    Intern,
    Junior,
    Mid,
    Senior,
    Lead,
    Principal,
    Executive,
}

impl Seniority {
    pub const ALL: [Seniority; 7] = [
        Seniority::Intern,
        Seniority::Junior,
        Seniority::Mid,
        Seniority::Senior,
        Seniority::Lead,
        Seniority::Principal,
        Seniority::Executive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::Intern => "intern",
            Seniority::Junior => "junior",
            Seniority::Mid => "mid",
            Seniority::Senior => "senior",
            Seniority::Lead => "lead",
            Seniority::Principal => "principal",
            Seniority::Executive => "executive",
        }
    }

    /// Reads the common spellings models produce ("Mid-Level", "Entry level", "Staff").
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        let level = match normalized.as_str() {
            "intern" | "internship" | "trainee" => Seniority::Intern,
            "junior" | "entry" | "entry level" | "graduate" => Seniority::Junior,
            "mid" | "mid level" | "middle" | "intermediate" => Seniority::Mid,
            "senior" | "sr" => Seniority::Senior,
            "lead" | "team lead" | "tech lead" => Seniority::Lead,
            "principal" | "staff" | "distinguished" => Seniority::Principal,
            "executive" | "director" | "vp" | "c level" => Seniority::Executive,
            _ => return None,
        };
        Some(level)
    }
}

fn opt_seniority<'de, D>(deserializer: D) -> Result<Option<Seniority>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string(deserializer)?.and_then(|raw| Seniority::parse_loose(&raw)))
}

/// Flat job-posting record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobData {
    #[serde(default, deserialize_with = "opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub employment_type: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub salary: Option<String>,

    #[serde(default, deserialize_with = "string_list")]
    pub required_skills: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub nice_to_have_skills: Vec<String>,
    #[serde(default, deserialize_with = "opt_years")]
    pub experience_years: Option<u32>,
    #[serde(default, deserialize_with = "opt_seniority")]
    pub seniority: Option<Seniority>,
    #[serde(default, deserialize_with = "string_list")]
    pub responsibilities: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub benefits: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StructuredRecord for JobData {
    const KIND: &'static str = "job_posting";
    const SUBJECT: &'static str = "job posting information";
    const FIELD_GUIDE: &'static str = JOB_FIELD_GUIDE;

    fn json_schema() -> Value {
        let list = json!({ "type": "array", "items": { "type": "string" } });
        let text = json!({ "type": ["string", "null"] });
        // Nullable field: the enum admits `null` as well.
        let mut levels: Vec<Value> = Seniority::ALL.iter().map(|s| json!(s.as_str())).collect();
        levels.push(Value::Null);
        json!({
            "type": "object",
            "properties": {
                "title": text,
                "company": text,
                "location": text,
                "employment_type": text,
                "salary": text,
                "required_skills": list,
                "nice_to_have_skills": list,
                "experience_years": {
                    "type": ["integer", "null"],
                    "minimum": 0,
                    "description": "Minimum years of experience required",
                },
                "seniority": {
                    "type": ["string", "null"],
                    "enum": levels,
                },
                "responsibilities": list,
                "benefits": list,
            },
            "required": ["title", "company", "required_skills"],
        })
    }

    fn label(&self) -> Option<&str> {
        self.title.as_deref()
    }
}
