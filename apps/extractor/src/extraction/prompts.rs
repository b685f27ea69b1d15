// Prompt constants for phase 2.
// Templates carry `{subject}`, `{fields}` and `{content}` placeholders; content is
// substituted last so page text can never inject a placeholder.

/// Direct strategy: one user message enumerating every field and its shape.
pub const DIRECT_PROMPT_TEMPLATE: &str = r#"
Extract {subject} from the following markdown content.

Return a JSON object with these fields (return empty arrays/null if not found):
{fields}

MARKDOWN CONTENT:
{content}

Return only valid JSON, no markdown formatting."#;

/// Schema-guided strategy: the schema travels in `response_format`, so the
/// prompt only frames the task.
pub const SCHEMA_PROMPT_TEMPLATE: &str = r#"Extract {subject} from the page content below.
Fill the fields defined by the response schema. Use only what the content states.

PAGE CONTENT:
{content}"#;

pub const CV_FIELD_GUIDE: &str = "\
- full_name: string (person's name)
- summary: string (professional summary)
- job_titles: array of strings (job positions)
- companies: array of strings (companies worked at)
- experience_details: array of strings (key achievements/responsibilities)
- technical_skills: array of strings (all technical skills)
- languages: array of strings (programming languages)
- frameworks: array of strings (frameworks/libraries)
- tools: array of strings (tools/technologies)
- degrees: array of strings (education degrees)
- institutions: array of strings (schools/universities)
- contact_info: string (email/contact if visible)";

pub const JOB_FIELD_GUIDE: &str = "\
- title: string (job title)
- company: string (hiring company)
- location: string (city/country or \"remote\")
- employment_type: string (full-time, part-time, contract, internship)
- salary: string (compensation as written)
- required_skills: array of strings (must-have skills)
- nice_to_have_skills: array of strings (preferred/bonus skills)
- experience_years: integer (minimum years of experience required)
- seniority: string, one of intern, junior, mid, senior, lead, principal, executive
- responsibilities: array of strings (what the role does day to day)
- benefits: array of strings (perks and benefits)";
