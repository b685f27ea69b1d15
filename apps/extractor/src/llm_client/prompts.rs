// Cross-cutting prompt fragments shared by every extraction prompt.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured data extraction assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to free-text prompts so missing data is reported as empty, not invented.
pub const MISSING_FIELDS_INSTRUCTION: &str =
    "Return empty arrays or null for anything that is not present in the content. \
    Do NOT invent details.";
