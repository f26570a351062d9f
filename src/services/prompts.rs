//! Resume parsing prompts

use crate::models::openrouter::UpstreamMessage;

/// Characters of resume text forwarded to the model
pub const RESUME_PROMPT_CHAR_LIMIT: usize = 12_000;

/// Sampling temperature for resume parsing
pub const RESUME_PARSE_TEMPERATURE: f64 = 0.3;

/// Token budget for resume parsing
pub const RESUME_PARSE_MAX_TOKENS: u32 = 2000;

const RESUME_SYSTEM_PROMPT: &str = "You are an expert resume parser. Extract structured information from resumes \
and return ONLY valid JSON with no markdown formatting, no code fences and no commentary.";

const RESUME_SCHEMA: &str = r#"{
  "contact": {
    "name": "",
    "email": "",
    "phone": "",
    "location": "",
    "linkedin": "",
    "website": ""
  },
  "summary": "",
  "experience": [
    {
      "title": "",
      "company": "",
      "location": "",
      "startDate": "",
      "endDate": "",
      "current": false,
      "bullets": [""]
    }
  ],
  "education": [
    {
      "degree": "",
      "school": "",
      "location": "",
      "graduationDate": "",
      "gpa": ""
    }
  ],
  "skills": [""],
  "projects": [
    {
      "name": "",
      "description": "",
      "technologies": [""],
      "link": ""
    }
  ],
  "certifications": [
    {
      "name": "",
      "issuer": "",
      "date": ""
    }
  ]
}"#;

/// Leading slice of the resume that fits the prompt, cut on a character boundary
pub fn clip_resume_text(text: &str) -> &str {
    match text.char_indices().nth(RESUME_PROMPT_CHAR_LIMIT) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Build the system + user messages asking the model for structured resume JSON
pub fn resume_parse_messages(resume_text: &str) -> Vec<UpstreamMessage> {
    let user_prompt = format!(
        "Parse the following resume and return a JSON object with exactly this structure:\n\n\
         {schema}\n\n\
         Rules:\n\
         - Use empty strings or empty arrays for anything not present in the resume.\n\
         - Keep bullet points concise and preserve the original wording where possible.\n\
         - Set \"current\" to true only when the role has no end date.\n\
         - Return ONLY the JSON object.\n\n\
         Resume:\n{resume}",
        schema = RESUME_SCHEMA,
        resume = clip_resume_text(resume_text),
    );

    vec![
        UpstreamMessage::system(RESUME_SYSTEM_PROMPT),
        UpstreamMessage::user(user_prompt),
    ]
}
