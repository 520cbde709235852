// All LLM prompt constants. One canonical prompt per capability, no
// parallel variants.

/// CV structuring prompt. Replace `{resume_text}` before sending.
/// The schema spelled out here mirrors `models::cv::CvDocument` exactly; the
/// response is validated against it at the parse boundary.
pub const STRUCTURE_CV_PROMPT: &str = r#"You are an expert resume parser. Convert the resume text below into structured JSON.

You MUST respond with valid JSON only. Do NOT include any text outside the JSON object. Do NOT use markdown code fences. Do NOT invent facts not present in the resume.

Return a JSON object with this EXACT schema (omit sections that have no data):
{
  "metadata": {
    "section_order": ["header", "summary", "experience", "education", "skills", "projects", "certifications", "languages", "interests"]
  },
  "sections": {
    "header": {
      "name": "Jane Doe",
      "title": "Senior Software Engineer",
      "email": "jane@example.com",
      "phone": "+1 555 000 0000",
      "location": "Zurich, Switzerland",
      "website": "https://janedoe.dev",
      "linkedin": "https://linkedin.com/in/janedoe"
    },
    "summary": { "content": "One short paragraph." },
    "experience": {
      "items": [
        {
          "title": "Senior Engineer",
          "company": "Acme Corp",
          "location": "Remote",
          "start_date": "2020-01",
          "end_date": null,
          "achievements": ["Did X, improving Y by Z%"],
          "technologies": ["Rust", "PostgreSQL"]
        }
      ]
    },
    "education": {
      "items": [
        {
          "institution": "ETH Zurich",
          "degree": "MSc",
          "field": "Computer Science",
          "start_date": "2014-09",
          "end_date": "2016-06",
          "gpa": null,
          "honors": []
        }
      ]
    },
    "skills": {
      "categories": [
        { "name": "Languages", "items": ["Rust", "Python"] }
      ]
    },
    "projects": {
      "items": [
        {
          "name": "Project name",
          "description": "What it does.",
          "url": null,
          "achievements": [],
          "technologies": []
        }
      ]
    },
    "certifications": { "items": [ { "name": "...", "issuer": "...", "date": "2021-03" } ] },
    "languages": { "items": [ { "language": "English", "proficiency": "Native" } ] },
    "interests": { "items": ["Alpine climbing"] }
  }
}

Rules:
- `header.name` is required; every other field may be null or omitted.
- Dates use "YYYY-MM" or "YYYY-MM-DD". Use null for ongoing end dates.
- `section_order` must list only sections that actually carry data, in the
  order they should appear on the final document.
- Keep achievement bullets as they are written; do not embellish.

RESUME TEXT:
{resume_text}"#;

/// Target-job tailoring prompt. Replace `{cv_json}` and `{job_text}`.
/// Returns the same CvDocument schema as the structuring prompt.
pub const TAILOR_CV_PROMPT: &str = r#"You are an expert resume strategist. Tailor the structured resume below to the target job description.

You MUST respond with valid JSON only, using the exact same schema as the input resume. Do NOT use markdown code fences. Do NOT invent experience, employers, dates or skills that are not in the input resume. Tailoring means reordering, rephrasing and emphasizing, never fabricating.

Tailoring rules:
- Reorder `section_order` and the items inside sections so the most relevant
  content for this job comes first.
- Rephrase achievement bullets to use the vocabulary of the job description
  where the underlying fact supports it.
- Rewrite `summary.content` to address the role directly.
- Drop items that are clearly irrelevant to the role; keep everything else.

CURRENT RESUME (JSON):
{cv_json}

TARGET JOB DESCRIPTION:
{job_text}"#;

/// Outreach email generation prompt. Replace `{preferences_json}`,
/// `{job_text}` and `{instructions}`.
pub const OUTREACH_EMAIL_PROMPT: &str = r#"You are helping a candidate write a short, specific outreach email for a job application.

You MUST respond with valid JSON only. Do NOT use markdown code fences.

Return:
{
  "subject": "Subject line under 80 characters",
  "body": "Plain-text email body, 120-180 words, no placeholders like [Name]"
}

Rules:
- Ground every claim in the candidate profile below; invent nothing.
- Mention at most two concrete achievements relevant to the job.
- Professional but not stiff; no buzzword padding.

CANDIDATE PROFILE (JSON):
{preferences_json}

TARGET JOB:
{job_text}

ADDITIONAL INSTRUCTIONS FROM THE CANDIDATE:
{instructions}"#;
