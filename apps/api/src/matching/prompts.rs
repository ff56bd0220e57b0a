// Prompt constants for resume matching.
// The system prompt is the shared JSON-only fragment from llm_client::prompts.

/// Fit assessment prompt. Replace `{job_description}` and `{resume_text}` before sending.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"You are helping a student outreach program match students to life sciences internships.
Assess how well this student fits the internship below.

JOB DESCRIPTION:
{job_description}

STUDENT RESUME:
{resume_text}

Weigh the following:
- Relevant coursework and academic background
- Skills that match the role
- Potential and motivation, which matter as much as experience for early-career and underrepresented students
- Interest and experience in the life sciences
- Leadership roles and extracurricular activities

Return ONLY a JSON object with this EXACT schema (no extra fields):
{
  "score": 0,
  "reasoning": "2-3 sentences explaining the match",
  "key_strengths": ["strength 1", "strength 2", "strength 3"],
  "concerns": ["concern, if any"]
}

Rules:
- "score" is an integer from 0 to 100.
- "key_strengths" holds short labels, at most three.
- "concerns" holds short labels and may be an empty array."#;

/// Fills the match prompt template. The resume is substituted last so text inside
/// it that happens to look like a placeholder is left alone.
pub fn build_match_prompt(job_description: &str, resume_text: &str) -> String {
    let (head, tail) = MATCH_PROMPT_TEMPLATE
        .split_once("{resume_text}")
        .unwrap_or((MATCH_PROMPT_TEMPLATE, ""));
    let mut prompt = head.replace("{job_description}", job_description);
    prompt.push_str(resume_text);
    prompt.push_str(tail);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_both_texts() {
        let prompt = build_match_prompt(
            "Seeking lab intern with biology coursework",
            "BS Biology, lab assistant 2 years",
        );
        assert!(prompt.contains("Seeking lab intern with biology coursework"));
        assert!(prompt.contains("BS Biology, lab assistant 2 years"));
        assert!(!prompt.contains("{job_description}"));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_prompt_requests_all_fields() {
        let prompt = build_match_prompt("job", "resume");
        for field in ["\"score\"", "\"reasoning\"", "\"key_strengths\"", "\"concerns\""] {
            assert!(prompt.contains(field), "missing {field}");
        }
    }

    #[test]
    fn test_placeholder_in_resume_is_not_expanded() {
        let prompt = build_match_prompt("Field biologist", "Objective: {job_description}");
        assert!(prompt.contains("Objective: {job_description}"));
    }
}
