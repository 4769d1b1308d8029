// Prompts for question generation (mock interviews and PYQ question sets).

use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION};

/// Replace: {job_position}, {job_desc}, {job_experience}, {count}, {json_only}
pub const INTERVIEW_PROMPT_TEMPLATE: &str = r#"You are an AI assistant helping with mock interview preparation.

Based on the following inputs:

- Job Position: {job_position}
- Job Description: {job_desc}
- Years of Experience: {job_experience}

Generate exactly {count} interview questions along with their answers.

Return only a valid JSON array of objects, with each object containing the fields:

- "Question": string
- "Answer": string

{json_only}"#;

/// Replace: {job_position}, {job_desc}, {job_experience}, {type_question}, {company},
///          {count}, {json_only}
pub const QUESTION_SET_PROMPT_TEMPLATE: &str = r#"You are an AI that only responds in JSON format.

Generate exactly {count} technical interview questions and answers for the role below.

Return ONLY a pure JSON array of objects.

Each object should have:
- "Question": the question as a string.
- "Answer": the answer as a string.

Job Position: {job_position}
Job Description: {job_desc}
Years of Experience: {job_experience}
Type of Questions: {type_question}
Target Company: {company}

{json_only}"#;

/// Role details shared by both question prompts.
#[derive(Debug, Clone, Copy)]
pub struct RoleDetails<'a> {
    pub job_position: &'a str,
    pub job_desc: &'a str,
    pub job_experience: &'a str,
}

pub fn interview_prompt(role: RoleDetails<'_>, count: u32) -> String {
    let count = count.to_string();
    fill_template(
        INTERVIEW_PROMPT_TEMPLATE,
        &[
            ("job_position", role.job_position),
            ("job_desc", role.job_desc),
            ("job_experience", role.job_experience),
            ("count", &count),
            ("json_only", JSON_ONLY_INSTRUCTION),
        ],
    )
}

pub fn question_set_prompt(
    role: RoleDetails<'_>,
    type_question: &str,
    company: &str,
    count: u32,
) -> String {
    let count = count.to_string();
    fill_template(
        QUESTION_SET_PROMPT_TEMPLATE,
        &[
            ("job_position", role.job_position),
            ("job_desc", role.job_desc),
            ("job_experience", role.job_experience),
            ("type_question", type_question),
            ("company", company),
            ("count", &count),
            ("json_only", JSON_ONLY_INSTRUCTION),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLE: RoleDetails<'static> = RoleDetails {
        job_position: "Full stack Developer",
        job_desc: "React, Node.js, MySQL",
        job_experience: "5",
    };

    #[test]
    fn test_interview_prompt_fields() {
        let prompt = interview_prompt(ROLE, 5);
        assert!(prompt.contains("- Job Position: Full stack Developer"));
        assert!(prompt.contains("- Job Description: React, Node.js, MySQL"));
        assert!(prompt.contains("- Years of Experience: 5"));
        assert!(prompt.contains("Generate exactly 5 interview questions"));
        assert!(prompt.contains("\"Question\": string"));
        assert!(prompt.contains("JSON only"));
        assert!(!prompt.contains("{json_only}"));
    }

    #[test]
    fn test_question_set_prompt_includes_tags() {
        let prompt = question_set_prompt(ROLE, "Leetcode", "Mercedes", 3);
        assert!(prompt.contains("Type of Questions: Leetcode"));
        assert!(prompt.contains("Target Company: Mercedes"));
        assert!(prompt.contains("Generate exactly 3 technical interview questions"));
        assert!(prompt.contains("code fences"));
    }

    #[test]
    fn test_prompts_are_deterministic() {
        assert_eq!(interview_prompt(ROLE, 5), interview_prompt(ROLE, 5));
        assert_eq!(
            question_set_prompt(ROLE, "CPP", "Apple", 5),
            question_set_prompt(ROLE, "CPP", "Apple", 5)
        );
    }
}
