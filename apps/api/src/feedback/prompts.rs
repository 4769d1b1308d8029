// Prompt for answer feedback. The same prompt goes to both providers.

use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION};

/// Replace: {job_position}, {job_desc}, {job_experience}, {question}, {user_answer},
///          {json_only}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"You are an experienced interviewer reviewing a candidate's answer in a mock interview.

Job Position: {job_position}
Job Description: {job_desc}
Years of Experience: {job_experience}

Question: {question}
Candidate Answer: {user_answer}

Depending on the question and the candidate's answer, give a rating for the answer from 1 to 10
and feedback as areas of improvement, in 3 to 5 lines.

Return a JSON object with exactly these fields:
{"rating": <number from 1 to 10>, "feedback": "<feedback text>"}

{json_only}"#;

/// Interview context embedded in the feedback prompt.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackContext<'a> {
    pub job_position: &'a str,
    pub job_desc: &'a str,
    pub job_experience: &'a str,
}

pub fn feedback_prompt(context: FeedbackContext<'_>, question: &str, user_answer: &str) -> String {
    fill_template(
        FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("job_position", context.job_position),
            ("job_desc", context.job_desc),
            ("job_experience", context.job_experience),
            ("question", question),
            ("user_answer", user_answer.trim()),
            ("json_only", JSON_ONLY_INSTRUCTION),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXT: FeedbackContext<'static> = FeedbackContext {
        job_position: "Backend Engineer",
        job_desc: "Rust, PostgreSQL",
        job_experience: "3",
    };

    #[test]
    fn test_prompt_embeds_question_and_answer() {
        let prompt = feedback_prompt(CONTEXT, "What is a mutex?", "  A lock.  ");
        assert!(prompt.contains("Question: What is a mutex?"));
        assert!(prompt.contains("Candidate Answer: A lock."));
        assert!(prompt.contains("Job Position: Backend Engineer"));
        assert!(prompt.contains("Years of Experience: 3"));
        assert!(!prompt.contains("{user_answer}"));
    }

    #[test]
    fn test_prompt_demands_bare_json() {
        let prompt = feedback_prompt(CONTEXT, "Q", "A");
        assert!(prompt.contains(r#"{"rating": <number from 1 to 10>"#));
        assert!(prompt.contains("JSON only"));
        assert!(prompt.contains("code fences"));
        assert!(prompt.contains("explanation"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(
            feedback_prompt(CONTEXT, "Q", "A"),
            feedback_prompt(CONTEXT, "Q", "A")
        );
    }
}
