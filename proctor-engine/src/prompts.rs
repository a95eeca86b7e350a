//! Prompt templates, deterministic fallback texts, and score extraction.
//!
//! The fallback texts are emitted verbatim whenever the completion service is
//! unconfigured or fails, so the interview can always run to completion.

use once_cell::sync::Lazy;
use regex::Regex;

/// Number of AI questions (the greeting plus five follow-ups) after which the
/// next turn issues the closing assessment that carries the score.
pub const TOTAL_AI_TURNS: usize = 6;

/// Score used when the assessment text carries no parsable SCORE marker.
pub const DEFAULT_SCORE: i64 = 75;

static SCORE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)SCORE:\s*(\d+)").expect("score pattern is valid"));

/// Opening message appended by `start`: greeting plus the literal first question.
pub fn greeting(role: &str) -> String {
    format!(
        "Hello! I'll be conducting your {role} interview today. This will be a \
         comprehensive interview covering your skills, experience, and problem-solving \
         abilities. I'll ask you 5-6 questions, and we'll have a natural conversation. \
         Let's begin.\n\nQuestion 1: Can you tell me about your background and what \
         interests you about the {role} role?"
    )
}

/// System directive for a mid-interview turn asking question `number`.
pub fn question_directive(role: &str, number: usize) -> String {
    format!(
        "You are an expert interviewer conducting a {role} interview. Ask relevant, \
         insightful questions that assess the candidate's skills, experience, and \
         cultural fit. Keep questions concise and professional. This is question \
         {number} of approximately 6. Make each question progressively more \
         challenging or specific based on their previous answers."
    )
}

/// System directive for the closing turn: structured assessment ending with
/// the literal SCORE marker.
pub fn assessment_directive(role: &str) -> String {
    format!(
        "You are an expert interviewer conducting a {role} interview. The interview \
         is now complete. Provide a comprehensive final feedback that includes:\n\n\
         1. Overall Assessment (2-3 sentences)\n\
         2. Strengths (bullet points)\n\
         3. Areas for Improvement (bullet points)\n\
         4. Final Score out of 100\n\n\
         Format your response clearly with these sections. Be constructive and \
         specific. End with: SCORE: [number]/100"
    )
}

/// Canned follow-up question used when the completion service is unavailable
/// mid-interview.
pub fn fallback_followup(number: usize) -> String {
    format!(
        "That's interesting. Question {number}: Can you describe a challenging \
         project you've worked on and how you approached solving the main obstacles?"
    )
}

/// Canned closing assessment used when the completion service is unavailable
/// on the final turn. Carries a fixed score of 75.
pub fn fallback_assessment() -> String {
    "Thank you for completing the interview!\n\n\
     **Overall Assessment**\n\
     You demonstrated good communication skills and provided thoughtful responses \
     throughout the interview.\n\n\
     **Strengths:**\n\
     - Clear communication\n\
     - Relevant experience\n\
     - Problem-solving approach\n\n\
     **Areas for Improvement:**\n\
     - Provide more specific examples\n\
     - Expand on technical details\n\
     - Demonstrate deeper industry knowledge\n\n\
     **SCORE: 75/100**\n\n\
     Thank you for your time. Good luck with your job search!"
        .to_string()
}

/// Extract the numeric score from free-form assessment text.
///
/// Case-insensitive match on `SCORE: <n>`; defaults to 75 when absent or
/// unparsable, and clamps to the 0-100 range.
pub fn extract_score(text: &str) -> i64 {
    SCORE_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .unwrap_or(DEFAULT_SCORE)
        .clamp(0, 100)
}

/// Strip the SCORE marker line from a feedback text for display purposes.
pub fn strip_score_marker(feedback: &str) -> String {
    feedback
        .lines()
        .filter(|line| !SCORE_PATTERN.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}
