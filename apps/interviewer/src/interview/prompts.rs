// Interview prompt templates.
// One template per generation type; placeholders are `{name}` and filled in one pass.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::session::Phase;

pub const GREETING_PROMPT: &str = "\
As {recruiter_name}, greet candidate {user_name} for a Zoom interview.
- Start with \"Hi {user_name}\" for a personal touch.
- Keep it warm, concise, natural (e.g., \"Hi {user_name}, nice to meet you! How's your day going?\").
- One sentence, max 25 words.";

pub const FIRST_RESPONSE_PROMPT: &str = "\
As {recruiter_name}, reply to the candidate's greeting: \"{user_response}\".
- Use a warm, conversational tone (e.g., \"Glad you're doing well!\").
{reciprocate}- Ask about a specific project or skill from the resume.
- Resume context: {context}
- One sentence, max 25 words, ending with a question mark.";

/// Inserted into the first-response prompt when the candidate asked how we are.
pub const RECIPROCATE_LINE: &str =
    "- They asked how you are: respond briefly first (e.g., \"I'm good, thanks!\").\n";

pub const SHORT_ANSWER_PROMPT: &str = "\
As {recruiter_name}, notice the candidate's short answers.
- Ask an open-ended question to encourage detail (e.g., \"What's a project you're proud of?\").
- Keep it warm, conversational.
- One sentence, max 25 words.";

pub const FOLLOW_UP_PROMPT: &str = "\
As {recruiter_name}, ask a follow-up question in a Zoom interview.
Latest exchange:
{recent}

Resume/job context:
{context}

Topics discussed:
{asked_topics}

Ask one question (1 sentence, max 25 words):
- Focus: {focus}
- Use details from the answer (e.g., {answer_keywords}), resume, or job description.
- Sound warm, conversational (e.g., \"That's interesting! How...\").
- Avoid repeats, slang, fluff.
- End with a question mark.";

/// Replaces the phase focus when the last AI question was already asked before.
pub const NEW_TOPIC_FOCUS: &str =
    "Ask about a new topic from the resume or job description, avoiding {asked_topics}.";

pub const END_OF_INTERVIEW_PROMPT: &str = "\
As {recruiter_name}, wrap up the Zoom interview.
- Thank the candidate warmly and ask if they have questions about the role or team.
- Example: \"Thanks for chatting! Any questions about the role?\"
- One sentence, max 25 words.";

pub const CANDIDATE_ANSWER_PROMPT: &str = "\
As {recruiter_name}, answer the candidate's question: \"{candidate_question}\".
Recent conversation:
{conversation}
Job description:
{job_description}

Reply in 1-2 sentences, max 40 words:
- Use a warm, conversational tone, like answering a colleague.
- Tie it to the role, team, or job description if relevant (e.g., \"We use agile sprints...\").
- End with: \"Any other questions?\"";

pub const FEEDBACK_PROMPT: &str = "\
As {recruiter_name}, provide detailed feedback after a Zoom interview.
Conversation:
{conversation}

- Summarize performance across: project (experience), technical (skills), problem-solving (challenges), coding (code explanation), behavioral (teamwork), role-fit (motivation).
- Highlight 2-3 strengths with specific examples (e.g., \"Your Python script explanation was clear\").
- Suggest 1-2 improvements with actionable tips (e.g., \"Add specific teamwork examples\").
- Provide a score (1-10) based on clarity, relevance, engagement.
- Use a warm, constructive tone, like a friendly email.
- Max 150 words.";

/// Substitutes `{key}` placeholders in a single pass. Substituted values are
/// never rescanned, so candidate text containing `{context}` stays literal.
/// Unknown placeholders are left as they are.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{(\w+)\}").expect("static placeholder regex"));
    re.replace_all(template, |caps: &Captures| {
        values
            .iter()
            .find(|(key, _)| *key == &caps[1])
            .map(|(_, value)| value.to_string())
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

/// What the follow-up question should be about in each phase.
pub fn phase_focus(phase: Phase) -> &'static str {
    match phase {
        Phase::Project => "Ask about a specific project or role from the resume (e.g., What did you do at your last company?).",
        Phase::Project2 => "Ask about a different project or experience from the resume.",
        Phase::Technical => "Ask about a technical skill (e.g., How did you use Python?).",
        Phase::Technical2 => "Ask about applying a skill in a scenario (e.g., Optimizing a query?).",
        Phase::ProblemSolving => "Ask about a challenge they overcame (e.g., Solving a tough bug?).",
        Phase::Coding => "Ask a verbal coding question (e.g., Design a function for...).",
        Phase::Behavioral => "Ask about teamwork or collaboration (e.g., Working with a team?).",
        Phase::Behavioral2 => "Ask about leadership or initiative (e.g., Leading a project?).",
        Phase::RoleFit => "Ask about motivation for the role (e.g., Why this job?).",
        Phase::Closing => "Thank them and ask if they have questions about the role.",
        Phase::Greeting => "Ask about a detail from their answer or resume.",
    }
}
