/*!
 * Prompt engineering for transcript summarization.
 *
 * Each chunk is summarized with a shared system prompt describing the
 * analyst role and JSON contract, plus a user prompt carrying the chunk
 * text and its position within the video.
 */

use crate::language_utils;
use crate::providers::SummaryRequest;

/// System prompt template for chunk summarization.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for summarizing a transcript chunk.
    pub const CHUNK_ANALYST: &'static str = r#"You are an expert content analyst who turns video transcripts into structured, actionable notes in {language}.

## Your Role
- Summarize what the speaker actually says; never invent facts that are not in the transcript
- Surface the insights a viewer would want to remember
- Name any frameworks, methods, or step-by-step techniques the speaker teaches
- Record standout moments in the order they occur

## Output Requirements
- Write every text field in {language}
- Return ONLY valid JSON matching the requested schema
- Do not include any text outside the JSON structure
- Leave a list empty rather than padding it with filler"#;

    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    pub fn chunk_analyst() -> Self {
        Self::new(Self::CHUNK_ANALYST)
    }

    /// Render the template for a language code, spelling the language
    /// out by name when it is known
    pub fn render(&self, language: &str) -> String {
        let language_name =
            language_utils::get_language_name(language).unwrap_or_else(|_| language.to_string());
        self.template.replace("{language}", &language_name)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::chunk_analyst()
    }
}

/// Builds the system and user prompts for one chunk summarization request.
#[derive(Debug, Clone)]
pub struct SummaryPromptBuilder {
    language: String,
}

impl SummaryPromptBuilder {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }

    /// Build the system prompt.
    pub fn build_system_prompt(&self) -> String {
        PromptTemplate::chunk_analyst().render(&self.language)
    }

    /// Build the user prompt for one chunk, with its position in the video.
    pub fn build_user_prompt(&self, request: &SummaryRequest<'_>) -> String {
        let chunk = request.chunk;
        let mut prompt = String::new();

        if request.total_chunks == 1 {
            prompt.push_str(&format!(
                "Below is the complete transcript of the video \"{}\".\n",
                request.video_title
            ));
        } else {
            prompt.push_str(&format!(
                "Below is section {} of {} of the transcript of the video \"{}\" (covering {} to {}).\n",
                request.position,
                request.total_chunks,
                request.video_title,
                format_timestamp(chunk.start_time),
                format_timestamp(chunk.end_time)
            ));
            if request.position == 1 {
                prompt.push_str("This section opens the video; later sections continue after it.\n");
            } else if request.is_final() {
                prompt.push_str("This section closes the video; earlier sections came before it.\n");
            } else {
                prompt.push_str("Other sections come before and after it.\n");
            }
        }

        prompt.push_str(
            r#"
Analyze this section on its own and respond with JSON in exactly this shape:
{
  "summary": "A few paragraphs summarizing this section",
  "key_insights": ["The most important takeaways"],
  "frameworks": [{"name": "Framework name", "description": "What it does", "steps": ["Step-by-step breakdown"]}],
  "key_moments": ["[mm:ss] Notable moment, in chronological order"]
}

Transcript section:
"#,
        );
        prompt.push_str(&chunk.text);

        prompt
    }

    /// Build both system and user prompts.
    pub fn build(&self, request: &SummaryRequest<'_>) -> (String, String) {
        (self.build_system_prompt(), self.build_user_prompt(request))
    }
}

/// Format seconds as mm:ss, or h:mm:ss past the hour mark
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
