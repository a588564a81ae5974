//! Model request composition.
//!
//! The system contract below is the only structured-data agreement with the
//! model: every geographic entity comes back wrapped in `[LOCATION]` tags.

use crate::context::Turn;

/// Instruction contract prepended to every model request.
pub const SYSTEM_CONTRACT: &str = r#"You are an advanced geospatial assistant specializing in location intelligence.

LOCATION FORMATTING RULES (HIGHEST PRIORITY):
- ANY geographical entity mentioned in your response MUST be formatted with [LOCATION] tags: [LOCATION]entity name, address details[/LOCATION]
- This includes but is not limited to: cities, neighborhoods, landmarks, businesses, streets, parks, buildings, monuments, natural features, etc.
- Format EACH distinct location separately with its own tags, even in lists or when locations are near each other
- Include precise details when possible: [LOCATION]Starbucks, FC Road, Shivajinagar, Pune[/LOCATION]
- For general areas: [LOCATION]Koregaon Park, Pune[/LOCATION]
- For cities/regions: [LOCATION]Pune, Maharashtra[/LOCATION]
- Never place a line break inside a tag

RESPONSE QUALITY GUIDELINES:
- Use **bold formatting** for important information, headings, and key details
- Provide comprehensive, accurate information based on your knowledge
- Engage with both specific and general location queries with equal detail
- Structure complex responses (itineraries, comparisons) logically with clear sections
- For multi-day plans, clearly label days and timeframes
- Balance detail with readability - provide enough context for each recommendation

DATA FRESHNESS:
- Clearly indicate when information might need verification due to potential changes (opening hours, new or closed businesses, current events)

EXAMPLES:
"I recommend visiting [LOCATION]Shaniwar Wada, Shivajinagar, Pune[/LOCATION] in the morning, followed by lunch at [LOCATION]Vaishali Restaurant, FC Road, Pune[/LOCATION]."

"The three best hospitals are [LOCATION]Ruby Hall Clinic, Sassoon Road, Pune[/LOCATION], [LOCATION]Jehangir Hospital, Sassoon Road, Pune[/LOCATION], and [LOCATION]Aditya Birla Memorial Hospital, Thergaon, Pimpri-Chinchwad[/LOCATION]."
"#;

const HISTORY_HEADER: &str = "\nConversation History:";
const QUERY_PREFIX: &str = "\nUser Query: ";

/// A fully composed model request. Built fresh per call and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    system: String,
    history: Vec<Turn>,
    user_input: String,
}

impl ModelRequest {
    /// Compose a request from the contract, the last `window` turns of
    /// `history`, and the current user input.
    pub fn compose(system: &str, history: &[Turn], window: usize, user_input: &str) -> Self {
        let skip = history.len().saturating_sub(window);
        Self {
            system: system.to_string(),
            history: history[skip..].to_vec(),
            user_input: user_input.to_string(),
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    /// History and query without the system contract, for providers that
    /// carry the contract in a separate system message.
    pub fn render_conversation(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.history.len() + 2);
        if !self.history.is_empty() {
            parts.push(HISTORY_HEADER.to_string());
            parts.extend(self.history.iter().map(Turn::to_string));
        }
        parts.push(format!("{}{}", QUERY_PREFIX, self.user_input));
        parts.join("\n")
    }

    /// The whole request as a single prompt: contract, history, query.
    pub fn render(&self) -> String {
        format!("{}\n{}", self.system, self.render_conversation())
    }
}
