//! Message builders for the three kinds of classification questions.

use crate::classifier::{ChatMessage, ClassificationRequest};
use crate::domain::tariff::TariffCode;

const VERDICT_SYSTEM_PROMPT: &str = "You are a customs classification assistant. \
Answer strictly with a single word: yes or no.";

/// Asks which of `candidates` are referenced by `text`.
///
/// `current` is named in the prompt so the model excludes it.
pub fn reference_request(text: &str, current: &str, candidates: &[&str]) -> ClassificationRequest {
    let candidate_list = candidates.join("\n");
    let content = format!(
        "The following is a customs notification. Identify all notification numbers (from the list) that are referenced within it.\n\
Exclude the current notification itself: {current}\n\n\
Text:\n{text}\n\n\
Notification Numbers to Check Against:\n{candidate_list}\n\n\
Only return the list of matched notification numbers from the list above, one per line, no explanation."
    );
    ClassificationRequest::new(vec![ChatMessage::user(content)])
}

/// Asks which of `candidates` are mentioned directly or by description.
pub fn tariff_batch_request(text: &str, candidates: &[&TariffCode]) -> ClassificationRequest {
    let candidate_list = candidates
        .iter()
        .map(|entry| format!("{}: {}", entry.code, entry.description))
        .collect::<Vec<_>>()
        .join("\n");
    let content = format!(
        "You are given a customs notification text. Identify all HSN codes that are clearly mentioned, either directly or by matching the description.\n\n\
Notification Text:\n{text}\n\n\
Available HSN Codes and Descriptions:\n{candidate_list}\n\n\
Return only a list of matching HSN codes (not descriptions), one per line."
    );
    ClassificationRequest::new(vec![ChatMessage::user(content)])
}

/// Asks a yes/no question about a single code.
pub fn tariff_verdict_request(text: &str, candidate: &TariffCode) -> ClassificationRequest {
    let content = format!(
        "Notification Text:\n{text}\n\n\
HSN Code: {code}\nDescription: {description}\n\n\
Does the notification text refer to goods or services matching this HSN code or its description? Answer yes or no.",
        code = candidate.code,
        description = candidate.description,
    );
    ClassificationRequest::new(vec![
        ChatMessage::system(VERDICT_SYSTEM_PROMPT),
        ChatMessage::user(content),
    ])
}
