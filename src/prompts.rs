//! Instruction text sent alongside the response contract.

use crate::contract::Language;

/// Build the analysis prompt for `text`.
///
/// The oracle is asked to detect the language itself; `hint` only tells it what the
/// capturing side believes the language to be.
pub fn analysis_prompt(text: &str, hint: Option<Language>) -> String {
    let supported = Language::SUPPORTED
        .iter()
        .map(Language::name)
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = String::with_capacity(text.len() + 1024);
    prompt.push_str("You are a careful assistant that assesses the stress level expressed in a piece of writing.\n\n");
    prompt.push_str(&format!(
        "1. Detect the language of the text. It will be one of: {supported}. \
         Write the explanation and suggestions in that same language.\n"
    ));
    if let Some(lang) = hint {
        prompt.push_str(&format!(
            "   The text was captured with the language set to {}; use this only as a hint.\n",
            lang.name()
        ));
    }
    prompt.push_str(
        "2. Classify the overall stress level as exactly one of \"low\", \"medium\" or \"high\", \
         give your confidence as a whole-number percentage, and justify it in a short explanation.\n",
    );
    prompt.push_str(
        "3. List the words or short phrases that most contribute to stress, copied exactly as they \
         appear in the text, each with an intensity from 1 (mild) to 10 (severe).\n",
    );
    prompt.push_str(
        "4. Score the reasoning: negativeWordScore (0-100), emotionalTone (-100 very negative to 100 \
         very positive) and cognitiveOverloadIndex (0-100).\n",
    );
    prompt.push_str(
        "5. If the level is high, give a few practical, gentle suggestions for coping. \
         Otherwise suggestions may be empty.\n\n",
    );
    prompt.push_str("Respond only with JSON matching the provided schema.\n\n");
    prompt.push_str("Text:\n\"\"\"\n");
    prompt.push_str(text);
    prompt.push_str("\n\"\"\"\n");
    prompt
}
