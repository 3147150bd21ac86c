//! System prompt for the LLM classifier.

use docket_core::{JUDGEMENT, NON_JUDGEMENT};

const POSITIVE_INDICATORS: &[&str] = &[
    "the words \"JUDGMENT\" or \"FINAL JUDGMENT\" in a heading",
    "the word \"DECREE\" or an order that finally disposes of the case",
    "a judge's signature block (\"DONE AND ORDERED\", \"SO ORDERED\", signed by the court)",
    "a case caption naming the court, the parties and a docket or case number",
];

const NEGATIVE_INDICATORS: &[&str] = &[
    "COMPLAINT",
    "MOTION",
    "BRIEF",
    "NOTICE",
    "STIPULATION",
    "AFFIDAVIT",
    "REQUEST for Production",
    "VERIFIED PETITION",
];

pub struct PromptBuilder;

impl PromptBuilder {
    /// Builds the fixed system instruction sent with every document.
    pub fn build() -> String {
        let positives = Self::bullets(POSITIVE_INDICATORS.iter().copied());
        let negatives = Self::bullets(NEGATIVE_INDICATORS.iter().copied());

        format!(
            "You classify legal documents filed in court proceedings.\n\
             A judgement is a court's final dispositive ruling. Motions, complaints, \
             notices and other procedural filings are not judgements.\n\n\
             Indicators that the document IS a judgement:\n{positives}\n\n\
             Indicators that the document is NOT a judgement (document titled):\n{negatives}\n\n\
             Weigh the title and caption more heavily than passing mentions in the body.\n\
             Reply with exactly one label and nothing else: \"{JUDGEMENT}\" or \"{NON_JUDGEMENT}\"."
        )
    }

    fn bullets<'a>(items: impl Iterator<Item = &'a str>) -> String {
        items.map(|i| format!("- {i}")).collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_both_indicator_sets_and_labels() {
        let prompt = PromptBuilder::build();
        assert!(prompt.contains("FINAL JUDGMENT"));
        assert!(prompt.contains("DECREE"));
        assert!(prompt.contains("- VERIFIED PETITION"));
        assert!(prompt.contains("- REQUEST for Production"));
        assert!(prompt.ends_with("\"Judgement\" or \"Non-Judgement\"."));
    }
}
