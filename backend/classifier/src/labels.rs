//! Mapping raw classifier output onto the Judgement / Non-Judgement taxonomy.

use docket_core::{LabelPolicy, JUDGEMENT, NON_JUDGEMENT, UNCLASSIFIED};

/// Apply the configured label policy to a trimmed model answer.
pub fn apply_policy(policy: LabelPolicy, raw: &str) -> String {
    let trimmed = raw.trim();
    match policy {
        LabelPolicy::Verbatim => trimmed.to_string(),
        LabelPolicy::Strict => normalize_label(trimmed).to_string(),
    }
}

/// Map free text onto a known label; `non-judg(e)ment` wins over `judg(e)ment`.
pub fn normalize_label(raw: &str) -> &'static str {
    let folded: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || c.is_whitespace())
        .collect();
    let compact = folded.replace(['-', ' ', '\t', '\n'], "");

    if compact.contains("nonjudgement") || compact.contains("nonjudgment") {
        NON_JUDGEMENT
    } else if compact.contains("judgement") || compact.contains("judgment") {
        JUDGEMENT
    } else {
        UNCLASSIFIED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbatim_only_trims() {
        assert_eq!(apply_policy(LabelPolicy::Verbatim, "  judgement.\n"), "judgement.");
        assert_eq!(
            apply_policy(LabelPolicy::Verbatim, "It is probably a motion"),
            "It is probably a motion"
        );
    }

    #[test]
    fn strict_maps_spelling_and_case_variants() {
        assert_eq!(normalize_label("Judgement"), JUDGEMENT);
        assert_eq!(normalize_label("FINAL JUDGMENT"), JUDGEMENT);
        assert_eq!(normalize_label("Non-Judgement"), NON_JUDGEMENT);
        assert_eq!(normalize_label("non judgment"), NON_JUDGEMENT);
        assert_eq!(normalize_label("\"Non-Judgment\"."), NON_JUDGEMENT);
    }

    #[test]
    fn strict_flags_everything_else_unclassified() {
        assert_eq!(apply_policy(LabelPolicy::Strict, "Motion to dismiss"), UNCLASSIFIED);
        assert_eq!(apply_policy(LabelPolicy::Strict, ""), UNCLASSIFIED);
    }
}
