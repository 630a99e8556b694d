//! Doc-reference checks.
//!
//! Load-bearing backend files (scoring contract, live data router) must
//! stay referenced from their docs; a rename that skips the doc update
//! shows up here.

use std::path::Path;

use pickwatch_core::config::DocReferenceRule;
use pickwatch_core::types::CheckOutcome;

/// One outcome per rule: the doc must exist and mention the source path.
pub fn check_references(root: &Path, rules: &[DocReferenceRule]) -> Vec<CheckOutcome> {
    rules
        .iter()
        .map(|rule| {
            let check = format!("doc_ref.{}", rule.source);
            let doc_path = root.join(&rule.doc);

            let content = match std::fs::read_to_string(&doc_path) {
                Ok(c) => c,
                Err(_) => {
                    return CheckOutcome::fail(check, format!("doc {} not readable", rule.doc));
                }
            };

            if content.contains(&rule.source) {
                CheckOutcome::pass(check, format!("{} references {}", rule.doc, rule.source))
            } else {
                CheckOutcome::fail(
                    check,
                    format!("{} does not mention {}", rule.doc, rule.source),
                )
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pickwatch_core::types::CheckStatus;

    fn rule(source: &str, doc: &str) -> DocReferenceRule {
        DocReferenceRule {
            source: source.to_string(),
            doc: doc.to_string(),
        }
    }

    #[test]
    fn reference_present_passes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(
            dir.path().join("docs/SCORING.md"),
            "Scores come from core/scoring_contract.py as of v3.\n",
        )
        .unwrap();

        let outcomes =
            check_references(dir.path(), &[rule("core/scoring_contract.py", "docs/SCORING.md")]);
        assert_eq!(outcomes[0].status, CheckStatus::Pass);
    }

    #[test]
    fn missing_mention_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/SCORING.md"), "TBD\n").unwrap();

        let outcomes =
            check_references(dir.path(), &[rule("core/scoring_contract.py", "docs/SCORING.md")]);
        assert_eq!(outcomes[0].status, CheckStatus::Fail);
        assert!(outcomes[0].detail.contains("does not mention"));
    }

    #[test]
    fn missing_doc_fails() {
        let dir = tempfile::tempdir().unwrap();
        let outcomes =
            check_references(dir.path(), &[rule("live_data_router.py", "docs/ROUTING.md")]);
        assert_eq!(outcomes[0].status, CheckStatus::Fail);
        assert!(outcomes[0].detail.contains("not readable"));
    }

    #[test]
    fn no_rules_no_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_references(dir.path(), &[]).is_empty());
    }
}
