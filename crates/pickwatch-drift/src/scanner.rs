//! Forbidden-literal scanner.
//!
//! Walks the tree with the usual vendor/build directories pruned and
//! reports every regex hit with file:line. Binary and non-UTF-8 files
//! are skipped silently.

use std::path::Path;

use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use pickwatch_core::config::ForbiddenRule;
use pickwatch_core::types::CheckOutcome;

const PRUNED_DIRS: [&str; 5] = [".git", "target", "node_modules", "artifacts", "__pycache__"];

/// A forbidden rule with its pattern compiled.
#[derive(Debug)]
pub struct CompiledRule {
    pub name: String,
    pub regex: Regex,
    pub extensions: Vec<String>,
}

impl CompiledRule {
    fn applies_to(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.extensions.iter().any(|e| e == ext)
    }
}

/// Built-in rules used when the config defines none.
pub fn default_rules() -> Vec<ForbiddenRule> {
    vec![
        ForbiddenRule {
            name: "hardcoded_localhost".to_string(),
            pattern: r"http://localhost".to_string(),
            extensions: vec!["py".to_string(), "sh".to_string()],
        },
        ForbiddenRule {
            name: "hardcoded_api_key".to_string(),
            pattern: r#"(?i)api_key\s*=\s*['"][A-Za-z0-9]"#.to_string(),
            extensions: vec!["py".to_string(), "sh".to_string()],
        },
        ForbiddenRule {
            name: "todo_scoring".to_string(),
            pattern: r"TODO SCORING".to_string(),
            extensions: Vec::new(),
        },
    ]
}

/// Compile configured rules, rejecting invalid patterns up front.
pub fn compile_rules(rules: &[ForbiddenRule]) -> Result<Vec<CompiledRule>, String> {
    rules
        .iter()
        .map(|rule| {
            let regex = Regex::new(&rule.pattern)
                .map_err(|e| format!("rule {:?}: invalid pattern: {e}", rule.name))?;
            Ok(CompiledRule {
                name: rule.name.clone(),
                regex,
                extensions: rule.extensions.clone(),
            })
        })
        .collect()
}

/// One outcome per rule: pass if the tree is clean, fail listing hits.
pub fn scan_tree(root: &Path, rules: &[CompiledRule]) -> Vec<CheckOutcome> {
    let mut hits: Vec<Vec<String>> = vec![Vec::new(); rules.len()];
    let mut files_scanned = 0u64;

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        let name = entry.file_name().to_str().unwrap_or("");
        !(entry.file_type().is_dir() && PRUNED_DIRS.contains(&name))
    });

    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let applicable: Vec<usize> = rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.applies_to(path))
            .map(|(i, _)| i)
            .collect();
        if applicable.is_empty() {
            continue;
        }

        let Ok(content) = std::fs::read_to_string(path) else {
            continue;
        };
        files_scanned += 1;

        let rel = path.strip_prefix(root).unwrap_or(path).display();
        for (line_no, line) in content.lines().enumerate() {
            for &i in &applicable {
                if rules[i].regex.is_match(line) {
                    hits[i].push(format!("{rel}:{}", line_no + 1));
                }
            }
        }
    }

    debug!(files_scanned, rules = rules.len(), "forbidden-literal scan complete");

    rules
        .iter()
        .zip(hits)
        .map(|(rule, rule_hits)| {
            let check = format!("forbidden.{}", rule.name);
            if rule_hits.is_empty() {
                CheckOutcome::pass(check, "no occurrences")
            } else {
                CheckOutcome::fail(
                    check,
                    format!("{} occurrence(s): {}", rule_hits.len(), rule_hits.join(", ")),
                )
            }
        })
        .collect()
}
