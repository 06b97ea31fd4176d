//! Placeholder extraction and substitution
//!
//! Placeholders are `{{NAME}}` tokens where `NAME` is one or more uppercase
//! ASCII letters or underscores.

use std::collections::{BTreeMap, HashSet};

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref PLACEHOLDER_PATTERN: Regex = Regex::new(r"\{\{([A-Z_]+)\}\}").unwrap();
}

/// Distinct placeholder names in `body`, in first-seen order
pub fn extract_variables(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER_PATTERN
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Output of substituting values into a template body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedTemplate {
    pub content: String,
    /// Placeholders that had no value and were left in place
    pub missing: Vec<String>,
}

impl RenderedTemplate {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Replace every placeholder that has a value; others stay verbatim
pub fn render_template(body: &str, values: &BTreeMap<String, String>) -> RenderedTemplate {
    let mut missing: Vec<String> = Vec::new();
    let content = PLACEHOLDER_PATTERN.replace_all(body, |caps: &Captures| {
        let name = &caps[1];
        match values.get(name) {
            Some(value) => value.clone(),
            None => {
                if !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
                caps[0].to_string()
            }
        }
    });

    RenderedTemplate {
        content: content.into_owned(),
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_dedupes_in_first_seen_order() {
        let vars = extract_variables("Hi {{NAME}}, rent is {{CURRENCY}}{{AMOUNT}}, {{NAME}} again");
        assert_eq!(vars, vec!["NAME", "CURRENCY", "AMOUNT"]);
    }

    #[test]
    fn test_extract_empty_and_no_match() {
        assert!(extract_variables("").is_empty());
        assert!(extract_variables("no tokens here").is_empty());
    }

    #[test]
    fn test_extract_ignores_malformed_tokens() {
        let vars = extract_variables("{{name}} {{ NAME }} {NAME} {{NAME1}} {{}} {{OK_TOKEN}}");
        assert_eq!(vars, vec!["OK_TOKEN"]);
    }

    #[test]
    fn test_extract_handles_nested_braces() {
        // The inner token is the only well-formed match
        assert_eq!(extract_variables("{{{{TENANT}}}}"), vec!["TENANT"]);
    }

    #[test]
    fn test_render_replaces_known_and_reports_missing() {
        let mut values = BTreeMap::new();
        values.insert("TENANT_NAME".to_string(), "Ada Obi".to_string());

        let rendered = render_template(
            "Dear {{TENANT_NAME}}, pay {{AMOUNT}} by {{DUE_DATE}}. {{AMOUNT}}",
            &values,
        );

        assert_eq!(
            rendered.content,
            "Dear Ada Obi, pay {{AMOUNT}} by {{DUE_DATE}}. {{AMOUNT}}"
        );
        assert_eq!(rendered.missing, vec!["AMOUNT", "DUE_DATE"]);
        assert!(!rendered.is_complete());
    }

    #[test]
    fn test_render_does_not_rescan_substituted_values() {
        let mut values = BTreeMap::new();
        values.insert("A".to_string(), "{{B}}".to_string());
        values.insert("B".to_string(), "nope".to_string());

        let rendered = render_template("{{A}}", &values);
        assert_eq!(rendered.content, "{{B}}");
        assert!(rendered.is_complete());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn token() -> impl Strategy<Value = String> {
        "[A-Z_]{1,8}"
    }

    fn filler() -> impl Strategy<Value = String> {
        "[a-z ,.]{0,12}"
    }

    proptest! {
        /// Extraction finds exactly the distinct tokens, in first-seen order
        #[test]
        fn extraction_matches_inserted_tokens(
            parts in prop::collection::vec((filler(), token()), 0..12),
            tail in filler(),
        ) {
            let mut body = String::new();
            let mut expected: Vec<String> = Vec::new();
            for (text, name) in &parts {
                body.push_str(text);
                body.push_str(&format!("{{{{{}}}}}", name));
                if !expected.contains(name) {
                    expected.push(name.clone());
                }
            }
            body.push_str(&tail);

            prop_assert_eq!(extract_variables(&body), expected);
        }

        #[test]
        fn extraction_is_idempotent(body in ".{0,200}") {
            let first = extract_variables(&body);
            let second = extract_variables(&body);
            prop_assert_eq!(first, second);
        }

        /// Every extracted name appears verbatim as a token in the body
        #[test]
        fn extracted_tokens_appear_in_body(body in "([a-z ]|\\{\\{[A-Z_]{1,5}\\}\\}){0,20}") {
            for name in extract_variables(&body) {
                let needle = format!("{{{{{}}}}}", name);
                prop_assert!(body.contains(&needle));
            }
        }

        /// Rendering with every value supplied leaves nothing behind
        #[test]
        fn full_render_leaves_no_tokens(
            names in prop::collection::vec(token(), 1..6),
        ) {
            let body = names.iter().map(|n| format!("[{{{{{}}}}}]", n)).collect::<String>();
            let values: BTreeMap<String, String> =
                names.iter().map(|n| (n.clone(), "v".to_string())).collect();

            let rendered = render_template(&body, &values);
            prop_assert!(rendered.is_complete());
            prop_assert!(extract_variables(&rendered.content).is_empty());
        }
    }
}
