//! Normalization of raw extracted code text.
//!
//! Scraped code arrives with install-command lines, copy-pasted line-number
//! gutters and duplicated blocks. The cleaner strips those artifacts, splits
//! the text into blocks, classifies each block as usage example or
//! implementation, and re-emits everything under labeled banners.

use lazy_static::lazy_static;
use regex::Regex;

use crate::page_extractor::schema::{Category, ComponentPayload};

lazy_static! {
    /// Package-install command lines the gallery injects into code panels.
    static ref INSTALL_LINE: Regex = Regex::new(r"(?m)^npm i .*$").expect("valid regex");

    /// A line-number gutter artifact: leading digits followed by whitespace.
    static ref LINE_NUMBER_PROBE: Regex = Regex::new(r"^\d+\s").expect("valid regex");

    /// Captures the content after a numeric prefix, for stripping.
    static ref LINE_NUMBER_PREFIX: Regex = Regex::new(r"^\s*\d+\s*(.*)$").expect("valid regex");
}

const BANNER: &str =
    "// ============================================================================";

/// Strip install-command lines and line-number gutters from raw code text.
///
/// If any line starts with a run of digits followed by whitespace, the numeric
/// prefix is stripped from every line; otherwise the text passes through
/// unchanged. Re-applying to already-cleaned text is a no-op.
#[must_use]
pub fn clean_code_text(code: &str) -> String {
    if code.is_empty() {
        return String::new();
    }

    let without_installs = INSTALL_LINE.replace_all(code, "");

    let lines: Vec<&str> = without_installs.split('\n').collect();
    let has_line_numbers = lines
        .iter()
        .any(|line| LINE_NUMBER_PROBE.is_match(line.trim()));

    if !has_line_numbers {
        return without_installs.into_owned();
    }

    lines
        .iter()
        .map(|line| match LINE_NUMBER_PREFIX.captures(line) {
            Some(captures) => captures
                .get(1)
                .map(|m| m.as_str())
                .unwrap_or(line),
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pick a file extension for a code artifact.
///
/// Markup syntax (a closing or self-closing tag, or angle brackets alongside a
/// `props` reference) or a React import signature selects `jsx`; otherwise
/// `js`. Empty code falls back to the category default: interactive
/// components ship JSX, backgrounds and animations ship plain JS.
#[must_use]
pub fn determine_file_extension(code: &str, category: Category) -> &'static str {
    if code.is_empty() {
        return match category {
            Category::Components => "jsx",
            _ => "js",
        };
    }

    if code.contains("</")
        || code.contains("/>")
        || (code.contains('<') && code.contains('>') && code.contains("props"))
    {
        return "jsx";
    }

    if code.contains("import React")
        || code.contains("from \"react\"")
        || code.contains("from 'react'")
    {
        return "jsx";
    }

    "js"
}

/// How a code block is emitted by [`format_code_with_headers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Implementation,
    UsageExample,
}

/// Heuristic classification of one deduplicated block.
///
/// Export/function/class/import-from patterns mark implementation; otherwise
/// angle-bracket markup marks a usage example; anything ambiguous defaults to
/// implementation.
fn classify_block(block: &str) -> BlockKind {
    if block.contains("export default")
        || block.contains("function ")
        || (block.contains("import ") && block.contains("from "))
        || block.contains("class ")
    {
        BlockKind::Implementation
    } else if block.contains('<') && block.contains('>') {
        BlockKind::UsageExample
    } else {
        BlockKind::Implementation
    }
}

/// Split cleaned code into blocks delimited by `import` statement lines.
///
/// Blocks are keyed by their first 20 characters; a repeated key replaces the
/// block's text but keeps its first-seen position, so emission order is stable
/// for identical input.
fn split_blocks(cleaned: &str) -> Vec<String> {
    let mut blocks: Vec<(String, String)> = Vec::new();
    let mut current = String::new();
    let mut block_id = String::new();

    let mut store = |blocks: &mut Vec<(String, String)>, id: &str, text: &str| {
        if let Some(entry) = blocks.iter_mut().find(|(existing, _)| existing == id) {
            entry.1 = text.to_string();
        } else {
            blocks.push((id.to_string(), text.to_string()));
        }
    };

    for line in cleaned.split('\n') {
        let trimmed = line.trim();

        // Skip empty lines at the start of a block.
        if current.is_empty() && trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with("import ") && !current.is_empty() {
            if !current.trim().is_empty() {
                store(&mut blocks, &block_id, &current);
            }
            current = format!("{line}\n");
            block_id = trimmed.chars().take(20).collect();
        } else {
            current.push_str(line);
            current.push('\n');
            if block_id.is_empty() {
                block_id = trimmed.chars().take(20).collect();
            }
        }
    }

    if !current.trim().is_empty() && !block_id.is_empty() {
        store(&mut blocks, &block_id, &current);
    }

    blocks
        .into_iter()
        .map(|(_, text)| text.trim().to_string())
        .collect()
}

/// Format cleaned code into a readable artifact with labeled sections.
///
/// Emits a header comment with the component's name and description, then an
/// installation section (only when dependencies are present), then usage
/// examples, then implementation blocks. Classification and ordering are
/// deterministic for identical input.
#[must_use]
pub fn format_code_with_headers(code: &str, payload: &ComponentPayload) -> String {
    if code.is_empty() {
        return String::new();
    }

    let cleaned = clean_code_text(code);

    let mut usage_examples = Vec::new();
    let mut implementation = Vec::new();

    for block in split_blocks(&cleaned) {
        match classify_block(&block) {
            BlockKind::UsageExample => usage_examples.push(block),
            BlockKind::Implementation => implementation.push(block),
        }
    }

    let mut formatted = format!(
        "/**\n * {}\n * \n * {}\n */\n\n",
        payload.name, payload.description
    );

    if !payload.dependencies.is_empty() {
        formatted.push_str(&format!(
            "{BANNER}\n// INSTALLATION\n{BANNER}\n\n// Install dependencies:\n// npm install {}\n\n",
            payload.dependencies.join(" ")
        ));
    }

    if !usage_examples.is_empty() {
        formatted.push_str(&format!(
            "{BANNER}\n// USAGE EXAMPLE\n{BANNER}\n\n{}\n\n",
            usage_examples.join("\n\n")
        ));
    }

    formatted.push_str(&format!(
        "{BANNER}\n// IMPLEMENTATION\n{BANNER}\n\n{}\n",
        implementation.join("\n\n")
    ));

    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn payload(name: &str, description: &str, dependencies: &[&str]) -> ComponentPayload {
        ComponentPayload {
            name: name.to_string(),
            description: description.to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            ..ComponentPayload::default()
        }
    }

    #[test]
    fn strips_install_lines() {
        let cleaned = clean_code_text("npm i framer-motion\nconst x = 1;");
        assert!(!cleaned.contains("npm i"));
        assert!(cleaned.contains("const x = 1;"));
    }

    #[test]
    fn strips_line_number_gutters() {
        let input = "1 import React from 'react';\n2 const x = 1;\n3 export default x;";
        let cleaned = clean_code_text(input);
        assert_eq!(
            cleaned,
            "import React from 'react';\nconst x = 1;\nexport default x;"
        );
    }

    #[test]
    fn leaves_unnumbered_code_alone() {
        let input = "import React from 'react';\nconst x = 1;";
        assert_eq!(clean_code_text(input), input);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let input = "10 const a = 1;\n11 const b = 2;";
        let once = clean_code_text(input);
        let twice = clean_code_text(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn extension_prefers_markup() {
        assert_eq!(
            determine_file_extension("const App = () => <div></div>;", Category::Backgrounds),
            "jsx"
        );
        assert_eq!(
            determine_file_extension("return <Stepper />;", Category::Animations),
            "jsx"
        );
    }

    #[test]
    fn extension_detects_react_imports() {
        assert_eq!(
            determine_file_extension("import React from 'react';", Category::Backgrounds),
            "jsx"
        );
        assert_eq!(
            determine_file_extension("import { motion } from \"react\"", Category::Animations),
            "jsx"
        );
    }

    #[test]
    fn extension_defaults_to_plain_js() {
        assert_eq!(
            determine_file_extension("const t = window.setTimeout;", Category::Backgrounds),
            "js"
        );
    }

    #[test]
    fn extension_falls_back_by_category_when_code_empty() {
        assert_eq!(determine_file_extension("", Category::Components), "jsx");
        assert_eq!(determine_file_extension("", Category::Backgrounds), "js");
        assert_eq!(determine_file_extension("", Category::Animations), "js");
    }

    #[test]
    fn installation_section_present_iff_dependencies() {
        let code = "import React from 'react';\nexport default function A() {}";

        let with_deps = format_code_with_headers(code, &payload("A", "", &["framer-motion"]));
        assert_eq!(with_deps.matches("// INSTALLATION").count(), 1);
        assert!(with_deps.contains("npm install framer-motion"));

        let without_deps = format_code_with_headers(code, &payload("A", "", &[]));
        assert_eq!(without_deps.matches("// INSTALLATION").count(), 0);
    }

    #[test]
    fn usage_examples_are_separated_from_implementation() {
        let code = "<Stepper initialStep={1} />\n\nimport Stepper from './Stepper';\nexport default Stepper;";
        let formatted = format_code_with_headers(code, &payload("Stepper", "A stepper", &[]));

        let usage_at = formatted.find("// USAGE EXAMPLE").expect("usage section");
        let impl_at = formatted
            .find("// IMPLEMENTATION")
            .expect("implementation section");
        assert!(usage_at < impl_at);
        assert!(formatted.contains("<Stepper initialStep={1} />"));
    }

    #[test]
    fn duplicate_blocks_collapse() {
        let block = "import A from 'a';\nexport default A;";
        let code = format!("{block}\n{block}");
        let formatted = format_code_with_headers(&code, &payload("A", "", &[]));
        assert_eq!(formatted.matches("export default A;").count(), 1);
    }

    #[test]
    fn formatting_is_deterministic() {
        let code = "import A from 'a';\nexport default A;\nimport B from 'b';\nexport { B };";
        let meta = payload("AB", "two blocks", &[]);
        assert_eq!(
            format_code_with_headers(code, &meta),
            format_code_with_headers(code, &meta)
        );
    }

    #[test]
    fn header_carries_name_and_description() {
        let formatted = format_code_with_headers(
            "export default function X() {}",
            &payload("X", "An X component", &[]),
        );
        assert!(formatted.starts_with("/**\n * X\n * \n * An X component\n */\n"));
    }

    proptest! {
        /// Stripping numeric prefixes recovers the original content, and
        /// cleaning its own output changes nothing.
        #[test]
        fn numeric_prefix_stripping_is_exact_and_idempotent(
            lines in proptest::collection::vec("[a-zA-Z_(){};][a-zA-Z0-9 _(){};=.<>/]{0,30}", 1..20)
        ) {
            let original = lines.join("\n");
            let numbered = lines
                .iter()
                .enumerate()
                .map(|(i, line)| format!("{} {line}", i + 1))
                .collect::<Vec<_>>()
                .join("\n");

            let cleaned = clean_code_text(&numbered);
            prop_assert_eq!(&cleaned, &original);
            prop_assert_eq!(clean_code_text(&cleaned), original);
        }
    }
}
