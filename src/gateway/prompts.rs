use crate::locale::Locale;
use crate::workspace::ArtifactSnapshot;
use serde_json::{Value, json};
use std::fmt::Write;

pub fn validation_prompt(content: &str, filename: &str, locale: Locale) -> String {
    format!(
        "You are an experienced Linux system administrator and an expert on the BIND9 DNS server.\n\
         Check the following configuration file ({filename}) for syntax and logic errors.\n\
         Follow the BIND9 format strictly. Report line numbers starting at 1, or 0 when an issue \
         is not tied to a single line.\n\
         Write every message and the summary in {language}.\n\n\
         File to check:\n```\n{content}\n```\n",
        language = locale.language_name(),
    )
}

pub fn explanation_prompt(content: &str, filename: &str, locale: Locale) -> String {
    format!(
        "You are a networking instructor. Explain in simple terms, in {language}, what this \
         BIND9 configuration file ({filename}) does.\n\
         Walk through the key directives. Use Markdown for formatting.\n\
         Be brief but informative.\n\n\
         File:\n```\n{content}\n```\n",
        language = locale.language_name(),
    )
}

pub fn lookup_prompt(args: &str, artifacts: &[ArtifactSnapshot], locale: Locale) -> String {
    let mut prompt = format!(
        "You are simulating a BIND9 server loaded with exactly the files below.\n\
         Answer the command `nslookup {args}` as the nslookup tool would print it, resolving \
         only from these files.\n\
         Output raw terminal text only: no Markdown, no code fences, no commentary.\n\
         If the tool would print an error, print that error. Any free-form text the tool prints \
         should be in {language}.\n",
        language = locale.language_name(),
    );

    for artifact in artifacts {
        // Writing to a String cannot fail
        let _ = write!(
            prompt,
            "\n--- {} ({}) ---\n```\n{}\n```\n",
            artifact.name,
            artifact.kind.label(),
            artifact.content
        );
    }

    prompt
}

/// Response schema the backend must follow for validation replies
pub fn validation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "isValid": {
                "type": "BOOLEAN",
                "description": "True if the BIND9 configuration is syntactically correct."
            },
            "errors": {
                "type": "ARRAY",
                "description": "List of problems found.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "line": {
                            "type": "INTEGER",
                            "description": "Line number of the problem, 0 if not line-specific."
                        },
                        "message": {
                            "type": "STRING",
                            "description": "Clear explanation of the problem."
                        },
                        "severity": {
                            "type": "STRING",
                            "enum": ["error", "warning"]
                        }
                    },
                    "required": ["line", "message", "severity"]
                }
            },
            "generalFeedback": {
                "type": "STRING",
                "description": "Brief summary of the configuration status."
            }
        },
        "required": ["isValid", "errors", "generalFeedback"]
    })
}
