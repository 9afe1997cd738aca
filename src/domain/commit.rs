use regex::Regex;

/// Parsed representation of a conventional commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub r#type: String,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking_change: bool,
}

impl ParsedCommit {
    /// Parse a commit message in the Conventional Commits format
    ///
    /// Only the first line is matched against the header grammar:
    /// - type(scope)!: description
    /// - type(scope): description
    /// - type!: description
    /// - type: description
    ///
    /// Anything else is treated as a `chore`. The body is searched for
    /// `breaking_indicators` (e.g. `BREAKING CHANGE:`).
    pub fn parse(message: &str, breaking_indicators: &[String]) -> Self {
        let header = message.lines().next().unwrap_or("").trim();
        let has_breaking_footer = breaking_indicators
            .iter()
            .any(|indicator| message.contains(indicator.as_str()));

        let captures = Regex::new(r"^([a-zA-Z]+)(?:\(([^)]+)\))?(!?):\s*(.*)$")
            .ok()
            .and_then(|re| re.captures(header));

        if let Some(captures) = captures {
            let r#type = captures
                .get(1)
                .map(|m| m.as_str().to_lowercase())
                .unwrap_or_default();
            let scope = captures.get(2).map(|m| m.as_str().to_string());
            let has_exclamation = captures.get(3).map(|m| m.as_str()) == Some("!");
            let description = captures
                .get(4)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();

            return ParsedCommit {
                r#type,
                scope,
                description,
                is_breaking_change: has_exclamation || has_breaking_footer,
            };
        }

        ParsedCommit {
            r#type: "chore".to_string(),
            scope: None,
            description: header.to_string(),
            is_breaking_change: has_breaking_footer,
        }
    }
}
