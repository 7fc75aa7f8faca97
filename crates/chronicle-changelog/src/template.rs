//! Editable text template for interactive change entry

use crate::types::{Change, ChangeType};

/// Build the template shown to an author, prefilled with any known values
pub fn change_template(
    change_type: Option<ChangeType>,
    description: Option<&str>,
    pull_requests: &[String],
) -> String {
    let types: Vec<&str> = ChangeType::all().map(|t| t.as_str()).collect();
    format!(
        "# Type must be one of: {types}\n\
         type: {change_type}\n\
         \n\
         # Optional pull request references, separated by commas\n\
         pull requests: {pull_requests}\n\
         \n\
         # Everything below `description:` is used as the description.\n\
         # Lines starting with `#` are ignored. Leave it empty to abort.\n\
         description:\n\
         {description}\n",
        types = types.join(", "),
        change_type = change_type.map(|t| t.as_str()).unwrap_or_default(),
        pull_requests = pull_requests.join(", "),
        description = description.unwrap_or_default(),
    )
}

/// Parse an edited template.
///
/// Returns `None` when the type is missing or unknown, or the description is
/// empty, which callers treat as an aborted entry.
pub fn parse_template(text: &str) -> Option<Change> {
    let mut change_type = None;
    let mut pull_requests = Vec::new();
    let mut description: Vec<&str> = Vec::new();
    let mut in_description = false;

    for line in text.lines() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        if in_description {
            description.push(line);
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "type" => change_type = value.trim().parse::<ChangeType>().ok(),
            "pull requests" => {
                pull_requests = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "description" => {
                in_description = true;
                if !value.trim().is_empty() {
                    description.push(value.trim_start());
                }
            }
            _ => {}
        }
    }

    let description = description.join("\n");
    Change::new(change_type?, description.trim())
        .ok()
        .map(|c| c.with_pull_requests(pull_requests))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filled_template() {
        let text = "# comment\n\
                    type: Feature\n\
                    pull requests: [#1](u1), [#2](u2)\n\
                    description:\n\
                    Add X\n\
                    \n\
                    # ignored\n\
                    More detail\n";
        let change = parse_template(text).unwrap();
        assert_eq!(change.change_type, ChangeType::Feature);
        assert_eq!(change.description, "Add X\n\nMore detail");
        assert_eq!(change.pull_requests, vec!["[#1](u1)", "[#2](u2)"]);
    }

    #[test]
    fn test_generated_template_round_trips() {
        let text = change_template(Some(ChangeType::BugFix), Some("Fix Y"), &[]);
        let change = parse_template(&text).unwrap();
        assert_eq!(change, Change::new(ChangeType::BugFix, "Fix Y").unwrap());
    }

    #[test]
    fn test_empty_template_aborts() {
        assert!(parse_template(&change_template(None, None, &[])).is_none());
        let no_description = change_template(Some(ChangeType::Other), None, &[]);
        assert!(parse_template(&no_description).is_none());
    }

    #[test]
    fn test_unknown_type_aborts() {
        assert!(parse_template("type: refactor\ndescription: Tidy\n").is_none());
    }

    #[test]
    fn test_inline_description() {
        let change = parse_template("type: docs\ndescription: Inline").map(|c| c.description);
        // `docs` is not a known tag
        assert_eq!(change, None);
        let change = parse_template("type: documentation\ndescription: Inline").unwrap();
        assert_eq!(change.description, "Inline");
    }
}
