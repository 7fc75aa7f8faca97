//! Markdown rendering of the release history

use tracing::{debug, instrument};

use chronicle_core::Result;

use crate::store::{ChangeStore, ReleaseEntry};
use crate::types::{Change, Release};

/// Default wrap column
pub const DEFAULT_WRAP_WIDTH: usize = 80;

/// Renders persisted releases as a markdown changelog
#[derive(Debug, Clone)]
pub struct ChangelogRenderer {
    /// Top-level heading
    pub title: String,
    /// Column at which prose lines are wrapped
    pub wrap_width: usize,
}

impl ChangelogRenderer {
    /// Create a renderer with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            wrap_width: DEFAULT_WRAP_WIDTH,
        }
    }

    /// Set the wrap column
    pub fn with_wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = width;
        self
    }

    /// Render everything persisted in a store
    pub fn render_store(&self, store: &ChangeStore) -> Result<String> {
        let entries = store.list_releases()?;
        Ok(self.render(&entries))
    }

    /// Render releases newest first, regardless of input order
    #[instrument(skip(self, entries), fields(releases = entries.len()))]
    pub fn render(&self, entries: &[ReleaseEntry]) -> String {
        let mut ordered: Vec<&ReleaseEntry> = entries.iter().collect();
        ordered.sort_by_key(|e| e.version());
        ordered.reverse();

        let mut output = format!("# {}\n\n", self.title.trim());
        for entry in ordered {
            match entry {
                ReleaseEntry::Structured(release) => render_release(&mut output, release),
                ReleaseEntry::Legacy { text, .. } => {
                    output.push_str(text.trim());
                    output.push_str("\n\n");
                }
            }
        }

        let mut wrapped = wrap_markdown(&output, self.wrap_width);
        let trimmed_len = wrapped.trim_end().len();
        wrapped.truncate(trimmed_len);
        wrapped.push('\n');

        debug!(output_len = wrapped.len(), "changelog rendered");
        wrapped
    }
}

impl Default for ChangelogRenderer {
    fn default() -> Self {
        Self::new("Changelog")
    }
}

fn render_release(output: &mut String, release: &Release) {
    output.push_str(&format!("## {} ({})\n\n", release.version, release.date));
    for (change_type, changes) in release.change_map() {
        output.push_str(&format!("### {}\n\n", change_type.section_title()));
        for change in changes {
            output.push_str(&render_change(change));
            output.push('\n');
        }
        output.push('\n');
    }
}

/// One bullet: first line, nested continuation lines, then pull requests
fn render_change(change: &Change) -> String {
    let description = change.description.trim();
    let mut lines = description.lines();
    let mut item = format!("* {}", lines.next().unwrap_or_default().trim_end());

    for line in lines {
        item.push('\n');
        if !line.trim().is_empty() {
            item.push_str("  ");
            item.push_str(line.trim_end());
        }
    }

    if !change.pull_requests.is_empty() {
        item.push_str(&format!(" ({})", change.pull_requests.join(", ")));
    }
    item
}

/// Wrap long prose lines at `width` columns.
///
/// Headings and fenced code blocks pass through untouched. Continuation
/// lines keep the original indentation, plus two spaces under a bullet.
/// Words longer than the width are never split.
pub fn wrap_markdown(text: &str, width: usize) -> String {
    let mut output = String::with_capacity(text.len());
    let mut in_fence = false;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            output.push_str(line);
        } else if in_fence || trimmed.starts_with('#') || line.chars().count() <= width {
            output.push_str(line);
        } else {
            wrap_line(&mut output, line, width);
        }
        output.push('\n');
    }

    output
}

fn wrap_line(output: &mut String, line: &str, width: usize) {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];
    let continuation = if trimmed.starts_with("* ") || trimmed.starts_with("- ") {
        format!("{}  ", indent)
    } else {
        indent.to_string()
    };

    let mut current = indent.to_string();
    let mut current_len = current.chars().count();
    let mut line_has_word = false;

    for word in trimmed.split(' ').filter(|w| !w.is_empty()) {
        let word_len = word.chars().count();
        let marker_only = matches!(current.trim(), "*" | "-");
        if line_has_word && !marker_only && current_len + 1 + word_len > width {
            output.push_str(current.trim_end());
            output.push('\n');
            current = continuation.clone();
            current_len = current.chars().count();
            line_has_word = false;
        }
        if line_has_word {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
        line_has_word = true;
    }

    output.push_str(current.trim_end());
}
