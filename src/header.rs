//! Header override
//!
//! A task whose content starts with `*` is a header: it never carries the
//! marker label and neither does anything below it. Users toggle headers in
//! bulk by prefixing a name with a directive:
//!
//! - `**` turns the node (and everything below it) into headers,
//! - `-*` turns them back into ordinary tasks.
//!
//! The directive itself is stripped from the name once it has been applied.

use crate::commit::ChangeSet;
use crate::tasks::TaskForest;
use std::collections::HashMap;

/// Prefix carried by header tasks.
pub const HEADER_PREFIX: &str = "* ";

const HEADER_ON: &str = "**";
const HEADER_OFF: &str = "-*";

/// Bulk header request found at the start of a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderDirective {
    On,
    Off,
}

/// Split a leading header directive off `text`.
///
/// Returns the directive (if any) and the remaining text with the whitespace
/// after the directive removed.
///
/// # Examples
/// ```
/// use gtd_autolabel::header::{scan, HeaderDirective};
/// assert_eq!(scan("** Notes"), (Some(HeaderDirective::On), "Notes"));
/// assert_eq!(scan("-*Notes"), (Some(HeaderDirective::Off), "Notes"));
/// assert_eq!(scan("* Notes"), (None, "* Notes"));
/// ```
pub fn scan(text: &str) -> (Option<HeaderDirective>, &str) {
    if let Some(rest) = text.strip_prefix(HEADER_ON) {
        (Some(HeaderDirective::On), rest.trim_start())
    } else if let Some(rest) = text.strip_prefix(HEADER_OFF) {
        (Some(HeaderDirective::Off), rest.trim_start())
    } else {
        (None, text)
    }
}

/// Whether the text marks a header task.
pub fn is_header(text: &str) -> bool {
    text.starts_with('*')
}

/// Whether a section name turns off labelling for its tasks (board columns).
pub fn disables_labelling(section_name: &str) -> bool {
    section_name.starts_with('*') || section_name.ends_with('*')
}

/// Apply a directive to task content.
pub fn apply(directive: HeaderDirective, text: &str) -> String {
    match directive {
        HeaderDirective::On if !text.starts_with(HEADER_PREFIX) => {
            format!("{}{}", HEADER_PREFIX, text)
        }
        HeaderDirective::Off => text.strip_prefix(HEADER_PREFIX).unwrap_or(text).to_string(),
        HeaderDirective::On => text.to_string(),
    }
}

/// Resolve the content of every task in a section after header directives.
///
/// A task's own directive wins over one inherited from an ancestor task,
/// which wins over the section or project directive (`forced`). A directive
/// on a task also applies to its whole subtree. Every task whose content
/// changes gets one content update queued on `changes`.
///
/// # Returns
/// Resolved content for each task of the forest, keyed by task ID
pub fn resolve_section<'a>(
    forest: &TaskForest<'a>,
    forced: Option<HeaderDirective>,
    changes: &mut ChangeSet,
) -> HashMap<&'a str, String> {
    let mut resolved = HashMap::with_capacity(forest.len());
    let mut inherited: Vec<Option<HeaderDirective>> = vec![None; forest.len()];

    for i in forest.preorder() {
        let task = forest.task(i);
        let (own, base) = scan(&task.content);

        let content = match own.or(inherited[i]).or(forced) {
            Some(directive) => apply(directive, base),
            None => base.to_string(),
        };

        if content != task.content {
            tracing::debug!("Header rewrite '{}' -> '{}'", task.content, content);
            changes.set_content(&task.id, &content);
        }

        let passed_down = own.or(inherited[i]);
        for &child in forest.children(i) {
            inherited[child] = passed_down;
        }
        resolved.insert(task.id.as_str(), content);
    }

    resolved
}
