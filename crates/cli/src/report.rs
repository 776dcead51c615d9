use catalog_loader::SkipReason;
use catalog_protocol::{normalize_name, CatalogDocument, CategoryNode, FileNaming, TagList};
use std::fmt::Write;

pub const EMPTY_STATE_MESSAGE: &str =
    "No categories to display. Adjust the search, pick another tag, or load JSON files.";

const INDENT: &str = "  ";

/// Renders `doc` as an indented outline.
///
/// Top-level categories sit at depth 1; a category is expanded when its depth
/// is at most `open_depth`, so 0 collapses everything. Siblings are ordered
/// case-insensitively.
pub fn render_tree(doc: &CatalogDocument, open_depth: usize) -> String {
    if doc.is_empty() {
        return EMPTY_STATE_MESSAGE.to_string();
    }
    let mut out = String::new();
    for (name, node) in sorted(doc.categories.iter()) {
        render_category(&mut out, name, node, 1, open_depth);
    }
    let sources = doc.sources();
    if !sources.is_empty() {
        let _ = writeln!(out, "\nSources: {}", sources.join(", "));
    }
    out.trim_end().to_string()
}

fn render_category(out: &mut String, name: &str, node: &CategoryNode, depth: usize, open: usize) {
    let indent = INDENT.repeat(depth - 1);
    let expanded = depth <= open;
    let marker = if expanded { "[-]" } else { "[+]" };
    let _ = write!(out, "{indent}{marker} {name}");
    if let Some(summary) = node.summary.as_deref().filter(|s| !s.is_empty()) {
        let _ = write!(out, " - {summary}");
    }
    if !expanded {
        let count = node.component_count();
        if count > 0 {
            let _ = write!(out, " ({count} components)");
        }
        out.push('\n');
        return;
    }
    out.push('\n');

    for (child_name, child) in sorted(node.children()) {
        render_category(out, child_name, child, depth + 1, open);
    }
    for (leaf_name, leaf) in sorted(node.components()) {
        let _ = write!(out, "{indent}{INDENT}* {leaf_name}");
        if let Some(description) = leaf.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = write!(out, " - {description}");
        }
        out.push('\n');
    }
}

fn sorted<'a, T>(entries: impl Iterator<Item = (&'a String, &'a T)>) -> Vec<(&'a String, &'a T)>
where
    T: 'a,
{
    let mut entries: Vec<_> = entries.collect();
    entries.sort_by(|(a, _), (b, _)| normalize_name(a).cmp(&normalize_name(b)).then(a.cmp(b)));
    entries
}

pub fn render_tags(tags: &TagList, naming: &FileNaming) -> String {
    let mut out = String::new();
    for tag in tags.iter() {
        if tag.is_all() {
            let _ = writeln!(out, "{tag}");
        } else {
            let _ = writeln!(out, "{tag}\t{}", naming.file_name_for_tag(tag));
        }
    }
    out.trim_end().to_string()
}

pub fn render_skipped<'a>(skipped: impl Iterator<Item = (&'a str, &'a SkipReason)>) -> String {
    let mut out = String::new();
    for (source, reason) in skipped {
        let _ = writeln!(out, "skipped {source}: {reason}");
    }
    out.trim_end().to_string()
}
