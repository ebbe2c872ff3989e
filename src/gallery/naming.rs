//! Category naming conventions.
//!
//! A category named `Bat Mitsva` lives on disk as `Bat_Mitsva`. The two pure
//! functions below pin that mapping; `CategoryResolver` layers the configured
//! alias table over them, and `find_entry` tolerates folders and files whose
//! casing drifted from the convention.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `"bat mitsva"` -> `"Bat_Mitsva"`: split on whitespace, capitalize each word,
/// join with underscores.
pub fn to_folder_name(category: &str) -> String {
    category
        .split_whitespace()
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join("_")
}

/// `"bat_mitsva"` -> `"Bat Mitsva"`: the inverse of [`to_folder_name`].
pub fn to_display_name(folder: &str) -> String {
    folder
        .split('_')
        .filter(|word| !word.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn same_ignoring_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Maps between display names and folder names, honoring aliases
/// (folder name -> display name) before falling back to the convention.
#[derive(Debug, Clone, Default)]
pub struct CategoryResolver {
    aliases: BTreeMap<String, String>,
}

impl CategoryResolver {
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases }
    }

    pub fn display_name(&self, folder: &str) -> String {
        self.aliases
            .iter()
            .find(|(alias_folder, _)| same_ignoring_case(alias_folder, folder))
            .map(|(_, display)| display.clone())
            .unwrap_or_else(|| to_display_name(folder))
    }

    pub fn folder_name(&self, category: &str) -> String {
        let category = category.trim();
        self.aliases
            .iter()
            .find(|(_, display)| same_ignoring_case(display, category))
            .map(|(folder, _)| folder.clone())
            .unwrap_or_else(|| to_folder_name(category))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A single path segment that cannot climb out of its parent or name a dotfile.
pub fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.starts_with('.')
        && !segment.contains('/')
        && !segment.contains('\\')
        && !segment.contains('\0')
}

/// Looks up `name` in `dir`, preferring an exact match and otherwise taking
/// the first entry whose name matches ignoring case.
pub async fn find_entry(dir: &Path, name: &str, kind: EntryKind) -> Option<PathBuf> {
    if !is_safe_segment(name) {
        return None;
    }

    let exact = dir.join(name);
    if let Ok(metadata) = tokio::fs::metadata(&exact).await
        && matches_kind(metadata.is_dir(), kind)
    {
        return Some(exact);
    }

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Failed to read directory {:?}: {}", dir, e);
            return None;
        }
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let Some(entry_name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if !same_ignoring_case(&entry_name, name) {
            continue;
        }
        if let Ok(metadata) = tokio::fs::metadata(entry.path()).await
            && matches_kind(metadata.is_dir(), kind)
        {
            debug!("Resolved {:?} to {:?} ignoring case", name, entry_name);
            return Some(entry.path());
        }
    }

    None
}

fn matches_kind(is_dir: bool, kind: EntryKind) -> bool {
    match kind {
        EntryKind::Directory => is_dir,
        EntryKind::File => !is_dir,
    }
}
