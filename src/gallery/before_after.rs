use super::{Gallery, GalleryError, files::asset_url};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

const BEFORE_MARKER: &str = "-1 Large";
const AFTER_MARKER: &str = "-2 Large";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeforeAfterSet {
    pub id: i64,
    pub title: String,
    pub before_image: String,
    pub after_image: String,
}

#[derive(Default)]
struct Pair<'a> {
    before: Option<&'a str>,
    after: Option<&'a str>,
}

/// Pairs `{key}-1 Large.jpeg` with `{key}-2 Large.jpeg`. Keys without both
/// halves are dropped; ids follow key order.
pub fn pair_files(file_names: &[String], url_prefix: &str, folder: &str) -> Vec<BeforeAfterSet> {
    let mut pairs: BTreeMap<&str, Pair<'_>> = BTreeMap::new();

    for name in file_names {
        let lower = name.to_lowercase();
        let stem_len = if lower.ends_with(" large.jpeg") {
            name.len() - ".jpeg".len()
        } else if lower.ends_with(" large.jpg") {
            name.len() - ".jpg".len()
        } else {
            continue;
        };
        let stem = &name[..stem_len];

        if let Some(key) = stem.strip_suffix(BEFORE_MARKER) {
            pairs.entry(key).or_default().before = Some(name.as_str());
        } else if let Some(key) = stem.strip_suffix(AFTER_MARKER) {
            pairs.entry(key).or_default().after = Some(name.as_str());
        }
    }

    pairs
        .into_iter()
        .filter_map(|(key, pair)| Some((key, pair.before?, pair.after?)))
        .enumerate()
        .map(|(index, (key, before, after))| BeforeAfterSet {
            id: index as i64 + 1,
            title: key.replace('_', " "),
            before_image: asset_url(url_prefix, folder, before),
            after_image: asset_url(url_prefix, folder, after),
        })
        .collect()
}

impl Gallery {
    pub async fn before_after_sets(&self) -> Result<Vec<BeforeAfterSet>, GalleryError> {
        let dir = self.config.before_after_directory();
        let file_names = match super::files::list_file_names(&dir).await {
            Ok(names) => names,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Before/after folder {:?} does not exist", dir);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(pair_files(
            &file_names,
            &self.config.url_prefix,
            &self.config.before_after_subdirectory,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_matching_halves() {
        let files: Vec<String> = [
            "Sarah_Cohen-2 Large.jpeg",
            "Sarah_Cohen-1 Large.jpeg",
            "Anna-1 Large.jpg",
            "Anna-2 Large.jpg",
            "Lonely-1 Large.jpeg",
            "notes.txt",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let sets = pair_files(&files, "/assets", "before_and_after");
        assert_eq!(
            sets,
            vec![
                BeforeAfterSet {
                    id: 1,
                    title: "Anna".to_string(),
                    before_image: "/assets/before_and_after/Anna-1%20Large.jpg".to_string(),
                    after_image: "/assets/before_and_after/Anna-2%20Large.jpg".to_string(),
                },
                BeforeAfterSet {
                    id: 2,
                    title: "Sarah Cohen".to_string(),
                    before_image: "/assets/before_and_after/Sarah_Cohen-1%20Large.jpeg"
                        .to_string(),
                    after_image: "/assets/before_and_after/Sarah_Cohen-2%20Large.jpeg"
                        .to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_no_files_no_sets() {
        assert!(pair_files(&[], "/assets", "before_and_after").is_empty());
    }
}
