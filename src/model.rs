//!
//! gallerium data model
//! --------------------
//! Entities surfaced by the storage catalog plus the single normalized shape
//! (`MediaEntry`) that crosses the engine boundary. Everything here is a
//! read-only snapshot fetched per request; this layer never creates, mutates
//! or destroys an entity.
//!
//! Normalization of the two source kinds into `MediaEntry` is modeled as the
//! `MediaSource` sum type: one variant per way a record can enter the unified
//! view, instead of a pile of overloaded conversion functions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Native media record owned by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Unique name; the identity of the record.
    pub name: String,
    pub created: DateTime<Utc>,
    pub display_name: String,
    pub description: String,
    pub url: String,
    pub cover: String,
    /// Explicit priority. `None` is a sentinel that sorts below every concrete
    /// value, including 0; it is not the same thing as priority 0.
    pub priority: Option<i32>,
    /// Name of the owning gallery.
    pub group: String,
}

/// Bulk-stored file asset belonging to a folder. Files carry no priority and
/// no description of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAsset {
    pub name: String,
    pub created: DateTime<Utc>,
    pub display_name: String,
    /// Resolved permalink. May be absent when the storage layer has not
    /// produced one; that is never an error at this layer.
    pub permalink: Option<String>,
    /// Name of the owning folder.
    pub folder: String,
}

/// Organizational unit. A gallery is either native (it organizes `MediaItem`s
/// whose `group` equals its name) or folder-backed (bound to one external
/// folder whose files are surfaced as entries). Exactly one of the two,
/// decided solely by the bound folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    pub name: String,
    pub created: DateTime<Utc>,
    pub priority: Option<i32>,
    /// Hidden galleries are excluded from every query surface.
    pub hidden: bool,
    /// Bound folder name; `Some` makes the gallery folder-backed.
    pub folder: Option<String>,
}

impl Gallery {
    /// Bound folder name when this gallery is folder-backed. An empty string
    /// counts as unbound.
    pub fn bound_folder(&self) -> Option<&str> {
        self.folder.as_deref().filter(|f| !f.is_empty())
    }

    pub fn is_folder_backed(&self) -> bool {
        self.bound_folder().is_some()
    }
}

/// The one normalized record shape exposed past the engine boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub name: String,
    pub created: DateTime<Utc>,
    pub display_name: String,
    pub description: String,
    pub url: Option<String>,
    pub cover: Option<String>,
    /// Forced to `Some(0)` for file-sourced entries.
    pub priority: Option<i32>,
    /// Resolved gallery name. Always `Some` for item-sourced entries; a
    /// merged-mode file whose folder has no gallery binding resolves to
    /// `None`.
    pub group: Option<String>,
}

/// A record about to enter the unified view, tagged by where it came from.
///
/// `normalize` is pure and never fails for well-formed input.
pub enum MediaSource<'a> {
    /// A native media item; fields copy through unchanged.
    Item(&'a MediaItem),
    /// A file surfaced through a scoped query on one folder-backed gallery;
    /// the target gallery name is supplied by the caller.
    ScopedFile { file: &'a FileAsset, group: &'a str },
    /// A file surfaced through a merged query; the gallery is resolved via
    /// the folder name -> gallery name index built for that query.
    MergedFile {
        file: &'a FileAsset,
        folders: &'a HashMap<String, String>,
    },
}

impl MediaSource<'_> {
    pub fn normalize(self) -> MediaEntry {
        match self {
            MediaSource::Item(item) => MediaEntry {
                name: item.name.clone(),
                created: item.created,
                display_name: item.display_name.clone(),
                description: item.description.clone(),
                url: Some(item.url.clone()),
                cover: Some(item.cover.clone()),
                priority: item.priority,
                group: Some(item.group.clone()),
            },
            MediaSource::ScopedFile { file, group } => file_entry(file, Some(group.to_string())),
            MediaSource::MergedFile { file, folders } => {
                file_entry(file, folders.get(&file.folder).cloned())
            }
        }
    }
}

fn file_entry(file: &FileAsset, group: Option<String>) -> MediaEntry {
    MediaEntry {
        name: file.name.clone(),
        created: file.created,
        display_name: file.display_name.clone(),
        // Files have no separate description field.
        description: file.display_name.clone(),
        url: file.permalink.clone(),
        cover: file.permalink.clone(),
        priority: Some(0),
        group,
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult<T> {
    pub page: u32,
    pub size: u32,
    pub total: u64,
    pub items: Vec<T>,
}

impl<T> ListResult<T> {
    /// The empty page shape returned for queries that match nothing, such as
    /// a scoped query on a gallery that does not exist.
    pub fn empty(page: u32, size: u32) -> Self {
        Self { page, size, total: 0, items: Vec::new() }
    }
}

/// Reporting view of one gallery with its live native member count and the
/// full ordered entry list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryView {
    pub name: String,
    pub created: DateTime<Utc>,
    pub priority: Option<i32>,
    pub folder: Option<String>,
    pub media_count: u64,
    pub entries: Vec<MediaEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).single().expect("valid timestamp")
    }

    fn item() -> MediaItem {
        MediaItem {
            name: "sunrise".into(),
            created: ts(3),
            display_name: "Sunrise".into(),
            description: "over the bay".into(),
            url: "/media/sunrise.jpg".into(),
            cover: "/media/sunrise-thumb.jpg".into(),
            priority: Some(2),
            group: "landscapes".into(),
        }
    }

    fn file() -> FileAsset {
        FileAsset {
            name: "shot-001".into(),
            created: ts(5),
            display_name: "Shot 001".into(),
            permalink: Some("/files/shot-001.png".into()),
            folder: "screenshots".into(),
        }
    }

    #[test]
    fn item_normalization_round_trips_every_field() {
        let src = item();
        let entry = MediaSource::Item(&src).normalize();
        assert_eq!(entry.name, src.name);
        assert_eq!(entry.created, src.created);
        assert_eq!(entry.display_name, src.display_name);
        assert_eq!(entry.description, src.description);
        assert_eq!(entry.url.as_deref(), Some(src.url.as_str()));
        assert_eq!(entry.cover.as_deref(), Some(src.cover.as_str()));
        assert_eq!(entry.priority, src.priority);
        assert_eq!(entry.group.as_deref(), Some(src.group.as_str()));
    }

    #[test]
    fn scoped_file_uses_display_name_for_description_and_forces_priority() {
        let src = file();
        let entry = MediaSource::ScopedFile { file: &src, group: "captures" }.normalize();
        assert_eq!(entry.description, src.display_name);
        assert_eq!(entry.url, src.permalink);
        assert_eq!(entry.cover, src.permalink);
        assert_eq!(entry.priority, Some(0));
        assert_eq!(entry.group.as_deref(), Some("captures"));
    }

    #[test]
    fn merged_file_resolves_group_via_folder_index() {
        let src = file();
        let mut folders = HashMap::new();
        folders.insert("screenshots".to_string(), "captures".to_string());
        let entry = MediaSource::MergedFile { file: &src, folders: &folders }.normalize();
        assert_eq!(entry.group.as_deref(), Some("captures"));
    }

    #[test]
    fn merged_file_with_unbound_folder_has_no_group() {
        let src = file();
        let folders = HashMap::new();
        let entry = MediaSource::MergedFile { file: &src, folders: &folders }.normalize();
        assert_eq!(entry.group, None);
        // Still a well-formed entry, not an error.
        assert_eq!(entry.name, src.name);
    }

    #[test]
    fn missing_permalink_propagates_as_absent_urls() {
        let mut src = file();
        src.permalink = None;
        let entry = MediaSource::ScopedFile { file: &src, group: "captures" }.normalize();
        assert_eq!(entry.url, None);
        assert_eq!(entry.cover, None);
    }

    #[test]
    fn empty_folder_binding_is_not_folder_backed() {
        let g = Gallery {
            name: "g".into(),
            created: ts(1),
            priority: None,
            hidden: false,
            folder: Some(String::new()),
        };
        assert!(!g.is_folder_backed());
        assert_eq!(g.bound_folder(), None);
    }
}
