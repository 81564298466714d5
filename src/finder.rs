//!
//! gallerium finder
//! ----------------
//! The merge-and-paginate engine. Queries either one named gallery (scoped
//! mode) or every visible gallery at once (merged mode), normalizes both
//! source kinds into [`MediaEntry`] and returns one paged, totaled result.
//!
//! Merged mode fans out the file fetch and the item fetch concurrently; the
//! two reads share nothing but the folder index, which is fully built before
//! the fan-out and read-only afterwards. A failure on either side fails the
//! whole request; there is no partial result and no retry at this layer.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::catalog::{Catalog, Comparator, Predicate};
use crate::model::{FileAsset, Gallery, GalleryView, ListResult, MediaEntry, MediaItem, MediaSource};
use crate::order;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_SIZE: u32 = 10;

/// Partition of the visible galleries by backing source.
pub struct GroupPartition {
    /// Bound folder name -> gallery name, one entry per folder-backed gallery.
    pub folder_index: HashMap<String, String>,
    /// Names of the galleries that organize native media items.
    pub native: HashSet<String>,
}

/// Split galleries into the folder index and the native name set.
///
/// A strict partition: membership is decided solely by the presence of a
/// bound folder. When two galleries bind the same folder the later one in the
/// given order wins; callers pass galleries in default group order, which
/// makes the winner deterministic. The caller is expected to have filtered
/// out hidden galleries already.
pub fn classify(galleries: &[Gallery]) -> GroupPartition {
    let mut folder_index = HashMap::new();
    let mut native = HashSet::new();
    for g in galleries {
        match g.bound_folder() {
            Some(folder) => {
                if let Some(prev) = folder_index.insert(folder.to_string(), g.name.clone()) {
                    warn!(
                        target: "gallerium::finder",
                        "folder '{}' is bound by both '{}' and '{}'; keeping '{}'",
                        folder, prev, g.name, g.name
                    );
                }
            }
            None => {
                native.insert(g.name.clone());
            }
        }
    }
    GroupPartition { folder_index, native }
}

/// Read-side query engine over a [`Catalog`].
#[derive(Clone)]
pub struct GalleryFinder<C> {
    catalog: C,
}

impl<C: Catalog> GalleryFinder<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Paged listing, merged across all visible galleries or scoped to one.
    ///
    /// `page` and `size` default to 1 and 10 when absent; an absent or empty
    /// `group` selects merged mode, and a scoped query on an unknown gallery
    /// yields an empty result rather than an error.
    ///
    /// Merged pages concatenate the file page and the item page (files first)
    /// without re-slicing, so one page can carry up to twice the requested
    /// size; `total` is the sum of both source totals. The two source pages
    /// advance independently. This mirrors the upstream contract and is
    /// deliberate, not an off-by-one.
    pub async fn list(
        &self,
        page: Option<u32>,
        size: Option<u32>,
        group: Option<&str>,
    ) -> Result<ListResult<MediaEntry>> {
        self.list_with(page, size, group, None, None).await
    }

    /// [`list`](Self::list) with a caller-supplied filter and sort for the
    /// native item side. Files are never affected by either.
    pub async fn list_with(
        &self,
        page: Option<u32>,
        size: Option<u32>,
        group: Option<&str>,
        pred: Option<Predicate<MediaItem>>,
        cmp: Option<Comparator<MediaItem>>,
    ) -> Result<ListResult<MediaEntry>> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let size = size.unwrap_or(DEFAULT_SIZE);
        match group.filter(|g| !g.is_empty()) {
            Some(target) => self.scoped(page, size, target, pred, cmp).await,
            None => self.merged(page, size, pred, cmp).await,
        }
    }

    /// Full unpaged listing of native media items in default media order.
    /// Folder-backed galleries contribute nothing to this view.
    pub async fn list_all(&self) -> Result<Vec<MediaEntry>> {
        let rows = self
            .catalog
            .list_media(None, Some(Arc::new(order::media_order)))
            .await?;
        Ok(rows.iter().map(|m| MediaSource::Item(m).normalize()).collect())
    }

    /// Full unpaged listing of the native items in one gallery, in default
    /// media order.
    pub async fn list_by(&self, group: &str) -> Result<Vec<MediaEntry>> {
        let name = group.to_string();
        let pred: Predicate<MediaItem> = Arc::new(move |m: &MediaItem| m.group == name);
        let rows = self
            .catalog
            .list_media(Some(pred), Some(Arc::new(order::media_order)))
            .await?;
        Ok(rows.iter().map(|m| MediaSource::Item(m).normalize()).collect())
    }

    /// One view per visible gallery, in default group order, each carrying
    /// its live native member count and full ordered entry list. This is a
    /// reporting view and never truncates. Folder-backed galleries appear
    /// with a zero count and no entries: their members are files, which this
    /// view does not enumerate.
    pub async fn group_by(&self) -> Result<Vec<GalleryView>> {
        let galleries = self
            .catalog
            .list_galleries(Some(Arc::new(order::group_order)))
            .await?;
        let mut views = Vec::new();
        for g in galleries.into_iter().filter(|g| !g.hidden) {
            let entries = self.list_by(&g.name).await?;
            views.push(GalleryView {
                name: g.name,
                created: g.created,
                priority: g.priority,
                folder: g.folder,
                media_count: entries.len() as u64,
                entries,
            });
        }
        Ok(views)
    }

    async fn merged(
        &self,
        page: u32,
        size: u32,
        pred: Option<Predicate<MediaItem>>,
        cmp: Option<Comparator<MediaItem>>,
    ) -> Result<ListResult<MediaEntry>> {
        let galleries: Vec<Gallery> = self
            .catalog
            .list_galleries(Some(Arc::new(order::group_order)))
            .await?
            .into_iter()
            .filter(|g| !g.hidden)
            .collect();
        let part = classify(&galleries);
        debug!(
            target: "gallerium::finder",
            folders = ?part.folder_index,
            native = ?part.native,
            "merged query over {} visible galleries",
            galleries.len()
        );

        let folder_index = Arc::new(part.folder_index);
        let native = Arc::new(part.native);

        let file_pred: Predicate<FileAsset> = {
            let idx = Arc::clone(&folder_index);
            Arc::new(move |f: &FileAsset| idx.contains_key(&f.folder))
        };
        let item_pred: Predicate<MediaItem> = match pred {
            Some(p) => {
                let native = Arc::clone(&native);
                Arc::new(move |m: &MediaItem| native.contains(&m.group) && p(m))
            }
            None => {
                let native = Arc::clone(&native);
                Arc::new(move |m: &MediaItem| native.contains(&m.group))
            }
        };
        let item_cmp: Comparator<MediaItem> = cmp.unwrap_or_else(|| Arc::new(order::media_order));

        // Independent reads, joined only at the combine step. A failure on
        // either side drops the sibling future and aborts the request.
        let ((files, file_total), (items, item_total)) = tokio::try_join!(
            self.catalog.page_files(Some(file_pred), None, page, size),
            self.catalog.page_media(Some(item_pred), Some(item_cmp), page, size),
        )?;

        let mut entries: Vec<MediaEntry> = Vec::with_capacity(files.len() + items.len());
        entries.extend(files.iter().map(|f| {
            MediaSource::MergedFile { file: f, folders: &folder_index }.normalize()
        }));
        entries.extend(items.iter().map(|m| MediaSource::Item(m).normalize()));

        Ok(ListResult { page, size, total: file_total + item_total, items: entries })
    }

    async fn scoped(
        &self,
        page: u32,
        size: u32,
        target: &str,
        pred: Option<Predicate<MediaItem>>,
        cmp: Option<Comparator<MediaItem>>,
    ) -> Result<ListResult<MediaEntry>> {
        let Some(gallery) = self.catalog.fetch_gallery(target).await? else {
            // Unknown gallery reads as empty, never as an error.
            return Ok(ListResult::empty(page, size));
        };

        if let Some(folder) = gallery.bound_folder().map(str::to_string) {
            let file_pred: Predicate<FileAsset> = Arc::new(move |f: &FileAsset| f.folder == folder);
            let (files, total) = self.catalog.page_files(Some(file_pred), None, page, size).await?;
            let items = files
                .iter()
                .map(|f| MediaSource::ScopedFile { file: f, group: target }.normalize())
                .collect();
            return Ok(ListResult { page, size, total, items });
        }

        let name = gallery.name.clone();
        let item_pred: Predicate<MediaItem> = match pred {
            Some(p) => Arc::new(move |m: &MediaItem| m.group == name && p(m)),
            None => Arc::new(move |m: &MediaItem| m.group == name),
        };
        let item_cmp: Comparator<MediaItem> = cmp.unwrap_or_else(|| Arc::new(order::media_order));
        let (rows, total) = self
            .catalog
            .page_media(Some(item_pred), Some(item_cmp), page, size)
            .await?;
        let items = rows.iter().map(|m| MediaSource::Item(m).normalize()).collect();
        Ok(ListResult { page, size, total, items })
    }
}
