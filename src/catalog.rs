//!
//! gallerium storage catalog
//! -------------------------
//! The storage accessor seam. The finder only ever talks to a [`Catalog`]:
//! filtered, sorted, optionally paged fetches over the three entity kinds,
//! with totals computed by the implementation. Errors raised here propagate
//! unchanged through the finder; there is no retry or recovery above this
//! boundary.
//!
//! [`MemoryCatalog`] is the in-process implementation used by the server
//! binary, tests and benches. A real deployment would put a CMS client
//! behind the same trait.

use std::cmp::Ordering;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;

use crate::model::{FileAsset, Gallery, MediaItem};

/// Row filter pushed down to the catalog.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
/// Sort order pushed down to the catalog.
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Read-only access to the two backing collections and the gallery registry.
///
/// Paged methods return the page slice together with the total match count;
/// `page` is 1-based. Implementations own the filter/sort/slice mechanics.
pub trait Catalog: Send + Sync {
    /// Full scan of media items with optional filter and sort.
    async fn list_media(
        &self,
        pred: Option<Predicate<MediaItem>>,
        cmp: Option<Comparator<MediaItem>>,
    ) -> Result<Vec<MediaItem>>;

    /// One page of media items plus the total match count.
    async fn page_media(
        &self,
        pred: Option<Predicate<MediaItem>>,
        cmp: Option<Comparator<MediaItem>>,
        page: u32,
        size: u32,
    ) -> Result<(Vec<MediaItem>, u64)>;

    /// One page of file assets plus the total match count. With no comparator
    /// the storage order is preserved.
    async fn page_files(
        &self,
        pred: Option<Predicate<FileAsset>>,
        cmp: Option<Comparator<FileAsset>>,
        page: u32,
        size: u32,
    ) -> Result<(Vec<FileAsset>, u64)>;

    /// All galleries, hidden ones included, with optional sort.
    async fn list_galleries(&self, cmp: Option<Comparator<Gallery>>) -> Result<Vec<Gallery>>;

    /// Fetch one gallery by name.
    async fn fetch_gallery(&self, name: &str) -> Result<Option<Gallery>>;
}

#[derive(Default)]
struct CatalogData {
    media: Vec<MediaItem>,
    files: Vec<FileAsset>,
    galleries: Vec<Gallery>,
}

/// Seedable in-memory catalog behind a shared read/write lock.
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    inner: Arc<RwLock<CatalogData>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        let data = self.inner.read();
        data.media.is_empty() && data.files.is_empty() && data.galleries.is_empty()
    }

    pub fn insert_media(&self, item: MediaItem) {
        self.inner.write().media.push(item);
    }

    pub fn insert_file(&self, file: FileAsset) {
        self.inner.write().files.push(file);
    }

    pub fn insert_gallery(&self, gallery: Gallery) {
        self.inner.write().galleries.push(gallery);
    }
}

fn scan<T: Clone>(rows: &[T], pred: Option<&Predicate<T>>, cmp: Option<&Comparator<T>>) -> Vec<T> {
    let mut out: Vec<T> = rows
        .iter()
        .filter(|r| pred.map_or(true, |p| p(r)))
        .cloned()
        .collect();
    if let Some(c) = cmp {
        out.sort_by(|a, b| c(a, b));
    }
    out
}

/// Slice one 1-based page out of the matched rows. Page 0 is treated as
/// page 1; a page past the end yields an empty slice with the true total.
fn page_of<T>(rows: Vec<T>, page: u32, size: u32) -> (Vec<T>, u64) {
    let total = rows.len() as u64;
    if size == 0 {
        return (Vec::new(), total);
    }
    let start = (page.max(1) as usize - 1).saturating_mul(size as usize);
    if start >= rows.len() {
        return (Vec::new(), total);
    }
    let end = (start + size as usize).min(rows.len());
    (rows.into_iter().skip(start).take(end - start).collect(), total)
}

impl Catalog for MemoryCatalog {
    async fn list_media(
        &self,
        pred: Option<Predicate<MediaItem>>,
        cmp: Option<Comparator<MediaItem>>,
    ) -> Result<Vec<MediaItem>> {
        let data = self.inner.read();
        Ok(scan(&data.media, pred.as_ref(), cmp.as_ref()))
    }

    async fn page_media(
        &self,
        pred: Option<Predicate<MediaItem>>,
        cmp: Option<Comparator<MediaItem>>,
        page: u32,
        size: u32,
    ) -> Result<(Vec<MediaItem>, u64)> {
        let data = self.inner.read();
        Ok(page_of(scan(&data.media, pred.as_ref(), cmp.as_ref()), page, size))
    }

    async fn page_files(
        &self,
        pred: Option<Predicate<FileAsset>>,
        cmp: Option<Comparator<FileAsset>>,
        page: u32,
        size: u32,
    ) -> Result<(Vec<FileAsset>, u64)> {
        let data = self.inner.read();
        Ok(page_of(scan(&data.files, pred.as_ref(), cmp.as_ref()), page, size))
    }

    async fn list_galleries(&self, cmp: Option<Comparator<Gallery>>) -> Result<Vec<Gallery>> {
        let data = self.inner.read();
        Ok(scan(&data.galleries, None, cmp.as_ref()))
    }

    async fn fetch_gallery(&self, name: &str) -> Result<Option<Gallery>> {
        let data = self.inner.read();
        Ok(data.galleries.iter().find(|g| g.name == name).cloned())
    }
}
