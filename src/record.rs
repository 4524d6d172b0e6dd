//! The per-image record a viewer keeps for each file it shows.
//!
//! A [`Photo`] is mostly a property bag: source path, decoded pages, page
//! counts, EXIF and color-profile metadata, plus the outcome of the last
//! load. The async operations delegate to an [`ImageBackend`] on a
//! blocking thread and resume the caller when the work is done.
//!
//! Load failures are *captured*, not thrown: after awaiting
//! [`Photo::load`], the record is complete (`is_done()`) and exactly one
//! of the page buffer or the error is set. Thumbnail and export failures
//! propagate to the caller as ordinary `Result`s.

use crate::imaging::{
    BackendError, ColorProfile, ExifSummary, ImageBackend, LoadOptions, ThumbnailParams,
};
use crate::pages::{PageBuffer, PageSelection};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;

/// Per-image record: source path, decoded pages, metadata, load outcome.
///
/// One load is in flight per record at a time — `load` takes `&mut self`,
/// so a second load cannot start until the first completes. Pages are
/// freed when the record drops, or earlier via [`release`](Self::release).
#[derive(Debug, Default)]
pub struct Photo {
    source: PathBuf,
    pages: Option<PageBuffer>,
    page_count: usize,
    active_page: usize,
    exif: Option<ExifSummary>,
    color_profile: Option<ColorProfile>,
    load_done: bool,
    load_error: Option<BackendError>,
}

impl Photo {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn pages(&self) -> Option<&PageBuffer> {
        self.pages.as_ref()
    }

    pub fn pages_mut(&mut self) -> Option<&mut PageBuffer> {
        self.pages.as_mut()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn active_page(&self) -> usize {
        self.active_page
    }

    pub fn exif(&self) -> Option<&ExifSummary> {
        self.exif.as_ref()
    }

    pub fn color_profile(&self) -> Option<&ColorProfile> {
        self.color_profile.as_ref()
    }

    /// True once a load has finished, successfully or not.
    pub fn is_done(&self) -> bool {
        self.load_done
    }

    pub fn error(&self) -> Option<&BackendError> {
        self.load_error.as_ref()
    }

    /// `None` until a load completes, then the load outcome.
    pub fn outcome(&self) -> Option<Result<&PageBuffer, &BackendError>> {
        if !self.load_done {
            return None;
        }
        match (&self.pages, &self.load_error) {
            (_, Some(err)) => Some(Err(err)),
            (Some(pages), None) => Some(Ok(pages)),
            (None, None) => None,
        }
    }

    /// Load the image from disk through `backend`.
    ///
    /// Runs the decode on a blocking thread and suspends until it
    /// finishes; there is no cancellation. A failure is stored on the
    /// record (the completion flag is still set) *and* returned, so
    /// callers can use either the `Result` or the post-await fields.
    /// On success the default page policy is applied (largest page for
    /// `.ico` sources, first page otherwise).
    pub async fn load<B>(
        &mut self,
        backend: &Arc<B>,
        options: LoadOptions,
    ) -> Result<(), &BackendError>
    where
        B: ImageBackend + ?Sized + 'static,
    {
        self.release();

        let params = options.into_params(&self.source);
        let worker = Arc::clone(backend);
        let outcome = match task::spawn_blocking(move || worker.load(&params)).await {
            Ok(result) => result,
            // A vanished decode task is indistinguishable from a decode
            // fault at this layer.
            Err(join) => Err(BackendError::Decode(format!("decode task failed: {join}"))),
        };

        self.load_done = true;
        match outcome {
            Ok(decoded) => {
                let mut pages = decoded.pages;
                self.page_count = pages.page_count();
                self.active_page = pages.select_page(PageSelection::Default, &self.source);
                self.exif = decoded.exif;
                self.color_profile = decoded.color_profile;
                log::debug!(
                    "{}: loaded {} page(s), active {}",
                    self.source.display(),
                    self.page_count,
                    self.active_page,
                );
                self.pages = Some(pages);
                Ok(())
            }
            Err(err) => {
                log::warn!("{}: load failed: {err}", self.source.display());
                Err(&*self.load_error.insert(err))
            }
        }
    }

    /// Resolve a page-selection request against the loaded pages.
    ///
    /// Without a page buffer (not yet loaded, failed, or released) this is
    /// a no-op returning 0.
    pub fn select_page(&mut self, request: PageSelection) -> usize {
        let Some(pages) = self.pages.as_mut() else {
            return 0;
        };
        self.active_page = pages.select_page(request, &self.source);
        self.active_page
    }

    /// Fetch a thumbnail of the image. Errors propagate.
    pub async fn thumbnail<B>(
        &self,
        backend: &Arc<B>,
        size: u32,
        use_embedded_thumbnail: bool,
    ) -> Result<DynamicImage, BackendError>
    where
        B: ImageBackend + ?Sized + 'static,
    {
        let params = ThumbnailParams {
            source: self.source.clone(),
            size,
            use_embedded_thumbnail,
        };
        let worker = Arc::clone(backend);
        task::spawn_blocking(move || worker.thumbnail(&params))
            .await
            .map_err(|join| BackendError::Decode(format!("thumbnail task failed: {join}")))?
    }

    /// Export every page of the image to `dest_dir` as individual files.
    /// Errors propagate. Returns the written paths in page order.
    pub async fn export_pages<B>(
        &self,
        backend: &Arc<B>,
        dest_dir: &Path,
    ) -> Result<Vec<PathBuf>, BackendError>
    where
        B: ImageBackend + ?Sized + 'static,
    {
        tokio::fs::create_dir_all(dest_dir).await?;

        let source = self.source.clone();
        let dest = dest_dir.to_path_buf();
        let worker = Arc::clone(backend);
        task::spawn_blocking(move || worker.export_pages(&source, &dest))
            .await
            .map_err(|join| BackendError::Decode(format!("export task failed: {join}")))?
    }

    /// Drop the decoded pages and reset all per-load state. The record
    /// keeps its source path and can be loaded again.
    pub fn release(&mut self) {
        self.pages = None;
        self.page_count = 0;
        self.active_page = 0;
        self.exif = None;
        self.color_profile = None;
        self.load_done = false;
        self.load_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp, decoded_with_widths};

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
    }

    #[test]
    fn new_record_is_incomplete_and_empty() {
        let photo = Photo::new("/photos/dawn.jpg");
        assert!(!photo.is_done());
        assert!(photo.pages().is_none());
        assert!(photo.error().is_none());
        assert!(photo.outcome().is_none());
        assert_eq!(photo.page_count(), 0);
        assert_eq!(photo.active_page(), 0);
    }

    #[test]
    fn load_success_populates_record() {
        let backend = Arc::new(MockBackend::with_page_widths(&[10, 40, 25]));
        let mut photo = Photo::new("/photos/dawn.jpg");

        runtime().block_on(async {
            photo.load(&backend, LoadOptions::default()).await.unwrap();
        });

        assert!(photo.is_done());
        assert!(photo.error().is_none());
        assert_eq!(photo.page_count(), 3);
        // Non-ico source: default page is the first, not the widest.
        assert_eq!(photo.active_page(), 0);
        assert!(matches!(photo.outcome(), Some(Ok(_))));

        let ops = backend.get_operations();
        assert!(matches!(
            &ops[0],
            RecordedOp::Load { source, .. } if source == "/photos/dawn.jpg"
        ));
    }

    #[test]
    fn load_ico_source_defaults_to_largest_page() {
        let backend = Arc::new(MockBackend::with_page_widths(&[10, 40, 25]));
        let mut photo = Photo::new("/icons/app.ico");

        runtime().block_on(async {
            photo.load(&backend, LoadOptions::default()).await.unwrap();
        });

        assert_eq!(photo.active_page(), 1);
        assert_eq!(photo.pages().unwrap().active_index(), 1);
    }

    #[test]
    fn load_failure_is_captured_and_returned() {
        let backend = Arc::new(MockBackend::new());
        backend.push_load(Err(BackendError::Decode("corrupt stream".into())));
        let mut photo = Photo::new("/photos/broken.jpg");

        runtime().block_on(async {
            let result = photo.load(&backend, LoadOptions::default()).await;
            assert!(result.is_err());
        });

        assert!(photo.is_done());
        assert!(photo.pages().is_none());
        assert_eq!(photo.page_count(), 0);
        assert_eq!(photo.active_page(), 0);
        assert!(matches!(photo.error(), Some(BackendError::Decode(_))));
        assert!(matches!(photo.outcome(), Some(Err(_))));
    }

    #[test]
    fn reload_after_failure_clears_error() {
        let backend = Arc::new(MockBackend::new());
        backend.push_load(Ok(decoded_with_widths(&[64])));
        backend.push_load(Err(BackendError::Decode("transient".into())));
        let mut photo = Photo::new("/photos/flaky.jpg");

        runtime().block_on(async {
            // Results pop in reverse push order: failure first.
            let _ = photo.load(&backend, LoadOptions::default()).await;
            assert!(photo.error().is_some());
            photo.load(&backend, LoadOptions::default()).await.unwrap();
        });

        assert!(photo.error().is_none());
        assert_eq!(photo.page_count(), 1);
    }

    #[test]
    fn select_page_without_pages_is_noop() {
        let mut photo = Photo::new("/photos/dawn.jpg");
        assert_eq!(photo.select_page(PageSelection::At(3)), 0);
        assert_eq!(photo.active_page(), 0);
    }

    #[test]
    fn select_page_wraps_and_mirrors_index() {
        let backend = Arc::new(MockBackend::with_page_widths(&[8, 8, 8, 8, 8]));
        let mut photo = Photo::new("/docs/scan.tiff");

        runtime().block_on(async {
            photo.load(&backend, LoadOptions::default()).await.unwrap();
        });

        assert_eq!(photo.select_page(PageSelection::At(5)), 0);
        assert_eq!(photo.select_page(PageSelection::At(-1)), 4);
        assert_eq!(photo.active_page(), 4);
        assert_eq!(photo.pages().unwrap().active_index(), 4);
    }

    #[test]
    fn thumbnail_propagates_backend_error() {
        let backend = Arc::new(MockBackend::new());
        backend.push_thumbnail(Err(BackendError::Decode("bad file".into())));
        let photo = Photo::new("/photos/dawn.jpg");

        runtime().block_on(async {
            let result = photo.thumbnail(&backend, 256, false).await;
            assert!(matches!(result, Err(BackendError::Decode(_))));
        });

        // Thumbnail failures never touch the load state.
        assert!(!photo.is_done());
        assert!(photo.error().is_none());
    }

    #[test]
    fn export_creates_dest_and_delegates() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dest = tmp.path().join("exported");
        let backend = Arc::new(MockBackend::new());
        backend.push_export(Ok(vec![dest.join("scan-001.png")]));
        let photo = Photo::new("/docs/scan.tiff");

        let paths = runtime()
            .block_on(photo.export_pages(&backend, &dest))
            .unwrap();

        assert_eq!(paths.len(), 1);
        assert!(dest.is_dir());
        let ops = backend.get_operations();
        assert!(matches!(
            &ops[0],
            RecordedOp::ExportPages { source, .. } if source == "/docs/scan.tiff"
        ));
    }

    #[test]
    fn release_clears_everything() {
        let backend = Arc::new(MockBackend::with_page_widths(&[10, 40]));
        let mut photo = Photo::new("/photos/dawn.jpg");

        runtime().block_on(async {
            photo.load(&backend, LoadOptions::default()).await.unwrap();
        });
        assert!(photo.pages().is_some());

        photo.release();
        assert!(photo.pages().is_none());
        assert!(!photo.is_done());
        assert_eq!(photo.page_count(), 0);
        assert_eq!(photo.source(), Path::new("/photos/dawn.jpg"));
    }

    #[test]
    fn dyn_backend_works_through_arc() {
        let backend: Arc<dyn ImageBackend> = Arc::new(MockBackend::with_page_widths(&[16]));
        let mut photo = Photo::new("/photos/dawn.jpg");

        runtime().block_on(async {
            photo.load(&backend, LoadOptions::default()).await.unwrap();
        });
        assert_eq!(photo.page_count(), 1);
    }
}
