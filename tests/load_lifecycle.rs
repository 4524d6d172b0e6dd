//! End-to-end record lifecycle against the production backend: real files
//! on disk, generated with the `image` crate into temp dirs.

use image::{Frame, RgbaImage};
use simple_view::{BackendError, LoadOptions, PageSelection, Photo, RustBackend};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn backend() -> Arc<RustBackend> {
    Arc::new(RustBackend::new())
}

fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 96])
    });
    img.save(path).unwrap();
}

fn write_gif(path: &Path, frames: usize, width: u32, height: u32) {
    let file = std::fs::File::create(path).unwrap();
    let mut encoder = image::codecs::gif::GifEncoder::new(file);
    for n in 0..frames {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([(n * 50) as u8, 0, 0, 255]));
        encoder.encode_frame(Frame::new(img)).unwrap();
    }
}

#[tokio::test]
async fn load_png_completes_with_one_page() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("dawn.png");
    write_png(&path, 320, 200);

    let backend = backend();
    let mut photo = Photo::new(&path);
    photo.load(&backend, LoadOptions::default()).await.unwrap();

    assert!(photo.is_done());
    assert!(photo.error().is_none());
    assert_eq!(photo.page_count(), 1);
    assert_eq!(photo.active_page(), 0);
    assert_eq!(
        photo.pages().unwrap().active_dimensions(),
        Some((320, 200))
    );
}

#[tokio::test]
async fn load_unreadable_path_captures_error() {
    let backend = backend();
    let mut photo = Photo::new("/nonexistent/dir/dawn.png");
    let result = photo.load(&backend, LoadOptions::default()).await;

    assert!(result.is_err());
    assert!(photo.is_done());
    assert!(matches!(photo.error(), Some(BackendError::Io(_))));
    assert!(photo.pages().is_none());
    assert_eq!(photo.page_count(), 0);
    assert_eq!(photo.active_page(), 0);
}

#[tokio::test]
async fn multi_page_gif_wraps_page_selection() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("anim.gif");
    write_gif(&path, 3, 40, 30);

    let backend = backend();
    let mut photo = Photo::new(&path);
    photo.load(&backend, LoadOptions::default()).await.unwrap();

    assert_eq!(photo.page_count(), 3);
    assert_eq!(photo.active_page(), 0);
    assert_eq!(photo.select_page(PageSelection::At(2)), 2);
    // Paging past the end cycles back to the first page, and before the
    // start to the last.
    assert_eq!(photo.select_page(PageSelection::At(3)), 0);
    assert_eq!(photo.select_page(PageSelection::At(-1)), 2);
}

#[tokio::test]
async fn load_with_target_size_downscales() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("big.png");
    write_png(&path, 800, 600);

    let backend = backend();
    let mut photo = Photo::new(&path);
    let options = LoadOptions {
        target_size: Some(200),
        ..LoadOptions::default()
    };
    photo.load(&backend, options).await.unwrap();

    assert_eq!(
        photo.pages().unwrap().active_dimensions(),
        Some((200, 150))
    );
}

#[tokio::test]
async fn thumbnail_of_real_file_fits_box() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("dawn.png");
    write_png(&path, 640, 480);

    let backend = backend();
    let photo = Photo::new(&path);
    let thumb = photo.thumbnail(&backend, 96, false).await.unwrap();
    assert!(thumb.width() <= 96 && thumb.height() <= 96);
}

#[tokio::test]
async fn thumbnail_failure_propagates() {
    let backend = backend();
    let photo = Photo::new("/nonexistent/dawn.png");
    let result = photo.thumbnail(&backend, 96, false).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn export_pages_writes_files() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("anim.gif");
    write_gif(&path, 3, 32, 32);

    let backend = backend();
    let photo = Photo::new(&path);
    let dest = tmp.path().join("out");
    let paths = photo.export_pages(&backend, &dest).await.unwrap();

    assert_eq!(paths.len(), 3);
    for (n, exported) in paths.iter().enumerate() {
        assert_eq!(*exported, dest.join(format!("anim-{:03}.png", n + 1)));
        let page = image::open(exported).unwrap();
        assert_eq!((page.width(), page.height()), (32, 32));
    }
}

#[tokio::test]
async fn release_then_reload() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("dawn.png");
    write_png(&path, 64, 64);

    let backend = backend();
    let mut photo = Photo::new(&path);
    photo.load(&backend, LoadOptions::default()).await.unwrap();
    photo.release();
    assert!(!photo.is_done());
    assert!(photo.pages().is_none());

    photo.load(&backend, LoadOptions::default()).await.unwrap();
    assert_eq!(photo.page_count(), 1);
}
