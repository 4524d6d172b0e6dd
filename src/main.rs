use clap::{Parser, Subcommand};
use serde::Serialize;
use simple_view::{Channel, LoadOptions, Photo, RustBackend};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "simple-view")]
#[command(about = "Inspect and export images the way the viewer core sees them")]
#[command(long_about = "\
Inspect and export images the way the viewer core sees them

Loads files through the same record type the viewer uses, so what this
tool prints (page counts, default page, EXIF, color profile) is exactly
what the viewer would show — including the largest-page default for
.ico files and wrap-around page selection.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load an image and print its pages and metadata
    Info {
        /// Image file to inspect
        image: PathBuf,
        /// Select a page (out-of-range wraps: past the end → first page,
        /// negative → last page)
        #[arg(long)]
        page: Option<isize>,
        /// View a single channel (red, green, blue, alpha)
        #[arg(long)]
        channel: Option<Channel>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a thumbnail of an image
    Thumb {
        /// Image file to thumbnail
        image: PathBuf,
        /// Output file (format from extension)
        #[arg(short, long)]
        output: PathBuf,
        /// Bounding box edge in pixels
        #[arg(long, default_value_t = 256)]
        size: u32,
        /// Prefer an embedded preview stream over a full decode
        #[arg(long)]
        embedded: bool,
    },
    /// Export every page of a multi-page image to a directory
    Export {
        /// Image file to export
        image: PathBuf,
        /// Destination directory
        #[arg(short, long)]
        dest: PathBuf,
    },
}

/// What `info` reports about a loaded image.
#[derive(Serialize)]
struct InfoReport<'a> {
    source: String,
    page_count: usize,
    active_page: usize,
    width: u32,
    height: u32,
    exif: Option<&'a simple_view::ExifSummary>,
    color_profile: Option<&'a simple_view::ColorProfile>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let backend = Arc::new(RustBackend::new());

    match cli.command {
        Command::Info {
            image,
            page,
            channel,
            json,
        } => {
            let mut photo = Photo::new(&image);
            let options = LoadOptions {
                channel,
                ..LoadOptions::default()
            };
            if let Err(err) = runtime.block_on(photo.load(&backend, options)) {
                return Err(format!("{}: {err}", image.display()).into());
            }
            if let Some(index) = page {
                photo.select_page(simple_view::PageSelection::At(index));
            }

            let (width, height) = photo
                .pages()
                .and_then(|p| p.active_dimensions())
                .unwrap_or((0, 0));
            let report = InfoReport {
                source: image.display().to_string(),
                page_count: photo.page_count(),
                active_page: photo.active_page(),
                width,
                height,
                exif: photo.exif(),
                color_profile: photo.color_profile(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Thumb {
            image,
            output,
            size,
            embedded,
        } => {
            let photo = Photo::new(&image);
            let thumb = runtime.block_on(photo.thumbnail(&backend, size, embedded))?;
            thumb.save(&output)?;
            println!(
                "{} → {} ({}x{})",
                image.display(),
                output.display(),
                thumb.width(),
                thumb.height()
            );
        }
        Command::Export { image, dest } => {
            let photo = Photo::new(&image);
            let paths = runtime.block_on(photo.export_pages(&backend, &dest))?;
            println!("{}: {} page(s)", image.display(), paths.len());
            for path in paths {
                println!("  {}", path.display());
            }
        }
    }

    Ok(())
}

fn print_report(report: &InfoReport) {
    println!("{}", report.source);
    println!(
        "  pages: {} (active {}), {}x{}",
        report.page_count, report.active_page, report.width, report.height
    );
    if let Some(exif) = report.exif {
        if let Some(make) = &exif.camera_make {
            let model = exif.camera_model.as_deref().unwrap_or("");
            println!("  camera: {} {}", make, model);
        }
        if let Some(taken) = &exif.taken_at {
            println!("  taken: {}", taken);
        }
        if let Some(orientation) = exif.orientation {
            println!("  orientation: {}", orientation);
        }
        if let Some(description) = &exif.description {
            println!("  description: {}", description);
        }
    }
    if let Some(profile) = report.color_profile {
        println!(
            "  profile: {} ({:?})",
            profile.description.as_deref().unwrap_or("unnamed"),
            profile.source
        );
    }
}
