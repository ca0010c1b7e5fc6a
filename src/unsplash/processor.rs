use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use walkdir::WalkDir;

use crate::unsplash::interrupt::CancelFlag;
use crate::unsplash::progress;

/// Suffix appended to a source stem for its derivative file.
pub(crate) const THUMBNAIL_MARKER: &str = "-thumbnail";

/// Default bound on either thumbnail dimension.
pub(crate) const DEFAULT_THUMBNAIL_SIZE: u32 = 128;

/// Whether a source file produced a thumbnail. Undecodable files are an
/// expected nuisance in the images directory and are skipped, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ThumbnailStatus {
    Created,
    Skipped,
}

/// Produces thumbnail derivatives for downloaded images.
pub(crate) struct ImageProcessor {
    images_dir: PathBuf,
    cancel: CancelFlag,
}

impl ImageProcessor {
    pub(crate) fn new(images_dir: &Path, cancel: CancelFlag) -> Self {
        ImageProcessor {
            images_dir: images_dir.to_path_buf(),
            cancel,
        }
    }

    /// Bounds the image to `max_size` on both axes preserving aspect ratio,
    /// drops alpha/palette down to RGB, and saves the result next to the
    /// source as `{stem}-thumbnail{suffix}`. The source is never rewritten.
    pub(crate) fn make_thumbnail(&self, source: &Path, max_size: u32) -> Result<ThumbnailStatus> {
        let Some(image) = open_unbounded(source) else {
            trace!("Skipping undecodable file: {}", source.display());
            return Ok(ThumbnailStatus::Skipped);
        };

        let thumbnail = image.thumbnail(max_size, max_size);
        let target = thumbnail_path(source);
        thumbnail
            .to_rgb8()
            .save(&target)
            .with_context(|| format!("Failed to save thumbnail: {}", target.display()))?;

        Ok(ThumbnailStatus::Created)
    }

    /// Exercises the full transform sequence on one image: horizontal flip,
    /// both quarter rotations, a fixed 400x400 resize, grayscale and RGB
    /// conversions. The intermediates are validation only and are discarded;
    /// the thumbnail is the sole persisted artifact.
    pub(crate) fn apply_transform_pipeline(
        &self,
        source: &Path,
        max_size: u32,
    ) -> Result<ThumbnailStatus> {
        let Some(image) = open_unbounded(source) else {
            trace!("Skipping undecodable file: {}", source.display());
            return Ok(ThumbnailStatus::Skipped);
        };

        let _exercised = image
            .fliph()
            .rotate90()
            .rotate270()
            .resize_exact(400, 400, FilterType::Triangle)
            .grayscale()
            .to_rgb8();

        let thumbnail = image.thumbnail(max_size, max_size);
        let target = thumbnail_path(source);
        thumbnail
            .to_rgb8()
            .save(&target)
            .with_context(|| format!("Failed to save thumbnail: {}", target.display()))?;

        Ok(ThumbnailStatus::Created)
    }

    /// Thumbnails every `.jpg` under the images directory that is not itself
    /// a derivative. Returns how many thumbnails were created.
    pub(crate) fn create_thumbnails(&self, max_size: u32) -> Result<usize> {
        self.process_sources(|source| self.make_thumbnail(source, max_size))
    }

    /// Batch variant that runs the full transform sequence over the same
    /// file set.
    pub(crate) fn run_transform_pass(&self, max_size: u32) -> Result<usize> {
        self.process_sources(|source| self.apply_transform_pipeline(source, max_size))
    }

    fn process_sources<F>(&self, operation: F) -> Result<usize>
    where
        F: Fn(&Path) -> Result<ThumbnailStatus>,
    {
        let sources = self.collect_sources();

        let mut created = 0;
        for source in progress::wrap(sources.iter(), sources.len() as u64, "Processing") {
            if self.cancel.is_cancelled() {
                info!("Operation interrupted by user.");
                break;
            }

            if operation(source)? == ThumbnailStatus::Created {
                created += 1;
            }
        }

        Ok(created)
    }

    fn collect_sources(&self) -> Vec<PathBuf> {
        let mut sources: Vec<PathBuf> = WalkDir::new(&self.images_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension().and_then(|ext| ext.to_str()) == Some("jpg")
                    && !is_thumbnail(path)
            })
            .collect();
        sources.sort();
        sources
    }
}

/// Opens and decodes an image with the decoder's dimension limits disabled
/// for this call; arbitrarily large photos must still process. Any open or
/// decode failure reads as "not an image".
fn open_unbounded(path: &Path) -> Option<DynamicImage> {
    let mut reader = ImageReader::open(path).ok()?;
    reader.no_limits();
    reader.with_guessed_format().ok()?.decode().ok()
}

fn is_thumbnail(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with(THUMBNAIL_MARKER))
}

fn thumbnail_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = source
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    source.with_file_name(format!("{stem}{THUMBNAIL_MARKER}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
    use std::fs::{read, write};

    fn save_test_image(path: &Path, width: u32, height: u32) {
        RgbImage::from_pixel(width, height, Rgb([200, 120, 40]))
            .save(path)
            .unwrap();
    }

    fn processor(images_dir: &Path) -> ImageProcessor {
        ImageProcessor::new(images_dir, CancelFlag::new())
    }

    #[test]
    fn thumbnail_is_bounded_rgb_and_leaves_the_source_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("tall.png");
        // RGBA source so the conversion to three channels is observable.
        RgbaImage::from_pixel(1000, 2000, Rgba([200, 120, 40, 255]))
            .save(&source)
            .unwrap();
        let original_bytes = read(&source).unwrap();

        let status = processor(tmp.path()).make_thumbnail(&source, 128).unwrap();
        assert_eq!(status, ThumbnailStatus::Created);

        let target = tmp.path().join("tall-thumbnail.png");
        let thumbnail = image::open(&target).unwrap();
        let (width, height) = thumbnail.dimensions();
        assert!(width.max(height) <= 128);
        // 1:2 aspect survives the resize.
        assert_eq!(width, 64);
        assert_eq!(height, 128);
        assert_eq!(thumbnail.color().channel_count(), 3);

        assert_eq!(read(&source).unwrap(), original_bytes);
    }

    #[test]
    fn undecodable_file_is_skipped_without_output() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("broken.jpg");
        write(&source, "this is not a jpeg").unwrap();

        let status = processor(tmp.path()).make_thumbnail(&source, 128).unwrap();

        assert_eq!(status, ThumbnailStatus::Skipped);
        assert!(!tmp.path().join("broken-thumbnail.jpg").exists());
    }

    #[test]
    fn transform_pipeline_persists_only_the_thumbnail() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("photo.jpg");
        save_test_image(&source, 600, 400);

        let files_before = std::fs::read_dir(tmp.path()).unwrap().count();
        let status = processor(tmp.path())
            .apply_transform_pipeline(&source, 128)
            .unwrap();
        let files_after = std::fs::read_dir(tmp.path()).unwrap().count();

        assert_eq!(status, ThumbnailStatus::Created);
        assert_eq!(files_after, files_before + 1);
        assert!(tmp.path().join("photo-thumbnail.jpg").exists());
    }

    #[test]
    fn directory_pass_skips_existing_derivatives() {
        let tmp = tempfile::tempdir().unwrap();
        save_test_image(&tmp.path().join("a-regular.jpg"), 300, 200);
        save_test_image(&tmp.path().join("b-regular.jpg"), 200, 300);
        save_test_image(&tmp.path().join("c-regular-thumbnail.jpg"), 64, 64);

        let created = processor(tmp.path()).create_thumbnails(128).unwrap();

        assert_eq!(created, 2);
        assert!(tmp.path().join("a-regular-thumbnail.jpg").exists());
        assert!(tmp.path().join("b-regular-thumbnail.jpg").exists());
        // The existing derivative is not thumbnailed again.
        assert!(!tmp.path().join("c-regular-thumbnail-thumbnail.jpg").exists());
    }

    #[test]
    fn directory_pass_tolerates_garbage_files() {
        let tmp = tempfile::tempdir().unwrap();
        save_test_image(&tmp.path().join("good.jpg"), 300, 200);
        write(tmp.path().join("bad.jpg"), "garbage").unwrap();

        let created = processor(tmp.path()).create_thumbnails(128).unwrap();

        assert_eq!(created, 1);
        assert!(tmp.path().join("good-thumbnail.jpg").exists());
        assert!(!tmp.path().join("bad-thumbnail.jpg").exists());
    }

    #[test]
    fn transform_pass_covers_the_directory() {
        let tmp = tempfile::tempdir().unwrap();
        save_test_image(&tmp.path().join("a-regular.jpg"), 300, 200);
        write(tmp.path().join("bad.jpg"), "garbage").unwrap();

        let processed = processor(tmp.path()).run_transform_pass(128).unwrap();

        assert_eq!(processed, 1);
        assert!(tmp.path().join("a-regular-thumbnail.jpg").exists());
        assert!(!tmp.path().join("bad-thumbnail.jpg").exists());
    }

    #[test]
    fn directory_pass_stops_when_cancelled() {
        let tmp = tempfile::tempdir().unwrap();
        save_test_image(&tmp.path().join("a-regular.jpg"), 300, 200);

        let cancel = CancelFlag::new();
        cancel.cancel();
        let created = ImageProcessor::new(tmp.path(), cancel)
            .create_thumbnails(128)
            .unwrap();

        assert_eq!(created, 0);
    }
}
