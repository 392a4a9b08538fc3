//! Output file naming
//!
//! Converted files are named after the input's stem: lowercased, spaces
//! replaced with underscores and the extension forced to `png`, since the
//! background-removal stage may introduce transparency.

use std::path::Path;

/// Extension given to every converted image
pub const OUTPUT_EXTENSION: &str = "png";

/// Derive the output file name for an input path
///
/// Only the final extension is dropped, so `archive.tar.gz` becomes
/// `archive.tar.png`. Dot-files without an extension keep their full name.
///
/// # Examples
/// ```
/// use image_batch_converter::naming::output_file_name;
/// use std::path::Path;
///
/// assert_eq!(output_file_name(Path::new("in/My Photo.JPG")), "my_photo.png");
/// ```
#[must_use]
pub fn output_file_name(input_path: &Path) -> String {
    let stem = input_path.file_stem().unwrap_or_default().to_string_lossy();
    format!("{}.{}", normalize_stem(&stem), OUTPUT_EXTENSION)
}

fn normalize_stem(stem: &str) -> String {
    stem.replace(' ', "_").to_lowercase()
}
