use crate::error::AppError;
use crate::services::capture_service::CapturedImage;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use std::time::Instant;

/// Longest edge of the on-screen preview.
const PREVIEW_EDGE: u32 = 1280;
const PREVIEW_QUALITY: u8 = 80;

/// Build the data URI shown next to the result.
///
/// Decodes, applies EXIF orientation (phone cameras store portrait shots
/// rotated), downsizes and re-encodes as JPEG. If the local decoder cannot
/// handle the file, the original bytes are wrapped as-is so the preview
/// still shows wherever the webview can render the format.
pub fn render_preview(image: &CapturedImage) -> String {
    let start = Instant::now();
    match downscaled_jpeg(&image.bytes) {
        Ok(jpeg) => {
            tracing::debug!(
                file = %image.file_name,
                ms = start.elapsed().as_millis() as u64,
                "Preview decoded"
            );
            data_uri("image/jpeg", &jpeg)
        }
        Err(e) => {
            tracing::warn!(file = %image.file_name, error = %e, "Preview decode failed, using original bytes");
            data_uri(image.mime, &image.bytes)
        }
    }
}

fn downscaled_jpeg(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let orientation = read_orientation(bytes);

    let mut img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;

    if img.width() > PREVIEW_EDGE || img.height() > PREVIEW_EDGE {
        // Bounding box resize keeps the aspect ratio; rotation after is fine.
        img = img.resize(PREVIEW_EDGE, PREVIEW_EDGE, FilterType::Triangle);
    }

    if orientation != 1 {
        img = apply_orientation(img, orientation);
    }

    encode_jpeg(&img)
}

fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>, AppError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, PREVIEW_QUALITY);
    // JPEG has no alpha channel.
    DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
    Ok(buffer.into_inner())
}

/// EXIF orientation tag of the primary image, 1 when absent or unreadable.
fn read_orientation(bytes: &[u8]) -> u32 {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(e) => e,
        Err(_) => return 1,
    };

    match exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY) {
        Some(field) => match field.value {
            exif::Value::Short(ref v) => v.first().map(|&o| o as u32).unwrap_or(1),
            exif::Value::Long(ref v) => v.first().copied().unwrap_or(1),
            _ => 1,
        },
        None => 1,
    }
}

fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.fliph().rotate90(),
        6 => img.rotate90(),
        7 => img.fliph().rotate270(),
        8 => img.rotate270(),
        _ => img,
    }
}

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, b64)
}
