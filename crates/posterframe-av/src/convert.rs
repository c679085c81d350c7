//! Resize and re-encode an extracted frame.

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::DynamicImage;

use crate::options::OutputFormat;
use crate::{Error, Result};

/// Target geometry and encoding for [`convert`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: OutputFormat,
    /// 0.0-1.0, ignored for PNG.
    pub quality: Option<f64>,
}

/// An encoded image and its final dimensions.
#[derive(Debug, Clone)]
pub struct ConvertedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Encoder quality used, `None` for PNG.
    pub quality: Option<u8>,
}

/// Decode `raw`, fit it inside the requested box and encode it.
///
/// JPEG and WebP are lossy at the resolved quality; PNG is lossless at
/// maximum compression.
pub fn convert(raw: &[u8], request: &ConvertRequest) -> Result<ConvertedImage> {
    let img = image::load_from_memory(raw)
        .map_err(|e| Error::conversion(format!("failed to decode frame: {e}")))?;

    let (src_width, src_height) = (img.width(), img.height());
    if src_width == 0 || src_height == 0 {
        return Err(Error::conversion("decoded frame is empty"));
    }

    let (width, height) = fit_inside(src_width, src_height, request.width, request.height);
    let img = if (width, height) == (src_width, src_height) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    };

    let quality = request.format.encoder_quality(request.quality);
    let bytes = encode(&img, request.format, quality)?;

    tracing::debug!(
        src_width,
        src_height,
        width,
        height,
        format = %request.format,
        len = bytes.len(),
        "converted frame"
    );

    Ok(ConvertedImage {
        bytes,
        width,
        height,
        quality,
    })
}

/// Dimensions of a `width` x `height` image scaled to fit inside the
/// requested box, keeping its aspect ratio. A missing axis is unbounded.
pub fn fit_inside(
    width: u32,
    height: u32,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> (u32, u32) {
    let (w, h) = (width as f64, height as f64);
    let scaled = |v: f64| (v.round() as u32).max(1);

    match (max_width, max_height) {
        (None, None) => (width, height),
        (Some(mw), None) => (mw, scaled(h * mw as f64 / w)),
        (None, Some(mh)) => (scaled(w * mh as f64 / h), mh),
        (Some(mw), Some(mh)) => {
            if (mw as f64 / w) <= (mh as f64 / h) {
                (mw, scaled(h * mw as f64 / w))
            } else {
                (scaled(w * mh as f64 / h), mh)
            }
        }
    }
}

fn encode(img: &DynamicImage, format: OutputFormat, quality: Option<u8>) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Png => {
            let mut buf = Vec::new();
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder)?;
            Ok(buf)
        }
        OutputFormat::Webp => {
            let quality = quality.unwrap_or(crate::options::DEFAULT_WEBP_QUALITY);
            encode_webp(img, quality)
        }
        OutputFormat::Jpeg => {
            let quality = quality.unwrap_or(crate::options::DEFAULT_JPEG_QUALITY);
            encode_jpeg(img, quality)
        }
    }
}

/// Lossy WebP through libwebp.
fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgba = img.to_rgba8();
    let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
        .encode_simple(false, f32::from(quality))
        .map_err(|e| Error::conversion(format!("webp encoding failed: {e:?}")))?;
    Ok(encoded.to_vec())
}

/// Baseline JPEG with optimized Huffman tables.
fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();
    let (width, height) = match (u16::try_from(rgb.width()), u16::try_from(rgb.height())) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(Error::conversion(format!(
                "{}x{} exceeds the JPEG size limit",
                rgb.width(),
                rgb.height()
            )))
        }
    };

    let mut buf = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut buf, quality);
    encoder.set_optimized_huffman_tables(true);
    encoder
        .encode(rgb.as_raw(), width, height, jpeg_encoder::ColorType::Rgb)
        .map_err(|e| Error::conversion(format!("jpeg encoding failed: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_frame(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn fit_inside_width_only() {
        assert_eq!(fit_inside(1920, 1080, Some(320), None), (320, 180));
    }

    #[test]
    fn fit_inside_height_only() {
        assert_eq!(fit_inside(1920, 1080, None, Some(90)), (160, 90));
    }

    #[test]
    fn fit_inside_box_uses_tighter_axis() {
        assert_eq!(fit_inside(1920, 1080, Some(320), Some(320)), (320, 180));
        assert_eq!(fit_inside(1080, 1920, Some(320), Some(320)), (180, 320));
    }

    #[test]
    fn fit_inside_never_collapses_to_zero() {
        assert_eq!(fit_inside(4000, 2, Some(100), None), (100, 1));
    }

    #[test]
    fn no_resize_keeps_source_dimensions() {
        let raw = png_frame(64, 36);
        let out = convert(&raw, &ConvertRequest::default()).unwrap();

        assert_eq!((out.width, out.height), (64, 36));
        assert_eq!(
            image::guess_format(&out.bytes).unwrap(),
            ImageFormat::Jpeg
        );
        assert_eq!(out.quality, Some(92));
    }

    #[test]
    fn resize_reports_final_dimensions() {
        let raw = png_frame(160, 90);
        let request = ConvertRequest {
            width: Some(32),
            ..Default::default()
        };
        let out = convert(&raw, &request).unwrap();

        assert_eq!((out.width, out.height), (32, 18));
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 18));
    }

    #[test]
    fn png_output_has_no_quality() {
        let raw = png_frame(16, 16);
        let request = ConvertRequest {
            format: OutputFormat::Png,
            quality: Some(0.3),
            ..Default::default()
        };
        let out = convert(&raw, &request).unwrap();

        assert_eq!(image::guess_format(&out.bytes).unwrap(), ImageFormat::Png);
        assert_eq!(out.quality, None);
    }

    #[test]
    fn webp_output_defaults_to_75() {
        let raw = png_frame(16, 16);
        let request = ConvertRequest {
            format: OutputFormat::Webp,
            ..Default::default()
        };
        let out = convert(&raw, &request).unwrap();

        assert_eq!(&out.bytes[0..4], b"RIFF");
        assert_eq!(&out.bytes[8..12], b"WEBP");
        assert_eq!(out.quality, Some(75));
    }

    fn webp_at(raw: &[u8], quality: Option<f64>) -> ConvertedImage {
        let request = ConvertRequest {
            format: OutputFormat::Webp,
            quality,
            ..Default::default()
        };
        convert(raw, &request).unwrap()
    }

    #[test]
    fn webp_quality_changes_output() {
        let raw = png_frame(128, 128);
        let low = webp_at(&raw, Some(0.1));
        let high = webp_at(&raw, Some(1.0));

        assert_eq!(low.quality, Some(10));
        assert_eq!(high.quality, Some(100));
        assert!(
            low.bytes.len() < high.bytes.len(),
            "low={} high={}",
            low.bytes.len(),
            high.bytes.len()
        );
    }

    #[test]
    fn webp_default_encodes_at_75() {
        let raw = png_frame(128, 128);
        let default = webp_at(&raw, None);
        let explicit = webp_at(&raw, Some(0.75));

        assert_eq!(default.bytes, explicit.bytes);
        assert_ne!(default.bytes, webp_at(&raw, Some(1.0)).bytes);
    }

    #[test]
    fn jpeg_uses_optimized_huffman_tables() {
        let raw = png_frame(128, 128);
        let img = image::load_from_memory(&raw).unwrap();
        let rgb = img.to_rgb8();

        let mut standard = Vec::new();
        jpeg_encoder::Encoder::new(&mut standard, 92)
            .encode(rgb.as_raw(), 128, 128, jpeg_encoder::ColorType::Rgb)
            .unwrap();
        let optimized = encode_jpeg(&img, 92).unwrap();

        let decoded = image::load_from_memory(&optimized).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (128, 128));
        assert!(
            optimized.len() < standard.len(),
            "optimized={} standard={}",
            optimized.len(),
            standard.len()
        );
    }

    #[test]
    fn jpeg_default_encodes_at_92() {
        let raw = png_frame(64, 64);
        let default = convert(&raw, &ConvertRequest::default()).unwrap();
        let explicit = convert(
            &raw,
            &ConvertRequest {
                quality: Some(0.92),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(default.bytes, explicit.bytes);
    }

    #[test]
    fn jpeg_quality_changes_output() {
        let raw = png_frame(128, 128);
        let low = convert(
            &raw,
            &ConvertRequest {
                quality: Some(0.1),
                ..Default::default()
            },
        )
        .unwrap();
        let high = convert(
            &raw,
            &ConvertRequest {
                quality: Some(1.0),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(low.quality, Some(10));
        assert_eq!(high.quality, Some(100));
        assert!(low.bytes.len() < high.bytes.len());
    }

    #[test]
    fn garbage_is_conversion_failed() {
        let err = convert(b"not an image at all", &ConvertRequest::default()).unwrap_err();
        assert!(matches!(err, Error::ConversionFailed(_)), "got: {err}");
    }

    #[test]
    fn truncated_frame_is_conversion_failed() {
        let raw = png_frame(64, 64);
        let err = convert(&raw[..raw.len() / 2], &ConvertRequest::default()).unwrap_err();
        assert!(matches!(err, Error::ConversionFailed(_)), "got: {err}");
    }
}
