//! Encoding and decoding of stream images.

use std::fs;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use image::{ColorType, DynamicImage, RgbaImage};

use crate::error::ImgvisError;
use crate::ir::{Image, ImageFormat};

fn codec_format(format: ImageFormat) -> image::ImageFormat {
    match format {
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Bmp => image::ImageFormat::Bmp,
        ImageFormat::Gif => image::ImageFormat::Gif,
        ImageFormat::Tiff => image::ImageFormat::Tiff,
        ImageFormat::WebP => image::ImageFormat::WebP,
    }
}

fn from_codec_format(format: image::ImageFormat) -> Option<ImageFormat> {
    match format {
        image::ImageFormat::Png => Some(ImageFormat::Png),
        image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
        image::ImageFormat::Bmp => Some(ImageFormat::Bmp),
        image::ImageFormat::Gif => Some(ImageFormat::Gif),
        image::ImageFormat::Tiff => Some(ImageFormat::Tiff),
        image::ImageFormat::WebP => Some(ImageFormat::WebP),
        _ => None,
    }
}

/// Decodes the pixels of a stream image.
pub fn decode(image: &Image) -> Result<DynamicImage, ImgvisError> {
    Ok(image::load_from_memory_with_format(
        &image.data,
        codec_format(image.format),
    )?)
}

/// Encodes pixels in `format`, converting to a color type the format's
/// encoder accepts.
pub fn encode(pixels: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ImgvisError> {
    let converted;
    let pixels = match format {
        ImageFormat::Jpeg | ImageFormat::Bmp if pixels.color().has_alpha() => {
            converted = DynamicImage::ImageRgb8(pixels.to_rgb8());
            &converted
        }
        ImageFormat::Jpeg if pixels.color() != ColorType::L8 && pixels.color() != ColorType::Rgb8 => {
            converted = DynamicImage::ImageRgb8(pixels.to_rgb8());
            &converted
        }
        ImageFormat::Gif | ImageFormat::WebP if pixels.color() != ColorType::Rgba8 => {
            converted = DynamicImage::ImageRgba8(pixels.to_rgba8());
            &converted
        }
        _ => pixels,
    };
    let mut bytes = Cursor::new(Vec::new());
    pixels.write_to(&mut bytes, codec_format(format))?;
    Ok(bytes.into_inner())
}

/// Converts an RGBA buffer back into the color type of the source image.
pub fn restore_color_type(pixels: RgbaImage, color: ColorType) -> DynamicImage {
    let rgba = DynamicImage::ImageRgba8(pixels);
    match color {
        ColorType::L8 => DynamicImage::ImageLuma8(rgba.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(rgba.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(rgba.to_rgb8()),
        other if other.has_alpha() => rgba,
        _ => DynamicImage::ImageRgb8(rgba.to_rgb8()),
    }
}

/// Wraps encoded bytes into an [`Image`], detecting format and size.
pub fn image_from_bytes(file_name: &str, data: Vec<u8>) -> Result<Image, ImgvisError> {
    let by_extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension);
    let format = match by_extension {
        Some(format) => format,
        None => image::guess_format(&data)
            .ok()
            .and_then(from_codec_format)
            .ok_or_else(|| ImgvisError::UnsupportedImageFormat(file_name.to_string()))?,
    };
    let size = imagesize::blob_size(&data).map_err(|err| {
        ImgvisError::UnsupportedImageFormat(format!("{file_name}: {err}"))
    })?;
    Ok(Image::new(
        file_name,
        data,
        format,
        size.width as u32,
        size.height as u32,
    ))
}

/// Resolves a stream file name below `dir`.
///
/// Only plain relative names are accepted; absolute names and `..`
/// components would escape `dir`.
pub fn stream_path(dir: &Path, file_name: &str) -> Result<PathBuf, ImgvisError> {
    let relative = Path::new(file_name);
    let plain = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if file_name.is_empty() || !plain {
        return Err(ImgvisError::InvalidImagePath(file_name.to_string()));
    }
    Ok(dir.join(relative))
}

/// Reads `file_name` from `dir` as a stream image.
pub fn load_image(dir: &Path, file_name: &str) -> Result<Image, ImgvisError> {
    let data = fs::read(stream_path(dir, file_name)?)?;
    image_from_bytes(file_name, data)
}

/// Writes the encoded bytes of `image` to `dir`, keeping its file name.
pub fn save_image(dir: &Path, image: &Image) -> Result<(), ImgvisError> {
    let path = stream_path(dir, &image.file_name)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &image.data)?;
    Ok(())
}
