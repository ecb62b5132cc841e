//! Test fixtures: images built in memory, plus magic-number-only blobs.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use img_parts::jpeg::Jpeg;
use img_parts::ImageEXIF;
use std::io::Cursor;

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .expect("Failed to encode fixture");
    buf
}

/// Opaque gradient PNG.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    encode(&DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

/// Fully transparent PNG.
pub fn transparent_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    encode(&DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

pub fn gif(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]));
    encode(&DynamicImage::ImageRgba8(img), ImageFormat::Gif)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([40, 80, 120]));
    encode(&DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

/// JPEG carrying an EXIF block with the given orientation tag.
pub fn jpeg_with_orientation(width: u32, height: u32, tag: u8) -> Vec<u8> {
    let exif = vec![
        b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08, // big-endian TIFF header
        0x00, 0x01, // one IFD0 entry
        0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, 0x00, tag, 0x00, 0x00, // Orientation
        0x00, 0x00, 0x00, 0x00,
    ];

    let mut parsed = Jpeg::from_bytes(jpeg(width, height).into()).expect("Failed to parse JPEG");
    parsed.set_exif(Some(exif.into()));
    parsed.encoder().bytes().to_vec()
}

/// A JPEG cut off after its header: sniffs as JPEG, does not decode.
pub fn truncated_jpeg() -> Vec<u8> {
    let mut data = jpeg(64, 64);
    data.truncate(200);
    data
}

/// WebP signature only; enough for sniffing.
pub fn webp() -> Vec<u8> {
    let mut data = b"RIFF\x24\0\0\0WEBPVP8 ".to_vec();
    data.extend_from_slice(&[0u8; 32]);
    data
}

/// MP4 `ftyp` box only; enough for sniffing.
pub fn mp4() -> Vec<u8> {
    let mut data = b"\0\0\0\x18ftypmp42\0\0\0\0mp42isom".to_vec();
    data.extend_from_slice(&[0u8; 64]);
    data
}

/// Minimal PDF.
pub fn pdf() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n"
        .to_vec()
}
