use color_quant::NeuQuant;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ExtendedColorType, ImageResult, Rgba, RgbaImage};
use std::collections::HashSet;

use super::Codec;

pub const DEFAULT_QUALITY: i32 = 100;
pub const DEFAULT_MAX_COLOURS: i32 = 256;

/// NeuQuant sample factor (1 = best, 30 = fastest)
const NEUQUANT_SAMPLE_FACTOR: i32 = 10;

/// Encoder settings after range normalisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// JPEG quality, 1..=100
    pub quality: u8,
    /// GIF palette bound, 1..=256
    pub max_colours: u16,
}

impl EncodeOptions {
    /// Quality is clamped to 1..=100. A palette size outside 1..=256 means
    /// the full 256 colour palette.
    pub fn new(quality: i32, max_colours: i32) -> Self {
        let quality = quality.clamp(1, 100) as u8;
        let max_colours = if (1..=256).contains(&max_colours) {
            max_colours as u16
        } else {
            256
        };
        Self {
            quality,
            max_colours,
        }
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY, DEFAULT_MAX_COLOURS)
    }
}

/// Decode `bytes` forcing the given codec
pub fn decode(bytes: &[u8], codec: Codec) -> ImageResult<DynamicImage> {
    image::load_from_memory_with_format(bytes, codec.image_format())
}

/// Encode an image into `codec`'s byte form
pub fn encode(image: &DynamicImage, codec: Codec, options: &EncodeOptions) -> ImageResult<Vec<u8>> {
    let mut buffer = Vec::new();

    match codec {
        Codec::Png => {
            image.write_with_encoder(PngEncoder::new(&mut buffer))?;
        }
        Codec::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, options.quality);
            jpeg_compatible(image).write_with_encoder(encoder)?;
        }
        Codec::Gif => {
            let rgba = quantize(&image.to_rgba8(), options.max_colours);
            // The GIF trailer is written when the encoder is dropped
            let mut encoder = GifEncoder::new(&mut buffer);
            encoder.encode(
                rgba.as_raw(),
                rgba.width(),
                rgba.height(),
                ExtendedColorType::Rgba8,
            )?;
        }
    }

    Ok(buffer)
}

/// JPEG has no alpha channel and no 16-bit baseline support
fn jpeg_compatible(image: &DynamicImage) -> DynamicImage {
    match image.color() {
        ColorType::L8 | ColorType::Rgb8 => image.clone(),
        ColorType::L16 | ColorType::La8 | ColorType::La16 => image.to_luma8().into(),
        _ => image.to_rgb8().into(),
    }
}

fn distinct_colours(image: &RgbaImage) -> usize {
    image
        .pixels()
        .map(|p| p.0)
        .collect::<HashSet<[u8; 4]>>()
        .len()
}

/// Reduce an RGBA raster to at most `max_colours` distinct colours.
///
/// Fully transparent pixels collapse into a single transparent entry which
/// takes one of the available slots; everything else is opaque. With a
/// single slot there is no room for transparency: the whole raster becomes
/// the mean opaque colour, or transparent when no pixel is opaque.
pub fn quantize(image: &RgbaImage, max_colours: u16) -> RgbaImage {
    let max_colours = max_colours.clamp(1, 256) as usize;
    if max_colours == 1 {
        return single_colour(image);
    }

    let mut output = image.clone();
    let mut has_transparency = false;
    for pixel in output.pixels_mut() {
        if pixel[3] == 0 {
            pixel.0 = [0, 0, 0, 0];
            has_transparency = true;
        } else {
            pixel[3] = 255;
        }
    }

    if distinct_colours(&output) <= max_colours {
        return output;
    }

    let opaque_slots = if has_transparency {
        max_colours - 1
    } else {
        max_colours
    };
    let quantizer = NeuQuant::new(NEUQUANT_SAMPLE_FACTOR, opaque_slots, output.as_raw());

    for pixel in output.pixels_mut() {
        if pixel[3] == 0 {
            continue;
        }
        if let Some([r, g, b, _]) = quantizer.lookup(quantizer.index_of(&pixel.0)) {
            pixel.0 = [r, g, b, 255];
        }
    }

    output
}

/// Fill the raster with the mean of its non-transparent pixels
fn single_colour(image: &RgbaImage) -> RgbaImage {
    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for pixel in image.pixels().filter(|p| p[3] != 0) {
        for (total, channel) in sum.iter_mut().zip(pixel.0) {
            *total += u64::from(channel);
        }
        count += 1;
    }

    let fill = if count == 0 {
        Rgba([0, 0, 0, 0])
    } else {
        let [r, g, b] = sum.map(|total| (total / count) as u8);
        Rgba([r, g, b, 255])
    };
    RgbaImage::from_pixel(image.width(), image.height(), fill)
}
