//! Native reading/writing for micrographs and analysis rasters
//!
//! TIFF goes through the `tiff` crate in both directions; PNG and JPEG
//! micrographs are decoded with `image`. Intensities are normalized to
//! `[0, 1]` for integer sample formats; color images are converted to
//! luminance.

use crate::error::{Error, Result};
use crate::raster::{GrayImage, PoreMask, Raster, RasterElement};
use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{Gray32Float, Gray8};
use tiff::encoder::TiffEncoder;
use tiff::ColorType;

/// Luminance weights applied to RGB samples (ITU-R BT.709)
const LUMA: [f64; 3] = [0.2125, 0.7154, 0.0721];

/// Read a grayscale image from a TIFF, PNG or JPEG file
///
/// Missing, empty or undecodable files are reported as [`Error::Input`].
pub fn read_image<P: AsRef<Path>>(path: P) -> Result<GrayImage> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| Error::Input(format!("cannot read {}: {}", path.display(), e)))?;
    read_image_from_buffer(&bytes)
}

/// Read a grayscale image from an in-memory buffer
///
/// TIFF is recognized by its byte-order header; anything else is handed to
/// `image`, which guesses the format from its signature.
pub fn read_image_from_buffer(data: &[u8]) -> Result<GrayImage> {
    if data.is_empty() {
        return Err(Error::Input("empty file provided".into()));
    }
    if is_tiff(data) {
        decode_gray(Cursor::new(data))
    } else {
        decode_other(data)
    }
}

fn is_tiff(data: &[u8]) -> bool {
    data.starts_with(b"II*\0") || data.starts_with(b"MM\0*")
}

/// Internal: decode PNG/JPEG into intensities
fn decode_other(data: &[u8]) -> Result<GrayImage> {
    let img = image::load_from_memory(data)
        .map_err(|e| Error::Input(format!("image decode error: {}", e)))?;
    let (width, height) = (img.width() as usize, img.height() as usize);
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    let gray = img.to_luma32f();
    let samples = gray.into_raw().into_iter().map(f64::from).collect();
    Raster::from_vec(samples, height, width)
}

/// Internal: decode any `Read + Seek` TIFF source into intensities
fn decode_gray<R>(reader: R) -> Result<GrayImage>
where
    R: std::io::Read + std::io::Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Input(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Input(format!("cannot read dimensions: {}", e)))?;
    let colortype = decoder
        .colortype()
        .map_err(|e| Error::Input(format!("cannot read color type: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let channels = match colortype {
        ColorType::Gray(_) => 1,
        ColorType::GrayA(_) => 2,
        ColorType::RGB(_) => 3,
        ColorType::RGBA(_) => 4,
        other => {
            return Err(Error::UnsupportedDataType(format!(
                "unsupported TIFF color type {:?}",
                other
            )))
        }
    };

    let result = decoder
        .read_image()
        .map_err(|e| Error::Input(format!("cannot read image data: {}", e)))?;

    let samples: Vec<f64> = match result {
        DecodingResult::U8(buf) => normalized(&buf),
        DecodingResult::U16(buf) => normalized(&buf),
        DecodingResult::U32(buf) => normalized(&buf),
        DecodingResult::F32(buf) => buf.iter().map(|&v| v as f64).collect(),
        DecodingResult::F64(buf) => buf,
        _ => {
            return Err(Error::UnsupportedDataType(
                "unsupported TIFF sample format".to_string(),
            ))
        }
    };

    if samples.len() != rows * cols * channels {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let gray = match channels {
        1 => samples,
        2 => samples.chunks_exact(2).map(|px| px[0]).collect(),
        _ => samples
            .chunks_exact(channels)
            .map(|px| LUMA[0] * px[0] + LUMA[1] * px[1] + LUMA[2] * px[2])
            .collect(),
    };

    Raster::from_vec(gray, rows, cols)
}

fn normalized<T: RasterElement>(buf: &[T]) -> Vec<f64> {
    let max = T::max_value().to_f64();
    buf.iter().map(|&v| v.to_f64() / max).collect()
}

/// Write a raster as a 32-bit float TIFF file
pub fn write_raster<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    encode_f32(raster, BufWriter::new(file))
}

/// Write a pore mask as an 8-bit TIFF (pore = 255, solid = 0)
pub fn write_mask<P: AsRef<Path>>(mask: &PoreMask, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let (rows, cols) = mask.shape();
    let data: Vec<u8> = mask.to_u8().iter().copied().collect();

    let mut encoder = TiffEncoder::new(BufWriter::new(file))
        .map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;
    encoder
        .write_image::<Gray8>(cols as u32, rows as u32, &data)
        .map_err(|e| Error::Other(format!("cannot write TIFF image: {}", e)))?;
    Ok(())
}

/// Internal: encode a raster as Gray32Float into any `Write + Seek` sink
fn encode_f32<T, W>(raster: &Raster<T>, writer: W) -> Result<()>
where
    T: RasterElement,
    W: std::io::Write + std::io::Seek,
{
    let mut encoder = TiffEncoder::new(writer)
        .map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();
    let data: Vec<f32> = raster.iter().map(|&v| v.to_f64() as f32).collect();

    encoder
        .write_image::<Gray32Float>(cols as u32, rows as u32, &data)
        .map_err(|e| Error::Other(format!("cannot write TIFF image: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray8_tiff(cols: u32, rows: u32, data: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buf)).unwrap();
        encoder.write_image::<Gray8>(cols, rows, data).unwrap();
        buf
    }

    #[test]
    fn test_read_gray8_normalizes() {
        let bytes = gray8_tiff(3, 2, &[0, 51, 255, 102, 0, 255]);
        let img = read_image_from_buffer(&bytes).unwrap();
        assert_eq!(img.shape(), (2, 3));
        assert!((img.get(0, 1).unwrap() - 0.2).abs() < 1e-12);
        assert!((img.get(0, 2).unwrap() - 1.0).abs() < 1e-12);
        assert!((img.get(1, 0).unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_read_png_normalizes() {
        let png = image::GrayImage::from_raw(3, 2, vec![0, 51, 255, 102, 0, 255]).unwrap();
        let mut bytes = Vec::new();
        image::DynamicImage::ImageLuma8(png)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let img = read_image_from_buffer(&bytes).unwrap();
        assert_eq!(img.shape(), (2, 3));
        assert!((img.get(0, 1).unwrap() - 0.2).abs() < 1e-6);
        assert!((img.get(1, 0).unwrap() - 0.4).abs() < 1e-6);
        assert_eq!(img.get(1, 2).unwrap(), 1.0);
    }

    #[test]
    fn test_empty_buffer_is_input_error() {
        assert!(matches!(read_image_from_buffer(&[]), Err(Error::Input(_))));
        assert!(matches!(
            read_image_from_buffer(b"not a tiff"),
            Err(Error::Input(_))
        ));
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let err = read_image("/definitely/not/here.tif").unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }

    #[test]
    fn test_raster_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thickness.tif");
        let raster = Raster::from_fn(4, 5, |r, c| (r * 5 + c) as u32);
        write_raster(&raster, &path).unwrap();

        let back = read_image(&path).unwrap();
        assert_eq!(back.shape(), (4, 5));
        assert_eq!(back.get(3, 4).unwrap(), 19.0);
    }

    #[test]
    fn test_mask_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.tif");
        let mask = PoreMask::from_fn(2, 2, |r, c| r == c);
        write_mask(&mask, &path).unwrap();

        let back = read_image(&path).unwrap();
        assert_eq!(back.get(0, 0).unwrap(), 1.0);
        assert_eq!(back.get(0, 1).unwrap(), 0.0);
    }
}
