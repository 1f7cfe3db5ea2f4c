use std::{
    io::{self, Write},
    path::Path,
};

use anyhow::Result;
use hwc::{GrayPicture, Quantizer};
use image::{ImageFormat, ImageReader};
use text_io::read;

#[derive(Clone, Copy)]
pub enum Assume {
    Yes,
    No,
}

pub fn quantizer(s: &str) -> Result<Quantizer, String> {
    if !s.is_ascii() {
        return Err(format!("Invalid quantizer {}", s))
    }

    let s_lower = s.to_lowercase();

    let quantizer = match s_lower.as_str() {
        "midrise" => Quantizer::Midrise,
        "zero-snap" | "zerosnap" => Quantizer::ZeroSnap,
        _ => return Err(format!("Invalid quantizer {}", s)),
    };

    Ok(quantizer)
}

/// Whether `path` has an extension `image` can write.
pub fn is_image_path<P: AsRef<Path>>(path: P) -> bool {
    ImageFormat::from_path(path).is_ok_and(|f| f.can_write())
}

/// Load the input picture, from a raw file when its dimensions are known, or
/// through `image` otherwise.
pub fn read_picture<P: AsRef<Path>>(path: P, dimensions: Option<(u32, u32)>) -> Result<GrayPicture> {
    if let Some((width, height)) = dimensions {
        return Ok(GrayPicture::open_raw(path, width, height)?);
    }

    let image = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?
        .into_luma8();

    let (width, height) = image.dimensions();
    Ok(GrayPicture::from_raw(width, height, image.into_vec())?)
}

pub fn exists_decision<P: AsRef<Path>>(place: &str, action: &str, path: &P, assume: Option<Assume>) -> bool {
    let path = path.as_ref();

    match assume {
        Some(Assume::Yes) => return true,
        Some(Assume::No) => return false,
        None => (),
    }

    loop {
        print!("{place} file {path:?} already exists. {action}? [y/N] ");
        let _ = io::stdout().flush();

        let opt: String = read!("{}\n");
        let opt = opt.trim().to_lowercase();

        match opt.as_str() {
            "y" | "yes" => return true,
            "" | "n" | "no" => return false,
            _ => continue,
        }
    }
}
