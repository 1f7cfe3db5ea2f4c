//! Headerless raw sample files, `width × height` bytes in row-major order.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use log::warn;

use crate::picture::Error;

/// Read exactly `width × height` samples from a raw file.
///
/// A file that is too short is an error. Anything past the expected size is
/// ignored.
pub fn read_raw<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<Vec<u8>, Error> {
    let path = path.as_ref();
    let expected = width as usize * height as usize;

    let mut bitmap = Vec::with_capacity(expected);
    BufReader::new(File::open(path)?).read_to_end(&mut bitmap)?;

    if bitmap.len() < expected {
        return Err(Error::BitmapSize {
            expected,
            got: bitmap.len(),
        });
    } else if bitmap.len() > expected {
        warn!(
            "{:?} holds {} bytes, only the first {} are used",
            path,
            bitmap.len(),
            expected
        );
        bitmap.truncate(expected);
    }

    Ok(bitmap)
}

/// Write samples to a raw file, replacing it if it exists.
pub fn write_raw<P: AsRef<Path>>(path: P, bitmap: &[u8]) -> Result<(), Error> {
    let mut out_file = BufWriter::new(File::create(path)?);
    out_file.write_all(bitmap)?;
    out_file.flush()?;

    Ok(())
}
