use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Cursor, Read, Write},
    path::Path,
};

use byteorder::{ReadBytesExt, WriteBytesExt};
use log::{debug, trace};
use thiserror::Error;

use crate::{
    binio::{BitPacker, BitUnpacker},
    compression::{
        haar,
        quantization::{
            dequantize_approximation, quantize_approximation, QuantizationSchedule,
        },
    },
    operations,
    params::Parameters,
    plane::{Band, CoefficientPlane},
    raw,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} levels is out of range, must be between 1 and 7")]
    InvalidLevels(u32),

    #[error("{width}×{height} is not divisible by 2^{levels}")]
    IndivisibleDimensions { width: u32, height: u32, levels: u32 },

    #[error("bitmap holds {got} bytes, {expected} expected")]
    BitmapSize { expected: usize, got: usize },

    #[error("stream holds {got} bytes, {expected} expected")]
    StreamTooShort { expected: usize, got: usize },

    #[error("buffers differ in length: {0} and {1}")]
    LengthMismatch(usize, usize),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A single channel, 8 bit grayscale picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayPicture {
    width: u32,
    height: u32,

    /// Row-major samples, one byte each
    bitmap: Vec<u8>,
}

impl GrayPicture {
    /// Create a picture from a row-major bitmap of exactly `width × height`
    /// bytes.
    pub fn from_raw(width: u32, height: u32, bitmap: Vec<u8>) -> Result<Self, Error> {
        let expected = width as usize * height as usize;
        if bitmap.len() != expected {
            return Err(Error::BitmapSize {
                expected,
                got: bitmap.len(),
            });
        }

        Ok(Self {
            width,
            height,
            bitmap,
        })
    }

    /// Read a headerless raw file of `width × height` bytes.
    pub fn open_raw<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<Self, Error> {
        let bitmap = raw::read_raw(path, width, height)?;
        Self::from_raw(width, height, bitmap)
    }

    /// Write the bitmap out as a headerless raw file.
    pub fn save_raw<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        raw::write_raw(path, &self.bitmap)
    }

    /// Encode the picture and write the stream to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P, params: &Parameters) -> Result<(), Error> {
        let mut out_file = BufWriter::new(File::create(path)?);
        self.encode(params, &mut out_file)?;

        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.bitmap
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.bitmap
    }

    /// Mean squared error between this picture and another of the same size.
    pub fn mse(&self, other: &GrayPicture) -> Result<f64, Error> {
        operations::mse(&self.bitmap, &other.bitmap)
    }

    /// Encode the picture into anything that implements [`Write`], returning
    /// the number of bytes written.
    ///
    /// The stream is the approximation band as plain bytes, followed by the
    /// bit packed detail bands coarsest level first. The width, height and
    /// parameters are not part of it.
    pub fn encode<O: Write + WriteBytesExt>(
        &self,
        params: &Parameters,
        mut output: O,
    ) -> Result<usize, Error> {
        params.validate(self.width, self.height)?;

        let width = self.width as usize;
        let height = self.height as usize;
        let levels = params.levels;
        let schedule = QuantizationSchedule::new(levels);

        debug!(
            "encoding {}×{} with {} levels, {:?} quantizer",
            width, height, levels, params.quantizer
        );

        let mut plane = CoefficientPlane::from_samples(&self.bitmap, width, height);
        haar::forward(&mut plane, levels);

        // Approximation band, one byte per coefficient
        let ll = plane.region(levels, Band::LL);
        for i in 0..ll.height {
            for j in 0..ll.width {
                output.write_u8(quantize_approximation(plane.at(ll, i, j)))?;
            }
        }

        // Detail bands, interleaved LH, HL, HH per position
        let mut packer = BitPacker::new(&mut output);
        for pass in schedule.passes() {
            let regions = Band::DETAIL.map(|band| plane.region(pass.depth, band));
            let bits = pass.bits();

            trace!(
                "pass {}: {}×{} bands at {} bits",
                pass.index, regions[0].width, regions[0].height, bits
            );

            for i in 0..regions[0].height {
                for j in 0..regions[0].width {
                    for region in regions {
                        let index = params.quantizer.quantize(plane.at(region, i, j), pass);
                        packer.push(index, bits)?;
                    }
                }
            }
        }
        packer.flush()?;

        let size = ll.len() + packer.byte_size();
        debug!("encoded {} bytes into {}", self.bitmap.len(), size);

        Ok(size)
    }

    /// Decode a picture from anything that implements [`Read`].
    ///
    /// `width`, `height` and `params` must be the ones the stream was encoded
    /// with. Exactly as many bytes as the stream needs are consumed.
    pub fn decode<I: Read + ReadBytesExt>(
        mut input: I,
        width: u32,
        height: u32,
        params: &Parameters,
    ) -> Result<Self, Error> {
        params.validate(width, height)?;

        let levels = params.levels;
        let schedule = QuantizationSchedule::new(levels);

        debug!(
            "decoding {}×{} with {} levels, {:?} quantizer",
            width, height, levels, params.quantizer
        );

        let mut plane = CoefficientPlane::zeroed(width as usize, height as usize);

        let ll = plane.region(levels, Band::LL);
        let mut ll_bytes = vec![0u8; ll.len()];
        input.read_exact(&mut ll_bytes)?;
        for (n, &value) in ll_bytes.iter().enumerate() {
            *plane.at_mut(ll, n / ll.width, n % ll.width) = dequantize_approximation(value);
        }

        let mut unpacker = BitUnpacker::new(&mut input);
        for pass in schedule.passes() {
            let regions = Band::DETAIL.map(|band| plane.region(pass.depth, band));
            let bits = pass.bits();

            for i in 0..regions[0].height {
                for j in 0..regions[0].width {
                    for region in regions {
                        let index = unpacker.pull(bits)?;
                        *plane.at_mut(region, i, j) = params.quantizer.dequantize(index, pass);
                    }
                }
            }
        }

        haar::inverse(&mut plane, levels);

        Ok(Self {
            width,
            height,
            bitmap: plane.to_samples(),
        })
    }
}

/// Encode a picture with `levels` decomposition levels and the default
/// quantizer, returning the stream.
pub fn encode(picture: &GrayPicture, levels: u32) -> Result<Vec<u8>, Error> {
    let mut stream = Vec::new();
    picture.encode(&Parameters::new(levels), &mut stream)?;

    Ok(stream)
}

/// Decode a stream made by [`encode`].
pub fn decode(stream: &[u8], width: u32, height: u32, levels: u32) -> Result<GrayPicture, Error> {
    decode_with(stream, width, height, &Parameters::new(levels))
}

/// Decode an in-memory stream, checking its length before doing any work.
/// Bytes past the end of the stream are ignored.
pub fn decode_with(
    stream: &[u8],
    width: u32,
    height: u32,
    params: &Parameters,
) -> Result<GrayPicture, Error> {
    params.validate(width, height)?;

    let expected = QuantizationSchedule::new(params.levels)
        .stream_len(width as usize, height as usize);
    if stream.len() < expected {
        return Err(Error::StreamTooShort {
            expected,
            got: stream.len(),
        });
    } else if stream.len() > expected {
        debug!("ignoring {} trailing bytes", stream.len() - expected);
    }

    GrayPicture::decode(Cursor::new(&stream[..expected]), width, height, params)
}

/// Open an encoded stream file and decode it.
pub fn open<P: AsRef<Path>>(
    path: P,
    width: u32,
    height: u32,
    params: &Parameters,
) -> Result<GrayPicture, Error> {
    let mut stream = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut stream)?;

    decode_with(&stream, width, height, params)
}
