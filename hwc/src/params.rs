use crate::{
    compression::quantization::{Quantizer, MAX_LEVELS},
    picture::Error,
};

/// Settings shared by the encoder and the decoder.
///
/// None of this is stored in the encoded stream. A stream can only be decoded
/// with the exact parameters, width and height it was encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameters {
    /// Number of wavelet decomposition levels, from 1 to 7. More levels give
    /// a smaller stream and a blurrier result. Default value is 3.
    pub levels: u32,

    /// The detail quantizer to use.
    pub quantizer: Quantizer,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            levels: 3,
            quantizer: Quantizer::default(),
        }
    }
}

impl Parameters {
    pub fn new(levels: u32) -> Self {
        Self {
            levels,
            ..Default::default()
        }
    }

    pub fn with_quantizer(self, quantizer: Quantizer) -> Self {
        Self { quantizer, ..self }
    }

    /// Check that an image of the given size can be coded with these
    /// parameters.
    pub fn validate(&self, width: u32, height: u32) -> Result<(), Error> {
        if !(1..=MAX_LEVELS).contains(&self.levels) {
            return Err(Error::InvalidLevels(self.levels));
        }

        let block = 1u32 << self.levels;
        if width == 0 || height == 0 || width % block != 0 || height % block != 0 {
            return Err(Error::IndivisibleDimensions {
                width,
                height,
                levels: self.levels,
            });
        }

        Ok(())
    }
}
