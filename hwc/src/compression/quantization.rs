//! Subband quantization. The approximation band is stored as plain bytes,
//! every detail band is reduced to a fixed number of bits which shrinks for
//! the finer, less important levels.

/// Largest number of transform levels the 8 bit budget allows. Each level
/// costs one bit of detail precision, and the finest level must keep at least
/// one.
pub const MAX_LEVELS: u32 = 7;

/// How a detail bin index is turned back into a coefficient. Both variants
/// compute the same index, so they write identical streams.
///
/// Bins tile `[-127.5, 128.5)` starting at `-127.5` with a width of one
/// step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quantizer {
    /// Decode to the bin midpoint. The error is at most half a step over the
    /// whole `[-127.5, 127.5]` range, but a zero coefficient comes back as
    /// `-step/2 + 0.5`, so flat areas pick up a small ripple.
    #[default]
    Midrise,

    /// Like [`Quantizer::Midrise`], except the bin holding zero decodes to
    /// exactly zero. Flat areas come out untouched. Inside that bin, which
    /// spans `[0.5 - step, 0.5)`, the error can reach `step - 0.5`.
    ZeroSnap,
}

impl Quantizer {
    /// Map a detail coefficient to its bin index for `pass`. Indexes outside
    /// `0..2^bits` are clamped to the nearest end.
    pub fn quantize(&self, value: f32, pass: Pass) -> u8 {
        let step = pass.step() as f32;
        let index = ((value + 127.5) / step).floor();

        index.clamp(0.0, pass.max_index() as f32) as u8
    }

    /// Reconstruct a detail coefficient from its bin index.
    pub fn dequantize(&self, index: u8, pass: Pass) -> f32 {
        if *self == Quantizer::ZeroSnap && index == pass.zero_bin() {
            return 0.0;
        }

        let step = pass.step() as f32;
        index as f32 * step + step / 2.0 - 127.5
    }

    /// Largest reconstruction error over `[-127.5, 127.5]` for a coefficient
    /// in `pass`.
    pub fn max_error(&self, pass: Pass) -> f32 {
        let step = pass.step() as f32;
        match self {
            Quantizer::Midrise => step / 2.0,
            Quantizer::ZeroSnap => step - 0.5,
        }
    }
}

/// Store an approximation coefficient as a byte, truncating toward zero.
pub fn quantize_approximation(value: f32) -> u8 {
    value as u8
}

pub fn dequantize_approximation(value: u8) -> f32 {
    value as f32
}

/// One detail level in the order it is written to the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    /// Position in the stream, `1` being the first pass after the
    /// approximation band.
    pub index: u32,

    /// Decomposition depth of the bands in this pass. Pass `1` holds the
    /// deepest (coarsest) level.
    pub depth: u32,
}

impl Pass {
    /// Bits used for every coefficient in this pass
    pub fn bits(&self) -> u8 {
        (8 - self.index) as u8
    }

    /// Width of one quantization bin
    pub fn step(&self) -> u32 {
        1 << self.index
    }

    /// Largest index that fits in [`Pass::bits`]
    pub fn max_index(&self) -> u8 {
        ((1u16 << self.bits()) - 1) as u8
    }

    /// Index of the bin that holds a zero coefficient
    pub fn zero_bin(&self) -> u8 {
        ((128 >> self.index) - 1) as u8
    }
}

/// The bit allocation for a given number of transform levels. The same
/// schedule must be walked when writing and reading a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizationSchedule {
    levels: u32,
}

impl QuantizationSchedule {
    pub fn new(levels: u32) -> Self {
        debug_assert!((1..=MAX_LEVELS).contains(&levels));
        Self { levels }
    }

    /// Every detail pass, coarsest first.
    pub fn passes(&self) -> impl Iterator<Item = Pass> {
        let levels = self.levels;
        (1..=levels).map(move |index| Pass {
            index,
            depth: levels - index + 1,
        })
    }

    /// Total number of bits the detail passes take for an image of the given
    /// size.
    pub fn detail_bits(&self, width: usize, height: usize) -> usize {
        self.passes()
            .map(|pass| {
                let band_size = (width >> pass.depth) * (height >> pass.depth);
                3 * band_size * pass.bits() as usize
            })
            .sum()
    }

    /// Exact byte length of an encoded stream for an image of the given size.
    pub fn stream_len(&self, width: usize, height: usize) -> usize {
        let approximation = (width >> self.levels) * (height >> self.levels);
        approximation + self.detail_bits(width, height).div_ceil(8)
    }
}
