//! The floating point working buffer shared by the wavelet transform and the
//! quantizer.

use std::fmt;

/// One of the four quadrants produced by a 2D Haar decomposition step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// Low-low, the coarse approximation
    LL,
    /// Low-high, stored bottom-left
    LH,
    /// High-low, stored top-right
    HL,
    /// High-high, the diagonal detail, stored bottom-right
    HH,
}

impl Band {
    /// The three detail bands, in stream order.
    pub const DETAIL: [Band; 3] = [Band::LH, Band::HL, Band::HH];
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Band::LL => "LL",
            Band::LH => "LH",
            Band::HL => "HL",
            Band::HH => "HH",
        };
        f.write_str(name)
    }
}

/// A rectangle inside a [`CoefficientPlane`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    /// Number of coefficients covered by the region
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A row-major grid of `f32` coefficients with the same dimensions as the
/// image it came from.
///
/// After `k` forward transform steps the top-left `width/2^k × height/2^k`
/// corner holds the current approximation, and the rest of the plane holds the
/// detail bands of every completed step.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientPlane {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl CoefficientPlane {
    /// A plane of all zeroes
    pub fn zeroed(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Copy 8 bit samples into a new plane.
    pub fn from_samples(samples: &[u8], width: usize, height: usize) -> Self {
        debug_assert_eq!(samples.len(), width * height);

        Self {
            width,
            height,
            data: samples.iter().map(|&s| s as f32).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Distance in coefficients between two vertically adjacent values
    pub fn stride(&self) -> usize {
        self.width
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }

    /// The full row `y`
    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// The rectangle holding `band` after `depth` forward steps.
    ///
    /// `depth` is the decomposition depth, `1` being the first (finest) step.
    /// [`Band::LL`] only holds real data at the deepest completed step.
    pub fn region(&self, depth: u32, band: Band) -> Region {
        let width = self.width >> depth;
        let height = self.height >> depth;

        let (x, y) = match band {
            Band::LL => (0, 0),
            Band::LH => (0, height),
            Band::HL => (width, 0),
            Band::HH => (width, height),
        };

        Region { x, y, width, height }
    }

    /// The coefficient at `row`, `col` relative to the top-left of `region`
    #[inline]
    pub fn at(&self, region: Region, row: usize, col: usize) -> f32 {
        self.get(region.x + col, region.y + row)
    }

    #[inline]
    pub fn at_mut(&mut self, region: Region, row: usize, col: usize) -> &mut f32 {
        &mut self.data[(region.y + row) * self.width + region.x + col]
    }

    /// Copy the values of `region` out into a new row-major buffer.
    pub fn copy_region(&self, region: Region) -> Vec<f32> {
        let mut out = Vec::with_capacity(region.len());
        for row in 0..region.height {
            let start = (region.y + row) * self.width + region.x;
            out.extend_from_slice(&self.data[start..start + region.width]);
        }

        out
    }

    /// Convert every coefficient back to an 8 bit sample. Values are
    /// truncated toward zero and saturate at `0` and `255`.
    pub fn to_samples(&self) -> Vec<u8> {
        self.data.iter().map(|&v| v as u8).collect()
    }
}
