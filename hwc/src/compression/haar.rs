use log::trace;

use crate::plane::{CoefficientPlane, Region};

/// Run one forward Haar step over the top-left `width × height` corner of the
/// plane.
///
/// Both filters are `{1/2, 1/2}` and `{1/2, -1/2}`, so the transform is not
/// energy preserving. The approximation lands in the top-left quadrant of the
/// corner, LH bottom-left, HL top-right and HH bottom-right.
pub fn forward_step(plane: &mut CoefficientPlane, width: usize, height: usize) {
    debug_assert!(width % 2 == 0 && height % 2 == 0);
    debug_assert!(width <= plane.width() && height <= plane.height());

    let stride = plane.stride();
    let half_width = width / 2;

    // Horizontal pass, low pass into the left half of each row and high pass
    // into the right half
    for_each_row(&mut plane.as_mut_slice()[..height * stride], stride, |row| {
        let mut low = Vec::with_capacity(half_width);
        let mut high = Vec::with_capacity(half_width);
        for pair in row[..width].chunks_exact(2) {
            low.push((pair[0] + pair[1]) / 2.0);
            high.push((pair[0] - pair[1]) / 2.0);
        }

        row[..half_width].copy_from_slice(&low);
        row[half_width..width].copy_from_slice(&high);
    });

    // Vertical pass over every column of the corner. Left columns hold L and
    // become LL/LH, right columns hold H and become HL/HH
    let half_height = height / 2;
    let corner = plane.copy_region(Region { x: 0, y: 0, width, height });
    for i in 0..half_height {
        let even = &corner[2 * i * width..(2 * i + 1) * width];
        let odd = &corner[(2 * i + 1) * width..(2 * i + 2) * width];

        for j in 0..width {
            plane.set(j, i, (even[j] + odd[j]) / 2.0);
            plane.set(j, i + half_height, (even[j] - odd[j]) / 2.0);
        }
    }
}

/// Undo one [`forward_step`], rebuilding the `2 × width` by `2 × height`
/// corner from the four `width × height` quadrants at its top-left.
pub fn inverse_step(plane: &mut CoefficientPlane, width: usize, height: usize) {
    debug_assert!(2 * width <= plane.width() && 2 * height <= plane.height());

    let stride = plane.stride();
    let full_width = 2 * width;

    // Vertical interpolation, top quadrants plus or minus bottom quadrants.
    // The left half of each rebuilt row is the low pass row, the right half
    // the high pass row
    let corner = plane.copy_region(Region {
        x: 0,
        y: 0,
        width: full_width,
        height: 2 * height,
    });
    for i in 0..height {
        let top = &corner[i * full_width..(i + 1) * full_width];
        let bottom = &corner[(i + height) * full_width..(i + height + 1) * full_width];

        for j in 0..full_width {
            plane.set(j, 2 * i, top[j] + bottom[j]);
            plane.set(j, 2 * i + 1, top[j] - bottom[j]);
        }
    }

    // Horizontal interpolation back into even and odd samples
    for_each_row(&mut plane.as_mut_slice()[..2 * height * stride], stride, |row| {
        let (low, high) = row[..full_width].split_at(width);
        let mut rebuilt = Vec::with_capacity(full_width);
        for (l, h) in low.iter().zip(high) {
            rebuilt.push(l + h);
            rebuilt.push(l - h);
        }

        row[..full_width].copy_from_slice(&rebuilt);
    });
}

/// Apply `levels` forward steps, each on the approximation left by the one
/// before.
pub fn forward(plane: &mut CoefficientPlane, levels: u32) {
    for k in 0..levels {
        let width = plane.width() >> k;
        let height = plane.height() >> k;

        trace!("forward step {} over {}×{}", k + 1, width, height);
        forward_step(plane, width, height);
    }
}

/// Invert [`forward`], working from the deepest step back to the first.
pub fn inverse(plane: &mut CoefficientPlane, levels: u32) {
    for k in (1..=levels).rev() {
        let width = plane.width() >> k;
        let height = plane.height() >> k;

        trace!("inverse step {} from {}×{} quadrants", k, width, height);
        inverse_step(plane, width, height);
    }
}

#[cfg(feature = "rayon")]
fn for_each_row<F>(rows: &mut [f32], stride: usize, f: F)
where
    F: Fn(&mut [f32]) + Send + Sync,
{
    use rayon::{iter::ParallelIterator, slice::ParallelSliceMut};

    rows.par_chunks_mut(stride).for_each(f)
}

#[cfg(not(feature = "rayon"))]
fn for_each_row<F>(rows: &mut [f32], stride: usize, f: F)
where
    F: Fn(&mut [f32]),
{
    rows.chunks_mut(stride).for_each(f)
}
