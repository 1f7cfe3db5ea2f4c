use crate::{
    compression::haar,
    params::Parameters,
    picture::{Error, GrayPicture},
    plane::CoefficientPlane,
};

/// Mean squared error between two equally sized sample buffers.
pub fn mse(original: &[u8], reconstructed: &[u8]) -> Result<f64, Error> {
    if original.len() != reconstructed.len() {
        return Err(Error::LengthMismatch(original.len(), reconstructed.len()));
    }

    if original.is_empty() {
        return Ok(0.0);
    }

    let sum: f64 = original
        .iter()
        .zip(reconstructed)
        .map(|(&a, &b)| {
            let diff = a as f64 - b as f64;
            diff * diff
        })
        .sum();

    Ok(sum / original.len() as f64)
}

/// Peak signal to noise ratio in decibels, infinite for identical buffers.
pub fn psnr(original: &[u8], reconstructed: &[u8]) -> Result<f64, Error> {
    let mse = mse(original, reconstructed)?;
    if mse == 0.0 {
        return Ok(f64::INFINITY);
    }

    Ok(10.0 * f64::log10(255.0 * 255.0 / mse))
}

/// Render the coefficient plane after each forward step as a viewable 8 bit
/// image, one per level.
///
/// The current approximation is shown as is, every detail coefficient is
/// offset by 127.5 so that zero sits at mid gray.
///
/// Fails like [`Parameters::validate`] when the picture cannot take `levels`
/// steps.
pub fn transform_snapshots(picture: &GrayPicture, levels: u32) -> Result<Vec<Vec<u8>>, Error> {
    Parameters::new(levels).validate(picture.width(), picture.height())?;

    let width = picture.width() as usize;
    let height = picture.height() as usize;

    let mut plane = CoefficientPlane::from_samples(picture.as_raw(), width, height);
    let mut snapshots = Vec::with_capacity(levels as usize);
    for k in 0..levels {
        let step_width = width >> k;
        let step_height = height >> k;
        haar::forward_step(&mut plane, step_width, step_height);

        let ll_width = step_width / 2;
        let ll_height = step_height / 2;

        let mut snapshot = Vec::with_capacity(width * height);
        for y in 0..height {
            for (x, &value) in plane.row(y).iter().enumerate() {
                if x < ll_width && y < ll_height {
                    snapshot.push(value as u8);
                } else {
                    snapshot.push((value + 127.5) as u8);
                }
            }
        }
        snapshots.push(snapshot);
    }

    Ok(snapshots)
}
