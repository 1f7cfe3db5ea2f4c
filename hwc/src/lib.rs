//! HWC (**H**aar **W**avelet **C**odec) is a small lossy codec for single
//! channel, 8 bit grayscale images.
//!
//! An image goes through a multi-level 2D Haar decomposition, the detail
//! bands are quantized to fewer bits the finer they are, and the result is
//! bit packed into a dense stream. The stream carries no header: the width,
//! height and [`Parameters`] used to encode it must be supplied again to
//! decode it.
//!
//! Image dimensions must be divisible by `2^levels`, and at most 7 levels
//! are supported.
//!
//! # Example
//! ## Encoding and decoding in memory
//! ```
//! use hwc::GrayPicture;
//!
//! let bitmap = (0..64 * 64).map(|i| (i % 64 * 4) as u8).collect();
//! let picture = GrayPicture::from_raw(64, 64, bitmap).unwrap();
//!
//! let stream = hwc::encode(&picture, 3).unwrap();
//! assert!(stream.len() < 64 * 64);
//!
//! let decoded = hwc::decode(&stream, 64, 64, 3).unwrap();
//! assert!(picture.mse(&decoded).unwrap() < 64.0);
//! ```
//!
//! ## Flat images
//! The default quantizer decodes a zero detail to a small offset, so flat
//! areas come back with a slight ripple. [`Quantizer::ZeroSnap`] reads the
//! same stream but restores zero details exactly.
//! ```
//! use hwc::{GrayPicture, Parameters, Quantizer};
//!
//! let picture = GrayPicture::from_raw(64, 64, vec![128u8; 64 * 64]).unwrap();
//! let stream = hwc::encode(&picture, 3).unwrap();
//!
//! let params = Parameters::new(3).with_quantizer(Quantizer::ZeroSnap);
//! let decoded = hwc::decode_with(&stream, 64, 64, &params).unwrap();
//! assert_eq!(decoded, picture);
//! ```
//!
//! ## Working with files
//! ```no_run
//! use hwc::{GrayPicture, Parameters};
//!
//! let picture = GrayPicture::open_raw("lenna_256x256.raw", 256, 256)
//!     .expect("Could not read the raw image");
//!
//! let params = Parameters::new(3);
//! picture.save("lenna.hwc", &params).expect("Could not save the stream");
//!
//! let decoded = hwc::open("lenna.hwc", 256, 256, &params).expect("Could not decode");
//! println!("MSE: {}", picture.mse(&decoded).unwrap());
//! ```

pub mod compression {
    pub mod haar;
    pub mod quantization;
}
pub mod binio;
pub mod operations;
pub mod plane;
pub mod raw;

pub mod picture;
pub mod params;

// ----------------------- //
// INLINED USEFUL FEATURES //
// ----------------------- //
#[doc(inline)]
pub use picture::GrayPicture;

#[doc(inline)]
pub use picture::{decode, decode_with, encode, open, Error};

#[doc(inline)]
pub use params::Parameters;

#[doc(inline)]
pub use compression::quantization::{Quantizer, MAX_LEVELS};
