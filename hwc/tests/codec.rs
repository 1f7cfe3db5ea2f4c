use std::io::Cursor;

use hwc::{
    binio::{BitPacker, BitUnpacker},
    compression::{haar, quantization::QuantizationSchedule},
    operations,
    plane::CoefficientPlane,
    GrayPicture, Parameters, Quantizer,
};

const WIDTH: u32 = 32;
const HEIGHT: u32 = 32;

fn noise(seed: u32, side: u32) -> Vec<u8> {
    let mut state = seed;
    (0..side * side)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (state >> 24) as u8
        })
        .collect()
}

fn gradient(side: u32) -> Vec<u8> {
    (0..side)
        .flat_map(|y| (0..side).map(move |x| ((x * 7 + y * 3) % 256) as u8))
        .collect()
}

/// Bowl shaped picture, reaching white towards the corners
fn blob(side: u32) -> Vec<u8> {
    let center = side as i32 / 2;
    let scale = (side * side / 512) as i32;
    (0..side as i32)
        .flat_map(|y| {
            (0..side as i32).map(move |x| {
                let distance = (x - center) * (x - center) + (y - center) * (y - center);
                (distance / scale).min(255) as u8
            })
        })
        .collect()
}

fn round_trip(picture: &GrayPicture, params: &Parameters) -> GrayPicture {
    let mut stream = Vec::new();
    picture.encode(params, &mut stream).unwrap();
    hwc::decode_with(&stream, picture.width(), picture.height(), params).unwrap()
}

#[test]
fn transform_round_trip() {
    let samples = noise(42, WIDTH);
    for levels in 1..=5 {
        let mut plane = CoefficientPlane::from_samples(&samples, WIDTH as usize, HEIGHT as usize);
        haar::forward(&mut plane, levels);
        haar::inverse(&mut plane, levels);

        for (restored, &original) in plane.as_slice().iter().zip(&samples) {
            assert!((restored - original as f32).abs() < 1e-3);
        }
    }
}

#[test]
fn bit_packing_round_trip() {
    let items: Vec<(u8, u8)> = (0..500u32)
        .map(|i| {
            let width = (i % 8) as u8 + 1;
            let value = ((i * 37) % (1 << width)) as u8;
            (value, width)
        })
        .collect();

    let mut stream = Vec::new();
    let mut packer = BitPacker::new(&mut stream);
    for &(value, width) in &items {
        packer.push(value, width).unwrap();
    }
    packer.flush().unwrap();

    let mut input = Cursor::new(stream);
    let mut unpacker = BitUnpacker::new(&mut input);
    let unpacked: Vec<(u8, u8)> = items
        .iter()
        .map(|&(_, width)| (unpacker.pull(width).unwrap(), width))
        .collect();

    assert_eq!(unpacked, items);
}

#[test]
fn error_grows_with_levels() {
    const SIDE: u32 = 128;

    for bitmap in [noise(0x1234, SIDE), gradient(SIDE), blob(SIDE)] {
        let picture = GrayPicture::from_raw(SIDE, SIDE, bitmap).unwrap();

        for quantizer in [Quantizer::Midrise, Quantizer::ZeroSnap] {
            let mut previous = 0.0;
            for levels in 1..=hwc::MAX_LEVELS {
                let params = Parameters::new(levels).with_quantizer(quantizer);
                let mse = picture.mse(&round_trip(&picture, &params)).unwrap();

                assert!(
                    mse >= previous,
                    "{quantizer:?}: {levels} levels gave {mse}, fewer gave {previous}"
                );
                previous = mse;
            }
        }
    }
}

#[test]
fn detail_stream_smaller_than_bytes() {
    for levels in 1..=hwc::MAX_LEVELS {
        let schedule = QuantizationSchedule::new(levels);
        let side = 1usize << levels;
        let (width, height) = (side * 2, side * 4);

        let detail_values = width * height - (width >> levels) * (height >> levels);
        let detail_bytes = schedule.stream_len(width, height) - (width >> levels) * (height >> levels);
        assert!(detail_bytes < detail_values, "{levels} levels");
    }

    let picture = GrayPicture::from_raw(WIDTH, HEIGHT, noise(9, WIDTH)).unwrap();
    let stream = hwc::encode(&picture, 1).unwrap();
    assert!(stream.len() < picture.as_raw().len());
}

#[test]
fn constant_picture_survives_every_level() {
    for value in [0, 37, 128, 255] {
        let picture = GrayPicture::from_raw(256, 256, vec![value; 256 * 256]).unwrap();
        for levels in [1, 3, 7] {
            let params = Parameters::new(levels).with_quantizer(Quantizer::ZeroSnap);
            let stream = hwc::encode(&picture, levels).unwrap();
            let decoded = hwc::decode_with(&stream, 256, 256, &params).unwrap();

            assert_eq!(operations::mse(picture.as_raw(), decoded.as_raw()).unwrap(), 0.0);
        }
    }
}

#[test]
fn non_square_picture() {
    let bitmap: Vec<u8> = (0..64 * 16).map(|i| (i % 251) as u8).collect();
    let picture = GrayPicture::from_raw(64, 16, bitmap).unwrap();

    let params = Parameters::new(4);
    let decoded = round_trip(&picture, &params);
    assert_eq!(decoded.width(), 64);
    assert_eq!(decoded.height(), 16);
    assert!(operations::psnr(picture.as_raw(), decoded.as_raw()).unwrap() > 10.0);
}

#[test]
fn files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let raw_path = dir.path().join("input.raw");
    let stream_path = dir.path().join("encode_file");
    let output_path = dir.path().join("output.raw");

    let original = GrayPicture::from_raw(WIDTH, HEIGHT, gradient(WIDTH)).unwrap();
    original.save_raw(&raw_path).unwrap();

    let params = Parameters::default();
    let picture = GrayPicture::open_raw(&raw_path, WIDTH, HEIGHT).unwrap();
    picture.save(&stream_path, &params).unwrap();

    let stream_len = std::fs::metadata(&stream_path).unwrap().len() as usize;
    assert_eq!(
        stream_len,
        QuantizationSchedule::new(params.levels).stream_len(WIDTH as usize, HEIGHT as usize)
    );

    let decoded = hwc::open(&stream_path, WIDTH, HEIGHT, &params).unwrap();
    decoded.save_raw(&output_path).unwrap();

    let reread = GrayPicture::open_raw(&output_path, WIDTH, HEIGHT).unwrap();
    assert_eq!(reread, decoded);
    assert_eq!(reread, round_trip(&original, &params));
}

#[test]
fn mismatched_parameters_do_not_panic() {
    let picture = GrayPicture::from_raw(WIDTH, HEIGHT, noise(3, WIDTH)).unwrap();
    let stream = hwc::encode(&picture, 2).unwrap();

    // Fewer levels needs a longer stream
    assert!(matches!(
        hwc::decode(&stream, WIDTH, HEIGHT, 1),
        Err(hwc::Error::StreamTooShort { .. })
    ));

    // More levels decodes, just not to the same picture
    let decoded = hwc::decode(&stream, WIDTH, HEIGHT, 3).unwrap();
    assert_ne!(decoded, round_trip(&picture, &Parameters::new(2)));
}
