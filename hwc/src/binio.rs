use std::io::{self, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

/// Packs values of varying bit widths into a byte stream, most significant
/// bit first, with no padding between values.
///
/// Nothing about the widths is stored in the output. Whoever reads the
/// stream back must pull the exact same sequence of widths.
pub struct BitPacker<'a, O: Write + WriteBytesExt> {
    output: &'a mut O,

    /// Partially filled byte, filled from the high bit down
    current_byte: u8,
    /// Bits still free in `current_byte`
    free_bits: u8,

    byte_size: usize,
}

impl<'a, O: Write + WriteBytesExt> BitPacker<'a, O> {
    /// Create a new packer writing into some output
    pub fn new(output: &'a mut O) -> Self {
        Self {
            output,

            current_byte: 0,
            free_bits: 8,

            byte_size: 0,
        }
    }

    /// Number of bytes emitted so far, not counting the pending byte
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    /// Append the low `width` bits of `value` to the stream.
    ///
    /// `width` must be within `1..=8` and `value` must fit in it.
    pub fn push(&mut self, value: u8, width: u8) -> io::Result<()> {
        debug_assert!((1..=8).contains(&width), "bit width {width} out of range");
        debug_assert!(width == 8 || value >> width == 0, "{value} does not fit in {width} bits");

        if width <= self.free_bits {
            self.current_byte |= value << (self.free_bits - width);
            self.free_bits -= width;
        } else {
            // Split across the byte boundary, the overflow is left-justified
            // in the next byte
            let overflow = width - self.free_bits;
            self.current_byte |= value >> overflow;
            self.emit()?;
            self.current_byte = value << (8 - overflow);
            self.free_bits = 8 - overflow;
        }

        if self.free_bits == 0 {
            self.emit()?;
        }

        Ok(())
    }

    /// Write out the pending byte, zero padded. Call once at the end of the
    /// stream.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.free_bits < 8 {
            self.emit()?;
        }

        self.output.flush()
    }

    fn emit(&mut self) -> io::Result<()> {
        self.output.write_u8(self.current_byte)?;
        self.byte_size += 1;

        self.current_byte = 0;
        self.free_bits = 8;

        Ok(())
    }
}

/// Reads back values written by a [`BitPacker`], given the same width
/// schedule.
pub struct BitUnpacker<'a, I: Read + ReadBytesExt> {
    input: &'a mut I,

    current_byte: u8,
    /// Bits of `current_byte` not consumed yet
    valid_bits: u8,

    byte_offset: usize,
}

impl<'a, I: Read + ReadBytesExt> BitUnpacker<'a, I> {
    /// Create a new unpacker over some input. Nothing is read until the first
    /// call to [`BitUnpacker::pull`].
    pub fn new(input: &'a mut I) -> Self {
        Self {
            input,

            current_byte: 0,
            valid_bits: 0,

            byte_offset: 0,
        }
    }

    /// Number of bytes taken from the input so far
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Read the next `width` bits as an unsigned value.
    pub fn pull(&mut self, width: u8) -> io::Result<u8> {
        debug_assert!((1..=8).contains(&width), "bit width {width} out of range");

        let mut result: u16 = 0;
        let mut remaining = width;
        while remaining > 0 {
            if self.valid_bits == 0 {
                self.current_byte = self.input.read_u8()?;
                self.valid_bits = 8;
                self.byte_offset += 1;
            }

            let take = remaining.min(self.valid_bits);
            let shift = self.valid_bits - take;
            let bits = (self.current_byte as u16 >> shift) & ((1 << take) - 1);

            result = (result << take) | bits;
            self.valid_bits -= take;
            remaining -= take;
        }

        Ok(result as u8)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn pack(items: &[(u8, u8)]) -> Vec<u8> {
        let mut output = Vec::new();
        let mut packer = BitPacker::new(&mut output);
        for &(value, width) in items {
            packer.push(value, width).unwrap();
        }
        packer.flush().unwrap();

        output
    }

    #[test]
    fn msb_first_layout() {
        // 101 + 11 + 0001 = 1011_1000 then 1 padded = 1000_0000
        let output = pack(&[(0b101, 3), (0b11, 2), (0b0001, 4)]);
        assert_eq!(output, [0b1011_1000, 0b1000_0000]);
    }

    #[test]
    fn exact_byte_has_no_padding() {
        let output = pack(&[(0b1111, 4), (0b0000, 4), (0xA5, 8)]);
        assert_eq!(output, [0xF0, 0xA5]);
    }

    #[test]
    fn seven_bit_values_straddle_bytes() {
        let values = [0x7F, 0x00, 0x55, 0x2A, 0x01, 0x40, 0x33, 0x7E];
        let items: Vec<(u8, u8)> = values.iter().map(|&v| (v, 7)).collect();
        let output = pack(&items);

        // 8 values of 7 bits is exactly 7 bytes
        assert_eq!(output.len(), 7);

        let mut input = Cursor::new(output);
        let mut unpacker = BitUnpacker::new(&mut input);
        for &v in &values {
            assert_eq!(unpacker.pull(7).unwrap(), v);
        }
        assert_eq!(unpacker.byte_offset(), 7);
    }

    #[test]
    fn mixed_width_sequence() {
        // Deterministic pseudo-random widths and values
        let mut state = 0x2545_F491u32;
        let mut items = Vec::new();
        for _ in 0..1000 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let width = (state >> 16) as u8 % 8 + 1;
            let value = ((state >> 8) as u8) & (((1u16 << width) - 1) as u8);
            items.push((value, width));
        }

        let total_bits: usize = items.iter().map(|&(_, w)| w as usize).sum();
        let output = pack(&items);
        assert_eq!(output.len(), total_bits.div_ceil(8));

        let mut input = Cursor::new(output);
        let mut unpacker = BitUnpacker::new(&mut input);
        for &(value, width) in &items {
            assert_eq!(unpacker.pull(width).unwrap(), value);
        }
    }

    #[test]
    fn byte_size_tracking() {
        let mut output = Vec::new();
        let mut packer = BitPacker::new(&mut output);
        packer.push(0b11, 2).unwrap();
        assert_eq!(packer.byte_size(), 0);

        packer.push(0b1111_11, 6).unwrap();
        assert_eq!(packer.byte_size(), 1);

        // Nothing pending, so flushing adds no byte
        packer.flush().unwrap();
        assert_eq!(packer.byte_size(), 1);
        assert_eq!(output, [0xFF]);
    }

    #[test]
    fn pull_past_end_is_eof() {
        let mut input = Cursor::new(vec![0xAB]);
        let mut unpacker = BitUnpacker::new(&mut input);
        assert_eq!(unpacker.pull(4).unwrap(), 0xA);
        assert_eq!(unpacker.pull(4).unwrap(), 0xB);

        let err = unpacker.pull(1).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
