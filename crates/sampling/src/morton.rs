//! Morton (Z-order) codes for quantized 3-D coordinates.
//!
//! Bits are interleaved so that bit `i` of `z` lands at code bit `3i`, bit `i`
//! of `y` at `3i + 1` and bit `i` of `x` at `3i + 2`, i.e. the code is
//! `(spread(x) << 2) | (spread(y) << 1) | spread(z)`.

/// Bits per axis used unless a caller asks otherwise: a 1024³ grid and a
/// 30-bit code.
pub const DEFAULT_BITS: u32 = 10;

/// Largest per-axis depth whose interleaved code still fits in a `u64`.
pub const MAX_BITS: u32 = 21;

#[inline]
fn max_coord(bits: u32) -> u32 {
    (1u32 << bits) - 1
}

/// Insert two zero bits between each of the low 10 bits of `v`.
#[inline]
fn spread_bits_10(v: u32) -> u32 {
    let mut v = v & 0x3ff;
    v = (v | (v << 16)) & 0x0300_00FF;
    v = (v | (v << 8)) & 0x0300_F00F;
    v = (v | (v << 4)) & 0x030C_30C3;
    v = (v | (v << 2)) & 0x0924_9249;
    v
}

/// Insert two zero bits between each of the low 21 bits of `v`.
#[inline]
fn spread_bits_21(v: u64) -> u64 {
    let mut v = v & 0x1F_FFFF;
    v = (v | (v << 32)) & 0x001F_0000_0000_FFFF;
    v = (v | (v << 16)) & 0x001F_0000_FF00_00FF;
    v = (v | (v << 8)) & 0x100F_00F0_0F00_F00F;
    v = (v | (v << 4)) & 0x10C3_0C30_C30C_30C3;
    v = (v | (v << 2)) & 0x1249_2492_4924_9249;
    v
}

/// Inverse of [`spread_bits_21`]: gather every third bit back together.
#[inline]
fn compact_bits_21(v: u64) -> u32 {
    let mut v = v & 0x1249_2492_4924_9249;
    v = (v ^ (v >> 2)) & 0x10C3_0C30_C30C_30C3;
    v = (v ^ (v >> 4)) & 0x100F_00F0_0F00_F00F;
    v = (v ^ (v >> 8)) & 0x001F_0000_FF00_00FF;
    v = (v ^ (v >> 16)) & 0x001F_0000_0000_FFFF;
    v = (v ^ (v >> 32)) & 0x1F_FFFF;
    v as u32
}

/// Morton code of a cell on the default 1024³ grid.
///
/// Coordinates above 1023 are clamped to 1023.
#[inline]
pub fn morton_encode(x: u32, y: u32, z: u32) -> u64 {
    let m = max_coord(DEFAULT_BITS);
    let x = spread_bits_10(x.min(m)) as u64;
    let y = spread_bits_10(y.min(m)) as u64;
    let z = spread_bits_10(z.min(m)) as u64;
    (x << 2) | (y << 1) | z
}

/// Morton code of a cell on a `2^bits`-per-axis grid.
///
/// `bits` is clamped to `1..=MAX_BITS`; coordinates are clamped to
/// `2^bits - 1`. For `bits == 10` this agrees with [`morton_encode`].
#[inline]
pub fn morton_encode_bits(x: u32, y: u32, z: u32, bits: u32) -> u64 {
    let m = max_coord(bits.clamp(1, MAX_BITS));
    let x = spread_bits_21(x.min(m) as u64);
    let y = spread_bits_21(y.min(m) as u64);
    let z = spread_bits_21(z.min(m) as u64);
    (x << 2) | (y << 1) | z
}

/// Split a code back into its `(x, y, z)` cell coordinates.
#[inline]
pub fn morton_decode(code: u64) -> (u32, u32, u32) {
    (
        compact_bits_21(code >> 2),
        compact_bits_21(code >> 1),
        compact_bits_21(code),
    )
}

/// Map a normalized coordinate in `[0, 1]` to a cell index on a
/// `2^bits`-per-axis grid: `floor(v * 2^bits)` clamped to `[0, 2^bits - 1]`.
///
/// `1.0` lands in the last cell rather than one past it. NaN and negative
/// inputs land in cell 0.
#[inline]
pub fn quantize(v: f64, bits: u32) -> u32 {
    let bits = bits.clamp(1, MAX_BITS);
    if v.is_nan() || v <= 0.0 {
        return 0;
    }
    let m = max_coord(bits);
    let cell = (v * (1u64 << bits) as f64).floor();
    if cell >= m as f64 {
        m
    } else {
        cell as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn origin_encodes_to_zero() {
        assert_eq!(morton_encode(0, 0, 0), 0);
        assert_eq!(morton_encode_bits(0, 0, 0, MAX_BITS), 0);
    }

    #[test]
    fn unit_axes_set_distinct_single_bits() {
        assert_eq!(morton_encode(0, 0, 1), 0b001);
        assert_eq!(morton_encode(0, 1, 0), 0b010);
        assert_eq!(morton_encode(1, 0, 0), 0b100);
    }

    #[test]
    fn second_bit_of_each_axis_lands_three_places_up() {
        assert_eq!(morton_encode(0, 0, 2), 1 << 3);
        assert_eq!(morton_encode(0, 2, 0), 1 << 4);
        assert_eq!(morton_encode(2, 0, 0), 1 << 5);
    }

    #[test]
    fn full_grid_corner_fills_thirty_bits() {
        assert_eq!(morton_encode(1023, 1023, 1023), (1u64 << 30) - 1);
    }

    #[test]
    fn out_of_range_coordinates_are_clamped() {
        assert_eq!(morton_encode(5000, 0, 0), morton_encode(1023, 0, 0));
        assert_eq!(morton_encode_bits(9, 9, 9, 3), morton_encode_bits(7, 7, 7, 3));
    }

    #[test]
    fn out_of_range_bits_are_clamped() {
        assert_eq!(morton_encode_bits(3, 3, 3, 30), morton_encode_bits(3, 3, 3, MAX_BITS));
        assert_eq!(morton_encode_bits(3, 3, 3, u32::MAX), morton_encode_bits(3, 3, 3, MAX_BITS));
        assert_eq!(morton_encode_bits(3, 3, 3, 0), morton_encode_bits(1, 1, 1, 1));
        assert_eq!(morton_encode_bits(3, 3, 3, 0), 0b111);
    }

    #[test]
    fn monotonic_along_each_axis() {
        let mut prev = [0u64; 3];
        for v in 1..1024 {
            let codes = [
                morton_encode(v, 0, 0),
                morton_encode(0, v, 0),
                morton_encode(0, 0, v),
            ];
            for axis in 0..3 {
                assert!(codes[axis] > prev[axis], "axis {axis} not increasing at {v}");
            }
            prev = codes;
        }
    }

    #[test]
    fn decode_recovers_coordinates() {
        let code = morton_encode(5, 700, 1023);
        assert_eq!(morton_decode(code), (5, 700, 1023));

        let wide = morton_encode_bits(2_000_000, 1, 1_048_576, MAX_BITS);
        assert_eq!(morton_decode(wide), (2_000_000, 1, 1_048_576));
    }

    #[test]
    fn nearby_cells_get_nearby_codes() {
        let c1 = morton_encode(10, 10, 10);
        let c2 = morton_encode(11, 10, 10);
        let c3 = morton_encode(100, 100, 100);
        assert!(c1.abs_diff(c2) < c1.abs_diff(c3));
    }

    #[test]
    fn quantize_maps_unit_range_onto_grid() {
        assert_eq!(quantize(0.0, 10), 0);
        assert_eq!(quantize(0.5, 10), 512);
        assert_eq!(quantize(1.0, 10), 1023);
        assert_eq!(quantize(0.999_999, 10), 1023);
        assert_eq!(quantize(1.0 / 1024.0, 10), 1);
    }

    #[test]
    fn quantize_clamps_out_of_range_and_nan() {
        assert_eq!(quantize(-0.25, 10), 0);
        assert_eq!(quantize(7.0, 10), 1023);
        assert_eq!(quantize(f64::NAN, 10), 0);
        assert_eq!(quantize(1.0, 1), 1);
        assert_eq!(quantize(1.0, MAX_BITS), (1 << MAX_BITS) - 1);
    }

    proptest! {
        #[test]
        fn ten_bit_paths_agree(x in 0u32..1024, y in 0u32..1024, z in 0u32..1024) {
            prop_assert_eq!(morton_encode(x, y, z), morton_encode_bits(x, y, z, DEFAULT_BITS));
        }

        #[test]
        fn code_fits_in_three_times_bits(
            x in any::<u32>(), y in any::<u32>(), z in any::<u32>(), bits in 1u32..=MAX_BITS
        ) {
            let code = morton_encode_bits(x, y, z, bits);
            prop_assert!(code < (1u64 << (3 * bits)));
        }

        #[test]
        fn quantize_stays_on_grid(v in -2.0f64..2.0, bits in 1u32..=MAX_BITS) {
            prop_assert!(quantize(v, bits) < (1u32 << bits));
        }
    }
}
