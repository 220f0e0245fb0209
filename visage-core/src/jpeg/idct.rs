//! Fixed-point inverse DCT and color conversion

/// Zigzag position to natural (row-major) position
pub const ZIGZAG: [u8; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27,
    20, 13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58,
    59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

/// `c(u) / 2 * cos((2x + 1) * u * pi / 16)` scaled by 2^12, indexed `[x][u]`
const COS: [[i32; 8]; 8] = [
    [1448, 2009, 1892, 1703, 1448, 1138, 784, 400],
    [1448, 1703, 784, -400, -1448, -2009, -1892, -1138],
    [1448, 1138, -784, -2009, -1448, 400, 1892, 1703],
    [1448, 400, -1892, -1138, 1448, 1703, -784, -2009],
    [1448, -400, -1892, 1138, 1448, -1703, -784, 2009],
    [1448, -1138, -784, 2009, -1448, -400, 1892, -1703],
    [1448, -1703, 784, 400, -1448, 2009, -1892, 1138],
    [1448, -2009, 1892, -1703, 1448, -1138, 784, -400],
];

const COS_BITS: u32 = 12;

/// Transform one dequantized block (natural order) into level-shifted
/// 8-bit samples
pub fn idct_block(coef: &[i32; 64], out: &mut [u8; 64]) {
    // Rows: keep the 2^12 scale for the column pass
    let mut tmp = [0i64; 64];
    for v in 0..8 {
        let row = &coef[v * 8..v * 8 + 8];
        if row.iter().all(|&c| c == 0) {
            continue;
        }
        for x in 0..8 {
            tmp[v * 8 + x] = (0..8)
                .map(|u| COS[x][u] as i64 * row[u] as i64)
                .sum();
        }
    }

    let round = 1i64 << (2 * COS_BITS - 1);
    for x in 0..8 {
        for y in 0..8 {
            let sum: i64 = (0..8).map(|v| COS[y][v] as i64 * tmp[v * 8 + x]).sum();
            let sample = ((sum + round) >> (2 * COS_BITS)) + 128;
            out[y * 8 + x] = sample.clamp(0, 255) as u8;
        }
    }
}

/// YCbCr (JFIF, full range) to RGB
#[inline]
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y = y as i32;
    let cb = cb as i32 - 128;
    let cr = cr as i32 - 128;
    let r = y + ((91_881 * cr + 32_768) >> 16);
    let g = y + ((-22_554 * cb - 46_802 * cr + 32_768) >> 16);
    let b = y + ((116_130 * cb + 32_768) >> 16);
    [
        r.clamp(0, 255) as u8,
        g.clamp(0, 255) as u8,
        b.clamp(0, 255) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dc_only_block_is_flat() {
        for level in [-128i32, -1, 0, 1, 72, 127] {
            let mut coef = [0i32; 64];
            coef[0] = 8 * level;
            let mut out = [0u8; 64];
            idct_block(&coef, &mut out);
            let expected = (level + 128) as u8;
            assert!(out.iter().all(|&s| s == expected), "level {}", level);
        }
    }

    #[test]
    fn test_first_horizontal_frequency() {
        // One cycle of a half cosine across the row: left bright, right dark
        let mut coef = [0i32; 64];
        coef[1] = 200;
        let mut out = [0u8; 64];
        idct_block(&coef, &mut out);

        for y in 0..8 {
            let row = &out[y * 8..y * 8 + 8];
            assert!(row.windows(2).all(|w| w[0] > w[1]));
            assert_eq!(row, &out[..8]);
        }
        assert_eq!(out[0] as i32 + out[7] as i32, 256);
    }

    #[test]
    fn test_clamped_output() {
        let mut coef = [0i32; 64];
        coef[0] = 4000;
        let mut out = [0u8; 64];
        idct_block(&coef, &mut out);
        assert!(out.iter().all(|&s| s == 255));

        coef[0] = -4000;
        idct_block(&coef, &mut out);
        assert!(out.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(ycbcr_to_rgb(255, 128, 128), [255, 255, 255]);
        assert_eq!(ycbcr_to_rgb(0, 128, 128), [0, 0, 0]);
        assert_eq!(ycbcr_to_rgb(76, 85, 255), [254, 0, 0]);
        assert_eq!(ycbcr_to_rgb(150, 44, 21), [0, 255, 1]);
        assert_eq!(ycbcr_to_rgb(29, 255, 107), [0, 0, 254]);
    }

    #[test]
    fn test_zigzag_is_permutation() {
        let mut seen = [false; 64];
        for &n in ZIGZAG.iter() {
            assert!(!seen[n as usize]);
            seen[n as usize] = true;
        }
    }
}
