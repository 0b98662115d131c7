//! Vertical flipping of RGBA8 images.

/// Reverse the row order of a tightly packed RGBA8 image in place.
///
/// Buffers smaller than `width * height * 4` are left untouched, which
/// covers the empty buffer of a failed decode.
pub fn flip_rgba8(data: &mut [u8], width: u32, height: u32) {
    let stride = width as usize * 4;
    let rows = height as usize;
    if stride == 0 || rows < 2 || data.len() < stride * rows {
        return;
    }

    for row in 0..rows / 2 {
        let mirror = rows - 1 - row;
        let (upper, lower) = data.split_at_mut(mirror * stride);
        upper[row * stride..(row + 1) * stride].swap_with_slice(&mut lower[..stride]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_image(width: u32, height: u32) -> Vec<u8> {
        (0..height)
            .flat_map(|row| std::iter::repeat(row as u8).take(width as usize * 4))
            .collect()
    }

    #[test]
    fn test_flip_even_rows() {
        let mut data = rows_image(2, 4);
        flip_rgba8(&mut data, 2, 4);
        assert_eq!(data, {
            let mut expected = Vec::new();
            for row in [3u8, 2, 1, 0] {
                expected.extend(std::iter::repeat(row).take(8));
            }
            expected
        });
    }

    #[test]
    fn test_flip_odd_rows_keeps_middle() {
        let mut data = rows_image(1, 3);
        flip_rgba8(&mut data, 1, 3);
        assert_eq!(data, vec![2, 2, 2, 2, 1, 1, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_flip_twice_is_identity() {
        let original: Vec<u8> = (0..=255).collect();
        let mut data = original.clone();
        flip_rgba8(&mut data, 8, 8);
        assert_ne!(data, original);
        flip_rgba8(&mut data, 8, 8);
        assert_eq!(data, original);
    }

    #[test]
    fn test_flip_short_buffer_is_noop() {
        let mut data = vec![1, 2, 3];
        flip_rgba8(&mut data, 4, 4);
        assert_eq!(data, vec![1, 2, 3]);

        let mut empty: Vec<u8> = Vec::new();
        flip_rgba8(&mut empty, 256, 256);
        assert!(empty.is_empty());
    }
}
