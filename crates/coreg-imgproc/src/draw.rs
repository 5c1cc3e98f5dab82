use coreg_image::Image;

/// 3x5 bitmaps for the digits 0-9, one row per entry, most significant bit on the left.
const DIGIT_GLYPHS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

const GLYPH_WIDTH: i64 = 3;
const GLYPH_HEIGHT: i64 = 5;

/// Helper function to set a pixel's color, ignoring coordinates outside the image.
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        img.as_slice_mut()[start..start + C].copy_from_slice(&color);
    }
}

/// Draws a filled circle on an image inplace.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `center` - The center of the circle as (x, y).
/// * `radius` - The radius in pixels. A radius of 0 sets a single pixel.
/// * `color` - The fill color.
pub fn draw_filled_circle<const C: usize>(
    img: &mut Image<u8, C>,
    center: (i64, i64),
    radius: u32,
    color: [u8; C],
) {
    let (cx, cy) = center;
    let r = radius as i64;

    for dy in -r..=r {
        // half width of the horizontal span at this row
        let half = ((r * r - dy * dy) as f64).sqrt().floor() as i64;
        for dx in -half..=half {
            set_pixel(img, cx + dx, cy + dy, color);
        }
    }
}

/// Draws a decimal number with a block digit font.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `number` - The value to render.
/// * `origin` - The top-left corner of the first digit as (x, y).
/// * `scale` - The size in pixels of one font cell; `0` is treated as `1`.
/// * `color` - The text color.
pub fn draw_number<const C: usize>(
    img: &mut Image<u8, C>,
    number: usize,
    origin: (i64, i64),
    scale: u32,
    color: [u8; C],
) {
    let scale = scale.max(1) as i64;
    let advance = (GLYPH_WIDTH + 1) * scale;

    for (i, ch) in number.to_string().chars().enumerate() {
        let Some(digit) = ch.to_digit(10) else {
            continue;
        };
        let glyph = &DIGIT_GLYPHS[digit as usize];
        let x0 = origin.0 + i as i64 * advance;

        for (gy, bits) in glyph.iter().enumerate() {
            for gx in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - gx)) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        set_pixel(
                            img,
                            x0 + gx * scale + sx,
                            origin.1 + gy as i64 * scale + sy,
                            color,
                        );
                    }
                }
            }
        }
    }
}

/// Height in pixels of the text drawn by [`draw_number`] at the given scale.
pub fn number_height(scale: u32) -> i64 {
    GLYPH_HEIGHT * scale.max(1) as i64
}
