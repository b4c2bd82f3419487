/// Generates a solid RGB frame.
pub fn solid_rgb(width: usize, height: usize, color: [u8; 3]) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut data = vec![0u8; width * height * 3];
    for px in data.chunks_exact_mut(3) {
        px.copy_from_slice(&color);
    }
    data
}

/// Paints an axis-aligned filled rectangle into an interleaved RGB buffer.
pub fn draw_rect(
    data: &mut [u8],
    width: usize,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    color: [u8; 3],
) {
    for yy in y..y + h {
        for xx in x..x + w {
            let i = (yy * width + xx) * 3;
            data[i..i + 3].copy_from_slice(&color);
        }
    }
}

/// Widget tone used throughout the tests: desaturated blue-gray, the kind of
/// color the button rule accepts.
pub const BUTTON_COLOR: [u8; 3] = [90, 90, 120];

pub const WHITE: [u8; 3] = [245, 245, 245];

/// A white screen with one button-like rectangle at (100, 100), 100x40.
pub fn single_button_frame(width: usize, height: usize) -> Vec<u8> {
    let mut data = solid_rgb(width, height, WHITE);
    draw_rect(&mut data, width, 100, 100, 100, 40, BUTTON_COLOR);
    data
}

/// A screen with several separated widgets of different shapes.
pub fn busy_frame(width: usize, height: usize) -> Vec<u8> {
    let mut data = solid_rgb(width, height, WHITE);
    draw_rect(&mut data, width, 60, 60, 120, 40, BUTTON_COLOR);
    draw_rect(&mut data, width, 300, 60, 48, 48, [60, 140, 70]);
    draw_rect(&mut data, width, 60, 200, 220, 36, [180, 180, 190]);
    draw_rect(&mut data, width, 400, 220, 140, 44, BUTTON_COLOR);
    data
}
