use flipstack_core::frame::{Frame, FrameSize};
use flipstack_core::sharpen::sharpen;

fn noisy(size: FrameSize) -> Frame {
    let mut frame = Frame::filled(size, [0, 0, 0]);
    for row in 0..size.height as usize {
        for col in 0..size.width as usize {
            let v = ((row * 37 + col * 91) % 200) as u8 + 20;
            frame.set_pixel(row, col, [v, v / 2, 255 - v]);
        }
    }
    frame
}

#[test]
fn zero_strength_is_identity() {
    let frame = noisy(FrameSize::new(12, 9));
    assert_eq!(sharpen(&frame, 0.0), frame);
    assert_eq!(sharpen(&frame, -1.0), frame);
}

#[test]
fn tiny_frames_are_untouched() {
    for size in [FrameSize::new(2, 10), FrameSize::new(10, 2), FrameSize::new(1, 1)] {
        let frame = noisy(size);
        assert_eq!(sharpen(&frame, 0.8), frame, "{size}");
    }
}

#[test]
fn border_pixels_are_copied() {
    let size = FrameSize::new(9, 7);
    let frame = noisy(size);
    let out = sharpen(&frame, 0.5);
    let (w, h) = (9, 7);
    for col in 0..w {
        assert_eq!(out.pixel(0, col), frame.pixel(0, col));
        assert_eq!(out.pixel(h - 1, col), frame.pixel(h - 1, col));
    }
    for row in 0..h {
        assert_eq!(out.pixel(row, 0), frame.pixel(row, 0));
        assert_eq!(out.pixel(row, w - 1), frame.pixel(row, w - 1));
    }
}

#[test]
fn flat_regions_are_preserved() {
    let frame = Frame::filled(FrameSize::new(8, 8), [90, 140, 30]);
    assert_eq!(sharpen(&frame, 1.0), frame);
}

#[test]
fn edges_gain_contrast() {
    // Dark left half, bright right half.
    let size = FrameSize::new(6, 5);
    let mut frame = Frame::filled(size, [100, 100, 100]);
    for row in 0..5 {
        for col in 3..6 {
            frame.set_pixel(row, col, [150, 150, 150]);
        }
    }
    let out = sharpen(&frame, 0.5);
    // center 3.0 * 100 - 0.5 * (100 + 100 + 100 + 150) = 75
    assert_eq!(out.pixel(2, 2), [75, 75, 75]);
    // center 3.0 * 150 - 0.5 * (150 + 150 + 100 + 150) = 175
    assert_eq!(out.pixel(2, 3), [175, 175, 175]);
}

#[test]
fn output_is_clamped() {
    let size = FrameSize::new(3, 3);
    let mut frame = Frame::filled(size, [0, 0, 0]);
    frame.set_pixel(1, 1, [250, 10, 0]);
    let out = sharpen(&frame, 1.0);
    // 5 * 250 saturates; 5 * 10 = 50 fits.
    assert_eq!(out.pixel(1, 1), [255, 50, 0]);
}

#[test]
fn large_frames_match_small_frame_path() {
    // Above the parallel threshold every row is still computed the same way.
    let big = noisy(FrameSize::new(300, 240));
    let out = sharpen(&big, 0.35);
    let crop = |f: &Frame| {
        let mut c = Frame::filled(FrameSize::new(5, 5), [0, 0, 0]);
        for row in 0..5 {
            for col in 0..5 {
                c.set_pixel(row, col, f.pixel(100 + row, 100 + col));
            }
        }
        c
    };
    let small_out = sharpen(&crop(&big), 0.35);
    assert_eq!(small_out.pixel(2, 2), out.pixel(102, 102));
}
