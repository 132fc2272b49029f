use flipstack_core::analysis::FrameMetrics;
use flipstack_core::frame::{Frame, FrameSize};
use flipstack_core::grid::GridConfig;
use flipstack_core::io::ser::SerHeader;
use flipstack_core::io::ser_writer::SerWriter;
use flipstack_core::pipeline::config::PipelineConfig;

/// Flat grey card back shown wherever a card is face down.
pub const CARD_BACK: [u8; 3] = [60, 60, 60];

/// Synthetic game: one row of `GAME_COLS` square cards, `CELL` px each.
pub const CELL: u32 = 40;
pub const GAME_COLS: usize = 4;
pub const GAME_FPS: f64 = 8.0;
pub const GAME_FRAMES: usize = 40;

/// First frame at which card `cell` starts flipping.
///
/// A flip shows the left half of the face for one frame, the full face for
/// three, then the back again.
pub fn reveal_start(cell: usize) -> usize {
    4 + 8 * cell
}

/// Black and white 2px checkerboard, the "face" of every card.
pub fn card_face(row: usize, col: usize) -> [u8; 3] {
    if (row / 2 + col / 2) % 2 == 0 {
        [255, 255, 255]
    } else {
        [0, 0, 0]
    }
}

pub fn game_size() -> FrameSize {
    FrameSize::new(CELL * GAME_COLS as u32, CELL)
}

fn paint_face(frame: &mut Frame, cell: usize, width: u32) {
    let left = cell * CELL as usize;
    for row in 0..CELL as usize {
        for col in left..left + width as usize {
            frame.set_pixel(row, col, card_face(row, col));
        }
    }
}

/// Frame `index` of the synthetic game.
pub fn game_frame(index: usize) -> Frame {
    let mut frame = Frame::filled(game_size(), CARD_BACK);
    for cell in 0..GAME_COLS {
        let start = reveal_start(cell);
        if index == start {
            paint_face(&mut frame, cell, CELL / 2);
        } else if index > start && index <= start + 3 {
            paint_face(&mut frame, cell, CELL);
        }
    }
    frame
}

pub fn game_frames() -> Vec<Frame> {
    (0..GAME_FRAMES).map(game_frame).collect()
}

/// What a perfect merge looks like: every card face up.
pub fn all_faces_up() -> Frame {
    let mut frame = Frame::filled(game_size(), CARD_BACK);
    for cell in 0..GAME_COLS {
        paint_face(&mut frame, cell, CELL);
    }
    frame
}

/// Config that samples every source frame at full resolution with one
/// uniform row of cells.
pub fn game_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.sampling.fps = GAME_FPS;
    config.sampling.analysis_scale = 1.0;
    config.sampling.output_scale = 1.0;
    config.grid = GridConfig {
        rows: 1,
        cols: GAME_COLS,
        layout: None,
    };
    config.sharpening.strength = 0.0;
    config
}

/// Encode frames as an in-memory RGB SER recording.
pub fn ser_bytes(frames: &[Frame], frame_rate: Option<f64>) -> Vec<u8> {
    let size = frames[0].size();
    let header = SerHeader::rgb8(size.width, size.height, frames.len() as u32);
    let mut writer = SerWriter::new(Vec::new(), &header).expect("write SER header");
    for frame in frames {
        writer.write_frame(frame).expect("write SER frame");
    }
    if let Some(rate) = frame_rate {
        writer.write_timestamps(rate).expect("write SER timestamps");
    }
    writer.finalize().expect("finalize SER")
}

/// Write bytes to a temporary file that lives as long as the handle.
pub fn write_temp(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::NamedTempFile::new().expect("create temp file");
    f.write_all(data).expect("write temp data");
    f.flush().expect("flush");
    f
}

pub fn metrics(pairs: &[(f32, f32)]) -> Vec<FrameMetrics> {
    pairs
        .iter()
        .map(|&(baseline_ratio, motion_ratio)| FrameMetrics {
            baseline_ratio,
            motion_ratio,
        })
        .collect()
}
