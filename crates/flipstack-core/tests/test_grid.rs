use flipstack_core::frame::FrameSize;
use flipstack_core::grid::{build_regions, uniform_regions, CardLayout, GridConfig, Rect};

#[test]
fn default_layout_first_card() {
    let regions = build_regions(FrameSize::new(1280, 720), &GridConfig::default());
    assert_eq!(regions.len(), 24);

    let first = &regions[0];
    assert_eq!(first.copy_rect, Rect::new(59, 138, 197, 300));
    assert_eq!(first.eval_rect, Rect::new(79, 161, 177, 271));
    assert_eq!(first.eval_pixel_count, 98 * 110);
}

#[test]
fn regions_are_row_major() {
    let regions = build_regions(FrameSize::new(1280, 720), &GridConfig::default());
    // Same row: same vertical extent, moving right.
    assert_eq!(regions[0].eval_rect.top, regions[7].eval_rect.top);
    assert!(regions[7].eval_rect.left > regions[0].eval_rect.left);
    // Next row starts back at the left.
    assert_eq!(regions[8].eval_rect.left, regions[0].eval_rect.left);
    assert!(regions[8].eval_rect.top > regions[0].eval_rect.top);
}

#[test]
fn overflowing_layout_falls_back_to_uniform() {
    let size = FrameSize::new(800, 300);
    let grid = GridConfig {
        rows: 3,
        cols: 8,
        layout: Some(CardLayout {
            left: 0.9,
            card_width: 0.2,
            ..CardLayout::default()
        }),
    };

    let regions = build_regions(size, &grid);
    assert_eq!(regions, uniform_regions(size, 3, 8));
    assert_eq!(regions[0].copy_rect, Rect::new(0, 0, 100, 100));
    assert_eq!(regions[23].copy_rect, Rect::new(700, 200, 800, 300));
}

#[test]
fn negative_layout_falls_back_to_uniform() {
    let size = FrameSize::new(640, 360);
    let grid = GridConfig {
        rows: 2,
        cols: 4,
        layout: Some(CardLayout {
            gap_x: -0.01,
            ..CardLayout::default()
        }),
    };
    assert_eq!(build_regions(size, &grid), uniform_regions(size, 2, 4));
}

#[test]
fn uniform_cells_tile_the_frame() {
    let size = FrameSize::new(101, 37);
    let regions = uniform_regions(size, 3, 7);
    let covered: usize = regions.iter().map(|r| r.copy_rect.area()).sum();
    assert_eq!(covered, size.pixel_count());
}

#[test]
fn regions_stay_inside_frame() {
    let sizes = [
        FrameSize::new(1280, 720),
        FrameSize::new(320, 180),
        FrameSize::new(33, 17),
        FrameSize::new(8, 3),
        FrameSize::new(1, 1),
    ];
    let grids = [
        GridConfig::default(),
        GridConfig {
            rows: 4,
            cols: 6,
            layout: None,
        },
        GridConfig {
            rows: 2,
            cols: 2,
            layout: Some(CardLayout {
                left: 0.0,
                top: 0.0,
                card_width: 0.5,
                card_height: 0.5,
                gap_x: 0.0,
                gap_y: 0.0,
                ..CardLayout::default()
            }),
        },
    ];

    for size in sizes {
        let frame = Rect::new(0, 0, size.width, size.height);
        for grid in &grids {
            let regions = build_regions(size, grid);
            assert_eq!(regions.len(), grid.cell_count());
            for region in &regions {
                assert!(frame.contains(&region.copy_rect), "{size}: {}", region.copy_rect);
                assert!(
                    region.copy_rect.contains(&region.eval_rect),
                    "{size}: {} not in {}",
                    region.eval_rect,
                    region.copy_rect
                );
                assert!(region.eval_pixel_count >= 1);
                assert_eq!(region.eval_pixel_count, region.eval_rect.area());
            }
        }
    }
}
