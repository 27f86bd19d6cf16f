#![forbid(unsafe_code)]

//! Character-grid preview of an overlay frame.
//!
//! Each grid cell samples the frame at its centre:
//!
//! | Glyph | Meaning |
//! |-------|---------|
//! | `:`   | masked |
//! | `#`   | highlight outline |
//! | ` `   | hole / unmasked page |
//! | `+-\|` | card border |
//!
//! Card text is clipped to the card's interior by display width, so wide
//! glyphs never straddle the border.

use unicode_width::UnicodeWidthChar;
use waypoint_tour::{OverlayFrame, PageRect, Viewport};

const MASK: char = ':';
const OUTLINE: char = '#';
const CLEAR: char = ' ';
/// Continuation cell of a double-width glyph; dropped on output.
const WIDE_TAIL: char = '\0';

/// Preview resolution in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewGrid {
    pub cols: u16,
    pub rows: u16,
}

impl Default for PreviewGrid {
    fn default() -> Self {
        Self { cols: 80, rows: 24 }
    }
}

struct Canvas {
    cells: Vec<Vec<char>>,
    cols: i64,
    rows: i64,
}

impl Canvas {
    fn new(grid: PreviewGrid) -> Self {
        Self {
            cells: vec![vec![CLEAR; usize::from(grid.cols)]; usize::from(grid.rows)],
            cols: i64::from(grid.cols),
            rows: i64::from(grid.rows),
        }
    }

    fn set(&mut self, col: i64, row: i64, ch: char) {
        if (0..self.cols).contains(&col) && (0..self.rows).contains(&row) {
            self.cells[row as usize][col as usize] = ch;
        }
    }

    /// Write `text` from `col`, never past `max_col` (inclusive).
    fn text(&mut self, row: i64, col: i64, max_col: i64, text: &str) {
        let mut at = col;
        for ch in text.chars() {
            let width = ch.width().unwrap_or(0) as i64;
            if width == 0 {
                continue;
            }
            if at.saturating_add(width - 1) > max_col || at >= self.cols {
                break;
            }
            self.set(at, row, ch);
            if width == 2 {
                self.set(at.saturating_add(1), row, WIDE_TAIL);
            }
            at = at.saturating_add(width);
        }
    }

    fn finish(self) -> String {
        let mut out = String::with_capacity(self.cells.len() * (self.cols as usize + 1));
        for row in self.cells {
            out.extend(row.into_iter().filter(|&ch| ch != WIDE_TAIL));
            out.push('\n');
        }
        out
    }
}

/// Cell span `[first, last]` covered by `[start, start + len)` at `scale`
/// pixels per cell.
/// Float-to-int casts saturate, so far off-page geometry pins to the `i64`
/// range instead of wrapping.
fn cell_span(start: f64, len: f64, scale: f64) -> (i64, i64) {
    let first = (start / scale).floor() as i64;
    let last = (((start + len) / scale).ceil() as i64).saturating_sub(1);
    (first, last.max(first))
}

/// The part of `[first, last]` inside `0..limit`, or `None` if disjoint.
fn visible(first: i64, last: i64, limit: i64) -> Option<(i64, i64)> {
    let (lo, hi) = (first.max(0), last.min(limit - 1));
    (lo <= hi).then_some((lo, hi))
}

/// Render `frame` over a page of `viewport` size. `None` renders the bare
/// page.
///
/// `card_height` is the assumed card height used for placement.
pub fn render_ascii(
    frame: Option<&OverlayFrame>,
    viewport: Viewport,
    grid: PreviewGrid,
    card_height: f64,
) -> String {
    let mut canvas = Canvas::new(grid);
    let Some(frame) = frame else {
        return canvas.finish();
    };
    if grid.cols == 0 || grid.rows == 0 || viewport.area() <= 0.0 {
        return canvas.finish();
    }

    let sx = viewport.width / f64::from(grid.cols);
    let sy = viewport.height / f64::from(grid.rows);

    for row in 0..canvas.rows {
        for col in 0..canvas.cols {
            let x = (col as f64 + 0.5) * sx;
            let y = (row as f64 + 0.5) * sy;
            let glyph = if frame.mask.covers(x, y) {
                MASK
            } else if frame.outline.contains(x, y) && !frame.hole.contains(x, y) {
                OUTLINE
            } else {
                CLEAR
            };
            canvas.set(col, row, glyph);
        }
    }

    draw_card(&mut canvas, frame, frame.card.bounds(card_height), sx, sy);
    canvas.finish()
}

fn draw_card(canvas: &mut Canvas, frame: &OverlayFrame, bounds: PageRect, sx: f64, sy: f64) {
    let (c0, c1) = cell_span(bounds.x, bounds.width, sx);
    let (r0, r1) = cell_span(bounds.y, bounds.height, sy);

    let (Some((row_lo, row_hi)), Some((col_lo, col_hi))) = (
        visible(r0, r1, canvas.rows),
        visible(c0, c1, canvas.cols),
    ) else {
        return;
    };

    for row in row_lo..=row_hi {
        for col in col_lo..=col_hi {
            let on_h = row == r0 || row == r1;
            let on_v = col == c0 || col == c1;
            let glyph = match (on_h, on_v) {
                (true, true) => '+',
                (true, false) => '-',
                (false, true) => '|',
                (false, false) => CLEAR,
            };
            canvas.set(col, row, glyph);
        }
    }

    let (inner_first, inner_last) = (c0.saturating_add(2), c1.saturating_sub(2));
    if inner_last < inner_first || r1.saturating_sub(r0) < 2 {
        return;
    }

    let card = &frame.card;
    let (title_row, content_row) = (r0.saturating_add(1), r0.saturating_add(2));
    canvas.text(title_row, inner_first, inner_last, &card.title);
    if content_row < r1 {
        canvas.text(content_row, inner_first, inner_last, &card.content);
    }

    let dots: String = card
        .progress
        .iter()
        .map(|current| if current { '*' } else { 'o' })
        .collect();
    let mut controls = format!("{dots}  [x]");
    if card.back_visible {
        controls.push_str(" [Back]");
    }
    controls.push_str(&format!(" [{}]", card.primary.label()));
    let controls_row = r1.saturating_sub(1);
    if controls_row > content_row {
        canvas.text(controls_row, inner_first, inner_last, &controls);
    }
}
