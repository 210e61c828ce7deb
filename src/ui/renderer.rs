/// Presentation layer: diff-based terminal renderer.
///
/// Each frame is composed into a cell buffer, compared cell-by-cell
/// against the previous frame, and only the differences are emitted.
/// All terminal commands are batched with `queue!` and flushed once,
/// which keeps full-map scrolling flicker-free.
///
/// Layout: the map fills the terminal with the viewport clamped at map
/// edges (the hero stays centered in between), the inventory overlays
/// the top-right corner, the message window overlays the bottom middle,
/// and an optional debug line sits top-left.

use std::io::{self, Write};

use crossterm::{
    cursor::{self, MoveTo},
    queue,
    style::{Color, Print, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::domain::entity::Behavior;
use crate::domain::tile::Tile;
use crate::sim::world::GameState;

const MESSAGE_WINDOW_WIDTH: usize = 38;

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::Reset };
}

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            cells: vec![Cell::BLANK; width * height],
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn put(&mut self, x: usize, y: usize, ch: char, fg: Color) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = Cell { ch, fg };
        }
    }

    fn put_str(&mut self, x: usize, y: usize, text: &str, fg: Color) {
        for (i, ch) in text.chars().enumerate() {
            self.put(x + i, y, ch, fg);
        }
    }
}

pub struct Renderer {
    front: FrameBuffer,
    back: FrameBuffer,
    /// Force a full repaint on the next frame (first frame, resize).
    repaint: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            repaint: true,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        queue!(out, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;
        out.flush()
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        let mut out = io::stdout();
        queue!(out, cursor::Show, LeaveAlternateScreen)?;
        out.flush()?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &GameState, debug_overlay: bool) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let (view_w, view_h) = (cols as usize, rows as usize);
        if view_w != self.front.width || view_h != self.front.height {
            self.front = FrameBuffer::new(view_w, view_h);
            self.back = FrameBuffer::new(view_w, view_h);
            self.repaint = true;
        }
        self.front.clear();

        self.compose_map(world);
        self.compose_inventory(world);
        if debug_overlay {
            self.compose_debug(world);
        }
        self.compose_message(world);

        self.flush_diff()
    }

    // ── Composition ──

    fn compose_map(&mut self, world: &GameState) {
        let map = world.map();
        let (view_w, view_h) = (self.front.width as i32, self.front.height as i32);
        let cam_x = camera_origin(world.hero.x, map.grid.width(), view_w);
        let cam_y = camera_origin(world.hero.y, map.grid.height(), view_h);

        for sy in 0..view_h {
            for sx in 0..view_w {
                let (wx, wy) = (cam_x + sx, cam_y + sy);
                if !map.grid.in_bounds(wx, wy) {
                    continue;
                }
                let (ch, fg) = match map.grid.tile_at(wx, wy) {
                    Tile::Floor => ('.', Color::DarkGrey),
                    Tile::Wall => ('#', Color::Grey),
                    Tile::Hazard => ('*', Color::Red),
                };
                self.front.put(sx as usize, sy as usize, ch, fg);
            }
        }

        for npc in &map.npcs {
            if let Some((sx, sy)) = to_screen(npc.x, npc.y, cam_x, cam_y, view_w, view_h) {
                let fg = match npc.behavior {
                    Behavior::Stationary => Color::Magenta,
                    _ => Color::Cyan,
                };
                self.front.put(sx, sy, 'o', fg);
            }
        }

        if let Some((sx, sy)) = to_screen(world.hero.x, world.hero.y, cam_x, cam_y, view_w, view_h)
        {
            self.front.put(sx, sy, '@', Color::Yellow);
        }
    }

    fn compose_inventory(&mut self, world: &GameState) {
        let panel_w = 16;
        if self.front.width < panel_w {
            return;
        }
        let x = self.front.width - panel_w;
        self.front.put_str(x, 0, "INVENTORY:", Color::White);
        for (i, item) in world.hero.inventory().iter().enumerate() {
            let line = format!("- {item}");
            self.front.put_str(x, 1 + i, &line, Color::White);
        }
    }

    fn compose_debug(&mut self, world: &GameState) {
        let map = world.map();
        let line = format!(
            "{} ({},{})  hero ({},{})  bgm {}",
            map.name,
            map.grid.width(),
            map.grid.height(),
            world.hero.x,
            world.hero.y,
            map.bgm,
        );
        self.front.put_str(0, 0, &line, Color::Yellow);
    }

    fn compose_message(&mut self, world: &GameState) {
        let Some(window) = world.message.as_ref() else {
            return;
        };
        let w = MESSAGE_WINDOW_WIDTH.min(self.front.width.saturating_sub(2));
        if w < 4 {
            return;
        }
        let lines = window.page_lines();
        let h = lines.len() + 2;
        if self.front.height <= h {
            return;
        }
        let x0 = (self.front.width - w) / 2;
        let y0 = self.front.height - h - 1;

        let top = format!("+{}+", "-".repeat(w - 2));
        self.front.put_str(x0, y0, &top, Color::White);
        for (i, line) in lines.iter().enumerate() {
            let mut row = format!("|{:^width$}|", truncate(line, w - 2), width = w - 2);
            if i + 1 == lines.len() && window.has_more_pages() {
                row.pop();
                row.pop();
                row.push('v');
                row.push('|');
            }
            self.front.put_str(x0, y0 + 1 + i, &row, Color::White);
        }
        self.front.put_str(x0, y0 + h - 1, &top, Color::White);
    }

    // ── Emission ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut out = io::stdout();
        if self.repaint {
            queue!(out, Clear(ClearType::All))?;
        }
        let mut fg = Color::Reset;
        queue!(out, SetForegroundColor(fg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.cells[y * self.front.width + x];
                if !self.repaint && cell == self.back.cells[y * self.back.width + x] {
                    continue;
                }
                queue!(out, MoveTo(x as u16, y as u16))?;
                if cell.fg != fg {
                    fg = cell.fg;
                    queue!(out, SetForegroundColor(fg))?;
                }
                queue!(out, Print(cell.ch))?;
            }
        }

        out.flush()?;
        std::mem::swap(&mut self.front, &mut self.back);
        self.repaint = false;
        Ok(())
    }
}

/// Leftmost (topmost) world column visible: the hero centered, clamped
/// at map edges; maps smaller than the viewport are centered whole.
fn camera_origin(target: i32, world_len: i32, view_len: i32) -> i32 {
    if world_len <= view_len {
        -((view_len - world_len) / 2)
    } else {
        (target - view_len / 2).clamp(0, world_len - view_len)
    }
}

fn to_screen(
    wx: i32,
    wy: i32,
    cam_x: i32,
    cam_y: i32,
    view_w: i32,
    view_h: i32,
) -> Option<(usize, usize)> {
    let (sx, sy) = (wx - cam_x, wy - cam_y);
    if sx >= 0 && sx < view_w && sy >= 0 && sy < view_h {
        Some((sx as usize, sy as usize))
    } else {
        None
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}
