/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout, top to bottom: inventory HUD, map, message line,
/// tutorial line, help line. The riddle prompt and the slain banner are
/// drawn as boxes over the map.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{LootKind, MonsterKind, Pos};
use crate::domain::tile::Cell as Tile;
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 16],  // up to 16 bytes (supports ZWJ emoji sequences)
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// inter-row gap color matches the cells on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 16, g: 12, b: 22 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 16],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn from_char_wide(c: char, bg: Color) -> Self {
        let mut cell = Self::from_char(c, Color::Reset, bg);
        cell.wide = true;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or("")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell::from_char(ch, fg, bg));
            cx += 1;
        }
    }

    /// Paint a whole row with `bg`, then write `s` from column 0.
    fn put_bar(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', fg, bg));
        }
        self.put_str(0, y, s, fg, bg);
    }
}

// ── Renderer ──

/// Each game cell = 2 terminal columns, so square-ish tiles and emoji fit.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 40, g: 16, b: 40 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const TUTORIAL_FG: Color = Color::Rgb { r: 150, g: 200, b: 255 };
const BOX_BG: Color = Color::Rgb { r: 30, g: 24, b: 40 };
const BOX_FG: Color = Color::Rgb { r: 200, g: 170, b: 255 };

const FLOOR_BG: Color = Color::Rgb { r: 34, g: 30, b: 42 };
const WALL_FG: Color = Color::Rgb { r: 120, g: 110, b: 130 };
const WALL_BG: Color = Color::Rgb { r: 64, g: 58, b: 72 };
const DOOR_LOCKED_BG: Color = Color::Rgb { r: 110, g: 20, b: 20 };
const DOOR_OPEN_BG: Color = Color::Rgb { r: 20, g: 90, b: 30 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clear for clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        self.compose(world);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                // Skip continuation cells (right half of wide emoji)
                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                // For wide cells, also check if the continuation changed
                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, w: &WorldState) {
        let map_h = w.grid.height();
        let msg_row = MAP_ROW + map_h + 1;

        self.compose_hud(w);
        self.compose_map(w);

        if !w.message.is_empty() {
            let msg = format!(" ◈ {} ", w.message);
            self.front.put_bar(msg_row, &msg, Color::Black, MSG_BG);
        }
        if let Some(text) = w.tutorial.current() {
            let line = format!(" Tutorial: {text}");
            self.front.put_str(0, msg_row + 1, &line, TUTORIAL_FG, Color::Reset);
        }
        let help = if w.riddle.is_some() {
            " Type answer  Enter:Submit  Backspace:Erase  Esc:Step back"
        } else {
            " ←↑↓→/WASD:Move  Space/E:Interact  Esc/Q:Quit  │  Pad: A:Interact  Select:Quit"
        };
        self.front.put_str(0, msg_row + 3, help, Color::DarkGrey, Color::Reset);

        match w.phase {
            Phase::Playing => {
                if w.riddle.is_some() { self.compose_riddle_box(w); }
            }
            Phase::Slain(kind) => self.compose_slain_box(w, kind),
        }
    }

    fn compose_hud(&mut self, w: &WorldState) {
        let inv = &w.player.inventory;
        let hud = format!(
            " Keys: {} | Relics: {} ",
            inv.count(LootKind::Key),
            inv.count(LootKind::Relic),
        );
        self.front.put_bar(HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_map(&mut self, w: &WorldState) {
        let buf_w = self.front.width;
        for gy in 0..w.grid.height() {
            let row = MAP_ROW + gy;
            if row >= self.front.height { break; }
            for gx in 0..w.grid.width() {
                let col = gx * CELL_W;
                if col + 1 >= buf_w { break; }
                self.compose_cell(w, gx, gy, col, row);
            }
        }
    }

    fn put_wide(&mut self, col: usize, row: usize, ch: char, bg: Color) {
        self.front.set(col, row, Cell::from_char_wide(ch, bg));
        self.front.set(col + 1, row, Cell::WIDE_CONT);
    }

    fn put_pair(&mut self, col: usize, row: usize, c0: char, c1: char, fg: Color, bg: Color) {
        self.front.set(col, row, Cell::from_char(c0, fg, bg));
        self.front.set(col + 1, row, Cell::from_char(c1, fg, bg));
    }

    /// Write the visual for game cell (gx, gy) into the front buffer at (col, row).
    /// Draw priority: monster > player > lever > door > chest > torch > tile.
    fn compose_cell(&mut self, w: &WorldState, gx: usize, gy: usize, col: usize, row: usize) {
        let at = |p: Pos| p.x == gx && p.y == gy;
        let tile = w.grid.cell_at(Pos::new(gx, gy));
        let tile_bg = match tile {
            Tile::Floor => FLOOR_BG,
            Tile::Wall => WALL_BG,
        };

        if let Some(m) = w.monsters.iter().find(|m| at(m.pos)) {
            self.put_wide(col, row, monster_glyph(m.kind), tile_bg);
            return;
        }
        if at(w.player.pos) {
            self.put_wide(col, row, '🤺', tile_bg);
            return;
        }
        if let Some(l) = w.levers.iter().find(|l| at(l.pos)) {
            let (c0, fg) = if l.activated {
                ('/', Color::Rgb { r: 80, g: 220, b: 80 })
            } else {
                ('\\', Color::Rgb { r: 230, g: 190, b: 60 })
            };
            self.put_pair(col, row, c0, '▁', fg, tile_bg);
            return;
        }
        if let Some(d) = w.doors.iter().find(|d| at(d.pos)) {
            let bg = if d.locked { DOOR_LOCKED_BG } else { DOOR_OPEN_BG };
            self.put_wide(col, row, '🚪', bg);
            return;
        }
        if let Some(c) = w.chests.iter().find(|c| at(c.pos)) {
            if c.opened {
                self.put_pair(col, row, '[', ']', Color::DarkGrey, tile_bg);
            } else {
                self.put_wide(col, row, '🧰', tile_bg);
            }
            return;
        }
        if w.torches.iter().any(|&t| at(t)) {
            self.put_wide(col, row, '🔥', tile_bg);
            return;
        }

        match tile {
            Tile::Floor => self.put_pair(col, row, ' ', ' ', Color::Reset, FLOOR_BG),
            Tile::Wall => self.put_pair(col, row, '▓', '▓', WALL_FG, WALL_BG),
        }
    }

    // ── Overlays ──

    /// Filled box over the map. Returns (x, y) of its top-left corner.
    fn compose_box(&mut self, w: &WorldState, box_w: usize, box_h: usize) -> (usize, usize) {
        let view_cols = w.grid.width() * CELL_W;
        let box_w = box_w.min(view_cols.max(1));
        let box_x = view_cols.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + w.grid.height().saturating_sub(box_h) / 2;
        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::from_char(' ', BOX_FG, BOX_BG));
            }
        }
        (box_x, box_y)
    }

    fn compose_riddle_box(&mut self, w: &WorldState) {
        let prompt = match &w.riddle {
            Some(p) => p,
            None => return,
        };
        let riddle = w.doors.get(prompt.door_idx).map(|d| d.riddle).unwrap_or("");
        let inner_w = (w.grid.width() * CELL_W).saturating_sub(4).max(10);
        let lines = wrap_text(riddle, inner_w);
        let box_h = lines.len() + 5;
        let (bx, by) = self.compose_box(w, inner_w + 4, box_h);

        self.front.put_str(bx + 2, by, "── Riddle ──", Color::Rgb { r: 255, g: 220, b: 50 }, BOX_BG);
        for (i, line) in lines.iter().enumerate() {
            self.front.put_str(bx + 2, by + 1 + i, line, BOX_FG, BOX_BG);
        }
        let answer = format!("> {}_", prompt.answer);
        self.front.put_str(bx + 2, by + lines.len() + 2, &answer, Color::White, BOX_BG);
    }

    fn compose_slain_box(&mut self, w: &WorldState, kind: MonsterKind) {
        let (bx, by) = self.compose_box(w, 30, 5);
        let red = Color::Rgb { r: 255, g: 60, b: 60 };
        self.front.put_str(bx + 2, by + 1, "✕  YOU WERE SLAIN  ✕", red, BOX_BG);
        let by_line = format!("by a {kind}");
        self.front.put_str(bx + 2, by + 3, &by_line, BOX_FG, BOX_BG);
    }
}

fn monster_glyph(kind: MonsterKind) -> char {
    match kind {
        MonsterKind::Vampire => '🧛',
        MonsterKind::Skeleton => '💀',
        MonsterKind::Ghost => '👻',
    }
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() { word.chars().count() } else { line.chars().count() + 1 + word.chars().count() };
        if needed > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() { line.push(' '); }
        line.push_str(word);
    }
    if !line.is_empty() { lines.push(line); }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::{Chest, Door, Monster, Pos};
    use crate::domain::grid::Grid;
    use crate::domain::interact::RiddlePrompt;
    use crate::domain::rng::GameRng;

    fn world() -> WorldState {
        let grid = Grid::from_rows(&[
            "######",
            "#    #",
            "#    #",
            "######",
        ]);
        WorldState::new(grid, Pos::new(1, 1), GameConfig::default().speed, GameRng::new(0))
    }

    fn composed(w: &WorldState) -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(80, 20);
        r.compose(w);
        r
    }

    fn glyph(r: &Renderer, gx: usize, gy: usize) -> String {
        r.front.get(gx * CELL_W, MAP_ROW + gy).as_str().to_string()
    }

    fn row_text(r: &Renderer, y: usize) -> String {
        (0..r.front.width).map(|x| r.front.get(x, y).as_str().to_string()).collect()
    }

    #[test]
    fn map_draws_tiles_and_entities() {
        let mut w = world();
        w.chests.push(Chest::new(Pos::new(2, 1), LootKind::Key));
        w.doors.push(Door::new(Pos::new(5, 2)));
        w.torches.push(Pos::new(0, 0));
        let r = composed(&w);
        assert_eq!(glyph(&r, 1, 1), "🤺");
        assert_eq!(glyph(&r, 2, 1), "🧰");
        assert_eq!(glyph(&r, 5, 2), "🚪");
        assert_eq!(glyph(&r, 0, 0), "🔥");
        assert_eq!(glyph(&r, 3, 0), "▓");
        assert!(r.front.get(CELL_W + 1, MAP_ROW + 1).cont);
    }

    #[test]
    fn monster_drawn_over_player() {
        let mut w = world();
        w.monsters.push(Monster::new(Pos::new(1, 1), MonsterKind::Ghost));
        let r = composed(&w);
        assert_eq!(glyph(&r, 1, 1), "👻");
    }

    #[test]
    fn hud_and_tutorial_lines() {
        let mut w = world();
        w.player.inventory.add(LootKind::Key);
        w.player.inventory.add(LootKind::Relic);
        w.player.inventory.add(LootKind::Relic);
        let r = composed(&w);
        assert!(row_text(&r, HUD_ROW).contains("Keys: 1 | Relics: 2"));
        let tutorial_row = MAP_ROW + w.grid.height() + 2;
        assert!(row_text(&r, tutorial_row).contains("Tutorial: Use arrow keys"));
    }

    #[test]
    fn riddle_box_echoes_answer() {
        let mut w = world();
        w.doors.push(Door::new(Pos::new(5, 1)));
        let mut prompt = RiddlePrompt::new(0);
        prompt.push('m');
        prompt.push('a');
        w.riddle = Some(prompt);
        let r = composed(&w);
        let all: String = (0..r.front.height).map(|y| row_text(&r, y)).collect();
        assert!(all.contains("> ma_"));
        assert!(all.contains("Riddle"));
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("What walks on four legs in the morning", 12);
        assert!(lines.iter().all(|l| l.chars().count() <= 12));
        assert_eq!(lines.join(" "), "What walks on four legs in the morning");
        assert_eq!(wrap_text("", 5), Vec::<String>::new());
    }
}
