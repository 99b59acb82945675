/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The play field is the fixed 800x600 world screen scaled onto whatever
/// terminal area is left below the HUD. A cell is painted by a rectangle
/// when the cell's center falls inside it; rectangles thinner than a cell
/// still get one.

use std::io::{self, BufWriter, Write};
use std::ops::Range;

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::ScreenConfig;
use crate::domain::geom::Rect;
use crate::sim::draw::{palette, Canvas, Rgb};
use crate::sim::highscore::Leaderboard;
use crate::sim::player::{Player, Pose};
use crate::sim::session::Session;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every "empty" cell, so the gap between
    /// rows matches the cells on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb { r: rgb.0, g: rgb.1, b: rgb.2 }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
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

    /// Write a string at (x, y). The background under each char is kept.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            let cx = x + i;
            if cx >= self.width { break; }
            let bg = self.get(cx, y).bg;
            self.set(cx, y, Cell { ch, fg, bg });
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let len = s.chars().count();
        self.put_str(self.width.saturating_sub(len) / 2, y, s, fg);
    }
}

// ── World → cell mapping ──

/// Cells whose centers fall in `[lo, hi)` along one axis, where each cell
/// spans `scale` world units. Never empty for a span that overlaps the
/// visible range; `None` when entirely off-screen.
fn span(lo: f32, hi: f32, scale: f32, cells: usize) -> Option<Range<usize>> {
    if cells == 0 || hi <= 0.0 || lo >= cells as f32 * scale || hi <= lo {
        return None;
    }
    let a = (lo / scale - 0.5).ceil().max(0.0) as usize;
    let b = ((hi / scale - 0.5).ceil().max(0.0) as usize).min(cells);
    if b > a {
        Some(a..b)
    } else {
        let a = ((lo.max(0.0) / scale) as usize).min(cells - 1);
        Some(a..a + 1)
    }
}

/// Draws world-space primitives into a region of the frame buffer.
struct TermCanvas<'a> {
    buf: &'a mut FrameBuffer,
    top: usize,
    cols: usize,
    rows: usize,
    scale_x: f32,
    scale_y: f32,
}

impl<'a> TermCanvas<'a> {
    fn new(buf: &'a mut FrameBuffer, top: usize, screen: &ScreenConfig) -> Self {
        let cols = buf.width;
        let rows = buf.height.saturating_sub(top);
        TermCanvas {
            buf,
            top,
            cols,
            rows,
            scale_x: screen.width / cols.max(1) as f32,
            scale_y: screen.height / rows.max(1) as f32,
        }
    }
}

impl Canvas for TermCanvas<'_> {
    fn clear(&mut self, c: Rgb) {
        let bg = color(c);
        for row in self.top..self.top + self.rows {
            for col in 0..self.cols {
                self.buf.set(col, row, Cell { ch: ' ', fg: Color::White, bg });
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, c: Rgb) {
        let Some(xs) = span(rect.left(), rect.right(), self.scale_x, self.cols) else { return };
        let Some(ys) = span(rect.top(), rect.bottom(), self.scale_y, self.rows) else { return };
        let bg = color(c);
        for row in ys {
            for col in xs.clone() {
                self.buf.set(col, self.top + row, Cell { ch: ' ', fg: Color::White, bg });
            }
        }
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, c: Rgb) {
        if x < 0.0 || y < 0.0 { return; }
        let col = (x / self.scale_x) as usize;
        let row = (y / self.scale_y) as usize;
        if row >= self.rows { return; }
        self.buf.put_str(col, self.top + row, text, color(c));
    }
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

/// What to put on screen this frame.
pub enum View<'a> {
    Play { session: &'a Session, high_score: u32 },
    GameOver(&'a Summary),
    NameEntry { initials: &'a str },
    HighScores { board: &'a Leaderboard, highlight: u32 },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Screen {
    Play,
    GameOver,
    NameEntry,
    HighScores,
}

impl View<'_> {
    fn screen(&self) -> Screen {
        match self {
            View::Play { .. } => Screen::Play,
            View::GameOver(_) => Screen::GameOver,
            View::NameEntry { .. } => Screen::NameEntry,
            View::HighScores { .. } => Screen::HighScores,
        }
    }
}

/// End-of-run numbers shown on the game-over screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub finished: bool,
    pub final_score: u32,
    pub levels_completed: usize,
    /// Best score on the board before this run.
    pub previous_high: u32,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    screen: ScreenConfig,
    last_screen: Option<Screen>,
}

impl Renderer {
    pub fn new(screen: ScreenConfig) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            screen,
            last_screen: None,
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
        // Force full repaint on first frame.
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

    pub fn render(&mut self, view: View<'_>) -> io::Result<()> {
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

        // Screen change → clear for clean transition
        let screen = view.screen();
        if self.last_screen != Some(screen) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_screen = Some(screen);
        }

        self.front.clear();
        match view {
            View::Play { session, high_score } => {
                compose_play(&mut self.front, &self.screen, session, high_score)
            }
            View::GameOver(summary) => compose_game_over(&mut self.front, summary),
            View::NameEntry { initials } => compose_name_entry(&mut self.front, initials),
            View::HighScores { board, highlight } => {
                compose_high_scores(&mut self.front, board, highlight)
            }
        }

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

        // Explicit base colors; ResetColor would fall back to the
        // terminal's own default and leave line artifacts.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
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

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

// ══════════════════════════════════════════════════════════════
// Compose: build front buffer content
// ══════════════════════════════════════════════════════════════

fn pose_glyph(pose: Pose) -> &'static str {
    match pose {
        Pose::Idle => "o",
        Pose::Airborne => "^",
        Pose::RunRight => ">",
        Pose::RunLeft => "<",
    }
}

fn draw_player(canvas: &mut dyn Canvas, player: &Player) {
    let fill = if player.dimmed() { palette::PLAYER_DIM } else { palette::PLAYER };
    canvas.fill_rect(player.rect, fill);
    canvas.draw_text(
        player.rect.center_x(),
        player.rect.center_y(),
        pose_glyph(player.pose),
        palette::BLACK,
    );
}

fn compose_play(buf: &mut FrameBuffer, screen: &ScreenConfig, s: &Session, high_score: u32) {
    let level = s.current_level();
    {
        let mut canvas = TermCanvas::new(buf, MAP_ROW, screen);
        level.draw(&mut canvas);
        draw_player(&mut canvas, &s.player);
    }

    // ── HUD row ──
    let parts = [
        (format!("High Score: {high_score}"), palette::WHITE),
        (format!("Level: {}", s.current + 1), palette::WHITE),
        (format!("Lives: {}", s.player.lives), palette::WHITE),
        (format!("Gold: {}", s.player.gold_total), palette::WHITE),
        (format!("Gold Left: {}", level.gold_remaining()), palette::GOLD),
        (format!("Time: {:.1}s", s.level_elapsed().as_secs_f32()), palette::WHITE),
    ];
    let mut x = 1;
    for (text, c) in &parts {
        buf.put_str(x, HUD_ROW, text, color(*c));
        x += text.chars().count() + 3;
    }
    buf.put_str(1, HUD_ROW + 1, "1/2/3: music  Esc: quit", Color::DarkGrey);
}

fn compose_game_over(buf: &mut FrameBuffer, summary: &Summary) {
    let top = buf.height.saturating_sub(9) / 2;
    let (title, title_color) = if summary.finished {
        ("YOU FINISHED", palette::WHITE)
    } else {
        ("GAME OVER", palette::RED)
    };
    buf.put_centered(top, title, color(title_color));
    buf.put_centered(top + 2, &format!("Final Score: {}", summary.final_score), Color::White);
    buf.put_centered(
        top + 3,
        &format!("Levels Completed: {}", summary.levels_completed),
        Color::White,
    );
    if summary.final_score > summary.previous_high {
        buf.put_centered(
            top + 5,
            &format!("NEW HIGH SCORE! Previous: {}", summary.previous_high),
            color(palette::GREEN),
        );
    } else {
        buf.put_centered(top + 5, &format!("High Score: {}", summary.previous_high), Color::White);
    }
    buf.put_centered(top + 7, "Press ENTER to save score", color(palette::GREEN));
    buf.put_centered(top + 8, "Press ESC to skip", color(palette::RED));
}

fn compose_name_entry(buf: &mut FrameBuffer, initials: &str) {
    let mid = buf.height / 2;
    buf.put_centered(mid, &format!("Enter 3 letters: {initials}"), Color::White);
    buf.put_centered(mid + 2, "ENTER: save   BACKSPACE: erase   ESC: skip", Color::DarkGrey);
}

fn compose_high_scores(buf: &mut FrameBuffer, board: &Leaderboard, highlight: u32) {
    let top = buf.height.saturating_sub(10) / 2;
    buf.put_centered(top, "HIGH SCORES", color(palette::YELLOW));
    for (i, e) in board.entries().iter().enumerate() {
        let c = if e.score == highlight { palette::YELLOW } else { palette::WHITE };
        buf.put_centered(top + 2 + i, &format!("{}. {} - {}", i + 1, e.initials, e.score), color(c));
    }
    if board.entries().is_empty() {
        buf.put_centered(top + 2, "(none yet)", Color::DarkGrey);
    }
    buf.put_centered(top + 9, "Press ESC to exit", color(palette::RED));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::PhysicsConfig;
    use crate::sim::highscore::HighScoreEntry;
    use crate::sim::pack;

    fn row_text(buf: &FrameBuffer, y: usize) -> String {
        (0..buf.width).map(|x| buf.get(x, y).ch).collect()
    }

    fn screen_text(buf: &FrameBuffer) -> String {
        (0..buf.height).map(|y| row_text(buf, y)).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn span_uses_cell_centers() {
        assert_eq!(span(0.0, 20.0, 10.0, 80), Some(0..2));
        assert_eq!(span(5.0, 8.0, 10.0, 80), Some(0..1));
        // Thinner than a cell and missing every center: still one cell.
        assert_eq!(span(6.0, 8.0, 10.0, 80), Some(0..1));
        assert_eq!(span(790.0, 900.0, 10.0, 80), Some(79..80));
        assert_eq!(span(-50.0, -10.0, 10.0, 80), None);
        assert_eq!(span(800.0, 900.0, 10.0, 80), None);
        assert_eq!(span(-15.0, 12.0, 10.0, 80), Some(0..1));
    }

    #[test]
    fn canvas_scales_rects_below_hud() {
        let mut buf = FrameBuffer::new(80, 32);
        let screen = ScreenConfig::default();
        let mut canvas = TermCanvas::new(&mut buf, MAP_ROW, &screen);
        canvas.fill_rect(Rect::new(0.0, 0.0, 20.0, 40.0), palette::RED);
        canvas.draw_text(0.0, 0.0, "hi", palette::WHITE);
        let red = color(palette::RED);
        assert_eq!(buf.get(0, MAP_ROW).bg, red);
        assert_eq!(buf.get(1, MAP_ROW + 1).bg, red);
        assert_eq!(buf.get(2, MAP_ROW).bg, Cell::BASE_BG);
        assert_eq!(buf.get(0, 0), Cell::BLANK);
        // Text keeps the rectangle behind it.
        assert_eq!(buf.get(0, MAP_ROW).ch, 'h');
        assert_eq!(buf.get(1, MAP_ROW).bg, red);
    }

    #[test]
    fn play_frame_has_hud_and_room() {
        let s = Session::new(
            pack::embedded().unwrap(),
            PhysicsConfig::default(),
            ScreenConfig::default(),
            Duration::from_millis(16),
        )
        .unwrap();
        let mut buf = FrameBuffer::new(100, 40);
        compose_play(&mut buf, &ScreenConfig::default(), &s, 1234);
        let hud = row_text(&buf, HUD_ROW);
        assert!(hud.contains("High Score: 1234"), "{hud}");
        assert!(hud.contains("Level: 1"));
        assert!(hud.contains("Lives: 3"));
        assert!(hud.contains("Gold Left: 4"));
        assert!(hud.contains("Time: 0.0s"));
        assert_eq!(buf.get(99, 39).bg, color(palette::ROOM));
    }

    #[test]
    fn game_over_reports_new_high_score() {
        let mut buf = FrameBuffer::new(60, 20);
        compose_game_over(&mut buf, &Summary {
            finished: false,
            final_score: 900,
            levels_completed: 1,
            previous_high: 500,
        });
        let text = screen_text(&buf);
        assert!(text.contains("GAME OVER"));
        assert!(text.contains("Final Score: 900"));
        assert!(text.contains("Levels Completed: 1"));
        assert!(text.contains("NEW HIGH SCORE! Previous: 500"));

        buf.clear();
        compose_game_over(&mut buf, &Summary {
            finished: true,
            final_score: 100,
            levels_completed: 3,
            previous_high: 500,
        });
        let text = screen_text(&buf);
        assert!(text.contains("YOU FINISHED"));
        assert!(text.contains("High Score: 500"));
    }

    #[test]
    fn high_scores_highlight_matching_score() {
        let path = std::env::temp_dir().join("ledgehop_renderer_scores.txt");
        std::fs::write(&path, "AAA 900\nBBB 400\n").unwrap();
        let mut board = Leaderboard::load(&path);
        board.insert(HighScoreEntry::new("CCC", 600).unwrap());
        let mut buf = FrameBuffer::new(60, 20);
        compose_high_scores(&mut buf, &board, 600);
        let top = 5;
        assert!(row_text(&buf, top).contains("HIGH SCORES"));
        let line = row_text(&buf, top + 3);
        assert!(line.contains("2. CCC - 600"), "{line}");
        let x = line.find('C').unwrap();
        assert_eq!(buf.get(x, top + 3).fg, color(palette::YELLOW));
        assert_eq!(buf.get(x, top + 2).fg, color(palette::WHITE));
        let _ = std::fs::remove_file(&path);
    }
}
