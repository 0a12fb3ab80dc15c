use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use winit::keyboard::NamedKey;

use crate::cli::HELP_KEYS;
use crate::error::SodiumError;
use crate::files::Catalog;
use crate::grid::GridLayout;
use crate::launcher::Launcher;
use crate::loader::{self, Thumbnail};
use crate::pager::{Direction, PagerState};
use crate::ui::render::{fit_scale, text_advance, Canvas, BG_COLOR};
use crate::video::VideoLookup;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const CELL_PADDING: u32 = 4;
const NOTICE_DURATION: Duration = Duration::from_secs(2);

const FORWARD_KEYS: &[NamedKey] = &[
    NamedKey::ArrowRight,
    NamedKey::ArrowDown,
    NamedKey::PageDown,
    NamedKey::Space,
];
const BACKWARD_KEYS: &[NamedKey] = &[
    NamedKey::ArrowLeft,
    NamedKey::ArrowUp,
    NamedKey::PageUp,
    NamedKey::Backspace,
];
const FORWARD_CHARS: &[char] = &['l', 'j'];
const BACKWARD_CHARS: &[char] = &['h', 'k'];

// ---------------------------------------------------------------------------
// Browser session
// ---------------------------------------------------------------------------

/// Everything one browsing session owns: the catalog, the paging position and
/// the decoded thumbnails of the page on screen.
pub struct BrowserState {
    pub catalog: Catalog,
    pub pager: PagerState,
    pub grid: GridLayout,
    pub lookup: VideoLookup,
    pub launcher: Launcher,
    /// Thumbnails of the visible page, indexed by grid slot.
    pub thumbs: Vec<Option<Thumbnail>>,

    pub notice: Option<(String, Instant)>,
    pub show_info: bool,
    pub show_help: bool,
    pub mouse_pos: (f64, f64),
    pub pending_click: Option<(f64, f64)>,

    // Key-hold repeat state
    pub initial_delay: f64,
    pub repeat_delay: f64,
    pub nav_hold_timer: f64,
    pub nav_past_initial: bool,
    pub last_frame: Instant,

    // Track which keys are currently held
    pub keys_down: HashSet<NamedKey>,
    pub chars_down: HashSet<char>,

    // Track keys that were just pressed this frame
    pub keys_pressed: HashSet<NamedKey>,
    pub chars_pressed: HashSet<char>,
}

impl BrowserState {
    pub fn new(
        catalog: Catalog,
        grid: GridLayout,
        lookup: VideoLookup,
        launcher: Launcher,
        initial_delay: f64,
        repeat_delay: f64,
    ) -> Self {
        let pager = PagerState::new(catalog.len(), grid.rows, grid.cols);
        let mut state = Self {
            catalog,
            pager,
            grid,
            lookup,
            launcher,
            thumbs: Vec::new(),
            notice: None,
            show_info: false,
            show_help: false,
            mouse_pos: (-1.0, -1.0),
            pending_click: None,
            initial_delay,
            repeat_delay,
            nav_hold_timer: 0.0,
            nav_past_initial: false,
            last_frame: Instant::now(),
            keys_down: HashSet::new(),
            chars_down: HashSet::new(),
            keys_pressed: HashSet::new(),
            chars_pressed: HashSet::new(),
        };
        state.show_page();
        state
    }

    pub fn is_key_pressed_named(&self, k: NamedKey) -> bool {
        self.keys_pressed.contains(&k)
    }

    pub fn is_char_pressed(&self, c: char) -> bool {
        self.chars_pressed.contains(&c)
    }

    pub fn is_key_down_named(&self, k: NamedKey) -> bool {
        self.keys_down.contains(&k)
    }

    pub fn is_char_down(&self, c: char) -> bool {
        self.chars_down.contains(&c)
    }

    fn any_pressed(&self, keys: &[NamedKey], chars: &[char]) -> bool {
        keys.iter().any(|k| self.is_key_pressed_named(*k))
            || chars.iter().any(|c| self.is_char_pressed(*c))
    }

    fn any_down(&self, keys: &[NamedKey], chars: &[char]) -> bool {
        keys.iter().any(|k| self.is_key_down_named(*k))
            || chars.iter().any(|c| self.is_char_down(*c))
    }

    pub fn nav_keys_held(&self) -> bool {
        self.any_down(FORWARD_KEYS, FORWARD_CHARS) || self.any_down(BACKWARD_KEYS, BACKWARD_CHARS)
    }

    // ------------------------------------------------------------------
    // Navigation and selection
    // ------------------------------------------------------------------

    pub fn navigate(&mut self, direction: Direction) {
        self.pager.advance(direction);
        self.show_page();
    }

    fn show_page(&mut self) {
        let range = self.pager.render();
        let paths: Vec<PathBuf> = range.filter_map(|i| self.catalog.path(i)).collect();
        let max_w = self.grid.cell_w.saturating_sub(2 * CELL_PADDING).max(1);
        let max_h = self.grid.cell_h.saturating_sub(2 * CELL_PADDING).max(1);
        self.thumbs = loader::load_page(&paths, max_w, max_h);
        log::debug!(
            "[page] {}/{} showing {:?}",
            self.pager.page_number(),
            self.pager.page_count(),
            self.pager.visible()
        );
    }

    /// `(grid slot, file name)` for every file on screen.
    pub fn current_page(&self) -> Vec<(usize, &str)> {
        self.pager
            .current_page()
            .into_iter()
            .filter_map(|(slot, idx)| self.catalog.name(idx).map(|name| (slot, name)))
            .collect()
    }

    /// Grid slot under the cursor if it holds a file.
    pub fn hovered(&self) -> Option<usize> {
        let (x, y) = self.mouse_pos;
        self.grid
            .locate_pixel(x, y)
            .filter(|&slot| self.pager.catalog_index(slot).is_some())
    }

    /// Play the video mapped to the file in grid slot `slot`. Slots past the
    /// end of the page are ignored.
    pub fn select_index(&mut self, slot: usize) -> Result<(), SodiumError> {
        let Some(name) = self
            .pager
            .catalog_index(slot)
            .and_then(|idx| self.catalog.name(idx))
        else {
            log::debug!("[select] slot {} is empty", slot);
            return Ok(());
        };
        let name = name.to_string();

        match self.lookup.lookup(&name)? {
            Some(resolved) => {
                if let Err(e) = self.launcher.launch(&resolved) {
                    log::error!("{}", e);
                    self.set_notice(format!("Could not start {}", resolved.command));
                }
            }
            None => {
                log::info!("No video for {}", name);
                self.set_notice(format!("No video for {}", name));
            }
        }
        Ok(())
    }

    pub fn select_at(&mut self, x: f64, y: f64) -> Result<(), SodiumError> {
        match self.grid.locate_pixel(x, y) {
            Some(slot) => self.select_index(slot),
            None => Ok(()),
        }
    }

    fn set_notice(&mut self, text: String) {
        self.notice = Some((text, Instant::now() + NOTICE_DURATION));
    }

    /// When the notice on screen should disappear.
    pub fn notice_deadline(&self) -> Option<Instant> {
        self.notice.as_ref().map(|(_, until)| *until)
    }

    /// Run the per-frame logic: input handling and notice expiry.
    /// Returns true if the app should quit.
    pub fn update(&mut self) -> Result<bool, SodiumError> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;

        if self.notice_deadline().is_some_and(|until| now >= until) {
            self.notice = None;
        }

        // ------------------------------------------------------------------
        // Quit
        // ------------------------------------------------------------------
        if self.is_key_pressed_named(NamedKey::Escape) || self.is_char_pressed('q') {
            return Ok(true);
        }

        // ------------------------------------------------------------------
        // Paging
        // ------------------------------------------------------------------
        let fwd_pressed = self.any_pressed(FORWARD_KEYS, FORWARD_CHARS);
        let bwd_pressed = self.any_pressed(BACKWARD_KEYS, BACKWARD_CHARS);
        let fwd_down = self.any_down(FORWARD_KEYS, FORWARD_CHARS);
        let bwd_down = self.any_down(BACKWARD_KEYS, BACKWARD_CHARS);

        let mut nav = None;
        if self.is_key_pressed_named(NamedKey::Home) {
            nav = Some(Direction::Home);
        } else if self.is_key_pressed_named(NamedKey::End) {
            nav = Some(Direction::End);
        } else if fwd_pressed || bwd_pressed {
            nav = Some(if fwd_pressed { Direction::Forward } else { Direction::Backward });
            self.nav_hold_timer = 0.0;
            self.nav_past_initial = false;
        } else if fwd_down || bwd_down {
            self.nav_hold_timer += dt;
            let held = if fwd_down { Direction::Forward } else { Direction::Backward };
            if !self.nav_past_initial {
                if self.nav_hold_timer >= self.initial_delay {
                    nav = Some(held);
                    self.nav_hold_timer = 0.0;
                    self.nav_past_initial = true;
                }
            } else if self.nav_hold_timer >= self.repeat_delay {
                nav = Some(held);
                self.nav_hold_timer -= self.repeat_delay;
            }
        } else {
            self.nav_hold_timer = 0.0;
            self.nav_past_initial = false;
        }

        if let Some(direction) = nav {
            self.navigate(direction);
        }

        // ------------------------------------------------------------------
        // Selection by number key or click
        // ------------------------------------------------------------------
        let digit = ('1'..='9').find(|c| self.is_char_pressed(*c));
        if let Some(slot) = digit.and_then(|c| self.grid.key_index(c)) {
            self.select_index(slot)?;
        }
        if let Some((x, y)) = self.pending_click.take() {
            self.select_at(x, y)?;
        }

        // ------------------------------------------------------------------
        // Toggles
        // ------------------------------------------------------------------
        if self.is_char_pressed('i') {
            self.show_info = !self.show_info;
        }
        if self.is_char_pressed('?') {
            self.show_help = !self.show_help;
        }

        // Clear per-frame input state
        self.keys_pressed.clear();
        self.chars_pressed.clear();

        Ok(false)
    }

    /// Render into the softbuffer framebuffer.
    pub fn render(&self, canvas: &mut Canvas) {
        canvas.clear(BG_COLOR);

        let hovered = self.hovered();
        for (slot, thumb) in self.thumbs.iter().enumerate() {
            let Some((cx, cy)) = self.grid.cell_origin(slot) else {
                continue;
            };
            let (cw, ch) = (self.grid.cell_w, self.grid.cell_h);

            match thumb {
                Some(t) => {
                    let box_w = cw.saturating_sub(2 * CELL_PADDING).max(1) as f32;
                    let box_h = ch.saturating_sub(2 * CELL_PADDING).max(1) as f32;
                    let scale = fit_scale(t.width as f32, t.height as f32, box_w, box_h).min(1.0);
                    let x0 = cx as f32 + (cw as f32 - t.width as f32 * scale) / 2.0;
                    let y0 = cy as f32 + (ch as f32 - t.height as f32 * scale) / 2.0;
                    canvas.blit_scaled(&t.rgba_bytes, t.width, t.height, x0, y0, scale);
                }
                None => {
                    let p = CELL_PADDING as i32;
                    let (pw, ph) = (cw.saturating_sub(2 * CELL_PADDING), ch.saturating_sub(2 * CELL_PADDING));
                    canvas.fill_rect(cx + p, cy + p, pw, ph, (60, 60, 60, 255));
                    canvas.draw_text("?", cx + cw as i32 / 2 - 6, cy + ch as i32 / 2 - 7, 2, (200, 200, 200, 255));
                }
            }

            if hovered == Some(slot) {
                canvas.stroke_rect(cx, cy, cw, ch, CELL_PADDING, (230, 200, 60, 255));
            }
        }

        let text_scale: u32 = 2;
        let line_h = (7 * text_scale + 8) as i32;

        // Status line
        if self.show_info {
            let visible = self.pager.visible();
            let mut line = format!(
                "page {}/{} | {}-{} of {}",
                self.pager.page_number(),
                self.pager.page_count(),
                visible.start + 1,
                visible.end,
                self.pager.total,
            );
            let page = self.current_page();
            if let Some((_, name)) = page.iter().find(|(slot, _)| Some(*slot) == hovered) {
                line.push_str(" | ");
                line.push_str(name);
            }
            let y = canvas.height as i32 - line_h;
            canvas.fill_rect(0, y, canvas.width, line_h as u32, (0, 0, 0, 178));
            canvas.draw_text(&line, 10, y + 4, text_scale, (255, 255, 255, 255));
        }

        // Notice
        if let Some((ref text, _)) = self.notice {
            let w = text.chars().count() as i32 * text_advance(text_scale) + 20;
            let x = (canvas.width as i32 - w) / 2;
            let y = (canvas.height as i32 - line_h) / 2;
            canvas.fill_rect(x, y, w.max(0) as u32, line_h as u32, (0, 0, 0, 200));
            canvas.draw_text(text, x + 10, y + 4, text_scale, (255, 80, 80, 255));
        }

        // Help overlay
        if self.show_help {
            canvas.fill_rect(0, 0, canvas.width, canvas.height, (0, 0, 0, 200));
            let mut y = 20;
            for line in HELP_KEYS.lines() {
                canvas.draw_text(line, 20, y, text_scale, (255, 255, 255, 255));
                y += 24;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::{tempdir, TempDir};

    fn session(files: usize, movie_list: &str) -> (TempDir, BrowserState) {
        let dir = tempdir().unwrap();
        let covers = dir.path().join("covers");
        fs::create_dir(&covers).unwrap();
        for i in 0..files {
            File::create(covers.join(format!("{i:02}.png"))).unwrap();
        }
        let list = dir.path().join("movie-list");
        fs::write(&list, movie_list).unwrap();

        let catalog = Catalog::scan(&covers).unwrap();
        let grid = GridLayout::new(3, 3, 100, 100);
        let state = BrowserState::new(
            catalog,
            grid,
            VideoLookup::new(list, None),
            Launcher::new(),
            0.5,
            0.25,
        );
        (dir, state)
    }

    #[test]
    fn test_first_page_and_paging() {
        let (_dir, mut state) = session(20, "");
        assert_eq!(state.thumbs.len(), 9);
        assert_eq!(state.current_page()[0], (0, "00.png"));

        state.keys_pressed.insert(NamedKey::End);
        assert!(!state.update().unwrap());
        assert_eq!(state.current_page(), vec![(0, "18.png"), (1, "19.png")]);
        assert_eq!(state.thumbs.len(), 2);

        state.chars_pressed.insert('h');
        state.update().unwrap();
        assert_eq!(state.current_page()[0], (0, "09.png"));

        state.keys_pressed.insert(NamedKey::Home);
        state.update().unwrap();
        assert_eq!(state.current_page()[0], (0, "00.png"));
    }

    #[test]
    fn test_select_without_mapping_sets_notice() {
        let (_dir, mut state) = session(3, "other.png|x.mp4|true|\n");
        state.select_index(1).unwrap();
        let (text, _) = state.notice.clone().unwrap();
        assert_eq!(text, "No video for 01.png");
    }

    #[test]
    fn test_select_past_loaded_is_ignored() {
        let (_dir, mut state) = session(3, "");
        state.chars_pressed.insert('5');
        state.update().unwrap();
        assert!(state.notice.is_none());
        state.select_at(-5.0, 10.0).unwrap();
        state.select_at(1000.0, 10.0).unwrap();
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_spawn_failure_is_not_fatal() {
        let (_dir, mut state) = session(1, "00.png|a.mp4|/nonexistent/player|\n");
        state.pending_click = Some((50.0, 50.0));
        assert!(!state.update().unwrap());
        let (text, _) = state.notice.clone().unwrap();
        assert_eq!(text, "Could not start /nonexistent/player");
    }

    #[test]
    fn test_missing_movie_list_is_fatal() {
        let (dir, mut state) = session(1, "");
        fs::remove_file(dir.path().join("movie-list")).unwrap();
        assert!(matches!(state.select_index(0), Err(SodiumError::Mapping(_))));
    }

    #[test]
    fn test_quit_key() {
        let (_dir, mut state) = session(1, "");
        state.chars_pressed.insert('q');
        assert!(state.update().unwrap());
    }

    #[test]
    fn test_render_smoke() {
        let (_dir, mut state) = session(2, "");
        state.show_info = true;
        state.mouse_pos = (10.0, 10.0);
        state.notice = Some(("No video".into(), Instant::now() + NOTICE_DURATION));
        let (w, h) = state.grid.size();
        let mut buf = vec![0u32; (w * h) as usize];
        state.render(&mut Canvas::new(&mut buf, w, h));
        assert_eq!(state.hovered(), Some(0));
        assert!(buf.iter().any(|&p| p != 0));
    }
}
