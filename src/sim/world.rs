/// GameState: the complete snapshot of a running game.
///
/// ## Ownership
///
/// The map array is fixed at startup. NPCs live in their map's roster;
/// the hero lives here, with `current_map` naming the map it currently
/// belongs to. A map transition therefore re-targets `current_map`
/// rather than moving the hero between vectors, and inventory rides
/// along untouched.
///
/// ## Occupancy
///
/// Walls and bounds fold into a single grid predicate; occupancy adds
/// the characters on top. A character in transit still occupies its
/// source tile — positions commit only on arrival — so a later mover in
/// the same tick observes the earlier mover's pre-commit tile.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::entity::Character;
use crate::domain::event::EventRegistry;
use crate::domain::grid::TileGrid;

pub struct MapState {
    pub name: String,
    pub grid: TileGrid,
    pub events: EventRegistry,
    pub npcs: Vec<Character>,
    /// Background-music track started when the hero enters this map.
    pub bgm: String,
    /// Respawn coordinate after a hazard death on this map.
    pub entry: (i32, i32),
}

impl MapState {
    /// Is (x, y) blocked for movement? Walls (bounds included) and NPC
    /// tiles count. `skip` excludes one roster index, since a character
    /// never blocks itself.
    pub fn is_occupied(&self, x: i32, y: i32, skip: Option<usize>) -> bool {
        if self.grid.is_wall(x, y) {
            return true;
        }
        self.npcs
            .iter()
            .enumerate()
            .any(|(i, c)| Some(i) != skip && c.x == x && c.y == y)
    }

    pub fn npc_at(&self, x: i32, y: i32) -> Option<&Character> {
        self.npcs.iter().find(|c| c.x == x && c.y == y)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    Finished,
}

/// Lines shown per message-window page.
pub const LINES_PER_PAGE: usize = 3;

/// Modal message window. '/' in source text separates lines; the action
/// key pages forward and finally dismisses. While a window is visible
/// the simulation is frozen and the action press belongs to the window.
pub struct MessageWindow {
    lines: Vec<String>,
    page: usize,
}

impl MessageWindow {
    pub fn new(text: &str) -> Self {
        MessageWindow {
            lines: text.split('/').map(str::to_string).collect(),
            page: 0,
        }
    }

    pub fn page_lines(&self) -> &[String] {
        let start = self.page * LINES_PER_PAGE;
        let end = (start + LINES_PER_PAGE).min(self.lines.len());
        &self.lines[start..end]
    }

    pub fn has_more_pages(&self) -> bool {
        (self.page + 1) * LINES_PER_PAGE < self.lines.len()
    }

    /// Advance to the next page. Returns true when the final page was
    /// already showing, meaning the window should close.
    pub fn next_page(&mut self) -> bool {
        if !self.has_more_pages() {
            return true;
        }
        self.page += 1;
        false
    }
}

pub struct GameState {
    pub maps: Vec<MapState>,
    pub current_map: usize,
    pub hero: Character,
    pub rng: StdRng,
    /// Per-tick chance an idle wandering NPC starts a move.
    pub wander_chance: f64,
    pub message: Option<MessageWindow>,
    /// One-shot countdown on the simulation timeline; the game ends when
    /// it reaches zero.
    pub win_timer: Option<u32>,
    pub phase: Phase,
    pub tick: u64,
}

impl GameState {
    pub fn new(maps: Vec<MapState>, current_map: usize, hero: Character, wander_chance: f64) -> Self {
        Self::with_seed(maps, current_map, hero, wander_chance, rand::random())
    }

    /// Deterministic construction for tests: the NPC wander stream is
    /// fully reproducible from the seed.
    pub fn with_seed(
        maps: Vec<MapState>,
        current_map: usize,
        hero: Character,
        wander_chance: f64,
        seed: u64,
    ) -> Self {
        GameState {
            maps,
            current_map,
            hero,
            rng: StdRng::seed_from_u64(seed),
            wander_chance,
            message: None,
            win_timer: None,
            phase: Phase::Playing,
            tick: 0,
        }
    }

    pub fn map(&self) -> &MapState {
        &self.maps[self.current_map]
    }

    pub fn map_mut(&mut self) -> &mut MapState {
        &mut self.maps[self.current_map]
    }

    /// Occupancy as the hero sees it: walls plus every NPC on this map.
    pub fn blocked_for_hero(&self, x: i32, y: i32) -> bool {
        self.map().is_occupied(x, y, None)
    }

    /// Occupancy as NPC `idx` sees it: walls, the other NPCs, and the hero.
    pub fn blocked_for_npc(&self, idx: usize, x: i32, y: i32) -> bool {
        if self.map().is_occupied(x, y, Some(idx)) {
            return true;
        }
        self.hero.x == x && self.hero.y == y
    }

    pub fn show_message(&mut self, text: &str) {
        self.message = Some(MessageWindow::new(text));
    }

    pub fn message_visible(&self) -> bool {
        self.message.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_window_pages_then_closes() {
        let mut w = MessageWindow::new("ONE/TWO/THREE/FOUR");
        assert_eq!(w.page_lines(), ["ONE", "TWO", "THREE"]);
        assert!(w.has_more_pages());
        assert!(!w.next_page());
        assert_eq!(w.page_lines(), ["FOUR"]);
        assert!(!w.has_more_pages());
        assert!(w.next_page());
    }

    #[test]
    fn single_page_message_closes_on_first_press() {
        let mut w = MessageWindow::new("HELLO THERE");
        assert_eq!(w.page_lines(), ["HELLO THERE"]);
        assert!(w.next_page());
    }
}
