/// The step function: advances the game by one tick.
///
/// Processing order:
///   1. Win countdown (runs even under a message window)
///   2. Message window (modal: the action press pages/dismisses it,
///      everything else freezes)
///   3. Hero move intent + transit
///   4. Arrival resolution (hazard first, then warp)
///   5. NPC wander (fixed roster order)
///   6. Action-button protocol
///
/// Occupancy is checked once, at move initiation. A character that has
/// committed to a move finishes the transit unconditionally; positions
/// commit only on arrival, so later movers in the same tick see earlier
/// movers' pre-commit tiles.

use rand::Rng;

use crate::domain::entity::{Behavior, Direction, FrameInput, MoveState};
use crate::domain::event::{MapEvent, GENERIC_KEY, LEGENDARY_KEY};
use crate::domain::grid::TileGrid;
use super::event::GameEvent;
use super::world::{GameState, Phase};

/// Map and tile of the realm's queen; talking to her while holding the
/// legendary key ends the game.
const QUEEN_MAP: usize = 3;
const QUEEN_TILE: (i32, i32) = (12, 10);

/// Ticks between the win dialogue and process exit (2 s at 20 ms/tick).
const WIN_DELAY_TICKS: u32 = 100;

/// Widest ring probed when a warp destination is blocked.
const SAFE_SPOT_MAX_RADIUS: i32 = 5;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut GameState, input: FrameInput) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    if world.phase != Phase::Playing {
        return events;
    }
    world.tick += 1;

    resolve_win_timer(world, &mut events);
    if world.phase != Phase::Playing {
        return events;
    }

    // A visible window owns the action button and freezes the world.
    if world.message_visible() {
        if input.action {
            let done = world.message.as_mut().map(|w| w.next_page()).unwrap_or(true);
            if done {
                world.message = None;
            }
        }
        return events;
    }

    resolve_hero_intent(world, input.movement);
    resolve_hero_transit(world, &mut events);
    resolve_npc_wander(world);
    if input.action {
        resolve_action(world, &mut events);
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Win countdown
// ══════════════════════════════════════════════════════════════

fn resolve_win_timer(world: &mut GameState, events: &mut Vec<GameEvent>) {
    if let Some(remaining) = world.win_timer {
        if remaining == 0 {
            world.phase = Phase::Finished;
            events.push(GameEvent::Quit);
        } else {
            world.win_timer = Some(remaining - 1);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Hero movement
// ══════════════════════════════════════════════════════════════

fn resolve_hero_intent(world: &mut GameState, movement: Option<Direction>) {
    let dir = match movement {
        Some(d) => d,
        None => return,
    };
    if world.hero.is_moving() {
        return;
    }
    // Facing updates even when the way is blocked, so the hero can turn
    // toward a door or NPC without moving.
    world.hero.direction = dir;

    let (dx, dy) = dir.unit();
    let (nx, ny) = (world.hero.x + dx, world.hero.y + dy);
    if !world.blocked_for_hero(nx, ny) {
        world.hero.begin_move(dir);
    }
}

fn resolve_hero_transit(world: &mut GameState, events: &mut Vec<GameEvent>) {
    if !world.hero.advance() {
        return;
    }
    resolve_arrival(world, events);
}

/// Arrival side effects, in priority order: a deadly tile wins over any
/// event that might share it.
fn resolve_arrival(world: &mut GameState, events: &mut Vec<GameEvent>) {
    let (hx, hy) = (world.hero.x, world.hero.y);

    if world.map().grid.tile_at(hx, hy).is_deadly() {
        hero_die(world, events);
        return;
    }

    let warp = match world.map().events.event_at(hx, hy) {
        Some(&MapEvent::Warp { dest_map, dest_x, dest_y, .. }) => Some((dest_map, dest_x, dest_y)),
        _ => None,
    };
    if let Some((dest_map, dest_x, dest_y)) = warp {
        enter_map(world, dest_map, dest_x, dest_y, events);
    }
}

fn hero_die(world: &mut GameState, events: &mut Vec<GameEvent>) {
    events.push(GameEvent::HeroDied);
    world.show_message("YOU TOUCHED A RED CRYSTAL!/GAME OVER!");
    world.hero.clear_inventory();
    let (ex, ey) = world.map().entry;
    world.hero.x = ex;
    world.hero.y = ey;
    world.hero.offset = 0;
    world.hero.direction = Direction::Down;
    world.hero.state = MoveState::Idle;
}

/// Switch maps. Inventory rides along on the hero; the destination tile
/// degrades to the nearest free tile when the nominal one is a wall.
fn enter_map(
    world: &mut GameState,
    dest_map: usize,
    dest_x: i32,
    dest_y: i32,
    events: &mut Vec<GameEvent>,
) {
    world.current_map = dest_map;
    let (sx, sy) = find_safe_spot(&world.maps[dest_map].grid, dest_x, dest_y);
    world.hero.x = sx;
    world.hero.y = sy;
    world.hero.offset = 0;
    world.hero.direction = Direction::Down;
    world.hero.state = MoveState::Idle;
    events.push(GameEvent::MapEntered { map: dest_map });
}

/// Resolve a warp destination. A blocked nominal tile falls back to an
/// expanding ring search: radius 1 upward, dx outer and dy inner with
/// interior cells skipped, first non-wall tile wins. An exhausted search
/// returns the nominal coordinate unchanged.
pub fn find_safe_spot(grid: &TileGrid, x: i32, y: i32) -> (i32, i32) {
    if !grid.is_wall(x, y) {
        return (x, y);
    }
    for radius in 1..SAFE_SPOT_MAX_RADIUS {
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if dx.abs().max(dy.abs()) != radius {
                    continue;
                }
                let (tx, ty) = (x + dx, y + dy);
                if !grid.is_wall(tx, ty) {
                    return (tx, ty);
                }
            }
        }
    }
    (x, y)
}

// ══════════════════════════════════════════════════════════════
// NPC wander
// ══════════════════════════════════════════════════════════════

fn resolve_npc_wander(world: &mut GameState) {
    let m = world.current_map;
    for i in 0..world.maps[m].npcs.len() {
        if world.maps[m].npcs[i].behavior != Behavior::Wander {
            continue;
        }
        if world.maps[m].npcs[i].is_moving() {
            world.maps[m].npcs[i].advance();
            continue;
        }
        if world.rng.random::<f64>() >= world.wander_chance {
            continue;
        }
        let dir = match world.rng.random_range(0..4) {
            0 => Direction::Left,
            1 => Direction::Right,
            2 => Direction::Up,
            _ => Direction::Down,
        };
        let (dx, dy) = dir.unit();
        let npc = &world.maps[m].npcs[i];
        let (nx, ny) = (npc.x + dx, npc.y + dy);
        // A blocked pick is skipped outright; the NPC rolls again on a
        // later tick.
        if world.blocked_for_npc(i, nx, ny) {
            continue;
        }
        world.maps[m].npcs[i].begin_move(dir);
    }
}

// ══════════════════════════════════════════════════════════════
// Action-button protocol
// ══════════════════════════════════════════════════════════════

/// Priority order, first match wins:
/// search own tile → open door on own tile → key-check a faced door →
/// talk to a faced character → "no one there".
fn resolve_action(world: &mut GameState, events: &mut Vec<GameEvent>) {
    if world.hero.is_moving() {
        return;
    }

    let (hx, hy) = (world.hero.x, world.hero.y);

    // 1. Search: treasure on the hero's own tile.
    let found = match world.map().events.event_at(hx, hy) {
        Some(e @ MapEvent::Treasure { .. }) => Some(e.clone()),
        _ => None,
    };
    if let Some(event) = found {
        if let MapEvent::Treasure { ref item, .. } = event {
            let item = item.clone();
            world.map_mut().events.remove(&event);
            world.hero.add_item(&item);
            world.show_message(&format!("HERO DISCOVERED/{item}"));
            events.push(GameEvent::TreasureFound { item });
        }
        return;
    }

    // 2. Open: a door on the hero's own tile needs no key.
    let reached = match world.map().events.event_at(hx, hy) {
        Some(e @ MapEvent::Door { .. }) => Some(e.clone()),
        _ => None,
    };
    if let Some(event) = reached {
        world.map_mut().events.remove(&event);
        events.push(GameEvent::DoorOpened);
        return;
    }

    // 3. Locked-door check on the faced tile.
    let (fx, fy) = world.hero.faced_tile();
    let faced_key = match world.map().events.event_at(fx, fy) {
        Some(MapEvent::Door { required_key, .. }) => Some(required_key.clone()),
        _ => None,
    };
    if let Some(key) = faced_key {
        if !world.hero.has_item(&key) {
            let msg = if key == GENERIC_KEY {
                "YOU NEED A KEY/TO OPEN THIS DOOR".to_string()
            } else {
                format!("YOU NEED THE {key}/TO OPEN THIS DOOR")
            };
            world.show_message(&msg);
            events.push(GameEvent::DoorLocked);
            return;
        }
        // Key in hand: nothing to do from here — the door opens from its
        // own tile once the hero walks onto it. Fall through to talk.
    }

    // 4. Talk to the character on the faced tile.
    let listener = world.map().npc_at(fx, fy).map(|c| (c.x, c.y, c.dialogue.clone()));
    if let Some((cx, cy, dialogue)) = listener {
        if world.current_map == QUEEN_MAP
            && (cx, cy) == QUEEN_TILE
            && world.hero.has_item(LEGENDARY_KEY)
        {
            world.show_message(
                "CONGRATULATIONS BRAVE HERO!/YOU HAVE SAVED OUR REALM/WITH THE LEGENDARY KEY!",
            );
            world.win_timer = Some(WIN_DELAY_TICKS);
            events.push(GameEvent::GameWon);
            return;
        }
        let line = dialogue.unwrap_or_else(|| "...".to_string());
        world.show_message(&line);
        events.push(GameEvent::Dialogue);
        return;
    }

    // 5. Nothing matched.
    world.show_message("THERE IS NO ONE/IN THAT DIRECTION");
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Character;
    use crate::domain::event::EventRegistry;
    use crate::domain::tile::Tile;
    use crate::sim::world::MapState;

    /// Build a map from a string diagram.
    /// Legend: '#'=Wall  '*'=Hazard  anything else=Floor
    fn map_from(name: &str, rows: &[&str]) -> MapState {
        let tiles = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|ch| match ch {
                        '#' => Tile::Wall,
                        '*' => Tile::Hazard,
                        _ => Tile::Floor,
                    })
                    .collect()
            })
            .collect();
        MapState {
            name: name.to_string(),
            grid: TileGrid::new(tiles),
            events: EventRegistry::new(),
            npcs: Vec::new(),
            bgm: name.to_string(),
            entry: (1, 1),
        }
    }

    fn hero_at(x: i32, y: i32) -> Character {
        Character::new(x, y, Direction::Down, Behavior::Player, 4)
    }

    fn world_of(maps: Vec<MapState>, hero: Character) -> GameState {
        GameState::with_seed(maps, 0, hero, 0.0, 7)
    }

    fn open_field(w: i32, h: i32) -> MapState {
        let mut rows = Vec::new();
        for y in 0..h {
            let row: String = (0..w)
                .map(|x| if x == 0 || y == 0 || x == w - 1 || y == h - 1 { '#' } else { '.' })
                .collect();
            rows.push(row);
        }
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        map_from("field", &refs)
    }

    fn move_input(dir: Direction) -> FrameInput {
        FrameInput { movement: Some(dir), action: false }
    }

    fn action_input() -> FrameInput {
        FrameInput { movement: None, action: true }
    }

    // ── Movement & collision ──

    #[test]
    fn unobstructed_move_commits_one_tile() {
        let mut world = world_of(vec![open_field(10, 10)], hero_at(4, 4));
        for _ in 0..8 {
            step(&mut world, move_input(Direction::Right));
        }
        assert_eq!((world.hero.x, world.hero.y), (5, 4));
        assert_eq!(world.hero.offset, 0);
        assert!(!world.hero.is_moving());
    }

    #[test]
    fn wall_blocks_move_entirely() {
        let mut world = world_of(vec![open_field(10, 10)], hero_at(1, 1));
        for _ in 0..20 {
            step(&mut world, move_input(Direction::Left));
        }
        assert_eq!((world.hero.x, world.hero.y), (1, 1));
        assert!(!world.hero.is_moving());
        // Facing still turned toward the wall
        assert_eq!(world.hero.direction, Direction::Left);
    }

    #[test]
    fn npc_tile_blocks_hero_move() {
        let mut field = open_field(10, 10);
        field.npcs.push(Character::new(5, 4, Direction::Down, Behavior::Stationary, 4));
        let mut world = world_of(vec![field], hero_at(4, 4));
        for _ in 0..20 {
            step(&mut world, move_input(Direction::Right));
        }
        assert_eq!((world.hero.x, world.hero.y), (4, 4));
    }

    #[test]
    fn blocking_is_checked_at_initiation_only() {
        // Once moving, the hero finishes the transit even if an NPC is
        // dropped onto the destination mid-flight.
        let mut world = world_of(vec![open_field(10, 10)], hero_at(4, 4));
        step(&mut world, move_input(Direction::Right));
        assert!(world.hero.is_moving());
        world.maps[0]
            .npcs
            .push(Character::new(5, 4, Direction::Down, Behavior::Stationary, 4));
        for _ in 0..7 {
            step(&mut world, FrameInput::default());
        }
        assert_eq!((world.hero.x, world.hero.y), (5, 4));
    }

    // ── Hazard ──

    #[test]
    fn hazard_arrival_clears_inventory_and_respawns() {
        let mut field = map_from(
            "cave",
            &[
                "#######",
                "#.....#",
                "#..*..#",
                "#.....#",
                "#######",
            ],
        );
        field.entry = (5, 3);
        let mut world = world_of(vec![field], hero_at(2, 2));
        world.hero.add_item("SWORD");
        world.hero.add_item("POTION");

        let mut events = Vec::new();
        for _ in 0..8 {
            events.extend(step(&mut world, move_input(Direction::Right)));
        }
        assert!(events.contains(&GameEvent::HeroDied));
        assert!(world.hero.inventory().is_empty());
        assert_eq!((world.hero.x, world.hero.y), (5, 3));
        assert_eq!(world.hero.direction, Direction::Down);
        assert!(world.message_visible());
    }

    // ── Warp & safe-spot search ──

    fn grid_from(rows: &[&str]) -> TileGrid {
        let tiles = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|ch| if ch == '#' { Tile::Wall } else { Tile::Floor })
                    .collect()
            })
            .collect();
        TileGrid::new(tiles)
    }

    #[test]
    fn safe_spot_prefers_the_nominal_tile() {
        let g = grid_from(&["...", "...", "..."]);
        assert_eq!(find_safe_spot(&g, 1, 1), (1, 1));
    }

    #[test]
    fn safe_spot_scans_ring_in_fixed_order() {
        // Nominal blocked; two free tiles on the radius-1 ring. The scan
        // runs dx = -1..1 outer, dy inner, so (-1, 0) precedes (1, 0).
        let g = grid_from(&[
            "#####",
            "#.#.#",
            "#####",
        ]);
        assert_eq!(find_safe_spot(&g, 2, 1), (1, 1));
    }

    #[test]
    fn safe_spot_expands_to_the_lowest_nonempty_radius() {
        // Everything within radius 1 of (3, 3) is wall; radius 2 has free
        // tiles. First in scan order at radius 2 is dx=-2, dy=-2 → (1, 1).
        let g = grid_from(&[
            "#######",
            "#.....#",
            "#.###.#",
            "#.###.#",
            "#.###.#",
            "#.....#",
            "#######",
        ]);
        assert_eq!(find_safe_spot(&g, 3, 3), (1, 1));
    }

    #[test]
    fn safe_spot_falls_back_to_nominal_when_exhausted() {
        let g = grid_from(&[
            "###",
            "###",
            "###",
        ]);
        assert_eq!(find_safe_spot(&g, 1, 1), (1, 1));
    }

    #[test]
    fn warp_moves_hero_and_keeps_inventory() {
        let mut castle = open_field(10, 10);
        castle.events.add(MapEvent::Warp { x: 5, y: 4, dest_map: 1, dest_x: 2, dest_y: 2 });
        let field = open_field(10, 10);
        let mut world = world_of(vec![castle, field], hero_at(4, 4));
        world.hero.add_item("POTION");

        let mut events = Vec::new();
        for _ in 0..8 {
            events.extend(step(&mut world, move_input(Direction::Right)));
        }
        assert!(events.contains(&GameEvent::MapEntered { map: 1 }));
        assert_eq!(world.current_map, 1);
        assert_eq!((world.hero.x, world.hero.y), (2, 2));
        assert!(world.hero.has_item("POTION"));
    }

    #[test]
    fn warp_to_blocked_tile_lands_on_ring_fallback() {
        let mut castle = open_field(10, 10);
        castle.events.add(MapEvent::Warp { x: 5, y: 4, dest_map: 1, dest_x: 0, dest_y: 0 });
        // Destination (0, 0) is the border wall; nearest free in scan
        // order is the radius-1 cell (1, 1).
        let field = open_field(10, 10);
        let mut world = world_of(vec![castle, field], hero_at(4, 4));
        for _ in 0..8 {
            step(&mut world, move_input(Direction::Right));
        }
        assert_eq!(world.current_map, 1);
        assert_eq!((world.hero.x, world.hero.y), (1, 1));
    }

    // ── Action protocol ──

    #[test]
    fn search_collects_treasure_after_walking_onto_it() {
        let mut field = open_field(12, 8);
        field.events.add(MapEvent::Treasure { x: 6, y: 5, item: "Sword".to_string() });
        let mut world = world_of(vec![field], hero_at(5, 5));
        world.hero.direction = Direction::Right;

        for _ in 0..8 {
            step(&mut world, move_input(Direction::Right));
        }
        assert_eq!((world.hero.x, world.hero.y), (6, 5));

        let events = step(&mut world, action_input());
        assert_eq!(events, vec![GameEvent::TreasureFound { item: "Sword".to_string() }]);
        assert_eq!(world.hero.inventory(), ["Sword".to_string()]);
        assert!(world.maps[0].events.event_at(6, 5).is_none());
        assert!(world.message_visible());
    }

    #[test]
    fn door_on_own_tile_opens_without_key() {
        let mut field = open_field(10, 10);
        field.events.add(MapEvent::Door {
            x: 4,
            y: 4,
            required_key: GENERIC_KEY.to_string(),
        });
        let mut world = world_of(vec![field], hero_at(4, 4));
        let events = step(&mut world, action_input());
        assert_eq!(events, vec![GameEvent::DoorOpened]);
        assert!(world.maps[0].events.event_at(4, 4).is_none());
    }

    #[test]
    fn faced_locked_door_needs_its_exact_key() {
        let mut field = open_field(10, 10);
        field.events.add(MapEvent::Door {
            x: 5,
            y: 4,
            required_key: LEGENDARY_KEY.to_string(),
        });
        let mut world = world_of(vec![field], hero_at(4, 4));
        world.hero.direction = Direction::Right;

        let events = step(&mut world, action_input());
        assert_eq!(events, vec![GameEvent::DoorLocked]);
        // No state change: door stays registered, inventory untouched
        assert!(world.maps[0].events.event_at(5, 4).is_some());
        assert!(world.message_visible());
    }

    #[test]
    fn faced_door_with_key_in_hand_falls_through_to_talk() {
        let mut field = open_field(10, 10);
        field.events.add(MapEvent::Door {
            x: 5,
            y: 4,
            required_key: LEGENDARY_KEY.to_string(),
        });
        let mut world = world_of(vec![field], hero_at(4, 4));
        world.hero.direction = Direction::Right;
        world.hero.add_item(LEGENDARY_KEY);

        let events = step(&mut world, action_input());
        // No lock message; nobody to talk to either
        assert!(events.is_empty());
        assert!(world.maps[0].events.event_at(5, 4).is_some());
        assert!(world.message_visible());
    }

    #[test]
    fn talk_shows_the_faced_npc_dialogue() {
        let mut field = open_field(10, 10);
        field.npcs.push(
            Character::new(5, 4, Direction::Left, Behavior::Stationary, 4)
                .with_dialogue("FINE WEATHER/IS IT NOT"),
        );
        let mut world = world_of(vec![field], hero_at(4, 4));
        world.hero.direction = Direction::Right;

        let events = step(&mut world, action_input());
        assert_eq!(events, vec![GameEvent::Dialogue]);
        assert_eq!(
            world.message.as_ref().unwrap().page_lines(),
            ["FINE WEATHER", "IS IT NOT"]
        );
    }

    #[test]
    fn empty_facing_reports_no_one_there() {
        let mut world = world_of(vec![open_field(10, 10)], hero_at(4, 4));
        world.hero.direction = Direction::Up;
        let events = step(&mut world, action_input());
        assert!(events.is_empty());
        assert_eq!(
            world.message.as_ref().unwrap().page_lines(),
            ["THERE IS NO ONE", "IN THAT DIRECTION"]
        );
    }

    #[test]
    fn treasure_underfoot_wins_over_faced_npc() {
        let mut field = open_field(10, 10);
        field.events.add(MapEvent::Treasure { x: 4, y: 4, item: "HERB".to_string() });
        field.npcs.push(
            Character::new(5, 4, Direction::Left, Behavior::Stationary, 4).with_dialogue("HI"),
        );
        let mut world = world_of(vec![field], hero_at(4, 4));
        world.hero.direction = Direction::Right;
        let events = step(&mut world, action_input());
        assert_eq!(events, vec![GameEvent::TreasureFound { item: "HERB".to_string() }]);
    }

    // ── Message window gating ──

    #[test]
    fn visible_window_consumes_the_action_press() {
        let mut field = open_field(10, 10);
        field.events.add(MapEvent::Treasure { x: 4, y: 4, item: "GEM".to_string() });
        let mut world = world_of(vec![field], hero_at(4, 4));
        world.show_message("HOLD");

        let events = step(&mut world, action_input());
        assert!(events.is_empty());
        assert!(!world.message_visible());
        // Treasure untouched while the window was up
        assert!(world.maps[0].events.event_at(4, 4).is_some());

        let events = step(&mut world, action_input());
        assert_eq!(events, vec![GameEvent::TreasureFound { item: "GEM".to_string() }]);
    }

    #[test]
    fn visible_window_freezes_hero_movement() {
        let mut world = world_of(vec![open_field(10, 10)], hero_at(4, 4));
        world.show_message("WAIT");
        for _ in 0..8 {
            step(&mut world, move_input(Direction::Right));
        }
        assert_eq!((world.hero.x, world.hero.y), (4, 4));
        // Movement keys do not dismiss the window
        assert!(world.message_visible());
    }

    // ── NPC wander ──

    #[test]
    fn wandering_npc_stays_on_free_tiles() {
        let mut field = open_field(8, 8);
        field.npcs.push(Character::new(4, 4, Direction::Down, Behavior::Wander, 32));
        let mut world = GameState::with_seed(vec![field], 0, hero_at(1, 1), 1.0, 99);

        for _ in 0..200 {
            step(&mut world, FrameInput::default());
            let npc = &world.maps[0].npcs[0];
            assert!(!world.maps[0].grid.is_wall(npc.x, npc.y));
            assert!((npc.x, npc.y) != (world.hero.x, world.hero.y));
        }
    }

    #[test]
    fn wandering_npc_moves_eventually() {
        let mut field = open_field(8, 8);
        field.npcs.push(Character::new(4, 4, Direction::Down, Behavior::Wander, 32));
        let mut world = GameState::with_seed(vec![field], 0, hero_at(1, 1), 1.0, 5);
        let mut moved = false;
        for _ in 0..50 {
            step(&mut world, FrameInput::default());
            if (world.maps[0].npcs[0].x, world.maps[0].npcs[0].y) != (4, 4) {
                moved = true;
                break;
            }
        }
        assert!(moved);
    }

    #[test]
    fn stationary_npc_never_moves() {
        let mut field = open_field(8, 8);
        field.npcs.push(Character::new(4, 4, Direction::Down, Behavior::Stationary, 32));
        let mut world = GameState::with_seed(vec![field], 0, hero_at(1, 1), 1.0, 5);
        for _ in 0..100 {
            step(&mut world, FrameInput::default());
        }
        assert_eq!((world.maps[0].npcs[0].x, world.maps[0].npcs[0].y), (4, 4));
    }

    #[test]
    fn zero_wander_chance_freezes_wanderers() {
        let mut field = open_field(8, 8);
        field.npcs.push(Character::new(4, 4, Direction::Down, Behavior::Wander, 32));
        let mut world = GameState::with_seed(vec![field], 0, hero_at(1, 1), 0.0, 5);
        for _ in 0..100 {
            step(&mut world, FrameInput::default());
        }
        assert_eq!((world.maps[0].npcs[0].x, world.maps[0].npcs[0].y), (4, 4));
    }

    // ── Win flow ──

    fn realm_with_queen() -> GameState {
        let mut maps: Vec<MapState> = (0..3).map(|_| open_field(6, 6)).collect();
        let mut village = open_field(16, 14);
        village.npcs.push(
            Character::new(QUEEN_TILE.0, QUEEN_TILE.1, Direction::Down, Behavior::Stationary, 4)
                .with_dialogue("FIND THE LEGENDARY KEY/BRAVE HERO"),
        );
        maps.push(village);
        let hero = hero_at(QUEEN_TILE.0 - 1, QUEEN_TILE.1);
        let mut world = GameState::with_seed(maps, QUEEN_MAP, hero, 0.0, 1);
        world.hero.direction = Direction::Right;
        world
    }

    #[test]
    fn queen_without_key_gives_plain_dialogue() {
        let mut world = realm_with_queen();
        let events = step(&mut world, action_input());
        assert_eq!(events, vec![GameEvent::Dialogue]);
        assert!(world.win_timer.is_none());
    }

    #[test]
    fn queen_with_legendary_key_wins_after_the_delay() {
        let mut world = realm_with_queen();
        world.hero.add_item(LEGENDARY_KEY);

        let events = step(&mut world, action_input());
        assert_eq!(events, vec![GameEvent::GameWon]);
        assert_eq!(world.win_timer, Some(WIN_DELAY_TICKS));
        assert!(world.message_visible());

        // The countdown runs even while the win dialogue stays up.
        let mut quit = Vec::new();
        for _ in 0..=WIN_DELAY_TICKS {
            quit.extend(step(&mut world, FrameInput::default()));
        }
        assert!(quit.contains(&GameEvent::Quit));
        assert_eq!(world.phase, Phase::Finished);
    }

    #[test]
    fn finished_world_ignores_further_input() {
        let mut world = realm_with_queen();
        world.phase = Phase::Finished;
        let before = world.tick;
        assert!(step(&mut world, action_input()).is_empty());
        assert_eq!(world.tick, before);
    }
}
