/// Level data: the embedded four-map campaign plus external overrides.
///
/// ## Sources (priority order):
///   1. `<maps_dir>/<name>.map` + `<maps_dir>/<name>.evt` file pair
///   2. Built-in embedded data
///
/// ## Grid format (`.map`): one row per line.
///   '.' = Floor    '#' = Wall    '*' = Hazard (deadly)
///
/// ## Event format (`.evt`): one directive per line, `#` starts a comment.
///   TREASURE x,y ITEM NAME
///   DOOR x,y [KEY NAME]              (key defaults to "KEY")
///   MOVE x,y dest_map dx,dy          (teleport on arrival)
///   NPC x,y WANDER|STILL MESSAGE     ('/' splits message lines)
///   ENTRY x,y                        (respawn spot after a hazard death)
///   START x,y                        (hero start; honored on map 0)
///
/// Malformed lines warn on stderr and are skipped; the game never fails
/// to start over bad level data.

use std::path::Path;

use crate::config::GameConfig;
use crate::domain::entity::{Behavior, Character, Direction};
use crate::domain::event::{EventRegistry, MapEvent, GENERIC_KEY};
use crate::domain::grid::TileGrid;
use crate::domain::tile::Tile;
use crate::sim::world::{GameState, MapState};

/// Campaign map names, in id order. Bgm tracks share these names.
pub const MAP_NAMES: [&str; 4] = ["castle", "field", "cave", "village"];

const DEFAULT_ENTRY: (i32, i32) = (6, 6);
const DEFAULT_START: (i32, i32) = (6, 6);

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Build the whole game world: every campaign map plus the hero.
pub fn load_campaign(config: &GameConfig) -> GameState {
    let mut maps = Vec::with_capacity(MAP_NAMES.len());
    let mut start = DEFAULT_START;

    for (id, name) in MAP_NAMES.iter().enumerate() {
        let (grid_text, event_text) = map_source(name, &config.maps_dir);
        let grid = parse_grid(&grid_text);
        let sheet = parse_events(name, &event_text, config.pace.npc_step);
        if id == 0 {
            if let Some(s) = sheet.start {
                start = s;
            }
        }
        maps.push(MapState {
            name: name.to_string(),
            grid,
            events: sheet.events,
            npcs: sheet.npcs,
            bgm: name.to_string(),
            entry: sheet.entry,
        });
    }

    let hero = Character::new(
        start.0,
        start.1,
        Direction::Down,
        Behavior::Player,
        config.pace.hero_step,
    );
    GameState::new(maps, 0, hero, config.pace.wander_chance)
}

/// Grid + event text for a map: the external file pair when both exist,
/// the embedded data otherwise.
fn map_source(name: &str, maps_dir: &Path) -> (String, String) {
    let map_path = maps_dir.join(format!("{name}.map"));
    let evt_path = maps_dir.join(format!("{name}.evt"));
    if map_path.is_file() && evt_path.is_file() {
        match (
            std::fs::read_to_string(&map_path),
            std::fs::read_to_string(&evt_path),
        ) {
            (Ok(m), Ok(e)) => return (m, e),
            _ => {
                eprintln!(
                    "Warning: could not read {} pair, using built-in map",
                    map_path.display()
                );
            }
        }
    } else if map_path.is_file() || evt_path.is_file() {
        eprintln!(
            "Warning: incomplete {name}.map/{name}.evt pair in {}, using built-in map",
            maps_dir.display()
        );
    }
    let (m, e) = embedded(name);
    (m.to_string(), e.to_string())
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

pub fn parse_grid(text: &str) -> TileGrid {
    let tiles = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.chars()
                .map(|ch| match ch {
                    '#' => Tile::Wall,
                    '*' => Tile::Hazard,
                    _ => Tile::Floor,
                })
                .collect()
        })
        .collect();
    TileGrid::new(tiles)
}

/// Everything an event sheet contributes to a map.
pub struct EventSheet {
    pub events: EventRegistry,
    pub npcs: Vec<Character>,
    pub entry: (i32, i32),
    pub start: Option<(i32, i32)>,
}

pub fn parse_events(map_name: &str, text: &str, npc_step: i32) -> EventSheet {
    let mut sheet = EventSheet {
        events: EventRegistry::new(),
        npcs: Vec::new(),
        entry: DEFAULT_ENTRY,
        start: None,
    };

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if parse_directive(line, npc_step, &mut sheet).is_none() {
            eprintln!("Warning: {map_name}.evt line {}: bad directive: {line}", lineno + 1);
        }
    }

    sheet
}

fn parse_directive(line: &str, npc_step: i32, sheet: &mut EventSheet) -> Option<()> {
    let (directive, rest) = line.split_once(char::is_whitespace)?;
    let rest = rest.trim();

    match directive {
        "TREASURE" => {
            let (pos, item) = rest.split_once(char::is_whitespace)?;
            let (x, y) = parse_coord(pos)?;
            let item = item.trim();
            if item.is_empty() {
                return None;
            }
            sheet.events.add(MapEvent::Treasure { x, y, item: item.to_string() });
        }
        "DOOR" => {
            let (pos, key) = match rest.split_once(char::is_whitespace) {
                Some((pos, key)) => (pos, key.trim()),
                None => (rest, GENERIC_KEY),
            };
            let (x, y) = parse_coord(pos)?;
            sheet.events.add(MapEvent::Door { x, y, required_key: key.to_string() });
        }
        "MOVE" => {
            let mut parts = rest.split_whitespace();
            let (x, y) = parse_coord(parts.next()?)?;
            let dest_map: usize = parts.next()?.parse().ok()?;
            let (dest_x, dest_y) = parse_coord(parts.next()?)?;
            sheet.events.add(MapEvent::Warp { x, y, dest_map, dest_x, dest_y });
        }
        "NPC" => {
            let (pos, rest) = rest.split_once(char::is_whitespace)?;
            let (x, y) = parse_coord(pos)?;
            let (kind, message) = match rest.trim().split_once(char::is_whitespace) {
                Some((kind, message)) => (kind, message.trim()),
                None => (rest.trim(), ""),
            };
            let behavior = match kind {
                "WANDER" => Behavior::Wander,
                "STILL" => Behavior::Stationary,
                _ => return None,
            };
            let mut npc = Character::new(x, y, Direction::Down, behavior, npc_step);
            if !message.is_empty() {
                npc = npc.with_dialogue(message);
            }
            sheet.npcs.push(npc);
        }
        "ENTRY" => {
            sheet.entry = parse_coord(rest)?;
        }
        "START" => {
            sheet.start = Some(parse_coord(rest)?);
        }
        _ => return None,
    }
    Some(())
}

fn parse_coord(text: &str) -> Option<(i32, i32)> {
    let (x, y) = text.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

// ══════════════════════════════════════════════════════════════
// Embedded campaign
// ══════════════════════════════════════════════════════════════

fn embedded(name: &str) -> (&'static str, &'static str) {
    match name {
        "castle" => (CASTLE_MAP, CASTLE_EVT),
        "field" => (FIELD_MAP, FIELD_EVT),
        "cave" => (CAVE_MAP, CAVE_EVT),
        _ => (VILLAGE_MAP, VILLAGE_EVT),
    }
}

const CASTLE_MAP: &str = "\
####################
#..................#
#..##..........##..#
#..##..........##..#
#..................#
#..................#
#..................#
#..................#
#..................#
#..##..........##..#
#..##..........##..#
#..................#
#..................#
#..................#
#########.##########
";

const CASTLE_EVT: &str = "\
# castle: the hero's home, gate to the field in the south wall
START 6,6
ENTRY 6,6
MOVE 9,14 1 9,2
TREASURE 17,2 POTION
TREASURE 2,11 HERB
NPC 10,4 WANDER WELCOME TO THE CASTLE/OF AZELHART
NPC 15,11 WANDER THE FIELD GATE IS/SOUTH OF HERE
";

const FIELD_MAP: &str = "\
####################
#########.##########
#..................#
#...#...........#..#
#..................#
#......##..........#
#..................#
#..................#
#....#........#....#
#..................#
#..................#
#...#..........#...#
#..................#
#..................#
####################
";

const FIELD_EVT: &str = "\
# field: hub between castle (north), cave (south west), village (south east)
ENTRY 6,6
MOVE 9,1 0 9,13
MOVE 2,13 2 9,3
MOVE 17,13 3 2,2
TREASURE 16,4 KEY
NPC 6,9 WANDER A CAVE LIES TO THE/SOUTH WEST
NPC 12,5 WANDER THE VILLAGE LIES TO THE/SOUTH EAST
";

const CAVE_MAP: &str = "\
####################
#..................#
#.***......***.....#
#..................#
#..................#
#####.####.#####...#
#...*......*...#...#
#..................#
#.#####.#####..##..#
#.*........*....*..#
#..................#
#######.############
#.....*............#
#..................#
####################
";

const CAVE_EVT: &str = "\
# cave: red crystals are deadly; the locked vault hides the legendary key
ENTRY 9,3
MOVE 9,1 1 2,12
DOOR 7,11 KEY
TREASURE 16,13 LEGENDARY KEY
NPC 3,7 STILL BEWARE THE RED CRYSTALS/ONE TOUCH MEANS DEATH
";

const VILLAGE_MAP: &str = "\
####################
#..................#
#..................#
#..##..##..##..##..#
#..##..##..##..##..#
#..................#
#..................#
#..##..##..##..##..#
#..##..##..##..##..#
#..................#
#..................#
#..................#
#..................#
#..................#
####################
";

const VILLAGE_EVT: &str = "\
# village: the queen holds court here
ENTRY 6,6
MOVE 2,1 1 17,12
NPC 12,10 STILL BRING THE LEGENDARY KEY/TO ME BRAVE HERO/AND SAVE OUR REALM
NPC 5,6 WANDER OUR QUEEN AWAITS/A TRUE HERO
NPC 16,11 WANDER THE LEGENDARY KEY LIES/DEEP IN THE CAVE
";

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn campaign() -> GameState {
        load_campaign(&GameConfig::default())
    }

    #[test]
    fn campaign_loads_four_maps() {
        let world = campaign();
        assert_eq!(world.maps.len(), 4);
        assert_eq!(world.current_map, 0);
        assert_eq!((world.hero.x, world.hero.y), (6, 6));
        for map in &world.maps {
            assert_eq!(map.grid.width(), 20);
            assert_eq!(map.grid.height(), 15);
        }
    }

    #[test]
    fn no_two_events_share_a_tile() {
        let world = campaign();
        for map in &world.maps {
            let mut seen = Vec::new();
            for y in 0..map.grid.height() {
                for x in 0..map.grid.width() {
                    if map.events.event_at(x, y).is_some() {
                        assert!(!seen.contains(&(x, y)), "duplicate event on {}", map.name);
                        seen.push((x, y));
                    }
                }
            }
        }
    }

    #[test]
    fn every_warp_targets_a_real_map_and_a_free_tile() {
        let world = campaign();
        for map in &world.maps {
            for y in 0..map.grid.height() {
                for x in 0..map.grid.width() {
                    if let Some(&MapEvent::Warp { dest_map, dest_x, dest_y, .. }) =
                        map.events.event_at(x, y)
                    {
                        assert!(dest_map < world.maps.len());
                        assert!(
                            !world.maps[dest_map].grid.is_wall(dest_x, dest_y),
                            "warp from {} lands in a wall",
                            map.name
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn spawn_and_entry_tiles_are_safe() {
        let world = campaign();
        for map in &world.maps {
            let (ex, ey) = map.entry;
            assert!(!map.grid.is_wall(ex, ey));
            assert!(!map.grid.tile_at(ex, ey).is_deadly());
        }
        assert!(!world.maps[0].grid.is_wall(world.hero.x, world.hero.y));
    }

    #[test]
    fn queen_is_posted_in_the_village() {
        let world = campaign();
        let village = &world.maps[3];
        let queen = village.npc_at(12, 10).expect("queen missing");
        assert_eq!(queen.behavior, Behavior::Stationary);
        assert!(queen.dialogue.is_some());
    }

    #[test]
    fn cave_respawn_differs_from_the_default() {
        let world = campaign();
        assert_eq!(world.maps[2].entry, (9, 3));
        assert_eq!(world.maps[0].entry, (6, 6));
    }

    #[test]
    fn directive_parsing_covers_every_kind() {
        let sheet = parse_events(
            "test",
            "TREASURE 3,4 RUSTY SWORD\n\
             DOOR 5,6\n\
             DOOR 7,8 LEGENDARY KEY\n\
             MOVE 1,2 3 4,5\n\
             NPC 2,2 STILL HELLO/THERE\n\
             NPC 3,3 WANDER\n\
             ENTRY 9,9\n\
             START 1,1\n",
            4,
        );
        assert_eq!(
            sheet.events.event_at(3, 4),
            Some(&MapEvent::Treasure { x: 3, y: 4, item: "RUSTY SWORD".to_string() })
        );
        assert_eq!(
            sheet.events.event_at(5, 6),
            Some(&MapEvent::Door { x: 5, y: 6, required_key: "KEY".to_string() })
        );
        assert_eq!(
            sheet.events.event_at(7, 8),
            Some(&MapEvent::Door { x: 7, y: 8, required_key: "LEGENDARY KEY".to_string() })
        );
        assert_eq!(
            sheet.events.event_at(1, 2),
            Some(&MapEvent::Warp { x: 1, y: 2, dest_map: 3, dest_x: 4, dest_y: 5 })
        );
        assert_eq!(sheet.npcs.len(), 2);
        assert_eq!(sheet.npcs[0].dialogue.as_deref(), Some("HELLO/THERE"));
        assert_eq!(sheet.npcs[1].dialogue, None);
        assert_eq!(sheet.entry, (9, 9));
        assert_eq!(sheet.start, Some((1, 1)));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let sheet = parse_events(
            "test",
            "TREASURE nonsense\n\
             WIBBLE 1,1\n\
             MOVE 1,2 notanumber 3,4\n\
             TREASURE 2,2 GEM\n",
            4,
        );
        assert_eq!(sheet.events.len(), 1);
        assert!(sheet.events.event_at(2, 2).is_some());
    }

    #[test]
    fn grid_parsing_reads_the_legend() {
        let grid = parse_grid("###\n#*.\n");
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert!(grid.is_wall(0, 0));
        assert!(grid.tile_at(1, 1).is_deadly());
        assert!(!grid.is_wall(2, 1));
    }
}
