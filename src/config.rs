/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub pace: PaceConfig,
    /// Directory holding external `<name>.map` / `<name>.evt` pairs.
    pub maps_dir: PathBuf,
    /// Show map name, grid size, hero tile and bgm track on screen.
    pub debug_overlay: bool,
}

#[derive(Clone, Debug)]
pub struct PaceConfig {
    pub tick_rate_ms: u64,
    /// Pixels of hero transit per tick (a tile is 32 px).
    pub hero_step: i32,
    pub npc_step: i32,
    /// Per-tick chance an idle wandering NPC starts a move.
    pub wander_chance: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            pace: PaceConfig {
                tick_rate_ms: default_tick_rate(),
                hero_step: default_hero_step(),
                npc_step: default_npc_step(),
                wander_chance: default_wander_chance(),
            },
            maps_dir: PathBuf::from(default_maps_dir()),
            debug_overlay: default_debug_overlay(),
        }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    pace: TomlPace,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPace {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_hero_step")]
    hero_step: i32,
    #[serde(default = "default_npc_step")]
    npc_step: i32,
    #[serde(default = "default_wander_chance")]
    wander_chance: f64,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_maps_dir")]
    maps_dir: String,
    #[serde(default = "default_debug_overlay")]
    debug_overlay: bool,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 20 }    // 50 simulation steps per second
fn default_hero_step() -> i32 { 4 }     // 8 ticks per tile
fn default_npc_step() -> i32 { 4 }
fn default_wander_chance() -> f64 { 0.02 }
fn default_maps_dir() -> String { "maps".into() }
fn default_debug_overlay() -> bool { false }

impl Default for TomlPace {
    fn default() -> Self {
        TomlPace {
            tick_rate_ms: default_tick_rate(),
            hero_step: default_hero_step(),
            npc_step: default_npc_step(),
            wander_chance: default_wander_chance(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            maps_dir: default_maps_dir(),
            debug_overlay: default_debug_overlay(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG data home, (4) system data directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        // Resolve the maps directory against the same candidates
        let maps_dir_str = &toml_cfg.general.maps_dir;
        let maps_dir = if PathBuf::from(maps_dir_str).is_absolute() {
            PathBuf::from(maps_dir_str)
        } else {
            search_dirs
                .iter()
                .map(|d| d.join(maps_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(maps_dir_str))
        };

        GameConfig {
            pace: PaceConfig {
                tick_rate_ms: toml_cfg.pace.tick_rate_ms,
                hero_step: toml_cfg.pace.hero_step.max(1),
                npc_step: toml_cfg.pace.npc_step.max(1),
                wander_chance: toml_cfg.pace.wander_chance.clamp(0.0, 1.0),
            },
            maps_dir,
            debug_overlay: toml_cfg.general.debug_overlay,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable (symlinks resolved, so an
    //    installed binary still finds data next to the real file)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/realmwalker)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/realmwalker");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/realmwalker)
    let sys = PathBuf::from("/usr/share/realmwalker");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.pace.tick_rate_ms, 20);
        assert_eq!(cfg.pace.hero_step, 4);
        assert_eq!(cfg.general.maps_dir, "maps");
        assert!(!cfg.general.debug_overlay);
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let cfg: TomlConfig = toml::from_str(
            "[pace]\nwander_chance = 0.5\n\n[general]\ndebug_overlay = true\n",
        )
        .unwrap();
        assert_eq!(cfg.pace.wander_chance, 0.5);
        assert_eq!(cfg.pace.tick_rate_ms, 20);
        assert!(cfg.general.debug_overlay);
        assert_eq!(cfg.general.maps_dir, "maps");
    }
}
