/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::entity::{Direction, FrameInput};
use sim::event::GameEvent;
use sim::level;
use sim::step;
use sim::world::{GameState, Phase};
use ui::gamepad::Gamepad;
use ui::input::Keyboard;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

/// Minimum sleep when a tick overruns its period, so the host terminal
/// is never starved.
const OVERRUN_FLOOR: Duration = Duration::from_millis(5);

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_ACTION: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Enter, KeyCode::Char('z')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

fn main() {
    let config = GameConfig::load();
    let mut world = level::load_campaign(&config);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut sound = SoundEngine::new();
    if let Some(s) = sound.as_mut() {
        s.play_music(&world.map().bgm);
    }

    let result = game_loop(&mut world, &mut renderer, &mut sound, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    if world.phase == Phase::Finished {
        println!("WINNER! The realm is saved.");
    }
    println!("Thanks for playing Realm Walker!");
}

fn game_loop(
    world: &mut GameState,
    renderer: &mut Renderer,
    sound: &mut Option<SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = Keyboard::new();
    let mut gp = Gamepad::new();
    let period = Duration::from_millis(config.pace.tick_rate_ms);

    loop {
        let tick_start = Instant::now();

        kb.drain();
        gp.update();

        if kb.ctrl_c() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            break;
        }

        let input = FrameInput {
            movement: detect_movement(&kb, &gp),
            action: kb.any_pressed(KEYS_ACTION) || gp.action_pressed(),
        };

        let events = step::step(world, input);
        process_sound_events(sound, &events, world);

        renderer.render(world, config.debug_overlay)?;

        if events.contains(&GameEvent::Quit) {
            break;
        }

        // One tick per loop iteration, no catch-up: an overrunning tick
        // just pushes the next one back by the floor delay.
        let sleep = period
            .checked_sub(tick_start.elapsed())
            .filter(|d| !d.is_zero())
            .unwrap_or(OVERRUN_FLOOR);
        std::thread::sleep(sleep);
    }

    Ok(())
}

fn detect_movement(kb: &Keyboard, gp: &Gamepad) -> Option<Direction> {
    if kb.any_held(KEYS_LEFT) || gp.left_held() {
        Some(Direction::Left)
    } else if kb.any_held(KEYS_RIGHT) || gp.right_held() {
        Some(Direction::Right)
    } else if kb.any_held(KEYS_UP) || gp.up_held() {
        Some(Direction::Up)
    } else if kb.any_held(KEYS_DOWN) || gp.down_held() {
        Some(Direction::Down)
    } else {
        None
    }
}

fn process_sound_events(sound: &mut Option<SoundEngine>, events: &[GameEvent], world: &GameState) {
    let Some(sfx) = sound.as_mut() else {
        return;
    };
    for event in events {
        match event {
            GameEvent::TreasureFound { .. } => sfx.play_treasure(),
            GameEvent::DoorOpened => sfx.play_door(),
            GameEvent::HeroDied => sfx.play_die(),
            GameEvent::GameWon => sfx.play_fanfare(),
            GameEvent::MapEntered { map } => {
                sfx.play_step();
                sfx.play_music(&world.maps[*map].bgm);
            }
            GameEvent::DoorLocked | GameEvent::Dialogue | GameEvent::Quit => {}
        }
    }
}
