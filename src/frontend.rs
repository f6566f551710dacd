use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use log::debug;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::Color;
use sdl2::rect::Rect;

use chip8::Interpreter;

use crate::{run_frame, Cli};

// ~60 fps
const FRAME_DURATION: Duration = Duration::from_micros(16_667);

const TITLE: &str = "Chip-8 - ESC to exit";

/// Conventional layout: the left 4x4 block of a QWERTY keyboard mirrors the hex pad
/// 1 2 3 C / 4 5 6 D / 7 8 9 E / A 0 B F.
fn keymap(keycode: Keycode) -> Option<u8> {
    let key = match keycode {
        Keycode::Num1 => 0x1,
        Keycode::Num2 => 0x2,
        Keycode::Num3 => 0x3,
        Keycode::Num4 => 0xC,
        Keycode::Q => 0x4,
        Keycode::W => 0x5,
        Keycode::E => 0x6,
        Keycode::R => 0xD,
        Keycode::A => 0x7,
        Keycode::S => 0x8,
        Keycode::D => 0x9,
        Keycode::F => 0xE,
        Keycode::Z => 0xA,
        Keycode::X => 0x0,
        Keycode::C => 0xB,
        Keycode::V => 0xF,
        _ => return None,
    };

    Some(key)
}

pub fn run(interpreter: &mut Interpreter, cli: &Cli) -> Result<()> {
    let sdl = sdl2::init().map_err(|e| anyhow!(e))?;
    let video = sdl.video().map_err(|e| anyhow!(e))?;

    let width = interpreter.display().width() as u32;
    let height = interpreter.display().height() as u32;
    let scale = cli.scale.max(1);

    let window = video
        .window(TITLE, width * scale, height * scale)
        .position_centered()
        .build()?;
    let mut canvas = window.into_canvas().build()?;
    let mut events = sdl.event_pump().map_err(|e| anyhow!(e))?;

    let mut beeping = false;

    'running: loop {
        let frame_start = Instant::now();

        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::KeyDown {
                    keycode: Some(keycode), ..
                } => {
                    if let Some(key) = keymap(keycode) {
                        interpreter.keyboard_mut().press_key(key);
                    }
                }
                Event::KeyUp {
                    keycode: Some(keycode), ..
                } => {
                    if let Some(key) = keymap(keycode) {
                        interpreter.keyboard_mut().release_key(key);
                    }
                }
                _ => {}
            }
        }

        let sound = run_frame(interpreter, cli.cycles_per_frame)?;

        // No audio device is opened, the title doubles as the buzzer
        if sound != beeping {
            beeping = sound;
            let title = if beeping { format!("{} [BEEP]", TITLE) } else { TITLE.to_string() };
            canvas.window_mut().set_title(&title)?;
        }

        canvas.set_draw_color(Color::BLACK);
        canvas.clear();
        canvas.set_draw_color(Color::WHITE);

        let display = interpreter.display();
        for (idx, _) in display.pixels().iter().enumerate().filter(|(_, p)| **p) {
            let x = (idx as u32 % width) * scale;
            let y = (idx as u32 / width) * scale;
            canvas
                .fill_rect(Rect::new(x as i32, y as i32, scale, scale))
                .map_err(|e| anyhow!(e))?;
        }

        canvas.present();

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        } else {
            debug!("Frame took {:?}", elapsed);
        }
    }

    Ok(())
}
