//! SDL2 User Interface
//!
//! Presents completed frames in a window. Only built with the `display`
//! feature.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;
use std::time::{Duration, Instant};

use log::info;

use crate::emu::Emulator;
use crate::error::{Error, Result};
use crate::frame::{TARGET_HEIGHT, TARGET_WIDTH};

/// SDL2 UI wrapper
pub struct Ui {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    texture_creator: TextureCreator<WindowContext>,
}

impl Ui {
    /// Create a window `scale` times the output resolution
    pub fn new(scale: u32) -> Result<Self> {
        let sdl_context = sdl2::init().map_err(Error::Display)?;
        let video_subsystem = sdl_context.video().map_err(Error::Display)?;

        let window = video_subsystem
            .window(
                "gblcd",
                TARGET_WIDTH as u32 * scale,
                TARGET_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()
            .map_err(|e| Error::Display(e.to_string()))?;

        let canvas = window
            .into_canvas()
            .software()
            .build()
            .map_err(|e| Error::Display(e.to_string()))?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump().map_err(Error::Display)?;

        Ok(Self {
            canvas,
            event_pump,
            texture_creator,
        })
    }

    /// Present frames until the window closes. A non-zero `frames` stops
    /// emulation after that many frames and keeps the last one on screen.
    pub fn run(&mut self, emulator: &mut Emulator, frames: u32) -> Result<()> {
        let mut texture = self
            .texture_creator
            .create_texture_streaming(
                PixelFormatEnum::ARGB8888,
                TARGET_WIDTH as u32,
                TARGET_HEIGHT as u32,
            )
            .map_err(|e| Error::Display(e.to_string()))?;

        let frame_duration = Duration::from_secs_f64(1.0 / 60.0);
        let mut bytes = vec![0u8; TARGET_WIDTH * TARGET_HEIGHT * 4];
        let mut shown = 0u32;

        'running: loop {
            let frame_start = Instant::now();

            for event in self.event_pump.poll_iter() {
                match event {
                    Event::Quit { .. }
                    | Event::KeyDown {
                        keycode: Some(Keycode::Escape),
                        ..
                    } => break 'running,
                    _ => {}
                }
            }

            if frames == 0 || shown < frames {
                emulator.run_frame();

                for (dst, px) in bytes.chunks_exact_mut(4).zip(emulator.get_video_buffer()) {
                    dst.copy_from_slice(&px.to_ne_bytes());
                }
                texture
                    .update(None, &bytes, TARGET_WIDTH * 4)
                    .map_err(|e| Error::Display(e.to_string()))?;
                shown += 1;
            }

            self.canvas.clear();
            self.canvas.copy(&texture, None, None).map_err(Error::Display)?;
            self.canvas.present();

            // Frame timing
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }
        }

        info!("Presented {} frames", shown);
        Ok(())
    }
}
