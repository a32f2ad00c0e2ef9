//! Game Boy LCD viewer - Entry Point
//!
//! Renders a 64KB address-space dump through the PPU and presents the
//! result in a window (`display` feature) or summarizes it on stdout.

use gblcd::config::Config;
use gblcd::emu::Emulator;
use gblcd::logger::init_logger;
use clap::Parser;
use std::process;

fn main() {
    let config = Config::parse();

    if let Err(e) = init_logger(config.log_level()) {
        eprintln!("Logger unavailable: {}", e);
    }

    if let Err(e) = run(&config) {
        eprintln!("Viewer error: {}", e);
        process::exit(1);
    }
}

fn run(config: &Config) -> gblcd::Result<()> {
    let mut emulator = Emulator::from_dump(&config.dump_path, config.palette.colors())?;

    #[cfg(feature = "display")]
    {
        let mut ui = gblcd::ui::Ui::new(config.scale)?;
        ui.run(&mut emulator, config.frames)?;
    }

    #[cfg(not(feature = "display"))]
    {
        for _ in 0..config.frames.max(1) {
            emulator.run_frame();
        }

        let mut histogram = [0usize; 4];
        for &index in emulator.frame().pixels() {
            histogram[(index & 0x03) as usize] += 1;
        }

        println!("Frames: {}", emulator.current_frame());
        println!("M-cycles: {}", emulator.ctx.ticks);
        println!("VBlank interrupts: {}", emulator.ctx.vblanks);
        println!("LCD STAT interrupts: {}", emulator.ctx.lcd_stats);
        for (index, count) in histogram.iter().enumerate() {
            println!("Color {}: {} pixels", index, count);
        }
    }

    Ok(())
}
