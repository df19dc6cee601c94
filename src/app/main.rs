use std::{env, path::Path, thread, time::Instant};

mod constants;
mod drawing;
mod emulator;
mod input;
mod sdl_setup;

use emulator::Emulator;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let positional: Vec<&String> = args.iter().skip(1).filter(|a| !a.starts_with("--")).collect();
    let headless = args.iter().any(|a| a == "--headless");

    let Some(rom_path) = positional.first() else {
        eprintln!("Usage: {} <rom_path> [--headless]", args[0]);
        std::process::exit(1);
    };
    let rom_path = Path::new(rom_path.as_str());

    let mut emulator = match Emulator::new(rom_path) {
        Ok(emulator) => emulator,
        Err(e) => {
            eprintln!("Failed to load ROM: {e}");
            std::process::exit(1);
        }
    };

    if headless {
        run_headless(&mut emulator);
    } else if let Err(e) = run_windowed(&mut emulator, rom_path) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run_headless(emulator: &mut Emulator) {
    loop {
        emulator.run_frame();
    }
}

fn run_windowed(emulator: &mut Emulator, rom_path: &Path) -> Result<(), String> {
    let rom_filename = rom_path.file_name().unwrap_or_default().to_string_lossy();
    let window_title = format!("boba - {rom_filename}");
    let mut sdl_context = sdl_setup::init_sdl(&window_title)?;

    'main_loop: loop {
        let frame_start = Instant::now();

        if input::handle_input(&mut sdl_context.event_pump, &mut emulator.gb) {
            break 'main_loop;
        }

        emulator.run_frame();
        drawing::draw_frame(&mut sdl_context.canvas, emulator.gb.ppu.ly());

        let elapsed = frame_start.elapsed();
        if elapsed < constants::TARGET_FRAME_DURATION {
            thread::sleep(constants::TARGET_FRAME_DURATION - elapsed);
        }
    }

    Ok(())
}
