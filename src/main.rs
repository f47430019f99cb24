//! ambler CLI — headless generative engine driver.
//!
//! Usage:
//!   ambler [bars] [--tempo BPM] [--root 0-11] [--mode 0-6]
//!          [--preset N] [--seed N] [--arp]
//!
//! Runs the decision core for the requested number of bars and prints the
//! note log bar by bar.

use amb_engine::{ControlId, Engine, ExternalInputs};
use amb_theory::{note_name, Mode, Part};
use std::env;

struct Options {
    bars: u32,
    tempo: f32,
    root: u8,
    mode: i32,
    preset: usize,
    seed: u64,
    arp: bool,
}

fn parse_args() -> Options {
    let args: Vec<String> = env::args().collect();
    let mut opts = Options {
        bars: 8,
        tempo: 120.0,
        root: 0,
        mode: 1,
        preset: 0,
        seed: 42,
        arp: false,
    };

    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        let take_value = |name: &str| -> String {
            args.get(i + 1).cloned().unwrap_or_else(|| {
                eprintln!("missing value for {}", name);
                std::process::exit(1);
            })
        };
        match arg {
            "--tempo" => {
                opts.tempo = take_value("--tempo").parse().unwrap_or(120.0);
                i += 2;
            }
            "--root" => {
                opts.root = take_value("--root").parse().unwrap_or(0);
                i += 2;
            }
            "--mode" => {
                opts.mode = take_value("--mode").parse().unwrap_or(1);
                i += 2;
            }
            "--preset" => {
                opts.preset = take_value("--preset").parse().unwrap_or(0);
                i += 2;
            }
            "--seed" => {
                opts.seed = take_value("--seed").parse().unwrap_or(42);
                i += 2;
            }
            "--arp" => {
                opts.arp = true;
                i += 1;
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: ambler [bars] [--tempo BPM] [--root 0-11] [--mode 0-6] \
                     [--preset N] [--seed N] [--arp]"
                );
                std::process::exit(0);
            }
            other => {
                opts.bars = other.parse().unwrap_or_else(|_| {
                    eprintln!("unrecognized argument: {}", other);
                    std::process::exit(1);
                });
                i += 1;
            }
        }
    }
    opts
}

fn part_label(part: Part) -> &'static str {
    match part {
        Part::Chord => "chord",
        Part::Melody => "melody",
        Part::Arp => "arp",
        Part::Bass => "bass",
        Part::External => "ext",
    }
}

fn main() {
    env_logger::init();
    let opts = parse_args();

    const SAMPLE_RATE: f32 = 48_000.0;
    let mut engine = Engine::new(SAMPLE_RATE, opts.seed);
    engine.set_root_key(opts.root);
    engine.set_mode(Mode::from_index(opts.mode));
    engine.set_preset(opts.preset);
    engine.transport.tempo = opts.tempo.clamp(10.0, 300.0);
    if opts.arp {
        amb_engine::apply_control(&mut engine, ControlId::ArpEnable, 1.0);
    }

    log::info!(
        "engine ready: sample_rate={} preset={} seed={}",
        SAMPLE_RATE,
        opts.preset,
        opts.seed
    );

    let mode = engine.mode();
    println!(
        "ambler: {} bars of {} {} at {:.0} BPM (preset {}, seed {})",
        opts.bars,
        note_name(opts.root as i16),
        mode.name(),
        engine.transport.tempo,
        opts.preset,
        opts.seed
    );
    println!();

    let inputs = ExternalInputs::default();
    let mut printed_bars = 0u32;
    // Generous cap so a stalled clock cannot spin forever.
    let max_samples = (SAMPLE_RATE as u64) * 4 * (opts.bars as u64 + 2);
    let mut samples: u64 = 0;

    while printed_bars < opts.bars && samples < max_samples {
        engine.process(&inputs);
        samples += 1;

        if engine.transport.bar_count() > printed_bars {
            // The bar just closed; its log is intact until the next downbeat.
            println!("bar {:>3}", printed_bars + 1);
            for entry in engine.note_log().as_slice() {
                println!(
                    "  {:>6}  {:<3} ({:>3})  tick {:>2}  1/{}",
                    part_label(entry.part),
                    note_name(entry.note),
                    entry.note,
                    entry.tick_in_bar,
                    entry.length_divisor
                );
            }
            printed_bars = engine.transport.bar_count();
        }
    }

    println!();
    println!("done: {} bars, {} samples", printed_bars, samples);
}
