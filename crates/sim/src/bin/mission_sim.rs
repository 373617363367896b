//! Full-mission host simulator.
//!
//! Runs the real behavior core against the 2-D arena model in lockstep:
//! one physics step, then one executive tick, per simulated millisecond.
//! Phase changes are reported as they happen, with a summary at the end.
//!
//! Usage:
//!   cargo run -p mech_rover_sim --bin mission_sim -- [OPTIONS]
//!
//! Options:
//!   --arena <FILE>      Arena JSON file (default: built-in practice course)
//!   --seed <N>          Sensor noise seed (default: 42)
//!   --ticks <N>         Tick limit (default: 120000, two competition minutes)
//!   --set <NAME=VALUE>  Override a parameter, repeatable
//!   -h, --help          Show this help

use std::env;
use std::process;

use mech_rover_core::executive::Executive;
use mech_rover_core::hsm::Phase;
use mech_rover_core::parameters::{ParamValue, ParameterStore, Tuning};
use mech_rover_sim::{Arena, RoverConfig, SimPlatform};

struct Args {
    arena: Option<String>,
    seed: u64,
    ticks: u64,
    sets: Vec<(String, ParamValue)>,
}

fn parse_args() -> Args {
    let mut args = Args {
        arena: None,
        seed: 42,
        ticks: 120_000,
        sets: Vec::new(),
    };

    let raw: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "--arena" => {
                i += 1;
                args.arena = Some(required_value(&raw, i, "arena").to_string());
            }
            "--seed" => {
                i += 1;
                args.seed = parse_u64_arg(&raw, i, "seed");
            }
            "--ticks" => {
                i += 1;
                args.ticks = parse_u64_arg(&raw, i, "ticks");
            }
            "--set" => {
                i += 1;
                args.sets.push(parse_set(required_value(&raw, i, "set")));
            }
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    args
}

fn required_value<'a>(raw: &'a [String], i: usize, name: &str) -> &'a str {
    raw.get(i).map(String::as_str).unwrap_or_else(|| {
        eprintln!("Error: --{name} requires a value");
        process::exit(1);
    })
}

fn parse_u64_arg(raw: &[String], i: usize, name: &str) -> u64 {
    required_value(raw, i, name).parse().unwrap_or_else(|_| {
        eprintln!("Error: invalid value for --{name}");
        process::exit(1);
    })
}

/// Parse `NAME=VALUE` into a typed parameter override.
///
/// Integers win over floats so `--set TIM_TURN_90=1500` stays an int.
fn parse_set(raw: &str) -> (String, ParamValue) {
    let Some((name, value)) = raw.split_once('=') else {
        eprintln!("Error: --set expects NAME=VALUE, got {raw}");
        process::exit(1);
    };
    let value = if let Ok(n) = value.parse::<i32>() {
        ParamValue::Int(n)
    } else if let Ok(f) = value.parse::<f32>() {
        ParamValue::Float(f)
    } else if let Ok(b) = value.parse::<bool>() {
        ParamValue::Bool(b)
    } else {
        eprintln!("Error: cannot parse value in --set {raw}");
        process::exit(1);
    };
    (name.to_string(), value)
}

fn print_usage() {
    eprintln!(
        "Usage: mission_sim [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --arena <FILE>      Arena JSON file (default: built-in practice course)\n\
         \x20 --seed <N>          Sensor noise seed (default: 42)\n\
         \x20 --ticks <N>         Tick limit (default: 120000)\n\
         \x20 --set <NAME=VALUE>  Override a parameter, repeatable\n\
         \x20 -h, --help          Show this help"
    );
}

fn report(tick: u64, phase: Phase, platform: &SimPlatform) {
    let p = platform.position();
    println!(
        "[{tick:>7}] {:<22} pose ({:.2}, {:.2}) heading {:>4.0} deg",
        phase.as_str(),
        p.x,
        p.y,
        platform.heading().to_degrees()
    );
}

fn main() {
    let args = parse_args();

    let arena = match &args.arena {
        Some(path) => Arena::load(path).unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            process::exit(1);
        }),
        None => Arena::default(),
    };

    let mut store = ParameterStore::new();
    Tuning::register_defaults(&mut store).expect("defaults fit the store");
    for (name, value) in &args.sets {
        if let Err(e) = store.set(name, *value) {
            eprintln!("Error: --set {name}: {e}");
            process::exit(1);
        }
    }
    let tuning = Tuning::from_store(&store);

    let config = RoverConfig {
        seed: args.seed,
        ..RoverConfig::default()
    };
    let mut platform = SimPlatform::new(arena, config, tuning.drive);
    let mut executive = Executive::new(tuning);
    if let Err(e) = executive.init(platform.io()) {
        eprintln!("Error: {e}");
        process::exit(2);
    }

    println!("=== mech_rover mission sim ===");
    if store.is_dirty() {
        println!("Overrides: {} parameter(s) changed", args.sets.len());
    }
    println!("Seed: {}, tick limit: {}", args.seed, args.ticks);
    println!();

    let mut phase = executive.phase();
    let mut loops = 0u32;
    report(0, phase, &platform);

    for tick in 1..=args.ticks {
        platform.step();
        executive.tick(platform.io());

        let now = executive.phase();
        if now != phase {
            // Wrapping back to the search phase means a full collect,
            // deliver, deliver cycle finished.
            if now == Phase::AmmoSearch {
                loops += 1;
            }
            phase = now;
            report(tick, phase, &platform);
        }
    }

    let p = platform.position();
    println!();
    println!(
        "Done: {} ticks, {} full loop(s), final phase {}, pose ({:.2}, {:.2}) heading {:.0} deg",
        args.ticks,
        loops,
        phase.as_str(),
        p.x,
        p.y,
        platform.heading().to_degrees()
    );
}
