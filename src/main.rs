//! cicero-emu: cycle-level simulator of the CICERO regex coprocessor

use std::env;

use anyhow::{bail, Context};
use cicero_emu::config::Config;
use cicero_emu::interpreter::engine::Engine;
use cicero_emu::interpreter::state::Program;
use cicero_emu::testing::BatchSuite;

const USAGE: &str = "\
Usage:
  cicero-emu match <program> <input>... [-w <width>]
  cicero-emu batch [<program_dir> <strings_file>] [-w <width>]
  cicero-emu disasm <program>
  cicero-emu config

Set RUST_LOG=debug (or trace) for per-cycle output.";

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::get();

    // Parse options
    let mut window_width = config.window_width();
    let mut positional = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-w" | "--window" => {
                let value = iter.next().context("-w needs a window width")?;
                window_width = value
                    .parse()
                    .with_context(|| format!("Invalid window width {:?}", value))?;
            }
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            _ => positional.push(arg.as_str()),
        }
    }

    let Some((&command, rest)) = positional.split_first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    match command {
        "match" => run_match(rest, window_width),
        "batch" => run_batch(rest, window_width, config),
        "disasm" => run_disasm(rest),
        "config" => {
            if let Some(path) = Config::user_config_path() {
                println!("# User config: {}", path.display());
            }
            print!("{}", Config::sample_config());
            Ok(())
        }
        other => bail!("Unknown command {:?}\n\n{}", other, USAGE),
    }
}

/// Match each input against one program, one verdict per line.
fn run_match(args: &[&str], window_width: usize) -> anyhow::Result<()> {
    let Some((&path, inputs)) = args.split_first() else {
        bail!("match needs a program file\n\n{}", USAGE);
    };

    let program = Program::from_file(path).with_context(|| format!("Failed to load {}", path))?;
    let mut engine = Engine::new(&program, window_width);

    for input in inputs {
        let outcome = engine.match_input(input.as_bytes());
        println!(
            "{:?}\t{}\t({} cycles)",
            input,
            if outcome.is_match() { "match" } else { "no match" },
            outcome.cycles
        );
    }

    Ok(())
}

/// Run every program in a directory against every line of a strings file.
fn run_batch(args: &[&str], window_width: usize, config: &Config) -> anyhow::Result<()> {
    let (program_dir, strings_file) = match args {
        [] => (config.program_dir(), config.strings_file()),
        [dir, strings] => ((*dir).into(), (*strings).into()),
        _ => bail!("batch takes a program directory and a strings file, or neither\n\n{}", USAGE),
    };

    let mut suite = BatchSuite::discover(&program_dir, &strings_file, window_width)?;
    let summary = suite.run_all();

    for result in suite.results() {
        println!("{}", result);
    }

    eprintln!();
    eprint!("{}", suite.summary_report(&summary));

    Ok(())
}

/// Print the listing of a program file.
fn run_disasm(args: &[&str]) -> anyhow::Result<()> {
    let [path] = args else {
        bail!("disasm needs exactly one program file\n\n{}", USAGE);
    };

    let program = Program::from_file(path).with_context(|| format!("Failed to load {}", path))?;
    println!("Program: {} ({} instructions)", path, program.len());
    println!();
    print!("{}", program.listing());

    Ok(())
}
