mod jsonc;
mod shell;

use std::{
    error::Error,
    io::{self, BufRead, Write},
    path::PathBuf,
    process,
};

use bitlens::{Alignment, DisplayOptions, InputMode, OutputFormat};
use clap::Parser;

use crate::shell::{Shell, Step};

#[derive(Parser)]
#[command(name = "bitlens")]
#[command(version, about = "Render, slice and compare Verilog literals")]
#[command(long_about = "
Verilog literal analyzer.

Literals: 8'hFF, 'b1010_0011, 0x1A, 0b101, 26 (bare digits follow --input).
With COMMANDS, each argument runs as one shell line and the program exits;
without, an interactive prompt reads commands from stdin. Type `help` there.
")]
struct Cli {
    /// JSONC field map replacing the built-in one
    #[arg(short, long, env = "BITLENS_FIELDS")]
    fields: Option<PathBuf>,

    /// How bare digits are read: auto, hex, dec, bin
    #[arg(short, long, default_value = "hex")]
    input: InputMode,

    /// Output format: hex, dec, bin
    #[arg(short, long, default_value = "hex")]
    output: OutputFormat,

    /// Alignment: byte_align, dw_align
    #[arg(short, long, default_value = "byte_align")]
    align: Alignment,

    /// Debug logging
    #[arg(short, long)]
    debug: bool,

    /// Shell commands to run instead of the interactive prompt
    commands: Vec<String>,
}

fn run_batch(shell: &mut Shell, commands: &[String]) -> bool {
    let mut ok = true;
    for command in commands {
        match shell.execute(command) {
            Ok(Step::Print(text)) => println!("{text}"),
            Ok(Step::Quit) => break,
            Err(err) => {
                eprintln!("error: {err}");
                ok = false;
            }
        }
    }
    ok
}

fn run_interactive(shell: &mut Shell) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("Verilog Byte Analyzer");
    println!("{}", shell::help_text());
    println!("{}\n", shell.status());

    let mut line = String::new();
    loop {
        print!("Input or Command: ");
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match shell.execute(&line) {
            Ok(Step::Print(text)) => println!("{text}"),
            Ok(Step::Quit) => {
                println!("Exiting.");
                break;
            }
            Err(err) => println!("error: {err}"),
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.debug {
        let env = env_logger::Env::default().default_filter_or("debug");
        env_logger::Builder::from_env(env).init();
    } else {
        env_logger::init();
    }

    let mut shell = Shell::new(cli.input, DisplayOptions::new(cli.output, cli.align));

    if let Some(path) = &cli.fields {
        if let Err(err) = shell.load_fields(path) {
            eprintln!("error: {}: {err}", path.display());
            process::exit(2);
        }
    }

    if cli.commands.is_empty() {
        run_interactive(&mut shell)?;
    } else if !run_batch(&mut shell, &cli.commands) {
        process::exit(1);
    }

    Ok(())
}
