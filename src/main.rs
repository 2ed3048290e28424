use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use clap_stdin::FileOrStdin;
use log::{info, LevelFilter};

use minics::{compile, error::CompileError};

/// Translates a MiniC# source file to three-address code and MASM.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Source file, or `-` for stdin
    input: FileOrStdin,

    /// Write the three-address code here
    #[arg(long, value_name = "PATH")]
    tac: Option<PathBuf>,

    /// Write the generated assembly here
    #[arg(long, value_name = "PATH")]
    asm: Option<PathBuf>,

    /// Print the class-level symbol table and the string pool
    #[arg(long)]
    symbols: bool,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

const FATAL_STATUS: u8 = 42;

fn run(args: Args) -> Result<(), CompileError> {
    let filename = match args.input.filename() {
        "-" => "<stdin>".to_string(),
        name => name.to_string(),
    };
    let source = args.input.contents().map_err(std::io::Error::other)?;

    let compilation = compile(&source, &filename)?;
    info!(
        "{}: {} TAC lines, entry {}",
        filename,
        compilation.tac.len(),
        compilation.entry
    );

    if let Some(path) = &args.tac {
        fs::write(path, compilation.tac.to_string())?;
    }
    if let Some(path) = &args.asm {
        fs::write(path, compilation.assembly(&filename))?;
    }
    if args.tac.is_none() && args.asm.is_none() {
        print!("{}", compilation.tac);
    }
    if args.symbols {
        print!("{}", compilation.symbol_report());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(FATAL_STATUS)
        }
    }
}
