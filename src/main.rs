// rbparse: parse a script and dump its syntax tree

use std::fs;
use std::path::Path;

use tracing::Level;

use rbparse::parser::grammar::Grammar;
use rbparse::parser::{parse_source, ParseOptions, ParseTable, RadixDetection};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("rbparse");

    let mut options = ParseOptions::default();
    let mut verbose = false;
    let mut input = None;
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--prefix-radix" => {
                options = options.with_radix_detection(RadixDetection::Prefix);
            }
            "-v" | "--verbose" => verbose = true,
            _ if input.is_none() => input = Some(arg.as_str()),
            _ => {
                eprintln!("Error: Unexpected argument '{}'", arg);
                print_usage(program_name);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let Some(input) = input else {
        eprintln!("Error: No input file provided");
        eprintln!();
        print_usage(program_name);
        std::process::exit(1);
    };

    if !Path::new(input).exists() {
        eprintln!("Error: File '{}' not found", input);
        print_usage(program_name);
        std::process::exit(1);
    }

    let source = fs::read_to_string(input)?;

    // Built once; any number of parsers could share it from here on.
    let table = ParseTable::build(&Grammar::ruby_subset())?;

    let main = match parse_source(&table, &source, options) {
        Ok(main) => main,
        Err(e) => {
            eprintln!("Parser error: {}", e);
            std::process::exit(1);
        }
    };

    println!("{:#?}", main);
    println!();
    println!("{}", main);

    Ok(())
}

fn print_usage(program_name: &str) {
    eprintln!("Usage: {} [--prefix-radix] [-v] <file>", program_name);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --prefix-radix   Only a leading 0x/0o/0b selects a number's radix");
    eprintln!("  -v, --verbose    Log table construction and parse progress");
}
