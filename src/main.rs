use std::fs;
use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow, bail};
use geolang::{Error, Interpreter, LexerConfig, Source};

enum Input {
    File(String),
    Text(String),
    Stdin,
}

struct Options {
    input: Input,
    config: LexerConfig,
}

fn parse_args() -> Result<Options> {
    let mut args = std::env::args().skip(1);
    let mut input = Input::Stdin;
    let mut config = LexerConfig::default();

    while let Some(arg) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| anyhow!("Missing value after {arg}"))
        };
        match arg.as_str() {
            "--file" | "-f" => input = Input::File(value()?),
            "--text" | "-t" => input = Input::Text(value()?),
            "--max-int-length" => {
                let length = value()?;
                config = config.with_max_int_length(
                    length
                        .parse::<usize>()
                        .with_context(|| format!("Invalid length '{length}'"))?,
                );
            }
            "--max-string-length" => {
                let length = value()?;
                config = config.with_max_string_length(
                    length
                        .parse::<usize>()
                        .with_context(|| format!("Invalid length '{length}'"))?,
                );
            }
            _ => bail!("Unknown argument '{arg}'"),
        }
    }

    Ok(Options { input, config })
}

fn report(error: &Error, source: &Source) {
    eprintln!("Error: {}: {error}", error.kind().headline());
    if let Some(position) = error.position() {
        let line = source.read_line(position.line);
        if !line.is_empty() {
            eprintln!("{}", line.trim_end_matches('\n'));
        }
    }
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let options = parse_args()?;

    let source = match options.input {
        Input::File(path) => {
            let text = fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?;
            Source::new(&text)
        }
        Input::Text(text) => Source::new(&text),
        Input::Stdin => Source::from_reader(io::stdin()).context("Reading stdin")?,
    };

    let interpreter = Interpreter::new(source.clone()).with_config(options.config);
    match interpreter.run() {
        Ok(value) => {
            println!("{value}");
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            report(&error, &source);
            Ok(ExitCode::FAILURE)
        }
    }
}
