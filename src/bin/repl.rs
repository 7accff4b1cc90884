//! Reads one expression per line as `<expression>\t<JSON tokens>`, or just the JSON
//! tokens, and prints the rolled result and its breakdown.

use stack_dice::{DisplayOptions, Lexeme, NumberFormat, RollError};
use std::io::{self, BufRead, Write};

fn run(line: &str, options: &DisplayOptions) -> Result<(), RollError> {
    let (original, json) = match line.split_once('\t') {
        Some((original, json)) => (Some(original), json),
        None => (None, line),
    };
    let lexemes = Lexeme::parse_all(json)?;
    let original = match original {
        Some(original) => original.to_string(),
        None => lexemes
            .iter()
            .map(|l| l.original.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    };

    let r = stack_dice::eval(&original, lexemes, rand::thread_rng())?;
    for notice in r.notices() {
        eprintln!("Warning: {}", notice);
    }
    if let Some(text) = r.display_text(options) {
        println!("{}", text);
    }
    println!("{}", r.tooltip());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let options = DisplayOptions {
        number_format: std::env::var("DICE_LOCALE")
            .map(|tag| NumberFormat::for_locale(&tag))
            .unwrap_or_default(),
        display_results_inline: true,
    };

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    print!("> ");
    io::stdout().flush()?;
    while let Some(Ok(line)) = lines.next() {
        if !line.trim().is_empty() {
            if let Err(why) = run(&line, &options) {
                eprintln!("Error: {}", why);
            }
        }
        print!("> ");
        io::stdout().flush()?;
    }
    Ok(())
}
