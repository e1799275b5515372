extern crate chomskify;
#[macro_use]
extern crate clap;

use chomskify::grammars::cfg::Cfg;
use std::fs::File;
use std::io::{stdin, BufRead, Read};
use std::process::exit;

fn read_grammar(path: &str) -> Cfg {
    let mut grammar_file = match File::open(path) {
        Ok(file) => file,
        Err(error) => {
            eprintln!("Could not open \'{}\': {}", path, error);
            exit(1);
        }
    };
    let grammar_string = {
        let mut buffer = String::new();
        if let Err(error) = grammar_file.read_to_string(&mut buffer) {
            eprintln!("Could not read \'{}\': {}", path, error);
            exit(1);
        }
        buffer
    };
    match grammar_string.parse() {
        Ok(cfg) => cfg,
        Err(error) => {
            eprintln!("{}", error);
            exit(1);
        }
    }
}

/// The start-symbol replacement to use for the conversion, either the one
/// requested on the command line or the first label the grammar does not
/// use yet.
fn start_replacement(cfg: &Cfg, requested: Option<&str>) -> String {
    match requested {
        Some(label) => String::from(label),
        None => cfg.next_unused_label(),
    }
}

fn main() {
    let matches = clap_app!(chomskify =>
        (version: "0.1")
        (about: "Normalizes context-free grammars into Chomsky normal form and decides membership with the CYK algorithm")
        (@subcommand simplify =>
            (about: "Remove ε productions, unit productions, and useless symbols from a grammar")
            (@arg GRAMMAR: +required "The file that contains the grammar")
        )
        (@subcommand cnf =>
            (about: "Convert a grammar into Chomsky normal form")
            (@arg GRAMMAR: +required "The file that contains the grammar")
            (@arg start: -s --start +takes_value "the label of the replacement start symbol, if one is needed")
        )
        (@subcommand recognize =>
            (about: "Decide membership of words given via stdin, one word per line")
            (@arg GRAMMAR: +required "The file that contains the grammar")
            (@arg start: -s --start +takes_value "the label of the replacement start symbol, if one is needed")
            (@arg words: -w --withwords "echo each word next to its answer")
        )
    ).get_matches();

    match matches.subcommand() {
        ("simplify", Some(options)) => {
            let mut cfg = read_grammar(options.value_of("GRAMMAR").unwrap());
            print!("% input\n{}", cfg);
            if let Err(error) = cfg.simplify() {
                eprintln!("{}", error);
                exit(1);
            }
            print!("% simplified\n{}", cfg);
            if cfg.derives_epsilon() {
                println!("% the grammar derives the empty word");
            }
        }
        ("cnf", Some(options)) => {
            let mut cfg = read_grammar(options.value_of("GRAMMAR").unwrap());
            let replacement = start_replacement(&cfg, options.value_of("start"));
            let mut simplified = cfg.clone();
            if let Err(error) = simplified.simplify() {
                eprintln!("{}", error);
                exit(1);
            }
            print!("% simplified\n{}", simplified);
            if let Err(error) = cfg.convert_to_cnf(&replacement) {
                eprintln!("{}", error);
                exit(1);
            }
            print!("% chomsky normal form\n{}", cfg);
            if cfg.derives_epsilon() {
                println!("% the grammar derives the empty word");
            }
        }
        ("recognize", Some(options)) => {
            let mut cfg = read_grammar(options.value_of("GRAMMAR").unwrap());
            let replacement = start_replacement(&cfg, options.value_of("start"));
            if let Err(error) = cfg.convert_to_cnf(&replacement) {
                eprintln!("{}", error);
                exit(1);
            }

            let echo_words = options.is_present("words");
            for word in stdin().lock().lines().flatten() {
                let word = word.trim();
                if echo_words {
                    println!("{}: {}", word, cfg.recognize(word));
                } else {
                    println!("{}", cfg.recognize(word));
                }
            }
        }
        _ => unimplemented!(),
    }
}
