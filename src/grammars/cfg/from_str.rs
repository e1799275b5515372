use nom::{is_space, IResult};
use std::str::{from_utf8, FromStr};

use grammars::cfg::{Cfg, RuleSymbol, LAMBDA};

/// Reads a grammar from a line-oriented rule format.
///
/// Every non-empty line holds one rule: a head, an arrow (`→`, `->`, or
/// `=>`), and `|`-separated alternatives. Within an alternative, lowercase
/// letters and digits are terminals, uppercase letters are non-terminals,
/// and `λ` on its own denotes the empty word. `%` starts a comment. The
/// head of the first rule becomes the start symbol.
///
/// ```
/// use chomskify::grammars::cfg::Cfg;
///
/// let cfg: Cfg = "% words over {a, b} with as many a's as b's\n\
///                 S → aSb | λ".parse().unwrap();
///
/// assert_eq!(cfg.start_label(), "S");
/// assert_eq!(cfg.terminals(), &['a', 'b']);
/// ```
impl FromStr for Cfg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rules = Vec::new();
        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('%') {
                continue;
            }
            match parse_rule(line.as_bytes()) {
                IResult::Done(_, rule) => rules.push(rule),
                _ => return Err(format!("Could not parse \'{}\'", line)),
            }
        }

        let start = match rules.first() {
            Some(&(ref head, _)) => head.clone(),
            None => return Err(String::from("The grammar does not contain any rules")),
        };
        if !is_nonterminal_label(&start) {
            return Err(format!("Malformed non-terminal \'{}\'", start));
        }

        let mut cfg = Cfg::new(&start);
        for (head, alternatives) in rules {
            if !is_nonterminal_label(&head) {
                return Err(format!("Malformed non-terminal \'{}\'", head));
            }
            let mut classified = Vec::with_capacity(alternatives.len());
            for alternative in &alternatives {
                classified.push(classify_alternative(alternative)?);
            }
            cfg.load_rule(&head, classified);
        }
        Ok(cfg)
    }
}

/// In the textual format, a non-terminal is a single uppercase letter.
fn is_nonterminal_label(label: &str) -> bool {
    label.len() == 1 && label.chars().all(|c| c.is_ascii_uppercase())
}

/// Classifies the characters of one alternative by case: lowercase letters
/// and digits are terminals, uppercase letters are non-terminals. This
/// convention belongs to the textual format, the grammar model itself only
/// ever sees pre-classified symbols.
fn classify_alternative(alternative: &str) -> Result<Vec<RuleSymbol>, String> {
    if alternative.chars().eq(Some(LAMBDA)) {
        return Ok(Vec::new());
    }
    let mut symbols = Vec::with_capacity(alternative.len());
    for c in alternative.chars() {
        if c.is_ascii_uppercase() {
            symbols.push(RuleSymbol::NonTerminal(c.to_string()));
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            symbols.push(RuleSymbol::Terminal(c));
        } else {
            return Err(format!("Unexpected symbol \'{}\' in \'{}\'", c, alternative));
        }
    }
    Ok(symbols)
}

fn parse_rule(input: &[u8]) -> IResult<&[u8], (String, Vec<String>)> {
    do_parse!(
        input,
        head: map_res!(is_not!(" \t-→="), from_utf8)
            >> take_while!(is_space)
            >> alt!(tag!("→") | tag!("->") | tag!("=>"))
            >> take_while!(is_space)
            >> alternatives:
                many0!(complete!(do_parse!(
                    opt!(tag!("|"))
                        >> take_while!(is_space)
                        >> alternative: map_res!(is_not!(" \t|%"), from_utf8)
                        >> take_while!(is_space)
                        >> (String::from(alternative))
                )))
            >> alt!(eof!() | preceded!(tag!("%"), take_while!(|_| true)))
            >> ((String::from(head), alternatives))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use grammars::cfg::Symbol;

    #[test]
    fn test_parse_rule_legal_input() {
        let legal_inputs = vec![
            "S → aSb | λ",
            "S -> aSb | λ",
            "S => aSb | λ",
            "S->aSb|λ",
            "S → aSb | λ % an end-of-line comment",
            "S → aSb",
            "S →",
        ];

        for legal_input in legal_inputs {
            match parse_rule(legal_input.as_bytes()) {
                IResult::Done(rest, _) => assert_eq!(rest, &b""[..]),
                _ => panic!("Could not parse the legal input \'{}\'", legal_input),
            }
        }
    }

    #[test]
    fn test_parse_rule_splits_alternatives() {
        match parse_rule("S -> aSb | AB | λ".as_bytes()) {
            IResult::Done(_, (head, alternatives)) => {
                assert_eq!(head, "S");
                assert_eq!(
                    alternatives,
                    vec![
                        String::from("aSb"),
                        String::from("AB"),
                        String::from("λ"),
                    ]
                );
            }
            _ => panic!("Could not parse the rule"),
        }
    }

    #[test]
    fn test_parse_rule_illegal_input() {
        let illegal_inputs = vec!["S aSb", "S ~> aSb", "→ aSb"];

        for illegal_input in illegal_inputs {
            match parse_rule(illegal_input.as_bytes()) {
                IResult::Done(_, _) | IResult::Incomplete(_) => {
                    panic!("Was able to parse the illegal input \'{}\'", illegal_input)
                }
                IResult::Error(_) => (),
            }
        }
    }

    #[test]
    fn test_cfg_from_str_legal_input() {
        let grammar_string = "% a comment line\n\
                              S -> AB | λ\n\
                              \n\
                              A -> a\n\
                              B -> b % trailing comment";
        let cfg: Cfg = grammar_string.parse().unwrap();

        assert_eq!(cfg.start_label(), "S");
        assert_eq!(cfg.terminals(), &['a', 'b']);
        assert_eq!(cfg.nonterminal_labels(), vec!["S", "A", "B"]);
        assert_eq!(
            cfg.productions_of("S").unwrap().to_vec(),
            vec![vec![Symbol::N(1), Symbol::N(2)], vec![]]
        );
    }

    #[test]
    fn test_cfg_from_str_forward_references() {
        let cfg: Cfg = "S -> AB\nA -> a\nB -> b".parse().unwrap();

        assert_eq!(cfg.productions_of("A").unwrap().to_vec(), vec![vec![Symbol::T('a')]]);
        assert_eq!(cfg.productions_of("B").unwrap().to_vec(), vec![vec![Symbol::T('b')]]);
    }

    #[test]
    fn test_cfg_from_str_illegal_input() {
        assert_eq!(
            Cfg::from_str(""),
            Err(String::from("The grammar does not contain any rules"))
        );
        assert_eq!(
            Cfg::from_str("SB -> a"),
            Err(String::from("Malformed non-terminal \'SB\'"))
        );
        assert_eq!(
            Cfg::from_str("S -> a?b"),
            Err(String::from("Unexpected symbol \'?\' in \'a?b\'"))
        );
        assert_eq!(
            Cfg::from_str("S aSb"),
            Err(String::from("Could not parse \'S aSb\'"))
        );
    }
}
