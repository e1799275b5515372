use fnv::FnvHashMap;

use grammars::cfg::{Cfg, NtId, Symbol};

impl Cfg {
    /// Decides membership of `input` in the grammar's language with the
    /// CYK algorithm. The grammar must be in Chomsky normal form; calls
    /// are read-only, so queries may run concurrently.
    ///
    /// The empty input is answered from the ε membership latched before
    /// simplification, since a CNF grammar cannot derive the empty word
    /// itself. Characters outside the terminal alphabet mark no table
    /// cell, so such inputs are rejected rather than reported as an error.
    ///
    /// Runs in O(n³ · |productions|) time and O(n² · |non-terminals|)
    /// space for an input of length n.
    pub fn recognize(&self, input: &str) -> bool {
        let word: Vec<char> = input.chars().collect();
        if word.is_empty() {
            return self.derives_epsilon;
        }
        let n = word.len();

        let dense: FnvHashMap<NtId, usize> = self
            .order
            .iter()
            .enumerate()
            .map(|(index, &id)| (id, index))
            .collect();
        let nonterminal_count = self.order.len();

        let mut terminal_productions: Vec<(usize, char)> = Vec::new();
        let mut binary_productions: Vec<(usize, usize, usize)> = Vec::new();
        for &id in &self.order {
            let head = dense[&id];
            for rhs in self.arena[id].productions() {
                match (rhs.len(), rhs.get(0), rhs.get(1)) {
                    (1, Some(&Symbol::T(c)), _) => terminal_productions.push((head, c)),
                    (2, Some(&Symbol::N(left)), Some(&Symbol::N(right))) => {
                        binary_productions.push((head, dense[&left], dense[&right]))
                    }
                    _ => (),
                }
            }
        }

        // table[length - 1][offset][nonterminal]
        let mut table = vec![vec![vec![false; nonterminal_count]; n]; n];
        for offset in 0..n {
            for &(head, c) in &terminal_productions {
                if word[offset] == c {
                    table[0][offset][head] = true;
                }
            }
        }
        for length in 2..(n + 1) {
            for offset in 0..(n - length + 1) {
                for split in 1..length {
                    for &(head, left, right) in &binary_productions {
                        if table[split - 1][offset][left]
                            && table[length - split - 1][offset + split][right]
                        {
                            table[length - 1][offset][head] = true;
                        }
                    }
                }
            }
        }
        table[n - 1][0][dense[&self.start]]
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};

    use grammars::cfg::{Cfg, Symbol};

    #[test]
    fn test_recognize_matching_pairs() {
        let mut cfg: Cfg = "S -> aSb | λ".parse().unwrap();
        cfg.convert_to_cnf("Z").unwrap();

        assert!(cfg.recognize(""));
        assert!(cfg.recognize("ab"));
        assert!(cfg.recognize("aabb"));
        assert!(!cfg.recognize("aab"));
        assert!(!cfg.recognize("ba"));
    }

    #[test]
    fn test_recognize_concatenation() {
        let mut cfg: Cfg = "S -> AB\nA -> a\nB -> b".parse().unwrap();
        cfg.convert_to_cnf("Z").unwrap();

        assert!(cfg.recognize("ab"));
        assert!(!cfg.recognize(""));
        assert!(!cfg.recognize("ba"));
        assert!(!cfg.recognize("abab"));
    }

    #[test]
    fn test_recognize_out_of_alphabet_input() {
        let mut cfg: Cfg = "S -> aSb | λ".parse().unwrap();
        cfg.convert_to_cnf("Z").unwrap();

        assert!(!cfg.recognize("axb"));
        assert!(!cfg.recognize("→"));
    }

    /// All words the grammar derives with at most `max_len` terminals,
    /// found by exhaustively expanding sentential forms. Only usable for
    /// tiny grammars, which is all the comparison below needs.
    fn bounded_language(cfg: &Cfg, max_len: usize) -> BTreeSet<String> {
        let mut language = BTreeSet::new();
        let mut seen: HashSet<Vec<Symbol>> = HashSet::new();
        let mut queue = vec![vec![Symbol::N(cfg.start)]];
        while let Some(form) = queue.pop() {
            let position = form.iter().position(|symbol| match *symbol {
                Symbol::N(_) => true,
                Symbol::T(_) => false,
            });
            let position = match position {
                None => {
                    let word: String = form
                        .iter()
                        .map(|symbol| match *symbol {
                            Symbol::T(c) => c,
                            Symbol::N(_) => unreachable!(),
                        })
                        .collect();
                    if word.len() <= max_len {
                        language.insert(word);
                    }
                    continue;
                }
                Some(position) => position,
            };
            let id = match form[position] {
                Symbol::N(id) => id,
                Symbol::T(_) => unreachable!(),
            };
            for rhs in cfg.arena[id].productions() {
                let mut next = Vec::with_capacity(form.len() + rhs.len());
                next.extend_from_slice(&form[..position]);
                next.extend_from_slice(rhs);
                next.extend_from_slice(&form[position + 1..]);
                let terminal_count = next
                    .iter()
                    .filter(|symbol| match **symbol {
                        Symbol::T(_) => true,
                        Symbol::N(_) => false,
                    })
                    .count();
                if terminal_count > max_len || next.len() > max_len + 2 {
                    continue;
                }
                if seen.insert(next.clone()) {
                    queue.push(next);
                }
            }
        }
        language
    }

    fn words_over(alphabet: &[char], max_len: usize) -> Vec<String> {
        let mut words = vec![String::new()];
        let mut last = vec![String::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for word in &last {
                for &c in alphabet {
                    let mut longer = word.clone();
                    longer.push(c);
                    next.push(longer);
                }
            }
            words.extend(next.iter().cloned());
            last = next;
        }
        words
    }

    #[test]
    fn test_conversion_preserves_the_language() {
        let grammar_strings = vec![
            "S -> aSb | λ",
            "S -> AB | BA\nA -> a\nB -> b",
            "S -> SS | ab",
            "S -> aS | b",
            "S -> aAb\nA -> aA | λ",
            "S -> AA | a\nA -> aA | λ",
        ];

        for grammar_string in grammar_strings {
            let original: Cfg = grammar_string.parse().unwrap();
            let mut cnf = original.clone();
            cnf.convert_to_cnf("Z").unwrap();
            assert!(cnf.is_cnf());

            let language = bounded_language(&original, 4);
            for word in words_over(&['a', 'b'], 4) {
                assert_eq!(
                    language.contains(&word),
                    cnf.recognize(&word),
                    "membership of \'{}\' diverged for the grammar \'{}\'",
                    word,
                    grammar_string
                );
            }
        }
    }
}
