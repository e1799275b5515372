use std::error;
use std::fmt;

use fnv::{FnvHashMap, FnvHashSet};

mod cnf;
mod cyk;
mod from_str;
mod simplify;

/// The character that denotes the empty word in the textual rule format.
pub const LAMBDA: char = 'λ';
/// The character that separates a rule head from its alternatives.
pub const ARROW: char = '→';

/// Index of a non-terminal in the grammar's arena. Ids are stable for the
/// lifetime of a `Cfg`, deleted non-terminals leave their slot behind.
pub type NtId = usize;

/// Variable or terminal symbol on the right-hand side of a production.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// A terminal symbol.
    T(char),
    /// A non-terminal symbol, referenced by its arena id.
    N(NtId),
}

/// A pre-classified symbol as handed over by a rule loader. Unlike
/// `Symbol`, it refers to non-terminals by label, so rules may mention
/// non-terminals before they are declared.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum RuleSymbol {
    Terminal(char),
    NonTerminal(String),
}

/// Fatal conditions of the simplification and normalization pipeline.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum CfgError {
    /// A start-symbol replacement was requested with a label that is
    /// already in use.
    DuplicateSymbol(String),
    /// The start symbol cannot derive any finite terminal string.
    DoesNotTerminate(String),
    /// Unit-production removal exceeded its round bound.
    DidNotConverge,
}

impl fmt::Display for CfgError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CfgError::DuplicateSymbol(ref label) => {
                write!(f, "The grammar already contains the symbol \'{}\'", label)
            }
            CfgError::DoesNotTerminate(ref label) => {
                write!(f, "The grammar does not terminate on the start symbol \'{}\'", label)
            }
            CfgError::DidNotConverge => {
                write!(f, "Unit-production removal did not reach a fixed point")
            }
        }
    }
}

impl error::Error for CfgError {}

/// A non-terminal symbol together with the productions it owns. The
/// production list has set semantics, duplicate right-hand sides are
/// suppressed on insertion and insertion order is preserved for display.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct NonTerminal {
    label: String,
    productions: Vec<Vec<Symbol>>,
}

impl NonTerminal {
    fn new(label: &str) -> Self {
        NonTerminal {
            label: String::from(label),
            productions: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn productions(&self) -> &[Vec<Symbol>] {
        &self.productions
    }

    fn add_production(&mut self, rhs: Vec<Symbol>) -> bool {
        if self.productions.contains(&rhs) {
            return false;
        }
        self.productions.push(rhs);
        true
    }

    fn remove_production(&mut self, rhs: &[Symbol]) -> bool {
        match self.productions.iter().position(|p| p.as_slice() == rhs) {
            Some(index) => {
                self.productions.remove(index);
                true
            }
            None => false,
        }
    }
}

/// A context-free grammar over single-character terminals.
///
/// Non-terminals live in an arena and are referenced by stable ids, so the
/// transformation passes never have to rebuild a keyed map while they
/// iterate. An explicit order list drives enumeration and display; it
/// starts with the start symbol after a start replacement.
///
/// ```
/// use chomskify::grammars::cfg::Cfg;
///
/// let mut cfg: Cfg = "S -> aSb | λ".parse().unwrap();
/// cfg.convert_to_cnf("Z").unwrap();
///
/// assert!(cfg.is_cnf());
/// assert!(cfg.recognize("aabb"));
/// assert!(!cfg.recognize("aab"));
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Cfg {
    terminals: Vec<char>,
    terminal_set: FnvHashSet<char>,
    arena: Vec<NonTerminal>,
    by_label: FnvHashMap<String, NtId>,
    order: Vec<NtId>,
    start: NtId,
    derives_epsilon: bool,
}

impl Cfg {
    /// Creates a grammar whose start symbol carries the given label. The
    /// start symbol initially owns no productions.
    pub fn new(start_label: &str) -> Self {
        let mut by_label = FnvHashMap::default();
        by_label.insert(String::from(start_label), 0);
        Cfg {
            terminals: Vec::new(),
            terminal_set: FnvHashSet::default(),
            arena: vec![NonTerminal::new(start_label)],
            by_label,
            order: vec![0],
            start: 0,
            derives_epsilon: false,
        }
    }

    /// Registers a terminal symbol. Idempotent, insertion order preserved.
    pub fn add_terminal(&mut self, symbol: char) {
        if self.terminal_set.insert(symbol) {
            self.terminals.push(symbol);
        }
    }

    /// Registers a non-terminal with the given label and returns its id.
    /// Idempotent, an existing non-terminal is returned unchanged.
    pub fn add_nonterminal(&mut self, label: &str) -> NtId {
        if let Some(&id) = self.by_label.get(label) {
            return id;
        }
        let id = self.arena.len();
        self.arena.push(NonTerminal::new(label));
        self.by_label.insert(String::from(label), id);
        self.order.push(id);
        id
    }

    /// Adds one source rule: a head label and its alternatives. Symbols are
    /// interned on the fly, so rules may reference non-terminals that are
    /// declared by a later rule. An empty alternative is an ε production.
    pub fn load_rule(&mut self, head: &str, alternatives: Vec<Vec<RuleSymbol>>) {
        let owner = self.add_nonterminal(head);
        for alternative in alternatives {
            let mut rhs = Vec::with_capacity(alternative.len());
            for symbol in alternative {
                match symbol {
                    RuleSymbol::Terminal(c) => {
                        self.add_terminal(c);
                        rhs.push(Symbol::T(c));
                    }
                    RuleSymbol::NonTerminal(ref label) => {
                        let id = self.add_nonterminal(label);
                        rhs.push(Symbol::N(id));
                    }
                }
            }
            self.arena[owner].add_production(rhs);
        }
    }

    /// Introduces a fresh start symbol whose sole production is the old
    /// start symbol. The new symbol is ordered first so that displays stay
    /// stable. Fails if the label is already taken.
    pub fn replace_start(&mut self, new_label: &str) -> Result<(), CfgError> {
        if self.by_label.contains_key(new_label) {
            return Err(CfgError::DuplicateSymbol(String::from(new_label)));
        }
        let old_start = self.start;
        let id = self.arena.len();
        self.arena.push(NonTerminal::new(new_label));
        self.by_label.insert(String::from(new_label), id);
        self.order.insert(0, id);
        self.arena[id].add_production(vec![Symbol::N(old_start)]);
        self.start = id;
        Ok(())
    }

    /// Returns the first label that is not in use, scanning `A` to `Z` and
    /// then the unbounded series `N1`, `N2`, … in this order. Allocation is
    /// deterministic, equal grammars yield equal labels.
    pub fn next_unused_label(&self) -> String {
        for c in b'A'..(b'Z' + 1) {
            let label = (c as char).to_string();
            if !self.by_label.contains_key(&label) {
                return label;
            }
        }
        let mut index = 1;
        loop {
            let label = format!("N{}", index);
            if !self.by_label.contains_key(&label) {
                return label;
            }
            index += 1;
        }
    }

    /// The label of the current start symbol.
    pub fn start_label(&self) -> &str {
        &self.arena[self.start].label
    }

    /// Whether the grammar derived the empty word before ε removal ran.
    /// `false` until `simplify` has been called.
    pub fn derives_epsilon(&self) -> bool {
        self.derives_epsilon
    }

    /// The terminal alphabet in insertion order.
    pub fn terminals(&self) -> &[char] {
        &self.terminals
    }

    /// The labels of all live non-terminals in enumeration order.
    pub fn nonterminal_labels(&self) -> Vec<&str> {
        self.order.iter().map(|&id| self.arena[id].label.as_str()).collect()
    }

    /// The productions of the non-terminal with the given label.
    pub fn productions_of(&self, label: &str) -> Option<&[Vec<Symbol>]> {
        self.by_label
            .get(label)
            .map(|&id| self.arena[id].productions.as_slice())
    }

    /// Drops a non-terminal from the enumeration order and the label map
    /// and clears its productions. The arena slot stays behind so that ids
    /// held elsewhere never dangle.
    fn remove_nonterminal(&mut self, id: NtId) {
        let label = self.arena[id].label.clone();
        self.by_label.remove(&label);
        self.order.retain(|&other| other != id);
        self.arena[id].productions.clear();
    }
}

impl fmt::Display for Cfg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &id in &self.order {
            let nonterminal = &self.arena[id];
            let mut alternatives = Vec::with_capacity(nonterminal.productions.len());
            for rhs in &nonterminal.productions {
                if rhs.is_empty() {
                    alternatives.push(LAMBDA.to_string());
                    continue;
                }
                let mut buffer = String::new();
                for symbol in rhs {
                    match *symbol {
                        Symbol::T(c) => buffer.push(c),
                        Symbol::N(n) => buffer.push_str(&self.arena[n].label),
                    }
                }
                alternatives.push(buffer);
            }
            writeln!(f, "{} {} {}", nonterminal.label, ARROW, alternatives.join(" | "))?;
        }
        Ok(())
    }
}
