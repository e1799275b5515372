use fnv::FnvHashMap;

use grammars::cfg::{Cfg, CfgError, NtId, Symbol};

/// A right-hand side satisfies CNF iff it is a single terminal or a pair
/// of non-terminals.
fn satisfies_cnf(rhs: &[Symbol]) -> bool {
    match rhs.len() {
        1 => match rhs[0] {
            Symbol::T(_) => true,
            Symbol::N(_) => false,
        },
        2 => match (rhs[0], rhs[1]) {
            (Symbol::N(_), Symbol::N(_)) => true,
            _ => false,
        },
        _ => false,
    }
}

/// The leftmost position at which the two symbols occur next to each other.
fn adjacent_position(rhs: &[Symbol], first: Symbol, second: Symbol) -> Option<usize> {
    (0..rhs.len().saturating_sub(1)).find(|&i| rhs[i] == first && rhs[i + 1] == second)
}

impl Cfg {
    /// Whether every production is a single terminal or a pair of
    /// non-terminals.
    pub fn is_cnf(&self) -> bool {
        self.order
            .iter()
            .all(|&id| self.arena[id].productions().iter().all(|rhs| satisfies_cnf(rhs)))
    }

    /// Rewrites the grammar into Chomsky normal form.
    ///
    /// If the start symbol occurs on any right-hand side, it is first
    /// isolated behind a fresh start symbol with the given label (failing
    /// with `CfgError::DuplicateSymbol` if the label is taken). The grammar
    /// is then simplified, terminals inside longer right-hand sides are
    /// moved behind dedicated non-terminals, and right-hand sides of three
    /// or more symbols are collapsed pairwise.
    ///
    /// Fresh non-terminals are reused aggressively: a non-terminal whose
    /// single production already satisfies CNF stands in for that
    /// right-hand side everywhere. During binarization the pairs (1,2),
    /// (1,3), (2,3) of the first three symbols are probed in this priority
    /// order for an existing stand-in that also occurs contiguously;
    /// otherwise the first two symbols are collapsed.
    pub fn convert_to_cnf(&mut self, start_replacement: &str) -> Result<(), CfgError> {
        let start = self.start;
        let start_in_rhs = self.order.iter().any(|&id| {
            self.arena[id]
                .productions()
                .iter()
                .any(|rhs| rhs.contains(&Symbol::N(start)))
        });
        if start_in_rhs {
            self.replace_start(start_replacement)?;
        }
        self.simplify()?;

        let mut standalones: FnvHashMap<Vec<Symbol>, NtId> = FnvHashMap::default();
        for &id in &self.order {
            let productions = self.arena[id].productions();
            if productions.len() == 1 && satisfies_cnf(&productions[0]) {
                standalones.entry(productions[0].clone()).or_insert(id);
            }
        }

        let worklist: Vec<NtId> = self.order.clone();
        for id in worklist {
            for index in 0..self.arena[id].productions.len() {
                let mut rhs = self.arena[id].productions[index].clone();
                if satisfies_cnf(&rhs) {
                    continue;
                }
                if rhs.len() > 1 {
                    for position in 0..rhs.len() {
                        if let Symbol::T(c) = rhs[position] {
                            let standalone =
                                self.standalone_for(&mut standalones, vec![Symbol::T(c)]);
                            rhs[position] = Symbol::N(standalone);
                        }
                    }
                }
                while rhs.len() >= 3 {
                    let candidates = [(rhs[0], rhs[1]), (rhs[0], rhs[2]), (rhs[1], rhs[2])];
                    let (first, second) = candidates
                        .iter()
                        .cloned()
                        .find(|&(first, second)| {
                            standalones.contains_key(&vec![first, second])
                                && adjacent_position(&rhs, first, second).is_some()
                        })
                        .unwrap_or((rhs[0], rhs[1]));
                    let position = adjacent_position(&rhs, first, second).unwrap_or(0);
                    let standalone =
                        self.standalone_for(&mut standalones, vec![first, second]);
                    rhs[position] = Symbol::N(standalone);
                    rhs.remove(position + 1);
                }
                self.arena[id].productions[index] = rhs;
            }

            // collapsing different right-hand sides onto the same stand-ins
            // can leave equal productions behind
            let mut seen: Vec<Vec<Symbol>> = Vec::new();
            self.arena[id].productions.retain(|rhs| {
                if seen.contains(rhs) {
                    false
                } else {
                    seen.push(rhs.clone());
                    true
                }
            });
        }
        Ok(())
    }

    /// The non-terminal that stands alone for the given right-hand side,
    /// minting one (with a deterministically allocated label) on first use.
    fn standalone_for(
        &mut self,
        standalones: &mut FnvHashMap<Vec<Symbol>, NtId>,
        rhs: Vec<Symbol>,
    ) -> NtId {
        if let Some(&id) = standalones.get(&rhs) {
            return id;
        }
        let label = self.next_unused_label();
        let id = self.add_nonterminal(&label);
        self.arena[id].add_production(rhs.clone());
        standalones.insert(rhs, id);
        id
    }
}
