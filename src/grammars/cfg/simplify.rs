use std::collections::VecDeque;

use fnv::FnvHashSet;

use grammars::cfg::{Cfg, CfgError, NtId, Symbol};

impl Cfg {
    /// Removes ε productions, unit productions, and useless symbols, in
    /// this order. Each pass runs to a fixed point before the next begins,
    /// so simplifying an already-simplified grammar changes nothing.
    pub fn simplify(&mut self) -> Result<(), CfgError> {
        self.remove_epsilon_productions();
        self.remove_unit_productions()?;
        self.remove_useless_symbols()
    }

    /// The set of non-terminals that derive the empty word: those with a
    /// literal ε production, closed transitively over productions that
    /// consist solely of known nullables. With `exclude_start`, the start
    /// symbol is never added by the transitive step (it still counts when
    /// it has a literal ε production of its own).
    fn nullable_closure(&self, exclude_start: bool) -> FnvHashSet<NtId> {
        let mut nullables = FnvHashSet::default();
        for &id in &self.order {
            if self.arena[id].productions().iter().any(|rhs| rhs.is_empty()) {
                nullables.insert(id);
            }
        }
        loop {
            let before = nullables.len();
            for &id in &self.order {
                if nullables.contains(&id) || (exclude_start && id == self.start) {
                    continue;
                }
                let derives_empty = self.arena[id].productions().iter().any(|rhs| {
                    !rhs.is_empty()
                        && rhs.iter().all(|symbol| match *symbol {
                            Symbol::T(_) => false,
                            Symbol::N(n) => nullables.contains(&n),
                        })
                });
                if derives_empty {
                    nullables.insert(id);
                }
            }
            if nullables.len() == before {
                return nullables;
            }
        }
    }

    /// Deletes every literal ε production and compensates by adding, for
    /// each occurrence of a nullable symbol in a longer right-hand side, a
    /// sibling production with that one occurrence removed. Latches
    /// `derives_epsilon` beforehand, the only record of ε membership that
    /// survives this pass.
    fn remove_epsilon_productions(&mut self) {
        if self.nullable_closure(false).contains(&self.start) {
            self.derives_epsilon = true;
        }
        let nullables = self.nullable_closure(true);

        for &id in &self.order {
            self.arena[id].productions.retain(|rhs| !rhs.is_empty());
        }

        // newly added siblings are revisited, so cascaded occurrences of
        // the same nullable are handled as well
        for &id in &self.order {
            let mut index = 0;
            while index < self.arena[id].productions.len() {
                let rhs = self.arena[id].productions[index].clone();
                index += 1;
                if rhs.len() < 2 {
                    continue;
                }
                for (position, symbol) in rhs.iter().enumerate() {
                    if let Symbol::N(n) = *symbol {
                        if nullables.contains(&n) {
                            let mut sibling = rhs.clone();
                            sibling.remove(position);
                            self.arena[id].add_production(sibling);
                        }
                    }
                }
            }
        }
    }

    /// Replaces every unit production `A → B` by copies of `B`'s
    /// productions until none remain. Copying can surface new unit
    /// productions, so the set is recomputed per round; the round bound
    /// exceeds the number of distinct ordered non-terminal pairs, so only a
    /// grammar that regrows units forever can hit it.
    fn remove_unit_productions(&mut self) -> Result<(), CfgError> {
        let bound = self.order.len() * self.order.len() + 1;
        let mut rounds = 0;
        loop {
            let mut units = Vec::new();
            for &id in &self.order {
                for rhs in self.arena[id].productions() {
                    if rhs.len() == 1 {
                        if let Symbol::N(target) = rhs[0] {
                            units.push((id, target));
                        }
                    }
                }
            }
            if units.is_empty() {
                return Ok(());
            }
            rounds += 1;
            if rounds > bound {
                return Err(CfgError::DidNotConverge);
            }
            for (owner, target) in units {
                let copied = self.arena[target].productions.clone();
                for rhs in copied {
                    self.arena[owner].add_production(rhs);
                }
                self.arena[owner].remove_production(&[Symbol::N(target)]);
            }
        }
    }

    /// Deletes every non-terminal that cannot derive a finite terminal
    /// string (together with every production mentioning it) and every
    /// non-terminal that is unreachable from the start symbol.
    fn remove_useless_symbols(&mut self) -> Result<(), CfgError> {
        let mut terminating: FnvHashSet<NtId> = FnvHashSet::default();
        loop {
            let before = terminating.len();
            for &id in &self.order {
                if terminating.contains(&id) {
                    continue;
                }
                let terminates = self.arena[id].productions().iter().any(|rhs| {
                    rhs.iter().all(|symbol| match *symbol {
                        Symbol::T(_) => true,
                        Symbol::N(n) => terminating.contains(&n),
                    })
                });
                if terminates {
                    terminating.insert(id);
                }
            }
            if terminating.len() == before {
                break;
            }
        }
        if !terminating.contains(&self.start) {
            return Err(CfgError::DoesNotTerminate(String::from(self.start_label())));
        }
        let dead: Vec<NtId> = self
            .order
            .iter()
            .cloned()
            .filter(|id| !terminating.contains(id))
            .collect();
        for id in dead {
            self.purge_references(id);
            self.remove_nonterminal(id);
        }

        let mut visited = FnvHashSet::default();
        let mut queue = VecDeque::new();
        visited.insert(self.start);
        queue.push_back(self.start);
        while let Some(id) = queue.pop_front() {
            for rhs in self.arena[id].productions() {
                for symbol in rhs {
                    if let Symbol::N(n) = *symbol {
                        if visited.insert(n) {
                            queue.push_back(n);
                        }
                    }
                }
            }
        }
        let unreached: Vec<NtId> = self
            .order
            .iter()
            .cloned()
            .filter(|id| !visited.contains(id))
            .collect();
        for id in unreached {
            self.remove_nonterminal(id);
        }
        Ok(())
    }

    /// Deletes every production anywhere that mentions the given
    /// non-terminal.
    fn purge_references(&mut self, target: NtId) {
        for &id in &self.order {
            self.arena[id]
                .productions
                .retain(|rhs| !rhs.contains(&Symbol::N(target)));
        }
    }
}
