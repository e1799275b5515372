//! Normalization of context-free grammars into Chomsky normal form and
//! membership queries via the CYK algorithm.

extern crate fnv;
#[macro_use]
extern crate nom;
extern crate serde;
#[macro_use]
extern crate serde_derive;

pub mod grammars;
