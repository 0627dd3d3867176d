/*!
Molecule types and the `verify` capability used during ingestion.

The graphs never inspect symbols themselves; they hand every incoming
sequence to a [`MolType`] and only continue if it is accepted.
*/

use crate::error::{GraphError, Result};

/// Anything that can decide whether a sequence is valid for a
/// molecule type.
pub trait MolType: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn verify(&self, sequence: &[u8]) -> Result<()>;
}

// loops can be used in const fns, meaning the membership tables are
// built at compile time
const fn symbol_table(symbols: &[u8]) -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < symbols.len() {
        table[symbols[i] as usize] = true;
        i += 1;
    }
    table
}

/// A molecule alphabet backed by a 256-entry lookup table.
#[derive(Clone, Copy)]
pub struct Alphabet {
    name: &'static str,
    table: [bool; 256],
}

impl std::fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Alphabet({})", self.name)
    }
}

impl PartialEq for Alphabet {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.table[..] == other.table[..]
    }
}

/// Nucleotides plus the IUPAC ambiguity codes.
pub const DNA: Alphabet = Alphabet::new("dna", b"ACGTNRYWSKMBDHV");

pub const RNA: Alphabet = Alphabet::new("rna", b"ACGUNRYWSKMBDHV");

/// The twenty amino acids plus `B`, `Z`, `X` and the stop symbol.
pub const PROTEIN: Alphabet =
    Alphabet::new("protein", b"ACDEFGHIKLMNPQRSTVWYBZX*");

impl Alphabet {
    pub const fn new(name: &'static str, symbols: &[u8]) -> Alphabet {
        Alphabet {
            name,
            table: symbol_table(symbols),
        }
    }

    #[inline]
    pub const fn contains(&self, symbol: u8) -> bool {
        self.table[symbol as usize]
    }
}

impl MolType for Alphabet {
    fn name(&self) -> &str {
        self.name
    }

    fn verify(&self, sequence: &[u8]) -> Result<()> {
        match sequence.iter().position(|&b| !self.contains(b)) {
            None => Ok(()),
            Some(position) => Err(GraphError::Alphabet {
                moltype: self.name.to_string(),
                symbol: sequence[position] as char,
                position,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dna_accepts_nucleotides_and_ambiguity_codes() {
        assert!(DNA.verify(b"ACGT").is_ok());
        assert!(DNA.verify(b"ACNNGT").is_ok());
        assert!(DNA.verify(b"").is_ok());
    }

    #[test]
    fn dna_rejects_foreign_symbols() {
        let err = DNA.verify(b"ACGU").unwrap_err();
        assert_eq!(
            err,
            GraphError::Alphabet {
                moltype: "dna".to_string(),
                symbol: 'U',
                position: 3,
            }
        );
        assert!(DNA.verify(b"acgt").is_err());
        assert!(DNA.verify(b"AC-GT").is_err());
    }

    #[test]
    fn rna_and_protein() {
        assert!(RNA.verify(b"ACGU").is_ok());
        assert!(RNA.verify(b"ACGT").is_err());
        assert!(PROTEIN.verify(b"MKWVTFISLL*").is_ok());
        assert!(PROTEIN.verify(b"MKJ").is_err());
    }
}
