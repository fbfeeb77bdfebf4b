use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

use crate::core::element::{aromatic_valence, can_be_aromatic, element_by_symbol, organic_valences};
use crate::core::molecule::{Atom, Bond, BondOrder, Molecule};
use crate::utils::validation::MAX_STRUCTURE_LENGTH;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmilesError {
    #[error("Empty structure string")]
    Empty,

    #[error("Structure string too long: {0} characters exceeds maximum of {MAX_STRUCTURE_LENGTH}")]
    TooLong(usize),

    #[error("Unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("Unknown element '{0}'")]
    UnknownElement(String),

    #[error("Element '{0}' cannot be aromatic")]
    InvalidAromatic(String),

    #[error("Unterminated bracket atom starting at position {0}")]
    UnterminatedBracket(usize),

    #[error("Unbalanced parentheses")]
    UnbalancedBranch,

    #[error("Unclosed ring bond(s): {0:?}")]
    UnclosedRing(Vec<u16>),

    #[error("Invalid ring closure {0}")]
    InvalidRingClosure(u16),

    #[error("Bond at position {0} is not followed by an atom")]
    DanglingBond(usize),

    #[error("Atom {0} is marked aromatic but is not in a ring")]
    NonRingAromatic(usize),

    #[error("Aromatic system at atom {0} cannot be kekulized")]
    Kekulize(usize),

    #[error("Atom {atom} has valence {valence}, more than its element allows")]
    Valence { atom: usize, valence: usize },
}

/// Parse a SMILES string into a [`Molecule`].
///
/// # Errors
///
/// Returns a [`SmilesError`] describing the first problem found. Nothing in the
/// input is repaired or guessed at.
pub fn parse_smiles(smiles: &str) -> Result<Molecule, SmilesError> {
    let smiles = smiles.trim();
    if smiles.is_empty() {
        return Err(SmilesError::Empty);
    }
    if smiles.len() > MAX_STRUCTURE_LENGTH {
        return Err(SmilesError::TooLong(smiles.len()));
    }

    let mut parser = SmilesParser::new(smiles);
    parser.parse()?;
    parser.finish()
}

/// Parse a structure string, reporting failure as `None`.
///
/// This is the entry point used by the matching engine: a bad structure never
/// aborts a run, it is logged and the caller skips the record.
#[must_use]
pub fn parse_structure(structure: &str) -> Option<Molecule> {
    match parse_smiles(structure) {
        Ok(mol) => Some(mol),
        Err(e) => {
            warn!("Could not parse structure '{}': {}", preview(structure), e);
            None
        }
    }
}

/// Shorten a structure string for log output
fn preview(structure: &str) -> String {
    const MAX_PREVIEW: usize = 80;
    if structure.chars().count() <= MAX_PREVIEW {
        structure.to_string()
    } else {
        let head: String = structure.chars().take(MAX_PREVIEW).collect();
        format!("{head}...")
    }
}

struct SmilesParser<'a> {
    text: &'a str,
    input: &'a [u8],
    pos: usize,
    atoms: Vec<Atom>,
    /// bracket[atom] is true for atoms written in brackets (hydrogens are explicit)
    bracket: Vec<bool>,
    bonds: Vec<Bond>,
    /// ring number -> (atom, bond order written at the opening digit)
    open_rings: BTreeMap<u16, (usize, Option<BondOrder>)>,
    /// atoms to return to when a branch closes
    branches: Vec<usize>,
    prev: Option<usize>,
    /// bond symbol waiting for its second atom, with its position
    pending: Option<(BondOrder, usize)>,
}

impl<'a> SmilesParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            input: text.as_bytes(),
            pos: 0,
            atoms: Vec::new(),
            bracket: Vec::new(),
            bonds: Vec::new(),
            open_rings: BTreeMap::new(),
            branches: Vec::new(),
            prev: None,
            pending: None,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn unexpected(&self, pos: usize) -> SmilesError {
        let ch = self.text[pos..].chars().next().unwrap_or('?');
        SmilesError::UnexpectedChar { ch, pos }
    }

    fn parse(&mut self) -> Result<(), SmilesError> {
        while let Some(ch) = self.peek() {
            let start = self.pos;
            match ch {
                b'(' => {
                    let prev = self.prev.ok_or_else(|| self.unexpected(start))?;
                    if self.pending.is_some() {
                        return Err(self.unexpected(start));
                    }
                    self.advance();
                    self.branches.push(prev);
                }
                b')' => {
                    if let Some((_, at)) = self.pending {
                        return Err(SmilesError::DanglingBond(at));
                    }
                    self.advance();
                    self.prev = Some(self.branches.pop().ok_or(SmilesError::UnbalancedBranch)?);
                }
                b'-' | b'=' | b'#' | b':' | b'/' | b'\\' => {
                    if self.prev.is_none() || self.pending.is_some() {
                        return Err(self.unexpected(start));
                    }
                    self.advance();
                    let order = match ch {
                        b'=' => BondOrder::Double,
                        b'#' => BondOrder::Triple,
                        b':' => BondOrder::Aromatic,
                        // '/' and '\' only carry double-bond geometry
                        _ => BondOrder::Single,
                    };
                    self.pending = Some((order, start));
                }
                b'%' => {
                    self.advance();
                    let ring = self.parse_two_digit_ring(start)?;
                    self.ring_closure(ring, start)?;
                }
                b'0'..=b'9' => {
                    self.advance();
                    self.ring_closure(u16::from(ch - b'0'), start)?;
                }
                b'[' => self.parse_bracket_atom()?,
                b'*' => {
                    self.advance();
                    self.add_atom(Atom::new(0), false);
                }
                b'.' => {
                    if self.prev.is_none() {
                        return Err(self.unexpected(start));
                    }
                    if let Some((_, at)) = self.pending {
                        return Err(SmilesError::DanglingBond(at));
                    }
                    self.advance();
                    self.prev = None;
                }
                _ if is_organic_atom_start(ch) => self.parse_organic_atom()?,
                _ => return Err(self.unexpected(start)),
            }
        }
        Ok(())
    }

    fn parse_organic_atom(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        let ch = self.advance().ok_or_else(|| self.unexpected(start))?;
        let aromatic = ch.is_ascii_lowercase();

        let symbol = match ch {
            b'B' if self.peek() == Some(b'r') => {
                self.advance();
                "Br"
            }
            b'C' if self.peek() == Some(b'l') => {
                self.advance();
                "Cl"
            }
            b'B' | b'b' => "B",
            b'C' | b'c' => "C",
            b'N' | b'n' => "N",
            b'O' | b'o' => "O",
            b'P' | b'p' => "P",
            b'S' | b's' => "S",
            b'F' => "F",
            b'I' => "I",
            _ => return Err(self.unexpected(start)),
        };

        let element =
            element_by_symbol(symbol).ok_or_else(|| SmilesError::UnknownElement(symbol.into()))?;
        let mut atom = Atom::new(element.atomic_number);
        atom.aromatic = aromatic;
        self.add_atom(atom, false);
        Ok(())
    }

    fn parse_bracket_atom(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        self.advance(); // '['

        let isotope = self.parse_number();

        let first = self.advance().ok_or(SmilesError::UnterminatedBracket(start))?;
        let (atomic_number, aromatic) = if first == b'*' {
            (0, false)
        } else if first.is_ascii_uppercase() {
            (self.bracket_element(first, false)?, false)
        } else if first.is_ascii_lowercase() {
            (self.bracket_element(first, true)?, true)
        } else {
            return Err(self.unexpected(self.pos - 1));
        };

        self.skip_chirality();

        let mut hydrogens = 0u8;
        if self.peek() == Some(b'H') {
            self.advance();
            hydrogens = match self.peek() {
                Some(d) if d.is_ascii_digit() => {
                    self.advance();
                    d - b'0'
                }
                _ => 1,
            };
        }

        let formal_charge = self.parse_charge();

        // Atom class, e.g. [CH3:1]; carries no chemistry
        if self.peek() == Some(b':') {
            self.advance();
            if self.parse_number().is_none() {
                return Err(self.unexpected(self.pos));
            }
        }

        match self.advance() {
            Some(b']') => {}
            Some(_) => return Err(self.unexpected(self.pos - 1)),
            None => return Err(SmilesError::UnterminatedBracket(start)),
        }

        let atom = Atom {
            atomic_number,
            formal_charge,
            isotope: isotope.and_then(|n| u16::try_from(n).ok()),
            aromatic,
            hydrogens,
        };
        self.add_atom(atom, true);
        Ok(())
    }

    /// Resolve the element symbol inside brackets, preferring two-letter symbols
    fn bracket_element(&mut self, first: u8, aromatic: bool) -> Result<u8, SmilesError> {
        let upper = char::from(first.to_ascii_uppercase());

        if let Some(next) = self.peek().filter(u8::is_ascii_lowercase) {
            let two = format!("{upper}{}", char::from(next));
            if let Some(element) = element_by_symbol(&two) {
                // in aromatic form only se/as/te are two-letter symbols
                if !aromatic || can_be_aromatic(element.atomic_number) {
                    self.advance();
                    return Ok(element.atomic_number);
                }
            }
        }

        let one = upper.to_string();
        let element = element_by_symbol(&one).ok_or_else(|| {
            SmilesError::UnknownElement(if aromatic {
                char::from(first).to_string()
            } else {
                one.clone()
            })
        })?;
        if aromatic && !can_be_aromatic(element.atomic_number) {
            return Err(SmilesError::InvalidAromatic(char::from(first).to_string()));
        }
        Ok(element.atomic_number)
    }

    /// Chirality is accepted but not represented: `@`, `@@`, and tags like `@TH1` or `@OH12`
    fn skip_chirality(&mut self) {
        if self.peek() != Some(b'@') {
            return;
        }
        self.advance();
        if self.peek() == Some(b'@') {
            self.advance();
            return;
        }
        let rest = &self.input[self.pos..];
        let tagged = [b"TH", b"AL", b"SP", b"TB", b"OH"]
            .iter()
            .any(|tag| rest.starts_with(*tag) && rest.get(2).is_some_and(u8::is_ascii_digit));
        if tagged {
            self.pos += 2;
            self.parse_number();
        }
    }

    fn parse_charge(&mut self) -> i8 {
        let sign: i8 = match self.peek() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return 0,
        };
        let symbol = self.input[self.pos];
        self.advance();

        if let Some(d) = self.peek().filter(u8::is_ascii_digit) {
            self.advance();
            return sign * i8::try_from(d - b'0').unwrap_or(9);
        }

        let mut magnitude: i8 = 1;
        while self.peek() == Some(symbol) && magnitude < 9 {
            self.advance();
            magnitude += 1;
        }
        sign * magnitude
    }

    fn parse_number(&mut self) -> Option<u32> {
        let mut value: u32 = 0;
        let mut found = false;
        while let Some(d) = self.peek().filter(u8::is_ascii_digit) {
            self.advance();
            value = value.saturating_mul(10).saturating_add(u32::from(d - b'0'));
            found = true;
        }
        found.then_some(value)
    }

    fn parse_two_digit_ring(&mut self, start: usize) -> Result<u16, SmilesError> {
        match (self.advance(), self.advance()) {
            (Some(d1), Some(d2)) if d1.is_ascii_digit() && d2.is_ascii_digit() => {
                Ok(u16::from(d1 - b'0') * 10 + u16::from(d2 - b'0'))
            }
            _ => Err(self.unexpected(start)),
        }
    }

    fn add_atom(&mut self, atom: Atom, bracket: bool) {
        let index = self.atoms.len();
        self.atoms.push(atom);
        self.bracket.push(bracket);

        if let Some(prev) = self.prev {
            let written = self.pending.take().map(|(order, _)| order);
            let order = self.bond_order(prev, index, written);
            self.bonds.push(Bond {
                begin: prev,
                end: index,
                order,
            });
        }
        self.pending = None;
        self.prev = Some(index);
    }

    /// An unwritten bond between two aromatic atoms is aromatic, otherwise single
    fn bond_order(&self, a: usize, b: usize, written: Option<BondOrder>) -> BondOrder {
        written.unwrap_or(if self.atoms[a].aromatic && self.atoms[b].aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        })
    }

    fn ring_closure(&mut self, ring: u16, start: usize) -> Result<(), SmilesError> {
        let current = self.prev.ok_or_else(|| self.unexpected(start))?;
        let written = self.pending.take().map(|(order, _)| order);

        let Some((open_atom, open_order)) = self.open_rings.remove(&ring) else {
            self.open_rings.insert(ring, (current, written));
            return Ok(());
        };

        if open_atom == current || self.has_bond(open_atom, current) {
            return Err(SmilesError::InvalidRingClosure(ring));
        }
        let order = match (open_order, written) {
            (Some(a), Some(b)) if a != b => return Err(SmilesError::InvalidRingClosure(ring)),
            (a, b) => a.or(b),
        };
        let order = self.bond_order(open_atom, current, order);
        self.bonds.push(Bond {
            begin: open_atom,
            end: current,
            order,
        });
        Ok(())
    }

    fn has_bond(&self, a: usize, b: usize) -> bool {
        self.bonds
            .iter()
            .any(|bond| (bond.begin == a && bond.end == b) || (bond.begin == b && bond.end == a))
    }

    fn finish(self) -> Result<Molecule, SmilesError> {
        if let Some((_, at)) = self.pending {
            return Err(SmilesError::DanglingBond(at));
        }
        if !self.branches.is_empty() {
            return Err(SmilesError::UnbalancedBranch);
        }
        if !self.open_rings.is_empty() {
            return Err(SmilesError::UnclosedRing(
                self.open_rings.keys().copied().collect(),
            ));
        }
        if self.atoms.is_empty() {
            return Err(SmilesError::Empty);
        }

        let bracket = self.bracket;
        let mut mol = Molecule::new(self.atoms, self.bonds);
        if let Some(atom) =
            (0..mol.atom_count()).find(|&i| mol.atoms[i].aromatic && !mol.is_ring_atom(i))
        {
            return Err(SmilesError::NonRingAromatic(atom));
        }

        // an aromatic-to-aromatic bond outside any ring (the biphenyl link) is single
        for bond in 0..mol.bond_count() {
            if mol.bonds[bond].order == BondOrder::Aromatic && !mol.is_ring_bond(bond) {
                mol.bonds[bond].order = BondOrder::Single;
            }
        }

        let needs_pi: Vec<bool> = (0..mol.atom_count())
            .map(|atom| needs_pi_bond(&mol, atom))
            .collect();
        mol.kekulize(&needs_pi).map_err(SmilesError::Kekulize)?;
        assign_implicit_hydrogens(&mut mol, &bracket)?;
        mol.perceive_aromaticity();
        Ok(mol)
    }
}

/// Whether an aromatic atom takes one of its ring's double bonds.
///
/// Runs before implicit hydrogens are filled in, so only bracket atoms count
/// hydrogens here. An atom with a written double bond (the `c` of `c=O`) or
/// with no room for another bond (`[nH]`, furan `o`) keeps single bonds.
fn needs_pi_bond(mol: &Molecule, atom: usize) -> bool {
    let a = &mol.atoms[atom];
    if !a.aromatic {
        return false;
    }
    let multiple = mol
        .neighbors(atom)
        .iter()
        .any(|&(_, b)| matches!(mol.bonds[b].order, BondOrder::Double | BondOrder::Triple));
    if multiple {
        return false;
    }
    aromatic_valence(a.atomic_number, a.formal_charge)
        .is_some_and(|target| mol.bond_valence(atom) + usize::from(a.hydrogens) < target)
}

/// Fill in hydrogens for organic-subset atoms from their normal valences
fn assign_implicit_hydrogens(mol: &mut Molecule, bracket: &[bool]) -> Result<(), SmilesError> {
    for index in 0..mol.atom_count() {
        if bracket[index] {
            continue;
        }
        let allowed = organic_valences(mol.atoms[index].atomic_number);
        let Some(&max) = allowed.last() else {
            continue;
        };

        let used = mol.bond_valence(index);
        if used > usize::from(max) {
            return Err(SmilesError::Valence {
                atom: index,
                valence: used,
            });
        }

        let hydrogens = allowed
            .iter()
            .map(|&v| usize::from(v))
            .find(|&v| v >= used)
            .map_or(0, |v| v - used);
        mol.atoms[index].hydrogens = u8::try_from(hydrogens).unwrap_or(0);
    }
    Ok(())
}

fn is_organic_atom_start(ch: u8) -> bool {
    matches!(
        ch,
        b'B' | b'C' | b'N' | b'O' | b'P' | b'S' | b'F' | b'I' | b'b' | b'c' | b'n' | b'o' | b'p' | b's'
    )
}
