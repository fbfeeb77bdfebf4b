use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::molecule::Molecule;

/// Default neighborhood radius (2 corresponds to ECFP4)
pub const DEFAULT_RADIUS: u32 = 2;

/// Default fingerprint length in bits
pub const DEFAULT_NBITS: usize = 2048;

/// Parameters of the circular fingerprint.
///
/// Fingerprints are only comparable when they were generated with the same parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintParams {
    /// Number of bond hops an atom environment grows by
    pub radius: u32,
    /// Length of the bit vector
    pub nbits: usize,
}

impl Default for FingerprintParams {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            nbits: DEFAULT_NBITS,
        }
    }
}

/// A fixed-length bit vector
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    words: Vec<u64>,
    nbits: usize,
}

impl Fingerprint {
    /// Create an all-zero fingerprint of `nbits` bits (at least one)
    #[must_use]
    pub fn new(nbits: usize) -> Self {
        let nbits = nbits.max(1);
        Self {
            words: vec![0; nbits.div_ceil(64)],
            nbits,
        }
    }

    pub fn set_bit(&mut self, pos: usize) {
        let pos = pos % self.nbits;
        self.words[pos / 64] |= 1u64 << (pos % 64);
    }

    #[must_use]
    pub fn nbits(&self) -> usize {
        self.nbits
    }

    /// Number of set bits
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// True when no bit is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of bits set in both fingerprints
    #[must_use]
    pub fn intersection_count(&self, other: &Self) -> usize {
        self.words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// Number of bits set in either fingerprint
    #[must_use]
    pub fn union_count(&self, other: &Self) -> usize {
        self.words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a | b).count_ones() as usize)
            .sum()
    }
}

/// Compute a circular (Morgan / ECFP-style) fingerprint.
///
/// Every heavy atom starts with an identifier hashed from its invariants
/// (element, heavy degree, hydrogens, charge, isotope, ring membership). Each
/// iteration rehashes an atom's identifier with the sorted identifiers of its
/// neighbors and the bonds leading to them, so after `radius` iterations an
/// identifier describes the substructure within `radius` bonds. An environment
/// covering exactly the same bonds as one already emitted is dropped, and
/// iteration stops early once no new environment appears.
///
/// Hydrogen atoms written as graph nodes are folded into their neighbor's
/// hydrogen count, so `[H]OC` and `OC` produce the same fingerprint.
///
/// The result depends only on the molecule and `params`.
#[must_use]
pub fn morgan_fingerprint(mol: &Molecule, params: FingerprintParams) -> Fingerprint {
    let mut fp = Fingerprint::new(params.nbits);
    let n = mol.atom_count();
    let words = mol.bond_count().div_ceil(64);

    let heavy: Vec<usize> = (0..n).filter(|&i| !mol.atoms[i].is_hydrogen()).collect();
    if heavy.is_empty() {
        return fp;
    }

    let mut identifiers = vec![0u64; n];
    for &atom in &heavy {
        identifiers[atom] = atom_invariant(mol, atom);
        fp.set_bit(fold(identifiers[atom], fp.nbits()));
    }

    // environments[atom] = set of bonds covered by the atom's current environment
    let mut environments = vec![vec![0u64; words]; n];
    let mut active: Vec<bool> = (0..n).map(|i| !mol.atoms[i].is_hydrogen()).collect();
    let mut seen: HashSet<Vec<u64>> = HashSet::new();

    for _ in 0..params.radius {
        let mut next_identifiers = identifiers.clone();
        let mut next_environments = environments.clone();
        let mut candidates: Vec<(Vec<u64>, u64, usize)> = Vec::new();

        for &atom in &heavy {
            let mut neighbors: Vec<(u64, u64)> = Vec::new();
            let mut environment = environments[atom].clone();

            for &(neighbor, bond) in mol.neighbors(atom) {
                if mol.atoms[neighbor].is_hydrogen() {
                    continue;
                }
                neighbors.push((mol.bonds[bond].order.code(), identifiers[neighbor]));
                environment[bond / 64] |= 1u64 << (bond % 64);
                for (word, covered) in environment.iter_mut().zip(&environments[neighbor]) {
                    *word |= covered;
                }
            }
            neighbors.sort_unstable();

            let mut h = fnv1a_update(FNV_OFFSET, identifiers[atom]);
            for (order, id) in &neighbors {
                h = fnv1a_update(h, *order);
                h = fnv1a_update(h, *id);
            }
            next_identifiers[atom] = h;

            if active[atom] {
                if neighbors.is_empty() || environment == environments[atom] {
                    // environment stopped growing
                    active[atom] = false;
                } else {
                    candidates.push((environment.clone(), h, atom));
                }
            }
            next_environments[atom] = environment;
        }

        // among identical environments the lowest identifier is kept
        candidates.sort_unstable();
        let mut emitted = 0usize;
        for (environment, id, atom) in candidates {
            if seen.contains(&environment) {
                active[atom] = false;
            } else {
                fp.set_bit(fold(id, fp.nbits()));
                seen.insert(environment);
                emitted += 1;
            }
        }

        identifiers = next_identifiers;
        environments = next_environments;
        if emitted == 0 {
            break;
        }
    }

    fp
}

fn atom_invariant(mol: &Molecule, atom: usize) -> u64 {
    let a = &mol.atoms[atom];
    let mut h = FNV_OFFSET;
    h = fnv1a_update(h, u64::from(a.atomic_number));
    h = fnv1a_update(h, mol.heavy_degree(atom) as u64);
    h = fnv1a_update(h, mol.total_hydrogens(atom) as u64);
    h = fnv1a_update(h, u64::from(a.formal_charge.to_le_bytes()[0]));
    h = fnv1a_update(h, u64::from(a.isotope.unwrap_or(0)));
    h = fnv1a_update(h, u64::from(mol.is_ring_atom(atom)));
    h
}

// FNV-1a keeps identifiers stable across processes and platforms
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a_update(hash: u64, value: u64) -> u64 {
    value.to_le_bytes().iter().fold(hash, |h, &b| {
        (h ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

#[allow(clippy::cast_possible_truncation)] // result is below nbits
fn fold(hash: u64, nbits: usize) -> usize {
    (hash % nbits as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::smiles::parse_smiles;

    fn fp(smiles: &str) -> Fingerprint {
        morgan_fingerprint(&parse_smiles(smiles).unwrap(), FingerprintParams::default())
    }

    #[test]
    fn test_bit_operations() {
        let mut fp = Fingerprint::new(128);
        assert!(fp.is_empty());
        fp.set_bit(42);
        fp.set_bit(100);
        fp.set_bit(42);
        assert_eq!(fp.count_ones(), 2);
        // positions wrap around the fingerprint length
        fp.set_bit(128 + 7);
        let mut seven = Fingerprint::new(128);
        seven.set_bit(7);
        assert_eq!(fp.intersection_count(&seven), 1);
    }

    #[test]
    fn test_intersection_and_union() {
        let mut a = Fingerprint::new(256);
        let mut b = Fingerprint::new(256);
        a.set_bit(1);
        a.set_bit(200);
        b.set_bit(200);
        b.set_bit(255);
        assert_eq!(a.intersection_count(&b), 1);
        assert_eq!(a.union_count(&b), 3);
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let aspirin = "CC(=O)OC1=CC=CC=C1C(=O)O";
        assert_eq!(fp(aspirin), fp(aspirin));
    }

    #[test]
    fn test_fingerprint_length_and_bits() {
        let f = fp("CCO");
        assert_eq!(f.nbits(), DEFAULT_NBITS);
        assert!(!f.is_empty());
        // at most one bit per atom per layer
        assert!(f.count_ones() <= 3 * 3);
    }

    #[test]
    fn test_explicit_hydrogens_ignored() {
        assert_eq!(fp("[H]OC"), fp("OC"));
    }

    #[test]
    fn test_kekule_and_aromatic_forms_agree() {
        assert_eq!(
            fp("CC(=O)OC1=CC=CC=C1C(=O)O"),
            fp("CC(=O)Oc1ccccc1C(=O)O")
        );
    }

    #[test]
    fn test_spellings_of_one_molecule_agree() {
        let spellings: &[&[&str]] = &[
            // biphenyl
            &[
                "c1ccccc1c1ccccc1",
                "c1ccccc1-c1ccccc1",
                "C1=CC=CC=C1C1=CC=CC=C1",
            ],
            // caffeine
            &["CN1C=NC2=C1C(=O)N(C(=O)N2C)C", "Cn1cnc2c1c(=O)n(C)c(=O)n2C"],
            // flavone
            &[
                "O=c1cc(-c2ccccc2)oc2ccccc12",
                "O=c1cc(c2ccccc2)oc2ccccc12",
                "O=C1C=C(OC2=CC=CC=C12)C1=CC=CC=C1",
            ],
            // quercetin
            &[
                "C1=CC(=C(C=C1C2=C(C(=O)C3=C(C=C(C=C3O2)O)O)O)O)O",
                "O=c1c(O)c(-c2ccc(O)c(O)c2)oc2cc(O)cc(O)c12",
            ],
            // 2-pyridone
            &["O=C1C=CC=CN1", "O=c1cccc[nH]1"],
        ];
        for group in spellings {
            let expected = fp(group[0]);
            for smiles in &group[1..] {
                assert_eq!(fp(smiles), expected, "{smiles} vs {}", group[0]);
            }
        }
    }

    #[test]
    fn test_different_molecules_differ() {
        assert_ne!(fp("CCO"), fp("CCN"));
        assert_ne!(fp("c1ccccc1O"), fp("c1ccccc1N"));
    }

    #[test]
    fn test_radius_zero_sets_atom_bits_only() {
        let mol = parse_smiles("CCCC").unwrap();
        let params = FingerprintParams {
            radius: 0,
            nbits: 2048,
        };
        // two terminal and two inner carbons
        assert!(morgan_fingerprint(&mol, params).count_ones() <= 2);
    }

    #[test]
    fn test_larger_radius_adds_bits() {
        let mol = parse_smiles("CC(=O)OC1=CC=CC=C1C(=O)O").unwrap();
        let r1 = morgan_fingerprint(&mol, FingerprintParams { radius: 1, nbits: 2048 });
        let r2 = morgan_fingerprint(&mol, FingerprintParams { radius: 2, nbits: 2048 });
        assert!(r2.count_ones() >= r1.count_ones());
        assert_eq!(r1.intersection_count(&r2), r1.count_ones());
    }

    #[test]
    fn test_single_atom() {
        let f = fp("C");
        assert_eq!(f.count_ones(), 1);
    }
}
