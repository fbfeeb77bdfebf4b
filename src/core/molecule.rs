/// Bond order classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Stable numeric code used when hashing atom environments
    #[must_use]
    pub fn code(self) -> u64 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Aromatic => 12,
        }
    }

    /// Valence consumed by this bond. Aromatic bonds count as a single sigma bond;
    /// the shared pi electron is accounted for once per aromatic atom.
    #[must_use]
    pub fn valence(self) -> u8 {
        match self {
            Self::Single | Self::Aromatic => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }
}

/// An atom in a molecular graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    /// Atomic number, 0 for the `*` wildcard
    pub atomic_number: u8,
    pub formal_charge: i8,
    pub isotope: Option<u16>,
    pub aromatic: bool,
    /// Hydrogens attached to this atom that are not graph nodes
    pub hydrogens: u8,
}

impl Atom {
    #[must_use]
    pub fn new(atomic_number: u8) -> Self {
        Self {
            atomic_number,
            formal_charge: 0,
            isotope: None,
            aromatic: false,
            hydrogens: 0,
        }
    }

    #[must_use]
    pub fn is_hydrogen(&self) -> bool {
        self.atomic_number == 1
    }
}

/// A bond between two atoms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
}

/// Molecular graph parsed from a structure string.
///
/// Lives only as long as the computation that parsed it; the matching engine
/// drops it as soon as the fingerprint has been extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    /// adjacency[atom] = (neighbor atom, bond index)
    adjacency: Vec<Vec<(usize, usize)>>,
    /// ring_bonds[bond] is true when the bond lies on at least one cycle
    ring_bonds: Vec<bool>,
}

impl Molecule {
    /// Build a molecule, deriving adjacency and ring membership from the bonds.
    ///
    /// Bond endpoints must be valid atom indices.
    #[must_use]
    pub fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (index, bond) in bonds.iter().enumerate() {
            adjacency[bond.begin].push((bond.end, index));
            adjacency[bond.end].push((bond.begin, index));
        }
        let ring_bonds = find_ring_bonds(&adjacency, bonds.len());

        Self {
            atoms,
            bonds,
            adjacency,
            ring_bonds,
        }
    }

    #[must_use]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[must_use]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Neighbors of an atom as (neighbor atom, bond index) pairs
    #[must_use]
    pub fn neighbors(&self, atom: usize) -> &[(usize, usize)] {
        &self.adjacency[atom]
    }

    /// Number of explicit bonds on an atom
    #[must_use]
    pub fn degree(&self, atom: usize) -> usize {
        self.adjacency[atom].len()
    }

    /// Number of non-hydrogen neighbors
    #[must_use]
    pub fn heavy_degree(&self, atom: usize) -> usize {
        self.adjacency[atom]
            .iter()
            .filter(|&&(n, _)| !self.atoms[n].is_hydrogen())
            .count()
    }

    /// Implicit plus explicit (graph node) hydrogens on an atom
    #[must_use]
    pub fn total_hydrogens(&self, atom: usize) -> usize {
        let explicit = self.adjacency[atom]
            .iter()
            .filter(|&&(n, _)| self.atoms[n].is_hydrogen())
            .count();
        usize::from(self.atoms[atom].hydrogens) + explicit
    }

    /// Sum of bond valences on an atom
    #[must_use]
    pub fn bond_valence(&self, atom: usize) -> usize {
        self.adjacency[atom]
            .iter()
            .map(|&(_, b)| usize::from(self.bonds[b].order.valence()))
            .sum()
    }

    #[must_use]
    pub fn is_ring_bond(&self, bond: usize) -> bool {
        self.ring_bonds[bond]
    }

    /// True when the atom has at least one ring bond
    #[must_use]
    pub fn is_ring_atom(&self, atom: usize) -> bool {
        self.adjacency[atom].iter().any(|&(_, b)| self.ring_bonds[b])
    }

    /// Replace aromatic bonds with alternating single and double bonds.
    ///
    /// `needs_pi[atom]` marks the aromatic atoms that must end up holding exactly
    /// one double bond. Double bonds are placed only on aromatic ring bonds joining
    /// two such atoms. Every other aromatic bond becomes single and all aromatic
    /// flags are cleared.
    ///
    /// # Errors
    ///
    /// Returns the lowest atom index of an aromatic system that has no valid
    /// double bond assignment (`c1cccc1`).
    pub fn kekulize(&mut self, needs_pi: &[bool]) -> Result<(), usize> {
        let candidates: Vec<Vec<(usize, usize)>> = (0..self.atoms.len())
            .map(|atom| {
                if !needs_pi[atom] {
                    return Vec::new();
                }
                self.adjacency[atom]
                    .iter()
                    .copied()
                    .filter(|&(next, bond)| {
                        needs_pi[next]
                            && self.ring_bonds[bond]
                            && self.bonds[bond].order == BondOrder::Aromatic
                    })
                    .collect()
            })
            .collect();

        let mut matched: Vec<Option<usize>> = vec![None; self.atoms.len()];
        let mut seen = vec![false; self.atoms.len()];
        for start in 0..self.atoms.len() {
            if !needs_pi[start] || seen[start] {
                continue;
            }
            let system = pi_system(&candidates, start, &mut seen);
            let mut budget = MAX_KEKULE_STEPS;
            if !assign_pi_bonds(&system, &candidates, &mut matched, &mut budget) {
                return Err(start);
            }
        }

        for bond in &mut self.bonds {
            if bond.order == BondOrder::Aromatic {
                bond.order = BondOrder::Single;
            }
        }
        for bond in matched.into_iter().flatten() {
            self.bonds[bond].order = BondOrder::Double;
        }
        for atom in &mut self.atoms {
            atom.aromatic = false;
        }
        Ok(())
    }

    /// Mark rings that satisfy the Hückel rule as aromatic.
    ///
    /// Works on a Kekulé graph. Every five- to seven-membered ring is judged on
    /// its own: each member must contribute pi electrons and the ring total must
    /// be 4n+2. Rings are all judged before any is marked, so the outcome does not
    /// depend on ring order.
    pub fn perceive_aromaticity(&mut self) {
        let aromatic: Vec<Vec<usize>> = self
            .small_rings()
            .into_iter()
            .filter(|ring| self.ring_is_aromatic(ring))
            .collect();

        for ring in aromatic {
            for (i, &atom) in ring.iter().enumerate() {
                let next = ring[(i + 1) % ring.len()];
                self.atoms[atom].aromatic = true;
                if let Some(bond) = self.bond_between(atom, next) {
                    self.bonds[bond].order = BondOrder::Aromatic;
                }
            }
        }
    }

    /// Index of the bond joining two atoms, if any
    #[must_use]
    pub fn bond_between(&self, a: usize, b: usize) -> Option<usize> {
        self.adjacency[a]
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, bond)| bond)
    }

    fn ring_is_aromatic(&self, ring: &[usize]) -> bool {
        let mut electrons = 0usize;
        for &atom in ring {
            match self.pi_electrons(atom) {
                Some(count) => electrons += usize::from(count),
                None => return false,
            }
        }
        electrons % 4 == 2
    }

    /// Pi electrons an atom adds to a ring, or `None` when it breaks conjugation.
    ///
    /// - one double bond that lies on a ring: 1
    /// - carbon with an exocyclic double bond to N, O or S (`C=O` in a pyridone): 0
    /// - N, O, S and friends with only single bonds: 2 (their lone pair)
    /// - carbanion 2, carbocation and neutral boron 0
    fn pi_electrons(&self, atom: usize) -> Option<u8> {
        let a = &self.atoms[atom];
        let mut ring_doubles = 0;
        let mut exocyclic = None;
        for &(next, bond) in &self.adjacency[atom] {
            match self.bonds[bond].order {
                BondOrder::Triple => return None,
                BondOrder::Double if self.ring_bonds[bond] => ring_doubles += 1,
                BondOrder::Double => exocyclic = Some(next),
                BondOrder::Single | BondOrder::Aromatic => {}
            }
        }

        match (ring_doubles, exocyclic) {
            (1, None) => Some(1),
            (0, Some(partner)) => {
                let polar = matches!(self.atoms[partner].atomic_number, 7 | 8 | 16);
                (a.atomic_number == 6 && polar).then_some(0)
            }
            (0, None) => match (a.atomic_number, a.formal_charge) {
                (7 | 15 | 33, 0) => {
                    (self.degree(atom) + usize::from(a.hydrogens) <= 3).then_some(2)
                }
                (7 | 15, -1) | (8 | 16 | 34 | 52, 0) | (6, -1) => Some(2),
                (6, 1) | (5, 0) => Some(0),
                _ => None,
            },
            _ => None,
        }
    }

    /// Five- to seven-membered rings as ordered atom cycles, each listed once
    fn small_rings(&self) -> Vec<Vec<usize>> {
        let mut rings: Vec<Vec<usize>> = Vec::new();
        let mut keys: Vec<Vec<usize>> = Vec::new();

        for (index, bond) in self.bonds.iter().enumerate() {
            if !self.ring_bonds[index] {
                continue;
            }
            let Some(path) = self.shortest_ring_path(bond.begin, bond.end, index, 7) else {
                continue;
            };
            if path.len() < 5 {
                continue;
            }
            let mut key = path.clone();
            key.sort_unstable();
            if !keys.contains(&key) {
                keys.push(key);
                rings.push(path);
            }
        }
        rings
    }

    /// Shortest path of at most `max_atoms` atoms from `from` to `to` over ring
    /// bonds, not using `skip`
    fn shortest_ring_path(
        &self,
        from: usize,
        to: usize,
        skip: usize,
        max_atoms: usize,
    ) -> Option<Vec<usize>> {
        let mut previous = vec![usize::MAX; self.atoms.len()];
        let mut depth = vec![0usize; self.atoms.len()];
        let mut queue = std::collections::VecDeque::from([from]);
        previous[from] = from;

        while let Some(atom) = queue.pop_front() {
            if atom == to {
                let mut path = vec![to];
                let mut current = to;
                while current != from {
                    current = previous[current];
                    path.push(current);
                }
                return Some(path);
            }
            if depth[atom] + 1 >= max_atoms {
                continue;
            }
            for &(next, bond) in &self.adjacency[atom] {
                if bond == skip || !self.ring_bonds[bond] || previous[next] != usize::MAX {
                    continue;
                }
                previous[next] = atom;
                depth[next] = depth[atom] + 1;
                queue.push_back(next);
            }
        }
        None
    }
}

/// Search steps allowed per aromatic system before kekulization gives up
const MAX_KEKULE_STEPS: usize = 100_000;

/// Atoms reachable from `start` over candidate double bonds
fn pi_system(candidates: &[Vec<(usize, usize)>], start: usize, seen: &mut [bool]) -> Vec<usize> {
    let mut system = vec![start];
    seen[start] = true;
    let mut next = 0;
    while next < system.len() {
        let atom = system[next];
        next += 1;
        for &(neighbor, _) in &candidates[atom] {
            if !seen[neighbor] {
                seen[neighbor] = true;
                system.push(neighbor);
            }
        }
    }
    system
}

/// Backtracking search pairing every atom of `system` with a double bond.
///
/// Always extends the unpaired atom with the fewest free partners, so forced
/// choices are taken first and ordinary ring systems never backtrack.
fn assign_pi_bonds(
    system: &[usize],
    candidates: &[Vec<(usize, usize)>],
    matched: &mut [Option<usize>],
    budget: &mut usize,
) -> bool {
    let mut best: Option<(usize, usize)> = None;
    for &atom in system {
        if matched[atom].is_some() {
            continue;
        }
        let free = candidates[atom]
            .iter()
            .filter(|&&(partner, _)| matched[partner].is_none())
            .count();
        if free == 0 {
            return false;
        }
        if best.map_or(true, |(_, fewest)| free < fewest) {
            best = Some((atom, free));
        }
    }
    let Some((atom, _)) = best else {
        return true;
    };

    for &(partner, bond) in &candidates[atom] {
        if matched[partner].is_some() {
            continue;
        }
        if *budget == 0 {
            return false;
        }
        *budget -= 1;
        matched[atom] = Some(bond);
        matched[partner] = Some(bond);
        if assign_pi_bonds(system, candidates, matched, budget) {
            return true;
        }
        matched[atom] = None;
        matched[partner] = None;
    }
    false
}

/// Mark every bond that is not a bridge.
///
/// A bond lies on a cycle exactly when removing it leaves its endpoints connected,
/// i.e. when it is not a bridge. Bridges are found with an iterative Tarjan
/// low-link walk so long chains cannot exhaust the call stack.
fn find_ring_bonds(adjacency: &[Vec<(usize, usize)>], bond_count: usize) -> Vec<bool> {
    const UNVISITED: usize = usize::MAX;

    let n = adjacency.len();
    let mut ring = vec![true; bond_count];
    let mut discovered = vec![UNVISITED; n];
    let mut low = vec![0usize; n];
    let mut timer = 0usize;

    for root in 0..n {
        if discovered[root] != UNVISITED {
            continue;
        }
        discovered[root] = timer;
        low[root] = timer;
        timer += 1;

        // (atom, bond used to reach it, next adjacency slot to visit)
        let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];

        while let Some(frame) = stack.last_mut() {
            let (atom, parent_bond) = (frame.0, frame.1);

            if frame.2 < adjacency[atom].len() {
                let (next, bond) = adjacency[atom][frame.2];
                frame.2 += 1;

                if Some(bond) == parent_bond {
                    continue;
                }
                if discovered[next] == UNVISITED {
                    discovered[next] = timer;
                    low[next] = timer;
                    timer += 1;
                    stack.push((next, Some(bond), 0));
                } else {
                    low[atom] = low[atom].min(discovered[next]);
                }
            } else {
                stack.pop();
                if let (Some(&(parent, _, _)), Some(bond)) = (stack.last(), parent_bond) {
                    low[parent] = low[parent].min(low[atom]);
                    if low[atom] > discovered[parent] {
                        ring[bond] = false;
                    }
                }
            }
        }
    }

    ring
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carbon() -> Atom {
        Atom::new(6)
    }

    fn single(begin: usize, end: usize) -> Bond {
        Bond {
            begin,
            end,
            order: BondOrder::Single,
        }
    }

    #[test]
    fn test_chain_has_no_ring_bonds() {
        let mol = Molecule::new(vec![carbon(), carbon(), carbon()], vec![single(0, 1), single(1, 2)]);
        assert!(!mol.is_ring_bond(0));
        assert!(!mol.is_ring_bond(1));
        assert!(!mol.is_ring_atom(1));
        assert_eq!(mol.degree(1), 2);
    }

    #[test]
    fn test_ring_with_tail() {
        // cyclopropane with a methyl substituent on atom 0
        let mol = Molecule::new(
            vec![carbon(), carbon(), carbon(), carbon()],
            vec![single(0, 1), single(1, 2), single(2, 0), single(0, 3)],
        );
        assert!(mol.is_ring_bond(0));
        assert!(mol.is_ring_bond(1));
        assert!(mol.is_ring_bond(2));
        assert!(!mol.is_ring_bond(3));
        assert!(mol.is_ring_atom(0));
        assert!(!mol.is_ring_atom(3));
    }

    #[test]
    fn test_two_rings_joined_by_bridge() {
        // two triangles joined by bond 2-3
        let atoms = vec![carbon(); 6];
        let bonds = vec![
            single(0, 1),
            single(1, 2),
            single(2, 0),
            single(2, 3),
            single(3, 4),
            single(4, 5),
            single(5, 3),
        ];
        let mol = Molecule::new(atoms, bonds);
        assert!(!mol.is_ring_bond(3));
        assert_eq!((0..7).filter(|&b| mol.is_ring_bond(b)).count(), 6);
    }

    fn aromatic_ring(size: usize) -> Molecule {
        let mut atom = carbon();
        atom.aromatic = true;
        let bonds = (0..size)
            .map(|i| Bond {
                begin: i,
                end: (i + 1) % size,
                order: BondOrder::Aromatic,
            })
            .collect();
        Molecule::new(vec![atom; size], bonds)
    }

    #[test]
    fn test_kekulize_six_ring_alternates() {
        let mut mol = aromatic_ring(6);
        mol.kekulize(&[true; 6]).unwrap();
        let doubles = mol.bonds.iter().filter(|b| b.order == BondOrder::Double).count();
        assert_eq!(doubles, 3);
        for atom in 0..6 {
            assert_eq!(mol.bond_valence(atom), 3);
            assert!(!mol.atoms[atom].aromatic);
        }

        mol.perceive_aromaticity();
        assert!(mol.atoms.iter().all(|a| a.aromatic));
        assert!(mol.bonds.iter().all(|b| b.order == BondOrder::Aromatic));
    }

    #[test]
    fn test_kekulize_odd_ring_fails() {
        let mut mol = aromatic_ring(5);
        assert_eq!(mol.kekulize(&[true; 5]), Err(0));
    }

    #[test]
    fn test_kekulize_skips_donor_atoms() {
        // pyrrole-like ring where atom 2 keeps only single bonds
        let mut mol = aromatic_ring(5);
        mol.atoms[2].atomic_number = 7;
        mol.atoms[2].hydrogens = 1;
        mol.kekulize(&[true, true, false, true, true]).unwrap();
        assert_eq!(mol.bond_valence(2), 2);
        assert_eq!(mol.bonds[0].order, BondOrder::Double);
        assert_eq!(mol.bonds[3].order, BondOrder::Double);

        mol.perceive_aromaticity();
        assert!(mol.atoms.iter().all(|a| a.aromatic));
    }

    #[test]
    fn test_explicit_hydrogen_counts() {
        let mut c = carbon();
        c.hydrogens = 2;
        let mol = Molecule::new(vec![c, Atom::new(1), carbon()], vec![single(0, 1), single(0, 2)]);
        assert_eq!(mol.total_hydrogens(0), 3);
        assert_eq!(mol.heavy_degree(0), 1);
        assert_eq!(mol.bond_valence(0), 2);
    }
}
