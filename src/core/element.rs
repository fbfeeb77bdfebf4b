//! Element lookup for structure parsing.

/// A chemical element as far as structure parsing needs to know it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub atomic_number: u8,
    pub symbol: &'static str,
}

const fn el(atomic_number: u8, symbol: &'static str) -> Element {
    Element {
        atomic_number,
        symbol,
    }
}

/// Elements H through Rn plus the common heavier ones seen in drug and natural product records.
static ELEMENTS: &[Element] = &[
    el(1, "H"),
    el(2, "He"),
    el(3, "Li"),
    el(4, "Be"),
    el(5, "B"),
    el(6, "C"),
    el(7, "N"),
    el(8, "O"),
    el(9, "F"),
    el(10, "Ne"),
    el(11, "Na"),
    el(12, "Mg"),
    el(13, "Al"),
    el(14, "Si"),
    el(15, "P"),
    el(16, "S"),
    el(17, "Cl"),
    el(18, "Ar"),
    el(19, "K"),
    el(20, "Ca"),
    el(21, "Sc"),
    el(22, "Ti"),
    el(23, "V"),
    el(24, "Cr"),
    el(25, "Mn"),
    el(26, "Fe"),
    el(27, "Co"),
    el(28, "Ni"),
    el(29, "Cu"),
    el(30, "Zn"),
    el(31, "Ga"),
    el(32, "Ge"),
    el(33, "As"),
    el(34, "Se"),
    el(35, "Br"),
    el(36, "Kr"),
    el(37, "Rb"),
    el(38, "Sr"),
    el(39, "Y"),
    el(40, "Zr"),
    el(41, "Nb"),
    el(42, "Mo"),
    el(43, "Tc"),
    el(44, "Ru"),
    el(45, "Rh"),
    el(46, "Pd"),
    el(47, "Ag"),
    el(48, "Cd"),
    el(49, "In"),
    el(50, "Sn"),
    el(51, "Sb"),
    el(52, "Te"),
    el(53, "I"),
    el(54, "Xe"),
    el(55, "Cs"),
    el(56, "Ba"),
    el(57, "La"),
    el(64, "Gd"),
    el(74, "W"),
    el(78, "Pt"),
    el(79, "Au"),
    el(80, "Hg"),
    el(81, "Tl"),
    el(82, "Pb"),
    el(83, "Bi"),
    el(86, "Rn"),
    el(88, "Ra"),
];

/// Look up an element by its case-sensitive symbol (e.g. `"Cl"`).
#[must_use]
pub fn element_by_symbol(symbol: &str) -> Option<Element> {
    ELEMENTS.iter().copied().find(|e| e.symbol == symbol)
}

/// Normal valences of the SMILES organic subset, lowest first.
///
/// Returns an empty slice for elements outside the organic subset; those only
/// appear in bracket atoms, which state their hydrogens explicitly.
#[must_use]
pub fn organic_valences(atomic_number: u8) -> &'static [u8] {
    match atomic_number {
        5 => &[3],
        6 => &[4],
        7 | 15 => &[3, 5],
        8 => &[2],
        16 => &[2, 4, 6],
        9 | 17 | 35 | 53 => &[1],
        _ => &[],
    }
}

/// Elements allowed to be written in lowercase (aromatic) form.
#[must_use]
pub fn can_be_aromatic(atomic_number: u8) -> bool {
    matches!(atomic_number, 5 | 6 | 7 | 8 | 15 | 16 | 33 | 34 | 52)
}

/// Valence an aromatic atom reaches once it holds one ring double bond.
///
/// Charged atoms take the valence of the element they are isoelectronic with:
/// `[n+]` behaves like carbon, `[o+]` and `[c-]` like nitrogen.
#[must_use]
pub fn aromatic_valence(atomic_number: u8, formal_charge: i8) -> Option<usize> {
    let charge = i16::from(formal_charge);
    let valence = match atomic_number {
        5 => 3 - charge,
        6 => 4 - charge.abs(),
        7 | 15 | 33 => 3 + charge,
        8 | 16 | 34 | 52 => 2 + charge,
        _ => return None,
    };
    usize::try_from(valence).ok()
}
