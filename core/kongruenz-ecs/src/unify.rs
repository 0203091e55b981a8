//! Unification over ambiguous readings as bitset algebra.
//!
//! Every concrete `(case, number, gender, person)` cell is one bit of a
//! `u128`; a token contributes the union of the cells its readings admit and
//! a span agrees iff the intersection over its tokens is non-empty.

use std::fmt;

use kongruenz_protocol::{
    AxisSet, Case, Feature, FeatureTuple, Gender, Number, Person, ViolatedAxes,
};

const CASES: usize = 4;
const NUMBERS: usize = 2;
const GENDERS: usize = 3;
const PERSONS: usize = 3;
const CELLS: usize = CASES * NUMBERS * GENDERS * PERSONS;

/// `(case, number, gender, person)` indices of one cell.
pub type Cell = (usize, usize, usize, usize);

fn bit((c, n, g, p): Cell) -> u128 {
    1u128 << (((c * NUMBERS + n) * GENDERS + g) * PERSONS + p)
}

fn cell(index: usize) -> Cell {
    let p = index % PERSONS;
    let g = (index / PERSONS) % GENDERS;
    let n = (index / (PERSONS * GENDERS)) % NUMBERS;
    let c = index / (PERSONS * GENDERS * NUMBERS);
    (c, n, g, p)
}

/// Concrete value indices of a feature; wildcards expand to the whole axis.
fn expand<F: Feature>(value: F) -> Vec<usize> {
    match value.index() {
        Some(i) => vec![i],
        None => (0..F::VALUES.len()).collect(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AgreementSet(u128);

impl AgreementSet {
    pub const EMPTY: AgreementSet = AgreementSet(0);

    pub fn full() -> Self {
        Self((1u128 << CELLS) - 1)
    }

    /// Cells a single feature tuple admits.
    pub fn from_features(features: &FeatureTuple) -> Self {
        let mut bits = 0;
        for c in expand(features.case) {
            for n in expand(features.number) {
                for g in expand(features.gender) {
                    for p in expand(features.person) {
                        bits |= bit((c, n, g, p));
                    }
                }
            }
        }
        Self(bits)
    }

    /// Union over tuples.
    pub fn from_tuples<'a>(tuples: impl IntoIterator<Item = &'a FeatureTuple>) -> Self {
        tuples
            .into_iter()
            .fold(Self::EMPTY, |acc, f| acc.union(Self::from_features(f)))
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn intersect(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn cells(self) -> impl Iterator<Item = Cell> {
        (0..CELLS).filter(move |&i| self.0 & (1u128 << i) != 0).map(cell)
    }

    /// Saturates the set along every axis in `axes`, so that those axes no
    /// longer constrain an intersection.
    pub fn relax(self, axes: AxisSet) -> Self {
        let range = |axis: AxisSet, value: usize, len: usize| {
            if axes.contains(axis) {
                0..len
            } else {
                value..value + 1
            }
        };
        let mut bits = 0;
        for (c, n, g, p) in self.cells() {
            for c in range(AxisSet::CASE, c, CASES) {
                for n in range(AxisSet::NUMBER, n, NUMBERS) {
                    for g in range(AxisSet::GENDER, g, GENDERS) {
                        for p in range(AxisSet::PERSON, p, PERSONS) {
                            bits |= bit((c, n, g, p));
                        }
                    }
                }
            }
        }
        Self(bits)
    }

    /// Keeps only cells whose value on `F`'s axis is in `values`.
    pub fn only<F: AxisValue>(self, values: &[F]) -> Self {
        let wanted: Vec<usize> = values.iter().flat_map(|v| expand(*v)).collect();
        let mut bits = 0;
        for cell in self.cells() {
            if wanted.contains(&F::project(cell)) {
                bits |= bit(cell);
            }
        }
        Self(bits)
    }

    /// Distinct values on `F`'s axis, in enumeration order.
    pub fn values<F: AxisValue>(self) -> Vec<F> {
        let mut seen = [false; CASES];
        for cell in self.cells() {
            seen[F::project(cell)] = true;
        }
        F::VALUES
            .iter()
            .enumerate()
            .filter(|(i, _)| seen[*i])
            .map(|(_, v)| *v)
            .collect()
    }

    /// Whether some cell matches the tuple (wildcards match anything).
    pub fn admits(self, features: &FeatureTuple) -> bool {
        !self.intersect(Self::from_features(features)).is_empty()
    }
}

impl fmt::Debug for AgreementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgreementSet({} cells)", self.0.count_ones())
    }
}

/// An agreement axis usable as a projection of [`AgreementSet`] cells.
pub trait AxisValue: Feature {
    fn project(cell: Cell) -> usize;
}

impl AxisValue for Case {
    fn project((c, _, _, _): Cell) -> usize {
        c
    }
}

impl AxisValue for Number {
    fn project((_, n, _, _): Cell) -> usize {
        n
    }
}

impl AxisValue for Gender {
    fn project((_, _, g, _): Cell) -> usize {
        g
    }
}

impl AxisValue for Person {
    fn project((_, _, _, p): Cell) -> usize {
        p
    }
}

/// Intersection of all sets.
pub fn unify(sets: &[AgreementSet]) -> AgreementSet {
    sets.iter()
        .fold(AgreementSet::full(), |acc, set| acc.intersect(*set))
}

/// Axes among `candidates` whose relaxation alone restores a non-empty
/// intersection. `None` when the sets already agree.
pub fn violated_axes(sets: &[AgreementSet], candidates: AxisSet) -> Option<ViolatedAxes> {
    if !unify(sets).is_empty() {
        return None;
    }

    let mut violated = AxisSet::empty();
    for axis in candidates.axes() {
        let relaxed: Vec<AgreementSet> = sets.iter().map(|s| s.relax(axis.flag())).collect();
        if !unify(&relaxed).is_empty() {
            violated |= axis.flag();
        }
    }

    Some(if violated.is_empty() {
        ViolatedAxes::Ambiguous
    } else {
        ViolatedAxes::Determined(violated)
    })
}

/// Intersection with the variable axes relaxed: the cells a correction may
/// land on without touching the other axes.
pub fn relaxed_intersection(sets: &[AgreementSet], variable: AxisSet) -> AgreementSet {
    let relaxed: Vec<AgreementSet> = sets.iter().map(|s| s.relax(variable)).collect();
    unify(&relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nominal(case: Case, number: Number, gender: Gender) -> AgreementSet {
        AgreementSet::from_features(&FeatureTuple::nominal(case, number, gender))
    }

    #[test]
    fn test_wildcards_expand() {
        assert_eq!(AgreementSet::from_features(&FeatureTuple::default()), AgreementSet::full());
        let plural = nominal(Case::Nominative, Number::Plural, Gender::CommonAmbiguous);
        assert_eq!(
            plural.values::<Gender>(),
            vec![Gender::Masculine, Gender::Feminine, Gender::Neuter]
        );
        assert_eq!(plural.values::<Number>(), vec![Number::Plural]);
    }

    #[test]
    fn test_gender_only_violation() {
        // "Der Fahrrad"
        let der = nominal(Case::Nominative, Number::Singular, Gender::Masculine)
            .union(nominal(Case::Dative, Number::Singular, Gender::Feminine))
            .union(nominal(Case::Genitive, Number::Singular, Gender::Feminine))
            .union(nominal(Case::Genitive, Number::Plural, Gender::CommonAmbiguous));
        let fahrrad = nominal(Case::Nominative, Number::Singular, Gender::Neuter)
            .union(nominal(Case::Accusative, Number::Singular, Gender::Neuter));

        let violated = violated_axes(&[der, fahrrad], AxisSet::NOMINAL);
        assert_eq!(violated, Some(ViolatedAxes::Determined(AxisSet::GENDER)));

        let target = relaxed_intersection(&[der, fahrrad], AxisSet::GENDER);
        assert_eq!(target.values::<Case>(), vec![Case::Nominative]);
        assert_eq!(target.values::<Number>(), vec![Number::Singular]);
    }

    #[test]
    fn test_agreeing_sets() {
        let die = nominal(Case::Nominative, Number::Singular, Gender::Feminine);
        let katze = nominal(Case::Unspecified, Number::Singular, Gender::Feminine);
        assert_eq!(violated_axes(&[die, katze], AxisSet::NOMINAL), None);
    }

    #[test]
    fn test_no_single_axis_is_ambiguous() {
        let a = nominal(Case::Nominative, Number::Singular, Gender::Masculine);
        let b = nominal(Case::Dative, Number::Plural, Gender::Feminine);
        assert_eq!(violated_axes(&[a, b], AxisSet::NOMINAL), Some(ViolatedAxes::Ambiguous));
    }

    #[test]
    fn test_only_filters_axis() {
        let any = AgreementSet::full();
        let dative = any.only(&[Case::Dative]);
        assert_eq!(dative.values::<Case>(), vec![Case::Dative]);
        assert!(dative.admits(&FeatureTuple::nominal(Case::Dative, Number::Plural, Gender::Neuter)));
        assert!(!dative.admits(&FeatureTuple::nominal(Case::Genitive, Number::Plural, Gender::Neuter)));
    }

    #[test]
    fn test_verbal_relaxation() {
        let ist = AgreementSet::from_features(&FeatureTuple::verbal(Person::Third, Number::Singular));
        let wir = AgreementSet::from_features(&FeatureTuple::verbal(Person::First, Number::Plural));
        assert_eq!(violated_axes(&[ist, wir], AxisSet::VERBAL), Some(ViolatedAxes::Ambiguous));

        let sind = AgreementSet::from_features(&FeatureTuple::verbal(Person::Third, Number::Plural));
        let katze = AgreementSet::from_features(&FeatureTuple::verbal(Person::Third, Number::Singular));
        assert_eq!(
            violated_axes(&[sind, katze], AxisSet::VERBAL),
            Some(ViolatedAxes::Determined(AxisSet::NUMBER))
        );
    }
}
