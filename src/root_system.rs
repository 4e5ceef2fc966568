//! This module exports the [`RootSystem`] object, which holds the positive roots of a Kac-Moody
//! algebra together with their multiplicities. In particular, this contains the core logic that
//! grows the root table one height at a time and evaluates Peterson's recursion formula.
//!
//! The roots are organised in buckets indexed by height. To construct height $h + 1$ we only ever
//! need data from heights at most $h$, so the construction is a dynamic program that is run
//! bottom up. Everything that has been constructed is kept for the lifetime of the root system,
//! since later heights may query arbitrarily low ones.
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use lie::{Algebra, Rational, Root, RootVector};
use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};

/// The states a [`RootSystem`] moves through. The transitions are one way.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstructionState {
    /// Only heights 0 and 1 are populated.
    Unconstructed,
    Constructing,
    /// A construction step found no roots at the next height, so the highest root has been
    /// reached. Only finite algebras get here.
    FullyConstructed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AnomalyKind {
    /// Peterson's formula produced a non-integral value.
    NonIntegral,
    /// The rounded value is negative or does not fit in a `u64`.
    OutOfRange,
    /// The denominator $\langle \alpha, \alpha \rangle - 2 \langle \rho, \alpha \rangle$
    /// vanishes, so the formula says nothing about the root. The recorded value is the
    /// numerator.
    VanishingDenominator,
}

/// A multiplicity produced by Peterson's formula that cannot be trusted. The root still receives
/// the rounded value; it is up to the caller whether to trust the table at and beyond `height`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiplicityAnomaly {
    pub vector: RootVector,
    pub height: usize,
    pub value: Rational,
    pub kind: AnomalyKind,
}

impl fmt::Display for MultiplicityAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            AnomalyKind::NonIntegral => write!(
                f,
                "multiplicity of root {} is not an integer but {}",
                self.vector, self.value
            ),
            AnomalyKind::OutOfRange => write!(
                f,
                "multiplicity of root {} is out of range: {}",
                self.vector, self.value
            ),
            AnomalyKind::VanishingDenominator => write!(
                f,
                "Peterson's formula is undefined at root {}: the denominator vanishes",
                self.vector
            ),
        }
    }
}

/// The outcome of Peterson's formula for a single root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Peterson {
    pub mult: u64,
    pub anomaly: Option<MultiplicityAnomaly>,
}

/// The data computed for a root at the frontier before it is written back into its bucket.
struct RootUpdate {
    vector: RootVector,
    mult: u64,
    co_mult: Rational,
    anomaly: Option<MultiplicityAnomaly>,
}

/// The positive roots of an algebra, constructed up to some height.
///
/// `roots[h]` maps the vector of every root of height `h` to the [`Root`] itself. Bucket 0 holds
/// a single placeholder for the Cartan subalgebra, with multiplicity equal to the rank. It is
/// never exported and never consulted by [`RootSystem::multiplicity`]. Bucket 1 holds the real
/// simple roots.
///
/// `multiples[h]` holds the vectors of height `h` that are a multiple of a root of lower height
/// but not roots themselves, together with their co-multiplicity. They only enter the cross
/// terms of Peterson's formula. These are plain values and do not refer to entries of `roots`.
///
/// Buckets at heights up to `constructed_height` are final. Buckets above it may already hold
/// roots found while extending root strings from lower heights, but their multiplicities are not
/// all known yet.
pub struct RootSystem {
    algebra: Arc<Algebra>,
    roots: Vec<BTreeMap<RootVector, Root>>,
    multiples: Vec<BTreeMap<RootVector, Rational>>,
    constructed_height: usize,
    fully_constructed: bool,
    anomalies: Vec<MultiplicityAnomaly>,
}

impl RootSystem {
    /// Creates the root system with heights 0 and 1 populated. The root system of a finite
    /// algebra is constructed completely right away.
    pub fn new(algebra: Arc<Algebra>) -> Self {
        let rank = algebra.rank();

        let mut csa = Root::with_norm(RootVector::zero(rank), 0);
        csa.set_mult(rank as u64);
        csa.set_co_mult(Rational::zero());
        let mut roots = vec![BTreeMap::from([(csa.vector().clone(), csa)])];

        let mut result = if rank == 0 {
            Self {
                algebra,
                roots,
                multiples: vec![BTreeMap::new()],
                constructed_height: 0,
                fully_constructed: false,
                anomalies: Vec::new(),
            }
        } else {
            let simple_roots = algebra
                .real_indices()
                .map(|i| {
                    let norm = algebra.normalization(i) * algebra.cartan_entry(i, i);
                    let mut root = Root::with_norm(RootVector::simple(rank, i), norm);
                    root.set_mult(1);
                    root.set_co_mult(Rational::one());
                    (root.vector().clone(), root)
                })
                .collect();
            roots.push(simple_roots);

            Self {
                algebra,
                roots,
                multiples: vec![BTreeMap::new(), BTreeMap::new()],
                constructed_height: 1,
                fully_constructed: false,
                anomalies: Vec::new(),
            }
        };

        if result.algebra.is_finite() {
            // The Coxeter number of a finite algebra of rank r is at most 4r^2.
            let budget = 4 * rank * rank;
            result.construct_until_exhausted(budget);
        }
        result
    }

    pub fn algebra(&self) -> &Arc<Algebra> {
        &self.algebra
    }

    pub fn rank(&self) -> usize {
        self.algebra.rank()
    }

    /// The height up to which the multiplicities are known.
    pub fn constructed_height(&self) -> usize {
        self.constructed_height
    }

    pub fn is_fully_constructed(&self) -> bool {
        self.fully_constructed
    }

    pub fn state(&self) -> ConstructionState {
        if self.fully_constructed {
            ConstructionState::FullyConstructed
        } else if self.constructed_height <= 1 {
            ConstructionState::Unconstructed
        } else {
            ConstructionState::Constructing
        }
    }

    /// Iterates through the constructed roots of height `height` in lexicographic order. This is
    /// empty if `height` has not been constructed.
    pub fn roots(&self, height: usize) -> impl Iterator<Item = &Root> + '_ {
        self.roots
            .get(height)
            .filter(|_| height <= self.constructed_height)
            .into_iter()
            .flat_map(BTreeMap::values)
    }

    /// The constructed root with vector `vector`, if there is one.
    pub fn root(&self, vector: &RootVector) -> Option<&Root> {
        let height = usize::try_from(vector.height()).ok()?;
        if height > self.constructed_height {
            return None;
        }
        self.roots[height].get(vector)
    }

    /// The root multiples of height `height` and their co-multiplicities.
    pub fn multiples(&self, height: usize) -> impl Iterator<Item = (&RootVector, &Rational)> + '_ {
        self.multiples
            .get(height)
            .filter(|_| height <= self.constructed_height)
            .into_iter()
            .flatten()
    }

    /// The number of constructed roots, excluding the Cartan subalgebra.
    pub fn num_roots(&self) -> usize {
        (1..=self.constructed_height)
            .map(|h| self.roots[h].len())
            .sum()
    }

    /// The multiplicity of the root whose vector is the absolute value of `vector`. This is 0 if
    /// that is not a constructed root. The Cartan subalgebra is not a root, so the zero vector
    /// has multiplicity 0 as well.
    pub fn multiplicity(&self, vector: &RootVector) -> u64 {
        let vector = vector.abs();
        match usize::try_from(vector.height()) {
            Ok(height) if height > 0 && height <= self.constructed_height => self.roots[height]
                .get(&vector)
                .map_or(0, Root::mult),
            _ => 0,
        }
    }

    /// The stored co-multiplicity of a constructed root.
    pub fn co_mult(&self, vector: &RootVector) -> Option<&Rational> {
        self.root(vector)?.co_mult()
    }

    /// The multiplicity anomalies encountered so far, in the order they were found.
    pub fn anomalies(&self) -> &[MultiplicityAnomaly] {
        &self.anomalies
    }

    /// The lowest height at which Peterson's formula misbehaved. Multiplicities at this height
    /// and above should not be trusted.
    pub fn first_anomalous_height(&self) -> Option<usize> {
        self.anomalies.iter().map(|a| a.height).min()
    }

    /// Constructs the root system up to and including height `max_height`. Heights that have
    /// already been constructed are left untouched, so this may be called repeatedly.
    #[tracing::instrument(skip(self), fields(algebra = %self.algebra.name()))]
    pub fn construct(&mut self, max_height: usize) {
        if self.fully_constructed || self.rank() == 0 {
            return;
        }
        while self.constructed_height < max_height {
            if !self.step() {
                break;
            }
        }
    }

    /// Keeps constructing until the highest root is reached, but at most `max_steps` more
    /// heights. Returns whether the root system is now fully constructed. For an algebra that is
    /// not finite this only returns `false`.
    #[tracing::instrument(skip(self), fields(algebra = %self.algebra.name()))]
    pub fn construct_until_exhausted(&mut self, max_steps: usize) -> bool {
        if self.rank() == 0 {
            return self.fully_constructed;
        }
        for _ in 0..max_steps {
            if !self.step() {
                break;
            }
        }
        self.fully_constructed
    }

    /// Constructs height `constructed_height + 1`. Returns `false` if there are no roots at that
    /// height, in which case the root system is now fully constructed.
    fn step(&mut self) -> bool {
        if self.fully_constructed {
            return false;
        }

        let height = self.constructed_height;
        let next_height = height + 1;

        self.extend_root_strings(height);

        if self.roots.get(next_height).map_or(true, BTreeMap::is_empty) {
            // We did nothing, and thus reached the highest root
            self.fully_constructed = true;
            tracing::debug!("Highest root reached at height {height}");
            return false;
        }

        let updates = self.compute_new_roots(next_height);
        self.apply_updates(next_height, updates);

        let multiples = self.compute_multiples(next_height);
        self.multiples.push(multiples);

        self.constructed_height = next_height;
        tracing::debug!(
            "Constructed height {next_height}: {} roots, {} root multiples",
            self.roots[next_height].len(),
            self.multiples[next_height].len()
        );
        true
    }

    /// Writes the data computed for the roots at `height` into their bucket and records the
    /// anomalies.
    fn apply_updates(&mut self, height: usize, updates: Vec<RootUpdate>) {
        let bucket = &mut self.roots[height];
        for update in updates {
            let root = bucket
                .get_mut(&update.vector)
                .expect("updates are computed from the bucket");
            root.set_mult(update.mult);
            root.set_co_mult(update.co_mult);
            if let Some(anomaly) = update.anomaly {
                tracing::debug!("{anomaly}");
                self.anomalies.push(anomaly);
            }
        }
    }

    /// Adds the roots obtained by extending the root strings through the roots of height
    /// `height`. For a root $\beta$ and a real simple root $\alpha_i$ with negative Dynkin label
    /// $-p$, the vectors $\beta + j \alpha_i$ for $1 \leq j \leq p$ are roots, and the last one is
    /// the Weyl reflection of $\beta$, which has the same multiplicity.
    ///
    /// A vector that is already present is not replaced, so the first insertion wins.
    fn extend_root_strings(&mut self, height: usize) {
        let mut new_roots = Vec::new();
        for beta in self.roots[height].values() {
            let labels = self.algebra.root_to_weight(beta.vector());
            for i in self.algebra.real_indices() {
                if labels[i] >= 0 {
                    continue;
                }
                let p_max = -labels[i];
                for j in 1..=p_max {
                    let mut vector = beta.vector().clone();
                    vector.add_to_component(i, j);
                    let mult = (j == p_max).then_some(beta.mult());
                    new_roots.push((height + j as usize, vector, mult));
                }
            }
        }

        for (new_height, vector, mult) in new_roots {
            if self.roots.len() <= new_height {
                // This will be the first time this height will be reached
                self.roots.resize_with(new_height + 1, BTreeMap::new);
            }
            if self.roots[new_height].contains_key(&vector) {
                continue;
            }
            let mut root = Root::with_norm(vector.clone(), self.algebra.norm_of(&vector));
            if let Some(mult) = mult {
                root.set_mult(mult);
            }
            self.roots[new_height].insert(vector, root);
        }
    }

    /// Computes the multiplicity and co-multiplicity of every root at `height`. All lower heights
    /// must have been constructed.
    fn compute_new_roots(&self, height: usize) -> Vec<RootUpdate> {
        let pending: Vec<&Root> = self.roots[height].values().collect();

        #[cfg(feature = "concurrent")]
        let updates: Vec<RootUpdate> = {
            use rayon::prelude::*;
            pending
                .into_par_iter()
                .map(|root| self.compute_root(root, height))
                .collect()
        };

        #[cfg(not(feature = "concurrent"))]
        let updates: Vec<RootUpdate> = pending
            .into_iter()
            .map(|root| self.compute_root(root, height))
            .collect();

        updates
    }

    fn compute_root(&self, root: &Root, height: usize) -> RootUpdate {
        let co_mult = self.co_mult_excluding_self(root);
        let mut anomaly = None;

        let mult = if root.mult() != 0 {
            root.mult()
        } else {
            // First try to get the multiplicity from another root in the Weyl orbit. A single
            // reflection down suffices since everything below has been computed.
            let labels = self.algebra.root_to_weight(root.vector());
            match self.algebra.real_indices().find(|&i| labels[i] > 0) {
                Some(i) => {
                    let reflected = self.algebra.simple_weyl_reflect(root.vector(), i);
                    self.multiplicity(&reflected)
                }
                None => {
                    let result = self.peterson(root, &co_mult, height);
                    anomaly = result.anomaly;
                    result.mult
                }
            }
        };

        RootUpdate {
            vector: root.vector().clone(),
            mult,
            co_mult: co_mult + Rational::from_integer(BigInt::from(mult)),
            anomaly,
        }
    }

    /// The root multiples of height `height` whose co-multiplicities are needed by Peterson's
    /// formula. Multiples that are roots themselves are skipped, since they are already counted.
    fn compute_multiples(&self, height: usize) -> BTreeMap<RootVector, Rational> {
        let mut multiples = BTreeMap::new();
        for i in (1..=height / 2).filter(|i| height % i == 0) {
            let factor = (height / i) as i64;
            for root in self.roots[i].values() {
                let multiple = root.vector().scale(factor);
                if self.roots[height].contains_key(&multiple) {
                    continue;
                }
                let co_mult = self.divisor_co_mult(&multiple);
                *multiples.entry(multiple).or_insert_with(Rational::zero) += co_mult;
            }
        }
        multiples
    }

    /// The co-multiplicity of `root` minus its own multiplicity. This vanishes for real roots.
    fn co_mult_excluding_self(&self, root: &Root) -> Rational {
        if root.norm() > 0 {
            Rational::zero()
        } else {
            self.divisor_co_mult(root.vector())
        }
    }

    /// The sum of $\mathrm{mult}(v / i) / i$ over all integers $i \geq 2$ dividing `vector`.
    fn divisor_co_mult(&self, vector: &RootVector) -> Rational {
        (2..=vector.highest())
            .filter_map(|i| {
                let divided = vector.divide(i)?;
                Some(Rational::new(
                    BigInt::from(self.multiplicity(&divided)),
                    BigInt::from(i),
                ))
            })
            .fold(Rational::zero(), |acc, x| acc + x)
    }

    /// Recomputes the co-multiplicity of a constructed root from the multiplicities of its
    /// divisors and its own multiplicity. This agrees with [`RootSystem::co_mult`].
    pub fn recompute_co_mult(&self, vector: &RootVector) -> Option<Rational> {
        let root = self.root(vector)?;
        Some(self.co_mult_excluding_self(root) + Rational::from_integer(BigInt::from(root.mult())))
    }

    /// Computes the multiplicity of `root` with Peterson's formula
    ///
    /// $$ (\langle \alpha, \alpha \rangle - 2 \langle \rho, \alpha \rangle) c_\alpha
    ///     = \sum_{\beta + \gamma = \alpha} \langle \beta, \gamma \rangle c_\beta c_\gamma, $$
    ///
    /// where $c$ is the co-multiplicity and $\beta, \gamma$ run through the roots and root
    /// multiples of positive height. `co_mult` is the co-multiplicity of `root` minus its
    /// multiplicity. All heights below `height` must have been constructed.
    ///
    /// A value that is not a non-negative integer fitting in a `u64` is reported in
    /// [`Peterson::anomaly`], and so is a vanishing left hand side factor, in which case the
    /// multiplicity is 0.
    pub fn peterson(&self, root: &Root, co_mult: &Rational, height: usize) -> Peterson {
        let vector = root.vector();

        // The sum is symmetric in beta and gamma, so we sum over the lower half of the heights
        // and double, adding the middle term once if the height is even.
        let mut sum = Rational::zero();
        for i in 1..(height + 1) / 2 {
            sum += self.peterson_part(vector, i, height - i);
        }
        sum *= Rational::from_integer(BigInt::from(2));
        if height % 2 == 0 {
            sum += self.peterson_part(vector, height / 2, height / 2);
        }

        let denominator = self.algebra.norm_of(vector) - 2 * self.algebra.rho(vector);
        if denominator == 0 {
            return Peterson {
                mult: 0,
                anomaly: Some(MultiplicityAnomaly {
                    vector: vector.clone(),
                    height,
                    value: sum,
                    kind: AnomalyKind::VanishingDenominator,
                }),
            };
        }
        let value = sum / Rational::from_integer(BigInt::from(denominator)) - co_mult;

        let rounded = round_half_even(&value);
        let mult = rounded.to_u64();
        let kind = match (value.is_integer(), mult) {
            (true, Some(_)) => None,
            (false, _) => Some(AnomalyKind::NonIntegral),
            (true, None) => Some(AnomalyKind::OutOfRange),
        };

        Peterson {
            mult: mult.unwrap_or(0),
            anomaly: kind.map(|kind| MultiplicityAnomaly {
                vector: vector.clone(),
                height,
                value,
                kind,
            }),
        }
    }

    /// The terms of Peterson's formula with $\beta$ of height `beta_height` and $\gamma$ of
    /// height `gamma_height`. Both $\beta$ and $\gamma$ may be roots or root multiples.
    fn peterson_part(&self, vector: &RootVector, beta_height: usize, gamma_height: usize) -> Rational {
        let betas = self.roots[beta_height]
            .iter()
            .map(|(v, root)| (v, constructed_co_mult(root)))
            .chain(self.multiples[beta_height].iter());

        let mut sum = Rational::zero();
        for (beta, beta_co_mult) in betas {
            let Some(gamma) = vector.checked_sub(beta) else {
                continue;
            };
            let gamma_co_mult = match self.roots[gamma_height].get(&gamma) {
                Some(root) => constructed_co_mult(root),
                None => match self.multiples[gamma_height].get(&gamma) {
                    Some(c) => c,
                    None => continue,
                },
            };
            let product = self.algebra.inner_product(beta, &gamma);
            sum += beta_co_mult * gamma_co_mult * Rational::from_integer(BigInt::from(product));
        }
        sum
    }

    /// A summary of the number of roots and root multiples at each constructed height.
    pub fn graded_count_string(&self) -> String {
        let mut result = String::new();
        for h in 1..=self.constructed_height {
            writeln!(
                result,
                "{h}: {} roots, {} multiples",
                self.roots[h].len(),
                self.multiples[h].len()
            )
            .unwrap();
        }
        result
    }
}

fn constructed_co_mult(root: &Root) -> &Rational {
    root.co_mult()
        .expect("co-multiplicities of constructed roots are known")
}

/// Rounds to the nearest integer, with ties going to the even neighbour.
fn round_half_even(value: &Rational) -> BigInt {
    let floor = value.floor();
    let fract = value - &floor;
    let half = Rational::new(BigInt::one(), BigInt::from(2));
    let floor = floor.to_integer();
    match fract.cmp(&half) {
        std::cmp::Ordering::Less => floor,
        std::cmp::Ordering::Greater => floor + 1,
        std::cmp::Ordering::Equal => {
            if (&floor % 2u32).is_zero() {
                floor
            } else {
                floor + 1
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn feingold_frenkel(height: usize) -> RootSystem {
        let mut rs = RootSystem::new(Arc::new(Algebra::feingold_frenkel()));
        rs.construct(height);
        rs
    }

    fn rational(n: i64, d: i64) -> Rational {
        Rational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_simple_roots() {
        let rs = feingold_frenkel(1);
        assert_eq!(rs.state(), ConstructionState::Unconstructed);
        let simple: Vec<_> = rs.roots(1).collect();
        assert_eq!(simple.len(), 3);
        for root in simple {
            let i = root.vector().components().iter().position(|&c| c == 1).unwrap();
            assert_eq!(root.mult(), 1);
            assert_eq!(
                root.norm(),
                rs.algebra().cartan_entry(i, i) * rs.algebra().normalization(i)
            );
            assert_eq!(root.co_mult(), Some(&Rational::one()));
        }
    }

    #[test]
    fn test_height_two() {
        let rs = feingold_frenkel(2);
        assert_eq!(rs.state(), ConstructionState::Constructing);

        let delta = RootVector::from([0, 1, 1]);
        let root = rs.root(&delta).unwrap();
        assert_eq!(root.mult(), 1);
        assert_eq!(root.norm(), 0);
        assert_eq!(rs.co_mult(&delta), Some(&Rational::one()));

        let multiples: Vec<_> = rs.multiples(2).map(|(v, c)| (v.to_string(), c.clone())).collect();
        assert_eq!(
            multiples,
            vec![
                ("(0, 0, 2)".to_string(), rational(1, 2)),
                ("(0, 2, 0)".to_string(), rational(1, 2)),
                ("(2, 0, 0)".to_string(), rational(1, 2)),
            ]
        );
    }

    #[test]
    fn test_imaginary_co_mult() {
        let rs = feingold_frenkel(4);
        // 2 delta is a root of multiplicity 1 and delta has multiplicity 1.
        let two_delta = RootVector::from([0, 2, 2]);
        assert_eq!(rs.multiplicity(&two_delta), 1);
        assert_eq!(rs.co_mult(&two_delta), Some(&rational(3, 2)));
        assert_eq!(rs.recompute_co_mult(&two_delta).as_ref(), rs.co_mult(&two_delta));
    }

    #[rstest]
    #[case([1, 2, 2], 2)]
    #[case([1, 3, 3], 3)]
    #[case([1, 4, 4], 5)]
    #[case([1, 5, 5], 7)]
    #[case([2, 4, 4], 7)]
    fn test_multiplicities(#[case] v: [i64; 3], #[case] mult: u64) {
        let rs = feingold_frenkel(15);
        assert_eq!(rs.multiplicity(&v.into()), mult);
    }

    #[test]
    fn test_multiplicity_lookup() {
        let rs = feingold_frenkel(3);
        assert_eq!(rs.multiplicity(&[0, -1, -1].into()), 1);
        assert_eq!(rs.multiplicity(&[0, 0, 0].into()), 0);
        assert_eq!(rs.multiplicity(&[1, 0, 1].into()), 0);
        // Above the constructed height.
        assert_eq!(rs.multiplicity(&[1, 1, 2].into()), 0);
        assert!(rs.root(&[1, 1, 2].into()).is_none());
        // The Cartan subalgebra placeholder is still there.
        assert_eq!(rs.root(&[0, 0, 0].into()).unwrap().mult(), 3);
    }

    #[test]
    fn test_finite_a2() {
        let algebra =
            Algebra::from_cartan("A2", vec![vec![2, -1], vec![-1, 2]], vec![1, 1], true).unwrap();
        let mut rs = RootSystem::new(Arc::new(algebra));
        assert_eq!(rs.state(), ConstructionState::FullyConstructed);
        assert_eq!(rs.constructed_height(), 2);
        assert_eq!(rs.num_roots(), 3);
        assert_eq!(rs.multiplicity(&[1, 1].into()), 1);

        rs.construct(10);
        assert_eq!(rs.constructed_height(), 2);
        assert!(rs.construct_until_exhausted(10));
    }

    #[test]
    fn test_finite_g2() {
        let algebra =
            Algebra::from_cartan("G2", vec![vec![2, -1], vec![-3, 2]], vec![1, 3], true).unwrap();
        let rs = RootSystem::new(Arc::new(algebra));
        assert!(rs.is_fully_constructed());
        assert_eq!(rs.num_roots(), 6);
        assert_eq!(rs.constructed_height(), 5);
        assert!(rs.roots(5).all(|r| r.mult() == 1));
    }

    #[test]
    fn test_rank_zero() {
        let algebra = Algebra::from_cartan("0", vec![], vec![], false).unwrap();
        let mut rs = RootSystem::new(Arc::new(algebra));
        rs.construct(10);
        assert_eq!(rs.constructed_height(), 0);
        assert_eq!(rs.num_roots(), 0);
        assert!(!rs.is_fully_constructed());
    }

    #[test]
    fn test_budget() {
        let mut rs = RootSystem::new(Arc::new(Algebra::feingold_frenkel()));
        assert!(!rs.construct_until_exhausted(5));
        assert_eq!(rs.constructed_height(), 6);
        assert!(rs.anomalies().is_empty());
        assert_eq!(rs.first_anomalous_height(), None);
    }

    fn shared() -> &'static RootSystem {
        static ROOT_SYSTEM: std::sync::OnceLock<RootSystem> = std::sync::OnceLock::new();
        ROOT_SYSTEM.get_or_init(|| feingold_frenkel(14))
    }

    proptest! {
        #[test]
        fn test_lookup_properties(v in proptest::collection::vec(0i64..7, 3)) {
            let rs = shared();
            let v = RootVector::new(v);
            prop_assume!(v.height() > 0 && v.height() <= 14);

            let mult = rs.multiplicity(&v);
            prop_assert_eq!(mult, rs.multiplicity(&v.scale(-1)));
            prop_assert_eq!(mult > 0, rs.root(&v).is_some());
            if let Some(root) = rs.root(&v) {
                // Real roots have norm 2 and multiplicity 1, the others are imaginary.
                prop_assert!(root.norm() <= 2);
                if root.norm() == 2 {
                    prop_assert_eq!(mult, 1);
                }
            }
        }
    }

    #[test]
    fn test_peterson_anomalies() {
        let rs = feingold_frenkel(4);
        let root = Root::new([1, 2, 2].into());

        assert_eq!(
            rs.peterson(&root, &Rational::zero(), 5),
            Peterson {
                mult: 2,
                anomaly: None
            }
        );

        // The rounded value is still used
        let result = rs.peterson(&root, &rational(1, 3), 5);
        assert_eq!(result.mult, 2);
        let anomaly = result.anomaly.unwrap();
        assert_eq!(anomaly.kind, AnomalyKind::NonIntegral);
        assert_eq!(anomaly.value, rational(5, 3));
        assert_eq!(anomaly.vector, RootVector::from([1, 2, 2]));
        assert_eq!(anomaly.height, 5);
        expect_test::expect!["multiplicity of root (1, 2, 2) is not an integer but 5/3"]
            .assert_eq(&anomaly.to_string());

        let result = rs.peterson(&root, &rational(100, 1), 5);
        assert_eq!(result.mult, 0);
        let anomaly = result.anomaly.unwrap();
        assert_eq!(anomaly.kind, AnomalyKind::OutOfRange);
        assert_eq!(anomaly.value, rational(-98, 1));
        expect_test::expect!["multiplicity of root (1, 2, 2) is out of range: -98"]
            .assert_eq(&anomaly.to_string());
    }

    #[test]
    fn test_vanishing_denominator() {
        // The simple root of A1 has norm 2 and pairs with rho to 1.
        let algebra = Algebra::from_cartan("A1", vec![vec![2]], vec![1], true).unwrap();
        let rs = RootSystem::new(Arc::new(algebra));
        assert!(rs.is_fully_constructed());

        let result = rs.peterson(&Root::new([1].into()), &Rational::zero(), 1);
        assert_eq!(result.mult, 0);
        let anomaly = result.anomaly.unwrap();
        assert_eq!(anomaly.kind, AnomalyKind::VanishingDenominator);
        assert!(anomaly.value.is_zero());
        expect_test::expect![
            "Peterson's formula is undefined at root (1): the denominator vanishes"
        ]
        .assert_eq(&anomaly.to_string());
    }

    #[test]
    fn test_anomalies_are_recorded() {
        let mut rs = feingold_frenkel(3);
        // Height 4 already holds roots found through the root strings at height 2.
        let (vector, mult) = rs.roots[4]
            .values()
            .map(|root| (root.vector().clone(), root.mult()))
            .next()
            .unwrap();
        let anomaly = MultiplicityAnomaly {
            vector: vector.clone(),
            height: 4,
            value: rational(7, 2),
            kind: AnomalyKind::NonIntegral,
        };

        rs.apply_updates(
            4,
            vec![RootUpdate {
                vector: vector.clone(),
                mult,
                co_mult: Rational::one(),
                anomaly: Some(anomaly.clone()),
            }],
        );
        assert_eq!(rs.anomalies(), &[anomaly]);
        assert_eq!(rs.first_anomalous_height(), Some(4));
        assert_eq!(rs.roots[4][&vector].co_mult(), Some(&Rational::one()));
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(&rational(5, 2)), BigInt::from(2));
        assert_eq!(round_half_even(&rational(7, 2)), BigInt::from(4));
        assert_eq!(round_half_even(&rational(-5, 2)), BigInt::from(-2));
        assert_eq!(round_half_even(&rational(10, 3)), BigInt::from(3));
        assert_eq!(round_half_even(&rational(-10, 3)), BigInt::from(-3));
        assert_eq!(round_half_even(&rational(6, 1)), BigInt::from(6));
    }

    #[test]
    fn test_graded_count_string() {
        let rs = feingold_frenkel(4);
        expect_test::expect![[r#"
            1: 3 roots, 0 multiples
            2: 2 roots, 3 multiples
            3: 3 roots, 3 multiples
            4: 3 roots, 4 multiples
        "#]]
        .assert_eq(&rs.graded_count_string());
    }
}
