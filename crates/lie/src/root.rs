use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;

use itertools::Itertools;

use crate::Rational;

/// A vector in the root lattice, written in the basis of simple roots.
///
/// This is a plain value: two vectors are equal if and only if their components are equal, and
/// the ordering is lexicographic in the components. The ordering is what fixes the order of roots
/// within a height both during construction and when exporting the table.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RootVector(Vec<i64>);

impl RootVector {
    pub fn new(components: Vec<i64>) -> Self {
        Self(components)
    }

    pub fn zero(rank: usize) -> Self {
        Self(vec![0; rank])
    }

    /// The `i`th simple root of an algebra of rank `rank`.
    pub fn simple(rank: usize, i: usize) -> Self {
        let mut v = Self::zero(rank);
        v.0[i] = 1;
        v
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn components(&self) -> &[i64] {
        &self.0
    }

    pub fn into_components(self) -> Vec<i64> {
        self.0
    }

    pub fn height(&self) -> i64 {
        self.0.iter().sum()
    }

    /// The largest component. This is 0 for a vector of rank 0.
    pub fn highest(&self) -> i64 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// Divides every component by `factor`. Returns `None` if some component is not divisible by
    /// `factor`, i.e. if the vector is not `factor` times a lattice vector.
    pub fn divide(&self, factor: i64) -> Option<Self> {
        if factor == 0 {
            return None;
        }
        self.0
            .iter()
            .map(|&c| (c % factor == 0).then(|| c / factor))
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    pub fn scale(&self, factor: i64) -> Self {
        Self(self.0.iter().map(|&c| c * factor).collect())
    }

    pub fn abs(&self) -> Self {
        Self(self.0.iter().map(|c| c.abs()).collect())
    }

    pub fn add_to_component(&mut self, i: usize, amount: i64) {
        self.0[i] += amount;
    }

    /// The component-wise difference `self - other`, or `None` if some component of the result
    /// would be negative. Both vectors must have the same length.
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        assert_eq!(self.len(), other.len());
        self.0
            .iter()
            .zip(&other.0)
            .map(|(&a, &b)| (a >= b).then(|| a - b))
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }
}

impl Index<usize> for RootVector {
    type Output = i64;

    fn index(&self, i: usize) -> &i64 {
        &self.0[i]
    }
}

impl From<Vec<i64>> for RootVector {
    fn from(components: Vec<i64>) -> Self {
        Self(components)
    }
}

impl<const N: usize> From<[i64; N]> for RootVector {
    fn from(components: [i64; N]) -> Self {
        Self(components.to_vec())
    }
}

impl fmt::Display for RootVector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({})", self.0.iter().join(", "))
    }
}

/// A root together with the data computed for it during the construction of a root system.
///
/// The vector and the norm are fixed once the root is created. The remaining data is filled in
/// afterwards, each at most once:
///  - the multiplicity, where 0 means that it has not been computed yet.
///  - the co-multiplicity entering Peterson's recursion formula.
///
/// Roots compare and hash by their vector only.
#[derive(Clone, Debug)]
pub struct Root {
    vector: RootVector,
    mult: u64,
    co_mult: Option<Rational>,
    norm: i64,
}

impl Root {
    /// A root whose norm is not known. The norm reads as 0.
    pub fn new(vector: RootVector) -> Self {
        Self::with_norm(vector, 0)
    }

    pub fn with_norm(vector: RootVector, norm: i64) -> Self {
        Self {
            vector,
            mult: 0,
            co_mult: None,
            norm,
        }
    }

    pub fn vector(&self) -> &RootVector {
        &self.vector
    }

    pub fn mult(&self) -> u64 {
        self.mult
    }

    pub fn co_mult(&self) -> Option<&Rational> {
        self.co_mult.as_ref()
    }

    /// The value of the bilinear form on the root with itself.
    pub fn norm(&self) -> i64 {
        self.norm
    }

    /// Records the multiplicity. Once it is nonzero it can only be set to the same value again.
    pub fn set_mult(&mut self, mult: u64) {
        assert!(
            self.mult == 0 || self.mult == mult,
            "multiplicity of {} is already {}, cannot set it to {mult}",
            self.vector,
            self.mult
        );
        self.mult = mult;
    }

    /// Records the co-multiplicity. This can be done only once.
    pub fn set_co_mult(&mut self, co_mult: Rational) {
        assert!(
            self.co_mult.is_none(),
            "co-multiplicity of {} is already known",
            self.vector
        );
        self.co_mult = Some(co_mult);
    }

    pub fn height(&self) -> i64 {
        self.vector.height()
    }

    pub fn highest(&self) -> i64 {
        self.vector.highest()
    }

    /// The first component. The visualization groups roots by this value.
    pub fn level(&self) -> i64 {
        self.vector.components().first().copied().unwrap_or(0)
    }

    /// A fresh root whose vector is this one divided by `factor`, if that is a lattice vector.
    pub fn divide(&self, factor: i64) -> Option<Self> {
        self.vector.divide(factor).map(Self::new)
    }

    /// A fresh root whose vector is `factor` times this one. The derived data is reset.
    pub fn scale(&self, factor: i64) -> Self {
        Self::new(self.vector.scale(factor))
    }
}

impl From<RootVector> for Root {
    fn from(vector: RootVector) -> Self {
        Self::new(vector)
    }
}

impl PartialEq for Root {
    fn eq(&self, other: &Self) -> bool {
        self.vector == other.vector
    }
}

impl Eq for Root {}

impl Hash for Root {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vector.hash(state);
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (mult {}, norm {})", self.vector, self.mult, self.norm)
    }
}
