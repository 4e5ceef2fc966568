use std::fmt;

use itertools::Itertools;
use thiserror::Error;

use crate::root::RootVector;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlgebraError {
    #[error("row {row} of the Cartan matrix has length {len}, expected {rank}")]
    NotSquare { row: usize, len: usize, rank: usize },
    #[error("normalization has length {found}, expected {expected}")]
    NormalizationLength { expected: usize, found: usize },
    #[error("normalization entry {index} is {value}, expected a positive integer")]
    NonPositiveNormalization { index: usize, value: i64 },
}

/// The structural constants of a Kac-Moody algebra.
///
/// An algebra is determined by its Cartan matrix $A$ and a diagonal matrix $D$ of positive
/// integers such that $AD$ is symmetric. The matrix $AD$ is the `metric` and defines the invariant
/// bilinear form on the root lattice, $\langle \alpha, \beta \rangle = \alpha^T A D \beta$.
///
/// All vectors are written in the basis of simple roots. Simple roots whose diagonal Cartan entry
/// is positive are *real*; the others are *imaginary* and have no simple Weyl reflection.
///
/// The data is fixed at construction and never mutated. The only algebra this crate is really
/// meant for is [`Algebra::feingold_frenkel`]; [`Algebra::from_cartan`] exists so that other
/// (in particular finite) algebras can be used to test the machinery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Algebra {
    name: String,
    cartan: Vec<Vec<i64>>,
    d: Vec<i64>,
    finite: bool,
    metric: Vec<Vec<i64>>,
}

impl Algebra {
    /// The hyperbolic Feingold-Frenkel algebra, the rank 3 algebra whose Cartan matrix extends the
    /// affine algebra $A_1^{(1)}$ by one further node.
    pub fn feingold_frenkel() -> Self {
        Self::from_cartan(
            "F",
            vec![vec![2, -1, 0], vec![-1, 2, -2], vec![0, -2, 2]],
            vec![1, 1, 1],
            false,
        )
        .expect("Feingold-Frenkel Cartan matrix is valid")
    }

    /// Constructs an algebra from a Cartan matrix and the diagonal entries `d` of the
    /// normalization. `finite` records whether the algebra is finite dimensional, which the
    /// caller asserts rather than this function checking.
    pub fn from_cartan(
        name: &str,
        cartan: Vec<Vec<i64>>,
        d: Vec<i64>,
        finite: bool,
    ) -> Result<Self, AlgebraError> {
        let rank = cartan.len();
        if let Some((row, r)) = cartan.iter().find_position(|r| r.len() != rank) {
            return Err(AlgebraError::NotSquare {
                row,
                len: r.len(),
                rank,
            });
        }
        if d.len() != rank {
            return Err(AlgebraError::NormalizationLength {
                expected: rank,
                found: d.len(),
            });
        }
        if let Some((index, &value)) = d.iter().find_position(|&&x| x <= 0) {
            return Err(AlgebraError::NonPositiveNormalization { index, value });
        }

        let metric = cartan
            .iter()
            .map(|row| row.iter().zip(&d).map(|(a, d)| a * d).collect())
            .collect();

        Ok(Self {
            name: name.to_string(),
            cartan,
            d,
            finite,
            metric,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rank(&self) -> usize {
        self.cartan.len()
    }

    pub fn is_finite(&self) -> bool {
        self.finite
    }

    pub fn cartan_entry(&self, i: usize, j: usize) -> i64 {
        self.cartan[i][j]
    }

    pub fn normalization(&self, i: usize) -> i64 {
        self.d[i]
    }

    /// Whether the `i`th simple root is real, i.e. whether its diagonal Cartan entry is positive.
    pub fn is_real(&self, i: usize) -> bool {
        self.cartan[i][i] > 0
    }

    /// Iterates through the indices of the real simple roots.
    pub fn real_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.rank()).filter(move |&i| self.is_real(i))
    }

    /// The invariant bilinear form $v^T A D w$.
    pub fn inner_product(&self, v: &RootVector, w: &RootVector) -> i64 {
        let (v, w) = (v.components(), w.components());
        debug_assert_eq!(v.len(), self.rank());
        debug_assert_eq!(w.len(), self.rank());

        self.metric
            .iter()
            .zip(v)
            .map(|(row, &vi)| vi * row.iter().zip(w).map(|(m, &wj)| m * wj).sum::<i64>())
            .sum()
    }

    /// The norm $\langle v, v \rangle$. Roots of positive norm are real, the others imaginary.
    pub fn norm_of(&self, v: &RootVector) -> i64 {
        self.inner_product(v, v)
    }

    /// The Dynkin labels of `v`, i.e. the weight $vA$.
    pub fn root_to_weight(&self, v: &RootVector) -> Vec<i64> {
        let v = v.components();
        (0..self.rank())
            .map(|j| v.iter().zip(&self.cartan).map(|(vi, row)| vi * row[j]).sum())
            .collect()
    }

    /// The reflection of `v` in the `i`th simple root. This subtracts the `i`th Dynkin label from
    /// the `i`th component. Imaginary simple roots have no reflection, and `v` is returned
    /// unchanged.
    pub fn simple_weyl_reflect(&self, v: &RootVector, i: usize) -> RootVector {
        let mut result = v.clone();
        if !self.is_real(i) {
            return result;
        }
        let label = self.root_to_weight(v)[i];
        result.add_to_component(i, -label);
        result
    }

    /// The pairing $\langle \rho, v \rangle$ of the Weyl vector with `v`, which appears in the
    /// denominator of Peterson's formula.
    pub fn rho(&self, v: &RootVector) -> i64 {
        v.components().iter().zip(&self.d).map(|(v, d)| v * d).sum()
    }
}

impl fmt::Display for Algebra {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} [{}]",
            self.name,
            self.cartan
                .iter()
                .map(|row| format!("[{}]", row.iter().join(", ")))
                .join(", ")
        )
    }
}
