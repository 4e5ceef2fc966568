//! Types for working with the structural data of a Kac-Moody algebra and the vectors of its root
//! lattice, with a focus on the rank 3 hyperbolic Feingold-Frenkel algebra.
//!
//! The two main exports are [`Algebra`], which holds the Cartan matrix and evaluates the invariant
//! bilinear form, and [`Root`], a vector in the root lattice together with the quantities
//! attached to it while a root system is being constructed.

mod algebra;
pub use crate::algebra::{Algebra, AlgebraError};

mod root;
pub use crate::root::{Root, RootVector};

/// Exact rationals of unbounded precision. Co-multiplicities are stored in this type.
pub type Rational = num_rational::BigRational;
