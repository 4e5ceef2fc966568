//! This crate computes the multiplicities of the positive roots of the hyperbolic
//! Feingold-Frenkel Kac-Moody algebra. The roots are constructed height by height with the
//! root-string method, and the multiplicities that cannot be obtained from a Weyl reflection are
//! computed with Peterson's recursion formula.
//!
//! The main object is [`RootSystem`](root_system::RootSystem), which is built on top of the
//! lattice primitives of the `lie` crate. The resulting table can be written to and read from a
//! plain text file with the functions in [`table`].
//!
//! # Example
//! ```
//! use std::sync::Arc;
//!
//! use lie::Algebra;
//! use roots::root_system::RootSystem;
//!
//! let mut roots = RootSystem::new(Arc::new(Algebra::feingold_frenkel()));
//! roots.construct(10);
//! assert_eq!(roots.multiplicity(&[1, 2, 2].into()), 2);
//! ```
//!
//! # Features
//! - `concurrent`: Compute the multiplicities at each height in parallel using `rayon`.
#![allow(clippy::many_single_char_names)]
#![warn(clippy::default_trait_access)]
#![warn(clippy::if_not_else)]
#![warn(clippy::needless_continue)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::explicit_into_iter_loop)]

pub mod root_system;
pub mod table;
pub mod utils;

pub use root_system::{AnomalyKind, ConstructionState, MultiplicityAnomaly, RootSystem};
pub use table::{parse_table, read_table, TableRow};
