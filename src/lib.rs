#![warn(missing_docs)]
//! # cassandra
//!
//! `cassandra` is a library for exact probabilistic inference over
//! Bayesian networks whose variables may be continuous, discrete, or a mix
//! of both.
//!
//! A network is built from [`models::Node`]s — each either a root with an
//! unconditional marginal density, a continuous child with a structural
//! equation under Gaussian noise, or a discrete child with a conditional
//! probability table — wired into a [`models::Network`] that validates
//! acyclicity at construction. Queries are answered by sum-product variable
//! elimination (see [`inference::Inference::infer`]), which factorises the
//! network, eliminates every variable but the query and its evidence, and
//! normalises the remaining factor over the query's domain.

/// Directed graph substrate used to validate and order a network's
/// variables.
pub mod graphs;
/// Exact inference algorithms over [`models::Network`].
pub mod inference;
/// Model structures: nodes, factors, and networks.
pub mod models;
/// Support types shared across the crate.
pub mod types;
/// Utility functions, notably numerical integration.
pub mod utils;
