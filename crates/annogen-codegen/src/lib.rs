//! annogen-codegen - Annotation resolution, generation strategies, and emission
//!
//! This crate turns a parsed corpus into Swift output:
//! - [`Resolver`] maps markers to typed tags and checks strategy preconditions
//! - [`mock`] failing mocks and fixture-backed stubs for contracts
//! - [`mapper`] DTO mapping initializers
//! - [`registration`] the dependency registration table
//! - [`composition`] reducers for feature descriptions
//! - [`emit`] per-strategy output units
//! - [`Engine`] drives a whole run and returns a [`GenerationReport`]

pub mod composition;
pub mod emit;
mod engine;
pub mod mapper;
pub mod mock;
pub mod registration;
mod resolver;
pub mod swift;

pub use engine::{Engine, Generated, GenerationContext, GenerationReport, Inspection};
pub use resolver::{Resolution, Resolver, annotations, dto_counterpart};

#[cfg(test)]
mod testing;
