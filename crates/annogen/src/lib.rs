//! # annogen
//!
//! An annotation-driven Swift source generator.
//!
//! annogen reads Swift declarations tagged with marker comments and writes
//! the boilerplate they ask for:
//! - `autoFailingMock` - a mock whose members throw until configured
//! - `autoStub` - a stub recording calls and returning fixture values
//! - `autoMappableFromDTO` - `init(dto:)` for a domain type and its DTO
//! - `autoregister` - a dependency registration table
//! - `describesFeature` / `containsComposition` - reducers built from a state description
//!
//! ## Quick Start
//!
//! ```
//! use annogen::prelude::*;
//!
//! let source = r#"
//! // sourcery: AutoFailingMock
//! protocol ClockProtocol {
//!     func now() async throws -> Date
//! }
//! "#;
//!
//! let report = Engine::default().generate(&[SourceUnit::new("Clock.swift", source)]);
//!
//! assert!(report.is_success());
//! assert!(report.outputs["AutoFailingMock.generated.swift"].contains("final class ClockFailingMock"));
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`annogen_core`] - Declaration model, errors, configuration
//! - [`annogen_parser`] - Swift declaration front end
//! - [`annogen_codegen`] - Resolution, generation strategies, emission

// Re-export core types
pub use annogen_core::{
    Annotation, ConfigError, Corpus, Declaration, DeclarationKind, ErrorCategory, FixtureProvider,
    GeneratedArtifact, GenerationError, GeneratorConfig, LogLevel, NamingConvention,
    ParsedDeclaration, Strategy, TypeRef,
};

// Re-export the front end
pub use annogen_parser::{DeclarationSource, ParseOutcome, SourceUnit, SwiftSource, parse_source};

// Re-export the engine
pub use annogen_codegen::{Engine, GenerationReport, Inspection, Resolution};

// Re-export common dependencies that embedders need
pub use serde;
pub use serde_json;
pub use tracing;

/// Generate from source units with the given configuration.
///
/// Shorthand for `Engine::new(config).generate(units)`.
pub fn generate(units: &[SourceUnit], config: GeneratorConfig) -> GenerationReport {
    Engine::new(config).generate(units)
}

/// Prelude module for convenient imports.
///
/// Use `use annogen::prelude::*;` to import commonly used types.
///
/// This includes:
/// - Driving a run: `Engine`, `GeneratorConfig`, `SourceUnit`, `GenerationReport`
/// - Results: `GeneratedArtifact`, `GenerationError`, `Strategy`
/// - Extension seams: `FixtureProvider`, `DeclarationSource`
pub mod prelude {
    pub use crate::{
        DeclarationSource, Engine, FixtureProvider, GeneratedArtifact, GenerationError,
        GenerationReport, GeneratorConfig, SourceUnit, Strategy, TypeRef,
    };
}
