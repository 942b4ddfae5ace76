//! annogen-core - Declaration model, errors, and configuration
//!
//! This crate provides the shared vocabulary for the annogen pipeline:
//! - [`Declaration`] and friends describing parsed contracts, value types and enumerations
//! - [`Annotation`] and [`Strategy`] typed tags selecting generators
//! - [`Corpus`] immutable name lookup over a whole generation run
//! - [`GenerationError`] for every problem surfaced to the driver
//! - [`GeneratorConfig`] for run configuration

mod annotation;
mod config;
mod corpus;
mod error;
mod fixture;
mod model;
pub mod parallel;

pub use annotation::{Annotation, Strategy};
pub use config::{ConfigError, GeneratorConfig, NamingConvention};
pub use corpus::Corpus;
pub use error::{ErrorCategory, GenerationError};
pub use fixture::FixtureProvider;
pub use model::{
    Contract, Declaration, DeclarationKind, Enumeration, Field, FunctionType, GeneratedArtifact,
    Initializer, Method, Parameter, ParsedDeclaration, TypeRef, ValueForm, ValueType,
};

/// Log levels accepted by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Annotation, Corpus, Declaration, DeclarationKind, GenerationError,
        GeneratedArtifact, GeneratorConfig, LogLevel, Strategy, TypeRef,
    };
}

#[cfg(test)]
mod lib_tests;
