//! Typed annotation tags and generation strategies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A recognized marker tag attached to a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Annotation {
    AutoFailingMock,
    AutoStub,
    #[serde(rename = "autoMappableFromDTO")]
    AutoMappableFromDto,
    Autoregister,
    DescribesFeature,
    /// Flag honored by the composition strategy; selects no generator by itself.
    ContainsComposition,
}

impl Annotation {
    pub const ALL: [Annotation; 6] = [
        Annotation::AutoFailingMock,
        Annotation::AutoStub,
        Annotation::AutoMappableFromDto,
        Annotation::Autoregister,
        Annotation::DescribesFeature,
        Annotation::ContainsComposition,
    ];

    /// Canonical tag spelling.
    pub fn tag(&self) -> &'static str {
        match self {
            Annotation::AutoFailingMock => "autoFailingMock",
            Annotation::AutoStub => "autoStub",
            Annotation::AutoMappableFromDto => "autoMappableFromDTO",
            Annotation::Autoregister => "autoregister",
            Annotation::DescribesFeature => "describesFeature",
            Annotation::ContainsComposition => "containsComposition",
        }
    }

    /// Recognize a marker, accepting the canonical tag and known aliases.
    ///
    /// Returns `None` for unrecognized markers.
    pub fn from_marker(marker: &str) -> Option<Self> {
        let marker = marker.trim();
        let annotation = match marker {
            "autoFailingMock" | "AutoFailingMock" | "AutoFailing" | "AsyncAutoFailing" => {
                Annotation::AutoFailingMock
            }
            "autoStub" | "AutoStub" | "AsyncAutoStub" => Annotation::AutoStub,
            "autoMappableFromDTO" | "AutoMappableFromDTO" | "AutoMappable" => {
                Annotation::AutoMappableFromDto
            }
            "autoregister" | "swiftDepAutoregister" | "AutoRegister" => Annotation::Autoregister,
            "describesFeature" | "describesTCAFeature" => Annotation::DescribesFeature,
            "containsComposition" => Annotation::ContainsComposition,
            _ => return None,
        };
        Some(annotation)
    }

    /// The strategy this tag selects, if any.
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            Annotation::AutoFailingMock => Some(Strategy::AutoFailingMock),
            Annotation::AutoStub => Some(Strategy::AutoStub),
            Annotation::AutoMappableFromDto => Some(Strategy::AutoMappableFromDto),
            Annotation::Autoregister => Some(Strategy::Autoregister),
            Annotation::DescribesFeature => Some(Strategy::DescribesFeature),
            Annotation::ContainsComposition => None,
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A generation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
    AutoFailingMock,
    AutoStub,
    #[serde(rename = "autoMappableFromDTO")]
    AutoMappableFromDto,
    Autoregister,
    DescribesFeature,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::AutoFailingMock,
        Strategy::AutoStub,
        Strategy::AutoMappableFromDto,
        Strategy::Autoregister,
        Strategy::DescribesFeature,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::AutoFailingMock => "autoFailingMock",
            Strategy::AutoStub => "autoStub",
            Strategy::AutoMappableFromDto => "autoMappableFromDTO",
            Strategy::Autoregister => "autoregister",
            Strategy::DescribesFeature => "describesFeature",
        }
    }

    /// Name of the output unit collecting this strategy's fragments.
    pub fn output_unit(&self) -> &'static str {
        match self {
            Strategy::AutoFailingMock => "AutoFailingMock.generated.swift",
            Strategy::AutoStub => "AutoStub.generated.swift",
            Strategy::AutoMappableFromDto => "AutoMappableFromDTO.generated.swift",
            Strategy::Autoregister => "Autoregister.generated.swift",
            Strategy::DescribesFeature => "Feature.generated.swift",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown strategy: {s}"))
    }
}
