//! Shared request model for the scaler load plugin
//!
//! This crate contains the in-memory form of a load-calculation request as
//! handed over by the resource manager: the global job parameters and one
//! resource descriptor per requested session.

use serde::Deserialize;
use serde::Serialize;

/// Rational frames-per-second value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRate {
    pub numerator: i32,
    pub denominator: i32,
}

impl FrameRate {
    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

impl std::fmt::Display for FrameRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// One video format plane, either a session input or one ladder output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: i32,
    pub height: i32,
    pub frame_rate: FrameRate,
}

impl Resolution {
    pub const fn new(width: i32, height: i32, frame_rate: FrameRate) -> Self {
        Self {
            width,
            height,
            frame_rate,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}@{}", self.width, self.height, self.frame_rate)
    }
}

/// Function a resource descriptor asks the device for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceFunction {
    Scaler,
    Encoder,
    /// Any function this plugin does not price (decoder, lookahead, ...)
    Other(String),
}

impl ResourceFunction {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceFunction::Scaler => "SCALER",
            ResourceFunction::Encoder => "ENCODER",
            ResourceFunction::Other(name) => name,
        }
    }
}

impl From<&str> for ResourceFunction {
    fn from(name: &str) -> Self {
        match name {
            "SCALER" => ResourceFunction::Scaler,
            "ENCODER" => ResourceFunction::Encoder,
            other => ResourceFunction::Other(other.to_string()),
        }
    }
}

impl From<String> for ResourceFunction {
    fn from(name: String) -> Self {
        match name.as_str() {
            "SCALER" => ResourceFunction::Scaler,
            "ENCODER" => ResourceFunction::Encoder,
            _ => ResourceFunction::Other(name),
        }
    }
}

impl From<ResourceFunction> for String {
    fn from(function: ResourceFunction) -> Self {
        match function {
            ResourceFunction::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ResourceFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One requested session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub function: ResourceFunction,
    /// Pixel format, carried through unchanged
    pub format: String,
    /// Caller-declared load in whole devices (deprecated override)
    pub channel_load: i32,
    /// Only populated for ENCODER resources
    pub lookahead_load: i32,
    pub input: Resolution,
    /// Ladder outputs in request order, only populated for SCALER resources
    pub outputs: Vec<Resolution>,
}

impl ResourceDescriptor {
    pub fn is_scaler(&self) -> bool {
        self.function == ResourceFunction::Scaler
    }
}

/// Global parameters shared by every resource of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParameters {
    /// Number of equal concurrent jobs the caller plans to run, `-1` when not supplied
    pub job_count: i32,
}

impl JobParameters {
    pub const JOB_COUNT_UNSET: i32 = -1;

    /// Returns the job count when the caller supplied a usable one
    pub fn job_count(&self) -> Option<i32> {
        (self.job_count > 0).then_some(self.job_count)
    }
}

impl Default for JobParameters {
    fn default() -> Self {
        Self {
            job_count: Self::JOB_COUNT_UNSET,
        }
    }
}

/// A fully parsed load-calculation request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub parameters: JobParameters,
    pub resources: Vec<ResourceDescriptor>,
}

impl Request {
    pub fn scaler_sessions(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.resources.iter().filter(|r| r.is_scaler())
    }
}
