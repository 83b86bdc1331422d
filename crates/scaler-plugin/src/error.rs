use api_types::FrameRate;
use derive_more::Display;
use thiserror::Error;

/// Reasons a request document could not be turned into a request model.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed request document: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("missing required field `{path}`")]
    MissingField { path: String },

    #[error("invalid field `{path}`: {reason}")]
    InvalidField { path: String, reason: String },
}

/// Reasons a parsed request cannot be priced.
#[derive(Debug, Display)]
pub enum CalcError {
    /// A scaler session must declare at least one output.
    #[display("scaler session {session} has no output resolutions")]
    MissingOutputs { session: usize },
    #[display("frame rate {frame_rate} has a zero denominator")]
    ZeroFrameRateDenominator { frame_rate: FrameRate },
    #[display("frame rate {frame_rate} is negative")]
    InvalidFrameRate { frame_rate: FrameRate },
    #[display("resolution {width}x{height} has a negative dimension")]
    InvalidResolution { width: i32, height: i32 },
    #[display("arithmetic overflow while computing {what}")]
    Overflow { what: &'static str },
    #[display("request has more than {max} scaler sessions")]
    TooManySessions { max: usize },
}

impl core::error::Error for CalcError {}

impl CalcError {
    pub fn overflow(what: &'static str) -> Self {
        Self::Overflow { what }
    }
}

/// Top-level failure of a plugin call, the underlying cause is attached to the report.
#[derive(Debug, Display)]
pub enum PluginError {
    #[display("failed to parse load request")]
    Parse,
    #[display("failed to calculate scaler load")]
    Calculate,
    #[display("invalid plugin parameter: {reason}")]
    InvalidInput { reason: String },
    #[display("result of {len} bytes does not fit the {capacity} byte output buffer")]
    OutputTooLarge { len: usize, capacity: usize },
}

impl core::error::Error for PluginError {}

impl PluginError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
