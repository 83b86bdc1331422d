//! Load calculation plugin for the U30 video scaler.
//!
//! The resource manager hands every scaler admission request to this plugin
//! as a JSON document and gets back the share of one scaler device the
//! request would occupy, in units of [`load::MAX_LOAD_GRANULARITY`]:
//! - [`request`]: parses the document into an [`api_types::Request`]
//! - [`load`]: prices the scaler sessions of a parsed request
//! - [`ffi`]: the C entry points the daemon loads by symbol name

use error_stack::Report;
use error_stack::ResultExt;

pub mod config;
pub mod error;
pub mod ffi;
pub mod load;
pub mod request;

/// Result type using error-stack for context-rich error reporting
pub type Result<T, C> = core::result::Result<T, Report<C>>;

pub use error::{CalcError, ParseError, PluginError};
pub use load::{calculate, CalcOutput, LoadSource, SessionLoad};

/// Parses a request document and calculates its scaler load.
pub fn calc_percent(input: &str) -> Result<CalcOutput, PluginError> {
    let request =
        request::parse(input).map_err(|err| Report::new(err).change_context(PluginError::Parse))?;
    load::calculate(&request.parameters, &request.resources).change_context(PluginError::Calculate)
}
