//! Request parser
//!
//! Turns the resource manager's JSON request document into a [`Request`].
//! The whole document is validated before anything is returned, so a caller
//! either gets a complete model or a single [`ParseError`].

use api_types::FrameRate;
use api_types::JobParameters;
use api_types::Request;
use api_types::Resolution;
use api_types::ResourceDescriptor;
use api_types::ResourceFunction;
use serde_json::Value;

use crate::error::ParseError;

/// A JSON value together with the dotted path it was reached by.
#[derive(Debug, Clone)]
struct Cursor<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> Cursor<'a> {
    fn join(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    /// Follows a dotted key path, `None` when any segment is absent.
    fn find(&self, dotted: &str) -> Result<Option<Cursor<'a>>, ParseError> {
        let mut current = self.clone();
        for key in dotted.split('.') {
            let path = current.join(key);
            let value: &'a Value = current.value;
            let object = value.as_object().ok_or_else(|| ParseError::InvalidField {
                path: current.path.clone(),
                reason: "expected an object".to_string(),
            })?;
            match object.get(key) {
                Some(value) => current = Cursor { value, path },
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    fn get(&self, dotted: &str) -> Result<Cursor<'a>, ParseError> {
        self.find(dotted)?.ok_or_else(|| ParseError::MissingField {
            path: self.join(dotted),
        })
    }

    fn invalid(&self, reason: impl Into<String>) -> ParseError {
        ParseError::InvalidField {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    fn as_i32(&self) -> Result<i32, ParseError> {
        let value = self
            .value
            .as_i64()
            .ok_or_else(|| self.invalid(format!("expected an integer, found {}", self.value)))?;
        i32::try_from(value).map_err(|_| self.invalid(format!("{value} is out of range")))
    }

    fn as_str(&self) -> Result<&'a str, ParseError> {
        self.value
            .as_str()
            .ok_or_else(|| self.invalid(format!("expected a string, found {}", self.value)))
    }

    fn as_array(&self) -> Result<impl Iterator<Item = Cursor<'a>> + '_, ParseError> {
        let items = self
            .value
            .as_array()
            .ok_or_else(|| self.invalid("expected an array"))?;
        Ok(items.iter().enumerate().map(move |(idx, value)| Cursor {
            value,
            path: format!("{}[{idx}]", self.path),
        }))
    }

    fn i32_or(&self, dotted: &str, default: i32) -> Result<i32, ParseError> {
        match self.find(dotted)? {
            Some(field) => field.as_i32(),
            None => Ok(default),
        }
    }
}

/// Parses a request document.
pub fn parse(input: &str) -> Result<Request, ParseError> {
    let document: Value = serde_json::from_str(input)?;
    let root = Cursor {
        value: &document,
        path: String::new(),
    };

    let parameters_node = root.get("request.parameters")?;
    let parameters = JobParameters {
        job_count: parameters_node.i32_or("job-count", JobParameters::JOB_COUNT_UNSET)?,
    };

    let resources = parameters_node
        .get("resources")?
        .as_array()?
        .map(|node| parse_resource(&node))
        .collect::<Result<Vec<_>, _>>()?;

    let request = Request {
        parameters,
        resources,
    };
    tracing::debug!(
        job_count = request.parameters.job_count,
        resources = request.resources.len(),
        "parsed load request"
    );
    Ok(request)
}

fn parse_resource(node: &Cursor<'_>) -> Result<ResourceDescriptor, ParseError> {
    let function = ResourceFunction::from(node.get("function")?.as_str()?);
    let format = node.get("format")?.as_str()?.to_string();
    let channel_load = node.i32_or("channel-load", 0)?;
    let input = parse_resolution(&node.get("resolution.input")?)?;

    let lookahead_load = match function {
        ResourceFunction::Encoder => node.i32_or("lookahead-load", 0)?,
        _ => 0,
    };

    let outputs = match function {
        ResourceFunction::Scaler => node
            .get("resolution.output")?
            .as_array()?
            .map(|output| parse_resolution(&output))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    Ok(ResourceDescriptor {
        function,
        format,
        channel_load,
        lookahead_load,
        input,
        outputs,
    })
}

fn parse_resolution(node: &Cursor<'_>) -> Result<Resolution, ParseError> {
    Ok(Resolution {
        width: node.get("width")?.as_i32()?,
        height: node.get("height")?.as_i32()?,
        frame_rate: FrameRate {
            numerator: node.get("frame-rate.num")?.as_i32()?,
            denominator: node.get("frame-rate.den")?.as_i32()?,
        },
    })
}
