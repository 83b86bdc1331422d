//! Scaler load calculator
//!
//! Prices every SCALER session of a request by its pixel rate relative to the
//! device's reference throughput, sums the sessions and reconciles the sum
//! with the caller's job-count and channel-load overrides.

use api_types::FrameRate;
use api_types::JobParameters;
use api_types::Resolution;
use api_types::ResourceDescriptor;
use derive_more::Display;
use error_stack::Report;
use error_stack::ResultExt;
use serde::Serialize;

use crate::error::CalcError;
use crate::Result;

/// Load units representing one fully used device
pub const MAX_LOAD_GRANULARITY: i32 = 1_000_000;

/// Reference pixel throughput of one device: two 4Kp60 streams
pub const DEVICE_MAX_PIXEL_RATE: u64 = 3840 * 2160 * 60 * 2;

/// Upper bound on scaler sessions priced in one request
pub const MAX_SESSIONS: usize = 64;

/// Which estimate ended up being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadSource {
    #[display("computed")]
    Computed,
    #[display("job-count")]
    JobCount,
    #[display("channel-load")]
    ChannelLoad,
}

/// Pricing of a single scaler session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionLoad {
    pub input_pixel_rate: u64,
    pub ladder_pixel_rate: u64,
    pub session_pixel_rate: u64,
    pub load: i32,
}

/// Result of a load calculation, displayed as `"<reported_load> <session_count>"`
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize)]
#[display("{reported_load} {session_count}")]
pub struct CalcOutput {
    pub reported_load: i32,
    pub session_count: i32,
    pub sessions: Vec<SessionLoad>,
    pub source: LoadSource,
}

/// Rounds a frame rate to whole frames per second, halves round up.
pub fn effective_frame_rate(frame_rate: FrameRate) -> Result<u64, CalcError> {
    if frame_rate.denominator == 0 {
        return Err(Report::new(CalcError::ZeroFrameRateDenominator { frame_rate }));
    }
    let (Ok(numerator), Ok(denominator)) = (
        u64::try_from(frame_rate.numerator),
        u64::try_from(frame_rate.denominator),
    ) else {
        return Err(Report::new(CalcError::InvalidFrameRate { frame_rate }));
    };
    Ok((numerator + (denominator >> 1)) / denominator)
}

/// Pixels per second of one resolution.
pub fn pixel_rate(resolution: &Resolution) -> Result<u64, CalcError> {
    let (Ok(width), Ok(height)) = (
        u64::try_from(resolution.width),
        u64::try_from(resolution.height),
    ) else {
        return Err(Report::new(CalcError::InvalidResolution {
            width: resolution.width,
            height: resolution.height,
        }));
    };
    let fps = effective_frame_rate(resolution.frame_rate)?;

    width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(fps))
        .ok_or_else(|| Report::new(CalcError::overflow("pixel rate")))
        .attach_printable_lazy(|| format!("resolution {resolution}"))
}

/// Prices one scaler session.
///
/// With a multi-rung ladder every rung except the last is charged on top of
/// the input; the last rung is covered by the input itself. A single output is
/// charged on its own. Either way a session never costs less than its input.
pub fn session_load(session: usize, resource: &ResourceDescriptor) -> Result<SessionLoad, CalcError> {
    let input_pixel_rate = pixel_rate(&resource.input)?;

    let (ladder_pixel_rate, summed_pixel_rate) = match resource.outputs.as_slice() {
        [] => return Err(Report::new(CalcError::MissingOutputs { session })),
        [single] => {
            let rate = pixel_rate(single)?;
            (rate, rate)
        }
        [rungs @ .., top] => {
            // the top rung is not charged but must still be well formed
            pixel_rate(top)?;
            let ladder = rungs.iter().try_fold(0u64, |acc, rung| {
                acc.checked_add(pixel_rate(rung)?)
                    .ok_or_else(|| Report::new(CalcError::overflow("ladder pixel rate")))
            })?;
            let summed = input_pixel_rate
                .checked_add(ladder)
                .ok_or_else(|| Report::new(CalcError::overflow("session pixel rate")))?;
            (ladder, summed)
        }
    };
    let session_pixel_rate = summed_pixel_rate.max(input_pixel_rate);

    let load = u128::from(MAX_LOAD_GRANULARITY.unsigned_abs()) * u128::from(session_pixel_rate)
        / u128::from(DEVICE_MAX_PIXEL_RATE);
    let load = i32::try_from(load)
        .map_err(|_| Report::new(CalcError::overflow("session load")))?
        .max(1);

    Ok(SessionLoad {
        input_pixel_rate,
        ladder_pixel_rate,
        session_pixel_rate,
        load,
    })
}

/// Computes the load a request puts on one scaler device.
///
/// Non-scaler resources are skipped, they are priced by their own plugins.
pub fn calculate(
    parameters: &JobParameters,
    resources: &[ResourceDescriptor],
) -> Result<CalcOutput, CalcError> {
    let mut sessions = Vec::new();
    let mut declared_aggregate: i64 = 0;

    for resource in resources.iter().filter(|r| r.is_scaler()) {
        let index = sessions.len();
        if index == MAX_SESSIONS {
            return Err(Report::new(CalcError::TooManySessions { max: MAX_SESSIONS }));
        }

        let session = session_load(index, resource)
            .attach_printable_lazy(|| format!("scaler session {index}: {}", resource.input))?;
        tracing::info!(
            session = index,
            input_pixel_rate = session.input_pixel_rate,
            ladder_pixel_rate = session.ladder_pixel_rate,
            session_pixel_rate = session.session_pixel_rate,
            load = session.load,
            "scaler session load computed"
        );
        sessions.push(session);

        // bounded by MAX_SESSIONS * i32::MAX * MAX_LOAD_GRANULARITY, fits i64
        declared_aggregate += i64::from(resource.channel_load) * i64::from(MAX_LOAD_GRANULARITY);
    }

    let computed_aggregate = sessions
        .iter()
        .try_fold(0i32, |acc, s| acc.checked_add(s.load))
        .ok_or_else(|| Report::new(CalcError::overflow("aggregate load")))?;

    let (reported_load, source) = reconcile(parameters, computed_aggregate, declared_aggregate);
    tracing::info!(
        computed_aggregate,
        declared_aggregate,
        job_count = parameters.job_count,
        reported_load,
        %source,
        "scaler load calculated"
    );

    Ok(CalcOutput {
        reported_load,
        // at most MAX_SESSIONS
        session_count: sessions.len() as i32,
        sessions,
        source,
    })
}

fn reconcile(parameters: &JobParameters, computed: i32, declared: i64) -> (i32, LoadSource) {
    if let Some(job_count) = parameters.job_count() {
        let global_share = MAX_LOAD_GRANULARITY / job_count;
        tracing::debug!(job_count, global_share, "job-count override");
        if global_share > computed && global_share <= MAX_LOAD_GRANULARITY {
            return (global_share, LoadSource::JobCount);
        }
    }

    match i32::try_from(declared) {
        Ok(declared) if declared > computed && declared <= MAX_LOAD_GRANULARITY => {
            (declared, LoadSource::ChannelLoad)
        }
        _ => (computed, LoadSource::Computed),
    }
}
