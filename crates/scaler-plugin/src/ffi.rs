//! C ABI exposed to the resource manager daemon
//!
//! The layout of [`XrmPluginFuncParam`] and [`XrmPluginData`] mirrors the
//! host's plugin header. Every entry point returns [`XRM_SUCCESS`] or
//! [`XRM_ERROR`]; failure details only go to the log.

use std::ffi::c_char;
use std::ffi::CStr;
use std::sync::Mutex;
use std::sync::Once;

use error_stack::Report;
use tracing_appender::non_blocking::WorkerGuard;
use utils::logging;
use utils::version;

use crate::config::PluginConfig;
use crate::error::PluginError;
use crate::Result;

pub const XRM_SUCCESS: i32 = 0;
pub const XRM_ERROR: i32 = -1;
pub const XRM_API_VERSION_1: i32 = 1;
pub const PLUGIN_ID: i32 = 3;
pub const XRM_MAX_PLUGIN_FUNC_PARAM_LEN: usize = 16384;
pub const XRM_MAX_PLUGIN_FUNC_NUM: usize = 8;

/// In/out buffers of a plugin function call, both NUL-terminated strings
#[repr(C)]
pub struct XrmPluginFuncParam {
    pub input: [c_char; XRM_MAX_PLUGIN_FUNC_PARAM_LEN],
    pub output: [c_char; XRM_MAX_PLUGIN_FUNC_PARAM_LEN],
}

impl Default for XrmPluginFuncParam {
    fn default() -> Self {
        Self {
            input: [0; XRM_MAX_PLUGIN_FUNC_PARAM_LEN],
            output: [0; XRM_MAX_PLUGIN_FUNC_PARAM_LEN],
        }
    }
}

pub type PluginFunc = unsafe extern "C" fn(*mut XrmPluginFuncParam) -> i32;

/// Plugin descriptor the daemon looks up by symbol name
#[repr(C)]
pub struct XrmPluginData {
    pub get_plugin_id: Option<extern "C" fn() -> i32>,
    pub get_api_version: Option<extern "C" fn() -> i32>,
    pub plugin_func: [Option<PluginFunc>; XRM_MAX_PLUGIN_FUNC_NUM],
    pub ext_data: [u32; 4],
}

#[no_mangle]
#[allow(non_upper_case_globals)]
pub static xrmU30ScalPlugin: XrmPluginData = XrmPluginData {
    get_plugin_id: Some(xrmU30ScalPlugin_get_plugin_id),
    get_api_version: Some(xrmU30ScalPlugin_api_version),
    plugin_func: [
        Some(xrmU30ScalPlugin_CalcPercent as PluginFunc),
        None,
        None,
        None,
        None,
        None,
        None,
        None,
    ],
    ext_data: [0; 4],
};

static LOGGING: Once = Once::new();
static LOG_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

/// Sets up logging on the first call into the plugin.
fn init_logging() {
    LOGGING.call_once(|| {
        let config = PluginConfig::from_env();
        let filter = config.log_filter.as_deref();
        match &config.log_file {
            Some(path) => match logging::init_with_file(path, filter) {
                Ok(guard) => {
                    if let Ok(mut slot) = LOG_GUARD.lock() {
                        *slot = Some(guard);
                    }
                }
                Err(err) => {
                    logging::init(filter);
                    tracing::error!("failed to open plugin log file {}: {err}", path.display());
                }
            },
            None => logging::init(filter),
        }
        tracing::info!("scaler load plugin {} loaded", &**version::VERSION);
    });
}

#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn xrmU30ScalPlugin_api_version() -> i32 {
    init_logging();
    tracing::info!("API version: {XRM_API_VERSION_1}");
    XRM_API_VERSION_1
}

#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn xrmU30ScalPlugin_get_plugin_id() -> i32 {
    init_logging();
    tracing::info!("plugin id: {PLUGIN_ID}");
    PLUGIN_ID
}

/// Computes the scaler load of the request in `param.input` and writes
/// `"<load> <count>"` to `param.output`.
///
/// # Safety
///
/// `param` must be null or point to a valid, writable [`XrmPluginFuncParam`]
/// not accessed concurrently for the duration of the call.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn xrmU30ScalPlugin_CalcPercent(param: *mut XrmPluginFuncParam) -> i32 {
    init_logging();

    let Some(param) = (unsafe { param.as_mut() }) else {
        tracing::error!("load calculation called with a null parameter");
        return XRM_ERROR;
    };
    param.output[0] = 0;

    let result = read_input(&param.input)
        .and_then(crate::calc_percent)
        .and_then(|output| write_output(&mut param.output, &output.to_string()));
    match result {
        Ok(()) => XRM_SUCCESS,
        Err(report) => {
            tracing::error!("scaler load calculation failed: {report:?}");
            param.output[0] = 0;
            XRM_ERROR
        }
    }
}

/// Borrows the NUL-terminated request text from an input buffer.
pub fn read_input(input: &[c_char]) -> Result<&str, PluginError> {
    // c_char is i8 or u8 depending on the target, both have the layout of u8
    let bytes = unsafe { std::slice::from_raw_parts(input.as_ptr().cast::<u8>(), input.len()) };
    CStr::from_bytes_until_nul(bytes)
        .map_err(|_| Report::new(PluginError::invalid_input("input is not NUL-terminated")))?
        .to_str()
        .map_err(|err| Report::new(PluginError::invalid_input(format!("input is not UTF-8: {err}"))))
}

/// Copies `text` into an output buffer as a NUL-terminated string.
pub fn write_output(output: &mut [c_char], text: &str) -> Result<(), PluginError> {
    let bytes = text.as_bytes();
    if bytes.len() >= output.len() {
        return Err(Report::new(PluginError::OutputTooLarge {
            len: bytes.len(),
            capacity: output.len(),
        }));
    }
    for (dst, src) in output.iter_mut().zip(bytes) {
        *dst = *src as c_char;
    }
    output[bytes.len()] = 0;
    Ok(())
}
