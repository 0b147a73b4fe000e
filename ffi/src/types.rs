//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! `SkyClientOptions` and `SkyResponse` keep the field layout C callers of
//! the Sky Island client already know. `SkyCallResult` adds an error code and
//! message for callers that need to know why a call failed. Conversions live
//! here so `lib.rs` stays focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use sky_island_core::{CallError, CallResult, ClientConfig};

/// Caller-owned client options. The library reads but never frees these.
#[repr(C)]
pub struct SkyClientOptions {
    pub endpoint: *const c_char,
    pub skip_host_verify: bool,
    pub skip_peer_verify: bool,
}

impl SkyClientOptions {
    /// Build a core config around an already-decoded `endpoint`.
    pub(crate) fn to_config(&self, endpoint: &str) -> ClientConfig {
        ClientConfig::new(endpoint)
            .skip_host_verify(self.skip_host_verify)
            .skip_peer_verify(self.skip_peer_verify)
    }
}

/// A successful response: Unix timestamp plus the JSON body as a C string.
#[repr(C)]
pub struct SkyResponse {
    pub timestamp: u64,
    pub data: *mut c_char,
}

impl SkyResponse {
    pub(crate) fn from_core(result: CallResult) -> *mut Self {
        Box::into_raw(Box::new(SkyResponse {
            timestamp: u64::try_from(result.timestamp).unwrap_or_default(),
            data: into_c_string(result.data),
        }))
    }
}

/// Error codes returned in `SkyCallResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub enum SkyErrorCode {
    Ok = 0,
    Initialization = 1,
    InvalidArgument = 2,
    Serialization = 3,
    Transport = 4,
    HttpStatus = 5,
    MalformedResponse = 6,
    Panic = 7,
    NullArg = 8,
}

/// Result envelope for `sky_island_call`.
///
/// On success `error_code` is `Ok`, `error_message` is null and `data` holds
/// the JSON body. On failure `data` is null, `error_message` describes the
/// problem and `http_status` is set when the service answered 4xx/5xx.
#[repr(C)]
pub struct SkyCallResult {
    pub error_code: SkyErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub timestamp: u64,
    pub data: *mut c_char,
}

impl SkyCallResult {
    pub(crate) fn ok(result: CallResult) -> *mut Self {
        Box::into_raw(Box::new(SkyCallResult {
            error_code: SkyErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            timestamp: u64::try_from(result.timestamp).unwrap_or_default(),
            data: into_c_string(result.data),
        }))
    }

    pub(crate) fn from_error(err: CallError) -> *mut Self {
        let (error_code, http_status) = match &err {
            CallError::Initialization(_) => (SkyErrorCode::Initialization, 0),
            CallError::InvalidArgument(_) => (SkyErrorCode::InvalidArgument, 0),
            CallError::Serialization(_) => (SkyErrorCode::Serialization, 0),
            CallError::Transport { .. } => (SkyErrorCode::Transport, 0),
            CallError::HttpStatus { status, .. } => (SkyErrorCode::HttpStatus, *status),
            CallError::MalformedResponse(_) => (SkyErrorCode::MalformedResponse, 0),
        };
        Self::failure(error_code, http_status, err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(SkyErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    pub(crate) fn not_utf8(name: &str) -> *mut Self {
        Self::failure(
            SkyErrorCode::InvalidArgument,
            0,
            format!("invalid argument: {name} is not valid UTF-8"),
        )
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(SkyErrorCode::Panic, 0, msg.to_string())
    }

    fn failure(error_code: SkyErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(SkyCallResult {
            error_code,
            error_message: into_c_string(msg),
            http_status,
            timestamp: 0,
            data: std::ptr::null_mut(),
        }))
    }
}

/// Hand a Rust string to C. Interior NULs cannot be represented and yield "".
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Free a string produced by `into_c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}
