//! C-ABI wrapper around `sky-island-core`.
//!
//! # Overview
//! Lets C programs call a Sky Island endpoint without libcurl or a JSON
//! library: pass a `SkyClientOptions`, a target URL and a call name, get back
//! the JSON body and a timestamp.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `sky_island_function` keeps the classic contract: a `SkyResponse` on
//!   success, null on any failure. The reason goes to the installed `tracing`
//!   subscriber, or to stderr when the host installed none.
//! - `sky_island_call` performs the same call but always returns a
//!   `SkyCallResult` carrying either the data or an error code and message.
//!   C callers that need to act on the failure reason should use it.
//! - The C caller owns all returned pointers and must release them with the
//!   matching `sky_island_free_*` function.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use sky_island_core::{CallError, CallResult};
use tracing::error;

use types::*;

enum Failure {
    NullArg(&'static str),
    NotUtf8(&'static str),
    Call(CallError),
}

impl Failure {
    fn message(&self) -> String {
        match self {
            Failure::NullArg(name) => format!("null argument: {name}"),
            Failure::NotUtf8(name) => format!("invalid argument: {name} is not valid UTF-8"),
            Failure::Call(e) => e.to_string(),
        }
    }
}

impl From<CallError> for Failure {
    fn from(err: CallError) -> Self {
        Failure::Call(err)
    }
}

/// Validate the raw arguments and run one blocking call.
fn perform(
    options: *const SkyClientOptions,
    url: *const c_char,
    call: *const c_char,
) -> Result<CallResult, Failure> {
    if options.is_null() {
        return Err(Failure::NullArg("options"));
    }
    let options = unsafe { &*options };
    let endpoint = read_str(options.endpoint, "endpoint")?;
    let url = read_str(url, "url")?;
    let call = read_str(call, "call")?;

    Ok(sky_island_core::call(&options.to_config(endpoint), url, call)?)
}

/// Borrow a caller-owned C string as `&str`.
fn read_str<'a>(ptr: *const c_char, name: &'static str) -> Result<&'a str, Failure> {
    if ptr.is_null() {
        return Err(Failure::NullArg(name));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| Failure::NotUtf8(name))
}

/// Log through `tracing` when the host set up a subscriber, else stderr.
fn report(message: &str) {
    if tracing::dispatcher::has_been_set() {
        error!("{message}");
    } else {
        eprintln!("ERROR: {message}");
    }
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

/// POST `{"url": url, "call": call}` to `options->endpoint`.
///
/// Returns null on any failure and reports the reason (see `report`); use
/// `sky_island_call` to receive it instead. The caller must free a non-null
/// result with `sky_island_free_response`.
#[unsafe(no_mangle)]
pub extern "C" fn sky_island_function(
    options: *const SkyClientOptions,
    url: *const c_char,
    call: *const c_char,
) -> *mut SkyResponse {
    catch_unwind(|| match perform(options, url, call) {
        Ok(result) => SkyResponse::from_core(result),
        Err(failure) => {
            report(&failure.message());
            std::ptr::null_mut()
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Same call as `sky_island_function`, reporting failures in the result.
///
/// Never returns null. The caller must free the result with
/// `sky_island_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn sky_island_call(
    options: *const SkyClientOptions,
    url: *const c_char,
    call: *const c_char,
) -> *mut SkyCallResult {
    catch_unwind(|| match perform(options, url, call) {
        Ok(result) => SkyCallResult::ok(result),
        Err(Failure::NullArg(name)) => SkyCallResult::null_arg(name),
        Err(Failure::NotUtf8(name)) => SkyCallResult::not_utf8(name),
        Err(Failure::Call(e)) => SkyCallResult::from_error(e),
    })
    .unwrap_or_else(|_| SkyCallResult::panic("panic in sky_island_call"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a `SkyResponse` returned by `sky_island_function`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn sky_island_free_response(response: *mut SkyResponse) {
    if response.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let response = unsafe { Box::from_raw(response) };
        free_c_string(response.data);
    });
}

/// Free a `SkyCallResult` returned by `sky_island_call`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn sky_island_free_result(result: *mut SkyCallResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.data);
    });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
