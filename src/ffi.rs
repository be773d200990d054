//! FFI bindings for host-application embedding
//!
//! C-compatible functions so a presentation layer in another language can
//! load the reference standards once and assess measurements against them.
//! All functions use C strings (null-terminated); returned strings are
//! allocated here and must be freed by the caller with `gizi_free_string`.
//! Failing calls return null and leave a message for `gizi_last_error`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::GrowthEngine;
use crate::record::MeasurementRecord;
use crate::types::MeasurementInput;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Load growth standards from a reference directory and return an engine
/// handle, or null on failure.
///
/// # Safety
/// `reference_dir` must be a valid null-terminated C string or null.
#[no_mangle]
pub unsafe extern "C" fn gizi_engine_new(reference_dir: *const c_char) -> *mut GrowthEngine {
    clear_last_error();

    let Some(dir) = cstr_to_string(reference_dir) else {
        set_last_error("reference_dir is null or not valid UTF-8");
        return ptr::null_mut();
    };

    match GrowthEngine::load_from_dir(&dir) {
        Ok(engine) => Box::into_raw(Box::new(engine)),
        Err(err) => {
            set_last_error(&err.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an engine handle returned by `gizi_engine_new`.
///
/// # Safety
/// `engine` must be a pointer previously returned by `gizi_engine_new`, or
/// null (a no-op).
#[no_mangle]
pub unsafe extern "C" fn gizi_engine_free(engine: *mut GrowthEngine) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Assess one measurement, passed as JSON, against the engine's standards.
///
/// Input is a measurement object (`sex`, `birth_date`, optional
/// `observed_at`, `weight_kg`, `height_cm`, optional `child_id`); output is
/// the denormalized measurement-record JSON. Returns null on failure.
///
/// # Safety
/// `engine` must be a live handle from `gizi_engine_new`;
/// `measurement_json` must be a valid null-terminated C string or null.
#[no_mangle]
pub unsafe extern "C" fn gizi_engine_assess_json(
    engine: *const GrowthEngine,
    measurement_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(engine) = engine.as_ref() else {
        set_last_error("engine is null");
        return ptr::null_mut();
    };
    let Some(json) = cstr_to_string(measurement_json) else {
        set_last_error("measurement_json is null or not valid UTF-8");
        return ptr::null_mut();
    };

    let result = serde_json::from_str::<MeasurementInput>(&json)
        .map_err(crate::GrowthError::from)
        .and_then(|input| input.into_measurement())
        .and_then(|measurement| engine.assess(&measurement))
        .and_then(|assessment| {
            let record = MeasurementRecord::from_assessment(&assessment);
            serde_json::to_string(&record).map_err(crate::GrowthError::from)
        });

    match result {
        Ok(record_json) => string_to_cstr(&record_json),
        Err(err) => {
            set_last_error(&err.to_string());
            ptr::null_mut()
        }
    }
}

/// Return the last error message for this thread, or null if the previous
/// call succeeded. The pointer stays valid until the next FFI call on the
/// same thread; do not free it.
#[no_mangle]
pub extern "C" fn gizi_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(msg) => msg.as_ptr(),
        None => ptr::null(),
    })
}

/// Free a string returned by `gizi_engine_assess_json`.
///
/// # Safety
/// `s` must be a pointer previously returned by this library, or null.
#[no_mangle]
pub unsafe extern "C" fn gizi_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
