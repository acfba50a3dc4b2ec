//! Entry points called by compiled code to throw and catch.

use core::ffi;

use crate::exception::Exception;
use crate::stdext;
use crate::uw::{self, _Unwind_Reason_Code};

/// Exit status of a process whose exception nobody caught.
pub const UNCAUGHT_EXIT_STATUS: ffi::c_int = -1;

/// Throws `payload`. Never returns: either a landing pad takes over, or the
/// process exits.
///
/// # Safety
/// Every frame between here and the handler must have unwind info.
#[no_mangle]
pub unsafe extern "C-unwind" fn __trq_throw(payload: *mut ffi::c_void) -> ! {
    // SAFETY: The unwinder gets a fresh exception.
    let code = raise(payload, |header| unsafe { uw::_Unwind_RaiseException(header) });
    error!(?code, ?payload, "uncaught exception");
    let _ = stdext::eprint(format_args!("trqeh: uncaught exception ({code:?})\n"));
    stdext::exit(UNCAUGHT_EXIT_STATUS)
}

/// Creates an exception for `payload` and hands it to `raise_exception`.
///
/// `raise_exception` only returns if the exception wasn't caught, in which
/// case the exception is released again and the reason is returned.
pub fn raise(
    payload: *mut ffi::c_void,
    raise_exception: impl FnOnce(*mut uw::_Unwind_Exception) -> _Unwind_Reason_Code,
) -> _Unwind_Reason_Code {
    let exception = allocate(payload);
    debug!(?exception, ?payload, "raising exception");

    // SAFETY: Just created, nothing else refers to it yet.
    let code = raise_exception(unsafe { (*exception).header() });

    // SAFETY: The unwinder has given up on it.
    unsafe { Exception::release(exception, code) };
    code
}

#[cfg(not(feature = "single-slot"))]
fn allocate(payload: *mut ffi::c_void) -> *mut Exception {
    Exception::boxed(payload)
}

#[cfg(feature = "single-slot")]
fn allocate(payload: *mut ffi::c_void) -> *mut Exception {
    crate::exception::slot::take(payload)
}

/// The payload of a caught exception, for landing pads.
///
/// # Safety
/// `exception` must be the pointer the landing pad received.
#[no_mangle]
pub unsafe extern "C" fn __trq_get_exception(exception: *mut uw::_Unwind_Exception) -> *mut ffi::c_void {
    // SAFETY: Forwarded from the caller.
    match unsafe { Exception::from_header(exception) } {
        Ok(exception) => exception.payload(),
        Err(err) => stdext::fatal(format_args!("{err}")),
    }
}

/// Releases a caught exception once its handler is done with it.
///
/// # Safety
/// `exception` must be the pointer the landing pad received, and must not be
/// used afterwards.
#[no_mangle]
pub unsafe extern "C" fn __trq_end_catch(exception: *mut uw::_Unwind_Exception) {
    trace!(?exception, "end of catch");
    // SAFETY: Forwarded from the caller.
    unsafe { uw::_Unwind_DeleteException(exception) }
}
