//! The personality routine the code generator registers for every function.
//!
//! The unwinder calls it once per frame in the search phase until a frame
//! reports a handler, then once per frame again in the cleanup phase up to
//! and including that frame:
//! ```text
//!  search:  frame 0 -> frame 1 -> ... -> frame n (handler found)
//!  cleanup: frame 0 -> frame 1 -> ... -> frame n (install context)
//! ```
//! The handler found in the search phase is stored in the exception, so the
//! handler frame doesn't need to be scanned twice.


use core::ffi;

use crate::context::{FrameContext, HostContext};
use crate::exception::Exception;
use crate::identify::identify;
use crate::install::install;
use crate::scan::{scan, ScanOutcome};
use crate::uw::{self, UnwindAction, _Unwind_Reason_Code};
use crate::{stdext, Result};

const _: uw::PersonalityRoutine = __trq_personality_v0;

/// # Safety
/// Must only be called by the unwinder, with the arguments it passes to
/// personality routines.
#[no_mangle]
pub unsafe extern "C" fn __trq_personality_v0(
    version: ffi::c_int,
    actions: uw::_UnwindAction,
    exception_class: u64,
    exception_object: *mut uw::_Unwind_Exception,
    context: *mut uw::_Unwind_Context,
) -> _Unwind_Reason_Code {
    // SAFETY: The context is the one we were called with.
    let mut frame = unsafe { HostContext::new(context) };
    let actions = UnwindAction::from_bits_retain(actions);

    // SAFETY: Forwarded from the unwinder.
    match unsafe { personality(version, actions, exception_class, exception_object, &mut frame) } {
        Ok(code) => code,
        Err(err) => stdext::fatal(format_args!("{err}")),
    }
}

/// The personality routine over any kind of frame.
///
/// Errors are fatal, the caller is expected to terminate on them.
///
/// # Safety
/// `exception_object` must point to a live exception header.
#[instrument(skip(frame), fields(ip = frame.ip()), ret)]
pub unsafe fn personality<C: FrameContext + ?Sized>(
    version: ffi::c_int,
    actions: UnwindAction,
    exception_class: u64,
    exception_object: *mut uw::_Unwind_Exception,
    frame: &mut C,
) -> Result<_Unwind_Reason_Code> {
    // SAFETY: The caller guarantees the header is live.
    let exception = unsafe { Exception::from_header(exception_object)? };

    if version != 1 {
        debug!("unsupported personality version");
        return Ok(_Unwind_Reason_Code::_URC_FATAL_PHASE1_ERROR);
    }

    trace!(function = ?identify(frame.region_start()));

    if actions.contains(UnwindAction::SEARCH_PHASE) {
        match scan(actions, frame)? {
            ScanOutcome::HandlerFound(handler) => {
                exception.handler = Some(handler);
                Ok(_Unwind_Reason_Code::_URC_HANDLER_FOUND)
            }
            ScanOutcome::ContinueUnwind => Ok(_Unwind_Reason_Code::_URC_CONTINUE_UNWIND),
        }
    } else if actions.contains(UnwindAction::CLEANUP_PHASE) {
        if !actions.contains(UnwindAction::HANDLER_FRAME) {
            return Ok(_Unwind_Reason_Code::_URC_CONTINUE_UNWIND);
        }
        let Some(handler) = exception.handler else {
            debug!("handler frame reached without a handler from the search phase");
            return Ok(_Unwind_Reason_Code::_URC_FATAL_PHASE2_ERROR);
        };
        install(frame, exception.header(), &handler);
        Ok(_Unwind_Reason_Code::_URC_INSTALL_CONTEXT)
    } else {
        debug!("neither search nor cleanup phase");
        Ok(_Unwind_Reason_Code::_URC_FATAL_PHASE1_ERROR)
    }
}
