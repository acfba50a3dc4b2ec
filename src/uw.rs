#![allow(nonstandard_style)] // Closely follow the ABI names here

use core::ffi;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum _Unwind_Reason_Code {
    _URC_NO_REASON = 0,
    /// This indicates that a different runtime caught this exception.
    /// Nested foreign exceptions, or re-throwing a foreign exception, result in
    /// undefined behavior.
    _URC_FOREIGN_EXCEPTION_CAUGHT = 1,
    /// The personality routine encountered an error during phase 1, other than the specific error codes defined.
    _URC_FATAL_PHASE1_ERROR = 3,
    /// The personality routine encountered an error during phase 2, for instance a stack corruption.
    _URC_FATAL_PHASE2_ERROR = 2,
    _URC_NORMAL_STOP = 4,
    /// The unwinder encountered the end of the stack during phase 1, without finding a handler.
    /// The unwind runtime will not have modified the stack.
    /// The C++ runtime will normally call uncaught_exception() in this case
    _URC_END_OF_STACK = 5,
    _URC_HANDLER_FOUND = 6,
    _URC_INSTALL_CONTEXT = 7,
    _URC_CONTINUE_UNWIND = 8,
}

/// The language independent header every exception object starts with.
/// The unwinder owns `private_1` and `private_2`.
#[repr(C)]
#[derive(Debug)]
pub struct _Unwind_Exception {
    pub exception_class: u64,
    pub exception_cleanup: Option<_Unwind_Exception_Cleanup_Fn>,
    pub private_1: usize,
    pub private_2: usize,
}

pub type _Unwind_Exception_Cleanup_Fn =
    unsafe extern "C" fn(reason: _Unwind_Reason_Code, exc: *mut _Unwind_Exception);

/// The _Unwind_Context type is an opaque type used to refer to a system-specific data structure used by the system unwinder.
/// This context is created and destroyed by the system, and passed to the personality routine during unwinding
#[repr(C)]
pub struct _Unwind_Context {
    _private: [u8; 0],
}

pub type PersonalityRoutine = unsafe extern "C" fn(
    version: ffi::c_int,
    actions: _UnwindAction,
    exceptionClass: u64,
    exception_object: *mut _Unwind_Exception,
    context: *mut _Unwind_Context,
) -> _Unwind_Reason_Code;

pub type _UnwindAction = ffi::c_int;

pub const _UA_SEARCH_PHASE: _UnwindAction = 1;
pub const _UA_CLEANUP_PHASE: _UnwindAction = 2;
pub const _UA_HANDLER_FRAME: _UnwindAction = 4;
pub const _UA_FORCE_UNWIND: _UnwindAction = 8;
pub const _UA_END_OF_STACK: _UnwindAction = 16;

bitflags::bitflags! {
    /// Typed view of the `actions` argument passed to a personality routine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UnwindAction: _UnwindAction {
        const SEARCH_PHASE = _UA_SEARCH_PHASE;
        const CLEANUP_PHASE = _UA_CLEANUP_PHASE;
        const HANDLER_FRAME = _UA_HANDLER_FRAME;
        const FORCE_UNWIND = _UA_FORCE_UNWIND;
        const END_OF_STACK = _UA_END_OF_STACK;
    }
}

// Provided by the platform unwinder (libgcc_s or libunwind).
extern "C-unwind" {
    pub fn _Unwind_RaiseException(exception_object: *mut _Unwind_Exception) -> _Unwind_Reason_Code;
}

extern "C" {
    pub fn _Unwind_DeleteException(exception_object: *mut _Unwind_Exception);
    pub fn _Unwind_GetIP(context: *mut _Unwind_Context) -> usize;
    pub fn _Unwind_GetRegionStart(context: *mut _Unwind_Context) -> usize;
    pub fn _Unwind_GetLanguageSpecificData(context: *mut _Unwind_Context) -> *mut ffi::c_void;
    pub fn _Unwind_SetGR(context: *mut _Unwind_Context, index: ffi::c_int, value: usize);
    pub fn _Unwind_SetIP(context: *mut _Unwind_Context, value: usize);
}
