//! The registers a landing pad expects the exception in, as DWARF register
//! numbers. These are what `__builtin_eh_return_data_regno(0)` and
//! `__builtin_eh_return_data_regno(1)` return for the target.

use core::ffi;

#[cfg(target_arch = "x86_64")]
const UNWIND_DATA_REG: (ffi::c_int, ffi::c_int) = (0, 1); // RAX, RDX

#[cfg(target_arch = "x86")]
const UNWIND_DATA_REG: (ffi::c_int, ffi::c_int) = (0, 2); // EAX, EDX

#[cfg(any(target_arch = "aarch64", target_arch = "arm"))]
const UNWIND_DATA_REG: (ffi::c_int, ffi::c_int) = (0, 1); // X0/R0, X1/R1

#[cfg(any(target_arch = "riscv64", target_arch = "riscv32"))]
const UNWIND_DATA_REG: (ffi::c_int, ffi::c_int) = (10, 11); // A0, A1

#[cfg(any(target_arch = "powerpc64", target_arch = "powerpc"))]
const UNWIND_DATA_REG: (ffi::c_int, ffi::c_int) = (3, 4); // R3, R4

/// Receives the address of the exception object.
pub(crate) const EXCEPTION_POINTER_REGISTER: ffi::c_int = UNWIND_DATA_REG.0;

/// Would receive the matched type selector. Never written, landing pads get
/// no way to tell which action matched.
#[allow(dead_code)]
pub(crate) const SELECTOR_REGISTER: ffi::c_int = UNWIND_DATA_REG.1;
