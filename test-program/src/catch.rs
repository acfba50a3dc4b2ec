//! A function that catches every exception thrown below it.
//!
//! Nothing in Rust emits landing pads for `trqeh`, so the catching frame is
//! written by hand: `trq_try` calls `thrower(payload)` inside a call site whose
//! action catches, and its landing pad passes the exception to [`caught`].
//! The exception table is the smallest one the personality accepts:
//! ```text
//! lpstart omit, ttype omit, call sites uleb128
//! [call start][call length][landing pad][action 1]
//! action 1: filter 1, no next
//! ```

use core::ffi;

use trqeh::uw;

pub type Thrower = extern "C-unwind" fn(payload: *mut ffi::c_void);

extern "C-unwind" {
    fn trq_try(thrower: Thrower, payload: *mut ffi::c_void) -> *mut ffi::c_void;
}

/// Runs `thrower` and returns the payload of the exception it threw, or null
/// if it returned normally.
pub fn try_catch(thrower: Thrower, payload: *mut ffi::c_void) -> *mut ffi::c_void {
    // SAFETY: `trq_try` has unwind info for every instruction that can throw.
    unsafe { trq_try(thrower, payload) }
}

/// Entered from the landing pad with the exception the personality installed.
extern "C" fn caught(exception: *mut uw::_Unwind_Exception) -> *mut ffi::c_void {
    tracing::info!(?exception, "landed");
    // SAFETY: The landing pad got the exception from the personality routine.
    unsafe {
        let payload = trqeh::__trq_get_exception(exception);
        trqeh::__trq_end_catch(exception);
        payload
    }
}

core::arch::global_asm!(
    ".pushsection .data.rel.ro,\"aw\",@progbits",
    ".p2align 3",
    ".Ltrq_personality_ref:",
    ".quad {personality}",
    ".popsection",
    "",
    ".text",
    ".globl trq_try",
    ".type trq_try,@function",
    ".p2align 4",
    "trq_try:",
    ".Ltrq_try_begin:",
    ".cfi_startproc",
    ".cfi_personality 0x9b, .Ltrq_personality_ref",
    ".cfi_lsda 0x1b, .Ltrq_try_lsda",
    "    push rbp",
    ".cfi_def_cfa_offset 16",
    ".cfi_offset rbp, -16",
    "    mov rax, rdi",
    "    mov rdi, rsi",
    ".Ltrq_try_call:",
    "    call rax",
    ".Ltrq_try_call_end:",
    "    xor eax, eax",
    ".cfi_remember_state",
    "    pop rbp",
    ".cfi_def_cfa_offset 8",
    "    ret",
    ".cfi_restore_state",
    ".Ltrq_try_landing_pad:",
    "    mov rdi, rax",
    "    call {caught}",
    "    pop rbp",
    ".cfi_def_cfa_offset 8",
    "    ret",
    ".cfi_endproc",
    ".size trq_try, . - trq_try",
    "",
    ".pushsection .gcc_except_table,\"a\",@progbits",
    ".p2align 2",
    ".Ltrq_try_lsda:",
    "    .byte 0xff",
    "    .byte 0xff",
    "    .byte 0x01",
    "    .uleb128 .Ltrq_try_call_sites_end - .Ltrq_try_call_sites",
    ".Ltrq_try_call_sites:",
    "    .uleb128 .Ltrq_try_call - .Ltrq_try_begin",
    "    .uleb128 .Ltrq_try_call_end - .Ltrq_try_call",
    "    .uleb128 .Ltrq_try_landing_pad - .Ltrq_try_begin",
    "    .uleb128 1",
    ".Ltrq_try_call_sites_end:",
    "    .byte 1",
    "    .byte 0",
    ".popsection",
    personality = sym trqeh::__trq_personality_v0,
    caught = sym caught,
);
