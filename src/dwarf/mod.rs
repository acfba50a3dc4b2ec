//! this implements reading the exception tables the compiler emits next to every function
//!
//! # how it works
//! the unwinder finds the FDE for a frame in `.eh_frame` and hands us the LSDA pointer from its
//! augmentation data. the LSDA lives in `.gcc_except_table` and maps ranges of the function's code
//! to landing pads and chains of actions. its integers are LEB128 or `DW_EH_PE_*` encoded pointers,
//! same as in `.eh_frame`.
//!
//! the format is not really specified anywhere except in the sources of GCC and LLVM, see
//! `libstdc++-v3/libsupc++/eh_personality.cc` for the closest thing to a reference.

pub mod lsda;
pub mod parse;
