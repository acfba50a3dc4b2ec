//! What the personality routine may see and touch of a frame.
//!
//! The unwinder only exposes frames through `_Unwind_Context` accessors.
//! Everything above this trait is ordinary code over plain integers and
//! slices, which is what lets the scanner run against fake frames in tests.

use core::ffi;

use crate::dwarf::parse::Cursor;
use crate::uw;

pub trait FrameContext {
    /// The return address of the frame, pointing just past the call.
    fn ip(&self) -> usize;
    /// The start of the function the frame belongs to.
    fn region_start(&self) -> usize;
    /// The frame's exception table, if its function has one.
    fn lsda(&self) -> Option<Cursor<'_>>;
    fn set_gr(&mut self, index: ffi::c_int, value: usize);
    fn set_ip(&mut self, value: usize);
}

/// A frame owned by the platform unwinder.
pub struct HostContext {
    raw: *mut uw::_Unwind_Context,
}

impl HostContext {
    /// # Safety
    /// `raw` must be the context the unwinder passed to the current
    /// personality routine invocation.
    pub unsafe fn new(raw: *mut uw::_Unwind_Context) -> Self {
        Self { raw }
    }
}

impl FrameContext for HostContext {
    fn ip(&self) -> usize {
        // SAFETY: `raw` is live for the duration of the personality call.
        unsafe { uw::_Unwind_GetIP(self.raw) }
    }

    fn region_start(&self) -> usize {
        // SAFETY: see above
        unsafe { uw::_Unwind_GetRegionStart(self.raw) }
    }

    fn lsda(&self) -> Option<Cursor<'_>> {
        // SAFETY: see above
        let lsda = unsafe { uw::_Unwind_GetLanguageSpecificData(self.raw) };
        if lsda.is_null() {
            return None;
        }
        // SAFETY: The LSDA was emitted by the compiler together with the code
        // of this frame and stays mapped as long as the code does.
        Some(unsafe { Cursor::from_ptr(lsda.cast::<u8>()) })
    }

    fn set_gr(&mut self, index: ffi::c_int, value: usize) {
        // SAFETY: see above
        unsafe { uw::_Unwind_SetGR(self.raw, index, value) }
    }

    fn set_ip(&mut self, value: usize) {
        // SAFETY: see above
        unsafe { uw::_Unwind_SetIP(self.raw, value) }
    }
}
