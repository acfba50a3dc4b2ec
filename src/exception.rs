//! The exception object thrown by compiled code.

use alloc::boxed::Box;
use core::ffi;

use crate::scan::Handler;
use crate::uw;
use crate::{Error, Result};

/// `exception_class` of every exception thrown by this runtime. Anything else
/// reaching the personality routine is foreign.
pub const TRQ_EXCEPTION_CLASS: u64 = 0xdead_beef;

/// An exception in flight.
///
/// The unwinder only knows about the header, which is why it has to be the
/// first field: the personality routine gets a pointer to the header and
/// turns it back into the whole exception.
#[repr(C)]
#[derive(Debug)]
pub struct Exception {
    header: uw::_Unwind_Exception,
    payload: *mut ffi::c_void,
    /// Found during the search phase, installed during the cleanup phase of
    /// the same throw.
    pub(crate) handler: Option<Handler>,
}

impl Exception {
    pub fn new(payload: *mut ffi::c_void) -> Self {
        Self {
            header: uw::_Unwind_Exception {
                exception_class: TRQ_EXCEPTION_CLASS,
                exception_cleanup: None,
                private_1: 0,
                private_2: 0,
            },
            payload,
            handler: None,
        }
    }

    /// Allocates an exception that frees itself when the unwinder deletes it.
    pub fn boxed(payload: *mut ffi::c_void) -> *mut Exception {
        let mut exception = Box::new(Exception::new(payload));
        exception.header.exception_cleanup = Some(free_boxed);
        Box::into_raw(exception)
    }

    /// Recovers the exception from the header the unwinder passes around.
    ///
    /// # Safety
    /// `header` must point to a live `_Unwind_Exception`. If its class is ours,
    /// it must be the header of an [`Exception`] not borrowed elsewhere.
    pub unsafe fn from_header<'a>(header: *mut uw::_Unwind_Exception) -> Result<&'a mut Exception> {
        // SAFETY: The caller guarantees the header is live.
        let class = unsafe { (*header).exception_class };
        if class != TRQ_EXCEPTION_CLASS {
            return Err(Error::ForeignException { class });
        }
        // SAFETY: Ours, so the header is the first field of an `Exception`.
        Ok(unsafe { &mut *header.cast::<Exception>() })
    }

    /// The header, as a pointer that can be turned back into the exception.
    pub fn header(&mut self) -> *mut uw::_Unwind_Exception {
        (self as *mut Exception).cast()
    }

    pub fn payload(&self) -> *mut ffi::c_void {
        self.payload
    }

    /// Runs the cleanup callback, freeing the exception if it was allocated
    /// with [`Exception::boxed`].
    ///
    /// # Safety
    /// `exception` must not be used afterwards.
    pub(crate) unsafe fn release(exception: *mut Exception, reason: uw::_Unwind_Reason_Code) {
        // SAFETY: The caller hands over the exception.
        unsafe {
            let header = exception.cast::<uw::_Unwind_Exception>();
            if let Some(cleanup) = (*header).exception_cleanup {
                cleanup(reason, header);
            }
        }
    }
}

unsafe extern "C" fn free_boxed(reason: uw::_Unwind_Reason_Code, header: *mut uw::_Unwind_Exception) {
    trace!(?reason, ?header, "freeing exception");
    // SAFETY: Only installed on exceptions created by `Exception::boxed`.
    drop(unsafe { Box::from_raw(header.cast::<Exception>()) });
}

#[cfg(feature = "single-slot")]
pub(crate) mod slot {
    //! One exception shared by every throw. A throw while another exception
    //! is in flight clobbers it.

    use core::cell::UnsafeCell;
    use core::ffi;

    use super::Exception;

    struct Slot(UnsafeCell<Option<Exception>>);

    // SAFETY: It isn't. Two threads throwing at once race on the slot, which
    // this mode accepts.
    unsafe impl Sync for Slot {}

    static SLOT: Slot = Slot(UnsafeCell::new(None));

    /// Overwrites the shared exception.
    pub(crate) fn take(payload: *mut ffi::c_void) -> *mut Exception {
        // SAFETY: See `Slot`.
        let slot = unsafe { &mut *SLOT.0.get() };
        slot.insert(Exception::new(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let mut payload = 42u32;
        let mut exception = Exception::new((&raw mut payload).cast());
        let header = exception.header();

        let recovered = unsafe { Exception::from_header(header) }.unwrap();
        assert_eq!(recovered.payload(), (&raw mut payload).cast());
        assert_eq!(recovered.handler, None);
    }

    #[test]
    fn foreign_class() {
        let mut exception = Exception::new(core::ptr::null_mut());
        exception.header.exception_class = u64::from_be_bytes(*b"GNUCC++\0");

        let err = unsafe { Exception::from_header(exception.header()) }.unwrap_err();
        assert_eq!(
            err,
            Error::ForeignException {
                class: u64::from_be_bytes(*b"GNUCC++\0")
            }
        );
    }

    #[test]
    fn boxed_exception_frees_itself() {
        let exception = Exception::boxed(core::ptr::null_mut());
        // SAFETY: Just allocated.
        unsafe {
            assert_eq!((*exception).header.exception_class, TRQ_EXCEPTION_CLASS);
            assert!((*exception).header.exception_cleanup.is_some());
            Exception::release(exception, uw::_Unwind_Reason_Code::_URC_FOREIGN_EXCEPTION_CAUGHT);
        }
    }
}
