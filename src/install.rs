use crate::arch::EXCEPTION_POINTER_REGISTER;
use crate::context::FrameContext;
use crate::scan::Handler;
use crate::uw;

/// Sets up `frame` to resume at the landing pad of `handler`, with the
/// exception in the first data register.
///
/// The selector register is left alone, so landing pads can't tell which
/// action matched and have to treat every catch alike.
pub fn install<C: FrameContext + ?Sized>(
    frame: &mut C,
    exception: *mut uw::_Unwind_Exception,
    handler: &Handler,
) {
    debug!(
        landing_pad = format_args!("{:#x}", handler.landing_pad),
        ?exception,
        "installing handler"
    );
    frame.set_gr(EXCEPTION_POINTER_REGISTER, exception.expose_provenance());
    frame.set_ip(handler.landing_pad);
}

#[cfg(test)]
mod tests {
    use super::install;
    use crate::arch::{EXCEPTION_POINTER_REGISTER, SELECTOR_REGISTER};
    use crate::scan::Handler;
    use crate::testutil::FakeFrame;

    #[test]
    fn redirects_frame() {
        let mut frame = FakeFrame::at(5, None);
        let exception = core::ptr::with_exposed_provenance_mut(0x7000);
        let handler = Handler {
            landing_pad: 0x1040,
            action: Some(0x2000),
        };

        install(&mut frame, exception, &handler);

        assert_eq!(frame.registers[EXCEPTION_POINTER_REGISTER as usize], 0x7000);
        assert_eq!(frame.registers[SELECTOR_REGISTER as usize], 0);
        assert_eq!(frame.new_ip, Some(0x1040));
    }
}
