//! Decides what a single frame does with the exception in flight.


use crate::context::FrameContext;
use crate::dwarf::lsda::{CallSite, Lsda};
use crate::uw::UnwindAction;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Nothing to do in this frame, carry on with the caller.
    ContinueUnwind,
    HandlerFound(Handler),
}

/// Where to resume a frame that handles the exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handler {
    pub landing_pad: usize,
    /// The action record that matched, `None` for an unfiltered cleanup.
    pub action: Option<usize>,
}

/// Looks up the call site the frame is stopped at and walks its actions.
///
/// Every catch action catches every exception of this runtime, the type
/// filters are not compared against anything. Cleanup actions are skipped.
///
/// A frame whose table doesn't cover its current location is an error, not
/// a frame without handlers.
#[instrument(level = "debug", skip(frame), ret)]
pub fn scan<C: FrameContext + ?Sized>(actions: UnwindAction, frame: &C) -> Result<ScanOutcome> {
    let Some(data) = frame.lsda() else {
        trace!("frame has no LSDA");
        return Ok(ScanOutcome::ContinueUnwind);
    };

    let region_start = frame.region_start();
    // The return address points past the call, which may already be the
    // next call site.
    let ip = frame.ip().wrapping_sub(1);
    let offset = ip.wrapping_sub(region_start);
    trace!("ip={ip:#x} region_start={region_start:#x} offset={offset:#x}");

    // SAFETY: The table comes from the frame and describes its function.
    let lsda = unsafe { Lsda::parse(data, region_start)? };

    for call_site in lsda.call_sites() {
        let call_site = call_site?;
        trace!(?call_site);

        if call_site.contains(offset) {
            return scan_call_site(actions, &lsda, &call_site);
        }
        if offset < call_site.start {
            // Call sites are sorted, so none of the rest can match either.
            break;
        }
    }

    Err(Error::NoCallSite { offset })
}

fn scan_call_site(
    actions: UnwindAction,
    lsda: &Lsda<'_>,
    call_site: &CallSite,
) -> Result<ScanOutcome> {
    if call_site.landing_pad == 0 {
        return Ok(ScanOutcome::ContinueUnwind);
    }
    let landing_pad = lsda.landing_pad(call_site);

    if call_site.action == 0 {
        let cleanup = actions.contains(UnwindAction::CLEANUP_PHASE)
            && !actions.contains(UnwindAction::HANDLER_FRAME);
        return Ok(if cleanup {
            ScanOutcome::HandlerFound(Handler {
                landing_pad,
                action: None,
            })
        } else {
            ScanOutcome::ContinueUnwind
        });
    }

    for record in lsda.actions(call_site.action) {
        let record = record?;
        trace!(?record);
        if record.type_filter == 0 {
            // cleanup, not run
        } else if actions.intersects(UnwindAction::SEARCH_PHASE | UnwindAction::HANDLER_FRAME) {
            return Ok(ScanOutcome::HandlerFound(Handler {
                landing_pad,
                action: Some(record.address),
            }));
        } else if !actions.contains(UnwindAction::FORCE_UNWIND) {
            return Err(Error::CatchOutsideSearch {
                actions: actions.bits(),
            });
        }
    }

    Ok(ScanOutcome::ContinueUnwind)
}
