use core::fmt::Write;
use core::{ffi, fmt};

pub struct LibCStderrWriter;

impl Write for LibCStderrWriter {
    fn write_str(&mut self, mut s: &str) -> fmt::Result {
        loop {
            let r = unsafe { libc::write(libc::STDERR_FILENO, s.as_ptr().cast(), s.len()) };
            if r < 0 {
                return Err(fmt::Error);
            }
            if r == 0 {
                return Ok(());
            }
            s = &s[(r as usize)..];
        }
    }
}

pub fn eprint(args: fmt::Arguments<'_>) -> fmt::Result {
    write!(LibCStderrWriter, "{}", args)
}

/// Reports an unrecoverable unwinding error and aborts.
pub(crate) fn fatal(args: fmt::Arguments<'_>) -> ! {
    error!("fatal: {args}");
    // Nothing left to do if stderr is gone too.
    let _ = eprint(format_args!("trqeh: fatal: {args}\n"));
    abort()
}

pub(crate) fn abort() -> ! {
    // SAFETY: We abort.
    unsafe { libc::abort() };
}

pub(crate) fn exit(status: ffi::c_int) -> ! {
    // SAFETY: Runs the process's exit handlers and never returns.
    unsafe { libc::exit(status) };
}
