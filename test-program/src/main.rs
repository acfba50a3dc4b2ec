//! Throws an exception, uncaught by default or caught with `catch` as the
//! first argument.
//!
//! There is no `lang_start` here: Rust's own `main` wrapper catches
//! everything, foreign exceptions included, and would abort instead of letting
//! the unwinder reach the end of the stack.

#![no_main]

#[cfg(all(target_arch = "x86_64", target_os = "linux"))]
mod catch;

use core::ffi;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

extern "C-unwind" fn throw(payload: *mut ffi::c_void) {
    tracing::info!(?payload, "throwing");
    unsafe { trqeh::__trq_throw(payload) }
}

#[no_mangle]
pub extern "C-unwind" fn main(_argc: ffi::c_int, _argv: *const *const ffi::c_char) -> ffi::c_int {
    let registry = tracing_subscriber::Registry::default().with(
        EnvFilter::builder()
            .with_default_directive(tracing::Level::TRACE.into())
            .from_env()
            .unwrap(),
    );

    let tree_layer = tracing_tree::HierarchicalLayer::new(2)
        .with_targets(true)
        .with_bracketed_fields(true);

    registry.with(tree_layer).init();

    let payload = Box::into_raw(Box::new("meow :3"));

    #[cfg(all(target_arch = "x86_64", target_os = "linux"))]
    if std::env::args().nth(1).as_deref() == Some("catch") {
        let caught = catch::try_catch(throw, payload.cast());
        if caught.is_null() {
            eprintln!("nothing was thrown");
            return 1;
        }
        let message = unsafe { Box::from_raw(caught.cast::<&str>()) };
        println!("caught: {message}");
        return 0;
    }

    throw(payload.cast());
    unreachable!("uncaught exceptions exit")
}
