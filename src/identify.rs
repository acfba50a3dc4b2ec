use core::ffi::CStr;

/// The name of the symbol containing `addr`, if the dynamic linker knows it.
///
/// Only used for diagnostics. Functions in the main executable are only found
/// if it exports its symbols (`-rdynamic`).
pub fn identify(addr: usize) -> Option<&'static CStr> {
    unsafe {
        let mut info: libc::Dl_info = core::mem::zeroed();

        if libc::dladdr(core::ptr::with_exposed_provenance(addr), &mut info) == 0 {
            return None;
        }

        if !info.dli_sname.is_null() {
            let sym_name = CStr::from_ptr(info.dli_sname);
            return Some(sym_name);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn unmapped_address() {
        assert_eq!(super::identify(0), None);
    }
}
