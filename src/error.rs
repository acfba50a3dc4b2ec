/// Something is wrong with the exception being propagated or with the tables
/// describing the frames it passes through. All of these are fatal: the
/// personality routine terminates the process when it sees one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("exception table truncated: wanted {wanted} bytes at {at:#x}")]
    Truncated { at: usize, wanted: usize },
    #[error("variable length integer at {at:#x} does not fit in 64 bits")]
    VarintOverflow { at: usize },
    #[error("invalid pointer encoding {0:#04x}")]
    InvalidEncoding(u8),
    #[error("unsupported pointer encoding {0:#04x}")]
    UnsupportedEncoding(u8),
    #[error("action record at {at:#x} is outside of the exception table")]
    ActionOutOfBounds { at: usize },
    #[error("action chain loops back to the record at {at:#x}")]
    ActionChainCycle { at: usize },
    #[error("no call site covers offset {offset:#x}")]
    NoCallSite { offset: usize },
    #[error("catch action reached in cleanup phase without forced unwind (actions={actions:#x})")]
    CatchOutsideSearch { actions: i32 },
    #[error("foreign exception with class {class:#x}")]
    ForeignException { class: u64 },
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
