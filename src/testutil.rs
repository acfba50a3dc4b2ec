//! Helpers for building exception tables and frames in tests.

use std::cell::Cell;

use crate::context::FrameContext;
use crate::dwarf::parse::Cursor;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

pub fn write_uleb128(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

pub fn write_sleb128(out: &mut Vec<u8>, mut value: i64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
        if done {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Builds an LSDA with an omitted landing pad base, no type table and
/// uleb128 call site entries.
#[derive(Default)]
pub struct LsdaBuilder {
    call_sites: Vec<u8>,
    actions: Vec<u8>,
}

impl LsdaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_site(mut self, start: u64, length: u64, landing_pad: u64, action: u64) -> Self {
        for value in [start, length, landing_pad, action] {
            write_uleb128(&mut self.call_sites, value);
        }
        self
    }

    /// Appends an action record and returns the index a call site uses to
    /// refer to it.
    pub fn action(&mut self, type_filter: i64, next_offset: i64) -> u64 {
        let index = self.actions.len() as u64 + 1;
        write_sleb128(&mut self.actions, type_filter);
        write_sleb128(&mut self.actions, next_offset);
        index
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = vec![0xff, 0xff, 0x01];
        write_uleb128(&mut out, self.call_sites.len() as u64);
        out.extend(self.call_sites);
        out.extend(self.actions);
        out
    }
}

/// A stack frame as the unwinder would describe it to a personality routine.
pub struct FakeFrame {
    pub ip: usize,
    pub region_start: usize,
    pub lsda: Option<Vec<u8>>,
    pub registers: [usize; 32],
    pub new_ip: Option<usize>,
    pub lsda_reads: Cell<usize>,
}

impl FakeFrame {
    pub const REGION_START: usize = 0x1000;

    /// A frame stopped at a call returning to `offset + 1` into its function.
    pub fn at(offset: usize, lsda: Option<Vec<u8>>) -> Self {
        Self {
            ip: Self::REGION_START + offset + 1,
            region_start: Self::REGION_START,
            lsda,
            registers: [0; 32],
            new_ip: None,
            lsda_reads: Cell::new(0),
        }
    }
}

impl FrameContext for FakeFrame {
    fn ip(&self) -> usize {
        self.ip
    }

    fn region_start(&self) -> usize {
        self.region_start
    }

    fn lsda(&self) -> Option<Cursor<'_>> {
        self.lsda_reads.set(self.lsda_reads.get() + 1);
        self.lsda.as_deref().map(Cursor::new)
    }

    fn set_gr(&mut self, index: i32, value: usize) {
        self.registers[index as usize] = value;
    }

    fn set_ip(&mut self, value: usize) {
        self.new_ip = Some(value);
    }
}
