//! The language specific data area, as emitted into `.gcc_except_table`.
//!
//! ```text
//! [lpstart enc][lpstart]
//! [ttype enc][ttype offset, uleb128, only if ttype enc is not omit]
//! [call site enc][call site table length, uleb128]
//! [call site table]
//! [action table]
//! ```
//!
//! Every call site entry is `[start][length][landing pad][action]`, the first
//! three in the call site encoding and the action as uleb128. Action records
//! are `[type filter, sleb128][next offset, sleb128]`.

#[cfg(test)]
mod tests;

use super::parse::{read_encoded, Cursor, Encoding};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy)]
pub struct Lsda<'a> {
    /// The landing pad offsets of the call sites are relative to this.
    pub landing_pad_base: usize,
    pub ttype_encoding: Encoding,
    /// There is no typed matching, so this is read and then ignored.
    pub ttype_offset: Option<u64>,
    pub call_site_encoding: Encoding,
    call_sites: Cursor<'a>,
    /// The action table starts right after the call site table, the rest of
    /// the data is addressed relative to it.
    actions: Cursor<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// Offset of the covered code from the start of the function.
    pub start: usize,
    pub length: usize,
    /// Offset from the landing pad base, `0` if there is no landing pad.
    pub landing_pad: usize,
    /// One plus the offset of the first action record, `0` for a cleanup
    /// without an action chain.
    pub action: u64,
}

impl CallSite {
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset - self.start < self.length
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRecord {
    /// Where the record starts.
    pub address: usize,
    /// `0` is a cleanup, anything else catches.
    pub type_filter: i64,
    /// The address of the next record in the chain.
    pub next: Option<usize>,
}

impl<'a> Lsda<'a> {
    /// Parses the header, leaving the call sites and actions to be read
    /// lazily.
    ///
    /// # Safety
    /// Indirect pointers in the header must be readable.
    pub unsafe fn parse(mut data: Cursor<'a>, region_start: usize) -> Result<Self> {
        let lp_start_encoding = Encoding(data.read_u8()?);
        let landing_pad_base = match unsafe { read_encoded(&mut data, lp_start_encoding)? } {
            0 => region_start,
            base => base,
        };

        let ttype_encoding = Encoding(data.read_u8()?);
        let ttype_offset = if ttype_encoding != Encoding::OMIT {
            Some(data.read_uleb128()?)
        } else {
            None
        };

        let call_site_encoding = Encoding(data.read_u8()?);
        let call_site_table_len = data.read_uleb128()? as usize;
        let call_sites = data.split(call_site_table_len)?;

        let lsda = Lsda {
            landing_pad_base,
            ttype_encoding,
            ttype_offset,
            call_site_encoding,
            call_sites,
            actions: data,
        };
        trace!(?lsda, "parsed LSDA header");
        Ok(lsda)
    }

    /// Iterates over the call site table in order.
    pub fn call_sites(&self) -> CallSites<'a> {
        CallSites {
            data: self.call_sites,
            encoding: self.call_site_encoding,
            done: false,
        }
    }

    /// The absolute address of a landing pad of a call site.
    pub fn landing_pad(&self, call_site: &CallSite) -> usize {
        self.landing_pad_base.wrapping_add(call_site.landing_pad)
    }

    /// The action chain starting at `index`, which is the non-zero `action`
    /// of a call site.
    pub fn actions(&self, index: u64) -> ActionChain<'_, 'a> {
        let base = self.actions.position();
        ActionChain {
            lsda: self,
            next: Some(base.wrapping_add(index as usize).wrapping_sub(1)),
            tortoise: None,
            power: 1,
            steps: 0,
        }
    }

    fn action_at(&self, address: usize) -> Result<ActionRecord> {
        let mut data = self.actions;
        data.seek(address)?;
        let type_filter = data.read_sleb128()?;
        let next_field = data.position();
        let next_offset = data.read_sleb128()?;
        let next = (next_offset != 0).then(|| next_field.wrapping_add(next_offset as usize));
        Ok(ActionRecord {
            address,
            type_filter,
            next,
        })
    }
}

/// Iterator over the records of an action chain.
///
/// Chains are linked by relative offsets and nothing stops a table from
/// linking a record back to an earlier one. Cycles are found with Brent's
/// algorithm and reported as [`Error::ActionChainCycle`], after which the
/// iterator ends.
#[derive(Debug)]
pub struct ActionChain<'l, 'a> {
    lsda: &'l Lsda<'a>,
    next: Option<usize>,
    tortoise: Option<usize>,
    power: usize,
    steps: usize,
}

impl Iterator for ActionChain<'_, '_> {
    type Item = Result<ActionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let address = self.next.take()?;
        if self.tortoise == Some(address) {
            return Some(Err(Error::ActionChainCycle { at: address }));
        }
        if self.steps == self.power {
            self.tortoise = Some(address);
            self.power *= 2;
            self.steps = 0;
        }
        self.steps += 1;

        let record = self.lsda.action_at(address);
        if let Ok(record) = &record {
            self.next = record.next;
        }
        Some(record)
    }
}

/// Iterator over the entries of a call site table.
#[derive(Debug)]
pub struct CallSites<'a> {
    data: Cursor<'a>,
    encoding: Encoding,
    done: bool,
}

impl CallSites<'_> {
    fn read_entry(&mut self) -> Result<CallSite> {
        // SAFETY: `next` rejects indirect call site encodings, so nothing is
        // dereferenced here.
        unsafe {
            Ok(CallSite {
                start: read_encoded(&mut self.data, self.encoding)?,
                length: read_encoded(&mut self.data, self.encoding)?,
                landing_pad: read_encoded(&mut self.data, self.encoding)?,
                action: self.data.read_uleb128()?,
            })
        }
    }
}

impl Iterator for CallSites<'_> {
    type Item = Result<CallSite>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.data.remaining() == 0 {
            return None;
        }
        if self.encoding.0 & 0x80 != 0 {
            self.done = true;
            return Some(Err(Error::UnsupportedEncoding(self.encoding.0)));
        }
        let entry = self.read_entry();
        self.done = entry.is_err();
        Some(entry)
    }
}
