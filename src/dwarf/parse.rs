//! Readers for the integer and pointer encodings used by `.gcc_except_table`.
//!
//! Source: <https://refspecs.linuxfoundation.org/LSB_5.0.0/LSB-Core-generic/LSB-Core-generic/dwarfext.html>
//! and the `DW_EH_PE_*` definitions of the LSB `.eh_frame` chapter.
//!
//! Pointers in the exception tables are stored with a one byte encoding in
//! front of them. The low nibble says how the value is stored, the high nibble
//! what it is relative to:
//! ```text
//!  7   6 5 4   3 2 1 0
//! [ind][ app ][ format]
//! ```
//! `0xff` is special and means the value is omitted entirely.


use core::{fmt, marker::PhantomData, mem};

use crate::{Error, Result};

/// A read position inside an exception table.
///
/// Tables handed to us by the unwinder have no known length, so the end may
/// be unbounded. Tables built from a slice are bounds checked.
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    ptr: *const u8,
    start: usize,
    end: usize,
    _data: PhantomData<&'a [u8]>,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        let ptr = data.as_ptr();
        Self {
            ptr,
            start: ptr.addr(),
            end: ptr.addr() + data.len(),
            _data: PhantomData,
        }
    }

    /// Creates a cursor over a table of unknown length.
    ///
    /// # Safety
    /// `ptr` must point to a well formed exception table that stays valid for
    /// `'a`. Reads are only limited by the contents of that table.
    pub unsafe fn from_ptr(ptr: *const u8) -> Self {
        Self {
            ptr,
            start: ptr.addr(),
            end: usize::MAX,
            _data: PhantomData,
        }
    }

    /// The address of the next byte that will be read.
    pub fn position(&self) -> usize {
        self.ptr.addr()
    }

    pub fn remaining(&self) -> usize {
        self.end - self.position()
    }

    /// Moves the cursor to an absolute address in the same table.
    pub(crate) fn seek(&mut self, addr: usize) -> Result<()> {
        if addr < self.start || addr >= self.end {
            return Err(Error::ActionOutOfBounds { at: addr });
        }
        self.ptr = self
            .ptr
            .wrapping_byte_offset(addr.wrapping_sub(self.position()) as isize);
        Ok(())
    }

    /// Returns a cursor over the next `len` bytes and skips them.
    pub(crate) fn split(&mut self, len: usize) -> Result<Cursor<'a>> {
        self.ensure(len)?;
        let head = Cursor {
            ptr: self.ptr,
            start: self.position(),
            end: self.position() + len,
            _data: PhantomData,
        };
        self.ptr = self.ptr.wrapping_add(len);
        Ok(head)
    }

    fn ensure(&self, wanted: usize) -> Result<()> {
        if self.remaining() < wanted {
            return Err(Error::Truncated {
                at: self.position(),
                wanted,
            });
        }
        Ok(())
    }

    fn read<T: Copy>(&mut self) -> Result<T> {
        self.ensure(mem::size_of::<T>())?;
        // SAFETY: The bytes are in bounds of the table, which is valid for 'a.
        let value = unsafe { self.ptr.cast::<T>().read_unaligned() };
        self.ptr = self.ptr.wrapping_add(mem::size_of::<T>());
        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read()
    }

    pub fn read_uleb128(&mut self) -> Result<u64> {
        let at = self.position();
        let mut result = 0;
        let mut shift = 0;
        loop {
            if shift >= u64::BITS {
                return Err(Error::VarintOverflow { at });
            }
            let byte = self.read_u8()?;
            // Only the lowest bit of the tenth group is left in a u64.
            if shift == 63 && byte & 0b0111_1110 != 0 {
                return Err(Error::VarintOverflow { at });
            }
            result |= ((byte & 0b0111_1111) as u64) << shift;
            shift += 7;
            if (byte >> 7) == 0 {
                break;
            }
        }
        Ok(result)
    }

    pub fn read_sleb128(&mut self) -> Result<i64> {
        let at = self.position();
        let mut result = 0;
        let mut shift = 0;
        let sign_bit_set = loop {
            if shift >= u64::BITS {
                return Err(Error::VarintOverflow { at });
            }
            let byte = self.read_u8()?;
            // The bits of the tenth group past bit 63 must be sign extension.
            if shift == 63 && !matches!(byte & 0b0111_1111, 0 | 0b0111_1111) {
                return Err(Error::VarintOverflow { at });
            }
            result |= ((byte & 0b0111_1111) as u64) << shift;
            shift += 7;
            if (byte >> 7) == 0 {
                break ((byte >> 6) & 1) == 1;
            }
        };
        if (shift < u64::BITS) && sign_bit_set {
            result |= !0 << shift;
        }
        Ok(result as i64)
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &format_args!("{:#x}", self.position()))
            .field("start", &format_args!("{:#x}", self.start))
            .finish_non_exhaustive()
    }
}

/// Reads a pointer stored with `encoding` and advances past it.
///
/// PC relative values are relative to the address of their first byte. A
/// value of zero is returned as is, without relocation or indirection, since
/// it means "no pointer" in every table that uses these encodings.
///
/// # Safety
/// If `encoding` is indirect, the decoded address must be readable.
pub unsafe fn read_encoded(data: &mut Cursor<'_>, encoding: Encoding) -> Result<usize> {
    if encoding == Encoding::OMIT {
        return Ok(0);
    }
    let field = data.position();

    let value = match encoding.format()? {
        ValueFormat::DW_EH_PE_absptr => data.read::<usize>()?,
        ValueFormat::DW_EH_PE_uleb128 => data.read_uleb128()? as usize,
        ValueFormat::DW_EH_PE_udata2 => data.read::<u16>()? as usize,
        ValueFormat::DW_EH_PE_udata4 => data.read::<u32>()? as usize,
        ValueFormat::DW_EH_PE_udata8 => data.read::<u64>()? as usize,
        ValueFormat::DW_EH_PE_sleb128 => data.read_sleb128()? as isize as usize,
        ValueFormat::DW_EH_PE_sdata2 => data.read::<i16>()? as isize as usize,
        ValueFormat::DW_EH_PE_sdata4 => data.read::<i32>()? as isize as usize,
        ValueFormat::DW_EH_PE_sdata8 => data.read::<i64>()? as isize as usize,
    };

    if value == 0 {
        return Ok(0);
    }

    let value = match encoding.application() {
        ValueApplication::DW_EH_PE_absptr => value,
        ValueApplication::DW_EH_PE_pcrel => value.wrapping_add(field),
        ValueApplication::DW_EH_PE_textrel
        | ValueApplication::DW_EH_PE_datarel
        | ValueApplication::DW_EH_PE_funcrel
        | ValueApplication::DW_EH_PE_aligned
        | ValueApplication::Unknown => return Err(Error::UnsupportedEncoding(encoding.0)),
    };

    if encoding.is_indirect() {
        trace!("dereferencing indirect pointer {value:#x}");
        // SAFETY: The caller guarantees indirect addresses are readable.
        return Ok(unsafe { core::ptr::with_exposed_provenance::<usize>(value).read_unaligned() });
    }

    Ok(value)
}

#[derive(PartialEq, Eq, Clone, Copy)]
#[repr(transparent)]
pub struct Encoding(pub u8);

impl Encoding {
    pub const OMIT: Encoding = Encoding(0xff);
    const INDIRECT: u8 = 0x80;

    fn format(&self) -> Result<ValueFormat> {
        Ok(match self.0 & 0b1111 {
            0x00 => ValueFormat::DW_EH_PE_absptr,
            0x01 => ValueFormat::DW_EH_PE_uleb128,
            0x02 => ValueFormat::DW_EH_PE_udata2,
            0x03 => ValueFormat::DW_EH_PE_udata4,
            0x04 => ValueFormat::DW_EH_PE_udata8,
            0x09 => ValueFormat::DW_EH_PE_sleb128,
            0x0A => ValueFormat::DW_EH_PE_sdata2,
            0x0B => ValueFormat::DW_EH_PE_sdata4,
            0x0C => ValueFormat::DW_EH_PE_sdata8,
            _ => return Err(Error::InvalidEncoding(self.0)),
        })
    }

    fn application(&self) -> ValueApplication {
        match self.0 & 0x70 {
            0x00 => ValueApplication::DW_EH_PE_absptr,
            0x10 => ValueApplication::DW_EH_PE_pcrel,
            0x20 => ValueApplication::DW_EH_PE_textrel,
            0x30 => ValueApplication::DW_EH_PE_datarel,
            0x40 => ValueApplication::DW_EH_PE_funcrel,
            0x50 => ValueApplication::DW_EH_PE_aligned,
            _ => ValueApplication::Unknown,
        }
    }

    fn is_indirect(&self) -> bool {
        self.0 & Self::INDIRECT != 0
    }
}

impl fmt::Debug for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Encoding::OMIT {
            return f.write_str("DW_EH_PE_omit");
        }
        match self.format() {
            Ok(format) => write!(f, "{:?} | {:?}", self.application(), format)?,
            Err(_) => write!(f, "{:?} | <invalid {:#x}>", self.application(), self.0 & 0xf)?,
        }
        if self.is_indirect() {
            f.write_str(" | DW_EH_PE_indirect")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
#[repr(u8)]
#[allow(non_camel_case_types)]
enum ValueFormat {
    /// A pointer sized value.
    DW_EH_PE_absptr = 0x00,
    /// Unsigned value is encoded using the Little Endian Base 128 (LEB128) as
    /// defined by DWARF Debugging Information Format, Revision 2.0.0 (July 27,
    /// 1993).
    DW_EH_PE_uleb128 = 0x01,
    /// A 2 bytes unsigned value.
    DW_EH_PE_udata2 = 0x02,
    /// A 4 bytes unsigned value.
    DW_EH_PE_udata4 = 0x03,
    /// An 8 bytes unsigned value.
    DW_EH_PE_udata8 = 0x04,
    /// Signed value is encoded using the Little Endian Base 128 (LEB128) as
    /// defined by DWARF Debugging Information Format, Revision 2.0.0 (July 27,
    /// 1993).
    DW_EH_PE_sleb128 = 0x09,
    /// A 2 bytes signed value.
    DW_EH_PE_sdata2 = 0x0A,
    /// A 4 bytes signed value.
    DW_EH_PE_sdata4 = 0x0B,
    /// An 8 bytes signed value.
    DW_EH_PE_sdata8 = 0x0C,
}

#[derive(Debug)]
#[repr(u8)]
#[allow(non_camel_case_types)]
enum ValueApplication {
    DW_EH_PE_absptr = 0x00,
    ///	Value is relative to the current program counter.
    DW_EH_PE_pcrel = 0x10,
    ///	Value is relative to the beginning of the .text section.
    DW_EH_PE_textrel = 0x20,
    ///	Value is relative to the beginning of the .got or .eh_frame_hdr
    /// section.
    DW_EH_PE_datarel = 0x30,
    ///	Value is relative to the beginning of the function.
    DW_EH_PE_funcrel = 0x40,
    ///	Value is aligned to an address unit sized boundary.
    DW_EH_PE_aligned = 0x50,
    Unknown = 0x70,
}
