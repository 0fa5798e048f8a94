//! Random access reads of a TIFF byte stream

use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use crate::error::{TiffFormatError, TiffResult};
use crate::tags::ByteOrder;

macro_rules! read_fn {
    ($name:ident, $type:ty) => {
        /// Reads a value in the byte order of the stream.
        #[inline(always)]
        fn $name(&mut self) -> io::Result<$type> {
            match self.byte_order() {
                ByteOrder::LittleEndian => ReadBytesExt::$name::<LittleEndian>(self),
                ByteOrder::BigEndian => ReadBytesExt::$name::<BigEndian>(self),
            }
        }
    };
}

/// Reader that is aware of the byte order.
pub trait EndianReader: Read {
    /// Byte order that should be adhered to
    fn byte_order(&self) -> ByteOrder;

    read_fn!(read_u16, u16);
    read_fn!(read_u32, u32);
}

/// Reader with explicit positioning that knows the length of its stream.
///
/// Every read states the absolute offset it starts at and is checked against the stream length
/// before any buffer is allocated.
#[derive(Debug)]
pub struct SmartReader<R> {
    reader: R,
    byte_order: ByteOrder,
    len: u64,
}

impl<R: Read + Seek> SmartReader<R> {
    /// Wraps a reader.
    pub fn wrap(mut reader: R, byte_order: ByteOrder) -> io::Result<Self> {
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        Ok(SmartReader {
            reader,
            byte_order,
            len,
        })
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    /// Total length of the stream.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Moves the cursor to `offset`, which must leave room for `needed` bytes.
    pub fn goto_offset(&mut self, offset: u64, needed: u64) -> TiffResult<()> {
        match offset.checked_add(needed) {
            Some(end) if end <= self.len => {
                self.reader.seek(SeekFrom::Start(offset))?;
                Ok(())
            }
            _ => Err(TiffFormatError::InvalidOffset(offset).into()),
        }
    }

    /// Reads `len` bytes starting at `offset`.
    pub fn read_at(&mut self, offset: u64, len: usize) -> TiffResult<Vec<u8>> {
        self.goto_offset(offset, len as u64)?;
        let mut buf = vec![0; len];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Read for SmartReader<R> {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<R: Read> EndianReader for SmartReader<R> {
    #[inline(always)]
    fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }
}
