use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::error::{TiffResult, UsageError};
use crate::tags::ByteOrder;

macro_rules! write_fn {
    ($name:ident, $type:ty, $len:expr) => {
        pub fn $name(&mut self, n: $type) -> Result<(), io::Error> {
            match self.byte_order {
                ByteOrder::LittleEndian => self.writer.$name::<LittleEndian>(n)?,
                ByteOrder::BigEndian => self.writer.$name::<BigEndian>(n)?,
            }
            self.offset += $len;
            Ok(())
        }
    };
}

/// Byte order aware writer that tracks its offset relative to the TIFF header.
pub struct TiffWriter<W> {
    writer: W,
    byte_order: ByteOrder,
    /// Stream position of the TIFF header.
    base: u64,
    offset: u64,
}

impl<W: Write + Seek> TiffWriter<W> {
    pub fn new(mut writer: W, byte_order: ByteOrder) -> Result<Self, io::Error> {
        let base = writer.stream_position()?;
        Ok(TiffWriter {
            writer,
            byte_order,
            base,
            offset: 0,
        })
    }

    pub fn goto_offset(&mut self, offset: u64) -> Result<(), io::Error> {
        self.writer.seek(SeekFrom::Start(self.base + offset))?;
        self.offset = offset;
        Ok(())
    }
}

impl<W: Write> TiffWriter<W> {
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Offset of the next byte written, relative to the TIFF header.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn write_header(&mut self) -> Result<(), io::Error> {
        let marker = self.byte_order.marker();
        self.write_bytes(&marker)?;
        self.write_u16(42)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), io::Error> {
        self.writer.write_all(bytes)?;
        self.offset += bytes.len() as u64;
        Ok(())
    }

    write_fn!(write_u16, u16, 2);
    write_fn!(write_u32, u32, 4);

    pub fn pad_word_boundary(&mut self) -> Result<(), io::Error> {
        if self.offset % 4 != 0 {
            let padding = [0, 0, 0];
            let padd_len = 4 - (self.offset % 4);
            self.write_bytes(&padding[..padd_len as usize])?;
        }

        Ok(())
    }

    /// Writes zeros up to `offset`.
    ///
    /// Fails if `offset` was passed already, which means the emitted bytes diverged from the
    /// computed layout.
    pub fn pad_to(&mut self, offset: u64) -> TiffResult<()> {
        if offset < self.offset {
            log::debug!("emission at {} passed layout offset {}", self.offset, offset);
            return Err(UsageError::LayoutUnstable.into());
        }
        let padding = offset - self.offset;
        io::copy(&mut io::repeat(0).take(padding), self)?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Write for TiffWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.writer.write(buf)?;
        self.offset += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Rounds up to the next multiple of four.
pub(crate) fn align(offset: u64) -> u64 {
    (offset + 3) & !3
}
