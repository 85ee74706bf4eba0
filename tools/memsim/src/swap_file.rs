use kernel_alloc::SwapDevice;
use kernel_vmem::info::{PAGE_SIZE, WORD_SIZE};
use kernel_vmem::{Frame, SlotIndex};
use log::warn;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Swap space in a file: slot `n` lives at byte offset `n * PAGE_SIZE`.
///
/// The file is created (or truncated) on open. Words are stored
/// little-endian.
pub struct FileSwap {
    file: File,
    buffer: Box<[u8; PAGE_SIZE]>,
}

impl FileSwap {
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            file,
            buffer: Box::new([0; PAGE_SIZE]),
        })
    }

    fn seek_to(&mut self, slot: SlotIndex) -> io::Result<()> {
        let offset = u64::from(slot.as_u32()) * PAGE_SIZE as u64;
        self.file.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn try_read(&mut self, slot: SlotIndex, frame: &mut Frame) -> io::Result<()> {
        self.seek_to(slot)?;
        self.file.read_exact(&mut self.buffer[..])?;
        for (word, bytes) in frame
            .words_mut()
            .iter_mut()
            .zip(self.buffer.chunks_exact(WORD_SIZE))
        {
            *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        Ok(())
    }

    fn try_write(&mut self, slot: SlotIndex, frame: &Frame) -> io::Result<()> {
        for (bytes, word) in self
            .buffer
            .chunks_exact_mut(WORD_SIZE)
            .zip(frame.words().iter())
        {
            bytes.copy_from_slice(&word.to_le_bytes());
        }
        self.seek_to(slot)?;
        self.file.write_all(&self.buffer[..])
    }
}

impl SwapDevice for FileSwap {
    fn read_page(&mut self, slot: SlotIndex, frame: &mut Frame) -> bool {
        self.try_read(slot, frame)
            .inspect_err(|e| warn!("Reading {slot} from swap file failed: {e}"))
            .is_ok()
    }

    fn write_page(&mut self, slot: SlotIndex, frame: &Frame) -> bool {
        self.try_write(slot, frame)
            .inspect_err(|e| warn!("Writing {slot} to swap file failed: {e}"))
            .is_ok()
    }
}
