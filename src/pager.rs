use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::StorageError;
use crate::{PAGE_SIZE, TABLE_MAX_PAGES};

pub type Page = [u8; PAGE_SIZE];

/// Page cache in front of the database file.
///
/// Pages are read from disk the first time they are asked for and then stay
/// resident until the pager is closed. Nothing is written back unless the
/// caller flushes it.
pub struct Pager {
    file: File,
    file_length: u64,
    pages: Vec<Option<Box<Page>>>,
}

impl Pager {
    /// Opens the database file, creating it if it does not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options.open(path)?;
        let file_length = file.metadata()?.len();

        Ok(Self {
            file,
            file_length,
            pages: (0..TABLE_MAX_PAGES).map(|_| None).collect(),
        })
    }

    pub fn file_length(&self) -> u64 {
        self.file_length
    }

    /// Number of pages that have at least one byte on disk.
    pub fn num_pages(&self) -> usize {
        self.file_length.div_ceil(PAGE_SIZE as u64) as usize
    }

    pub fn is_loaded(&self, page_num: usize) -> bool {
        matches!(self.pages.get(page_num), Some(Some(_)))
    }

    /// Returns the resident buffer for `page_num`, loading it on first use.
    pub fn get_page(&mut self, page_num: usize) -> Result<&mut Page, StorageError> {
        if page_num >= TABLE_MAX_PAGES {
            return Err(StorageError::PageOutOfBounds {
                page: page_num,
                max: TABLE_MAX_PAGES,
            });
        }

        let page = match self.pages[page_num].take() {
            Some(page) => page,
            None => self.load_page(page_num)?,
        };
        let page: &mut Page = self.pages[page_num].insert(page);
        Ok(page)
    }

    fn load_page(&mut self, page_num: usize) -> Result<Box<Page>, StorageError> {
        let mut page = Box::new([0u8; PAGE_SIZE]);
        if page_num >= self.num_pages() {
            return Ok(page);
        }

        self.file.seek(SeekFrom::Start((page_num * PAGE_SIZE) as u64))?;
        // The last page on disk may be short; the rest stays zeroed.
        let mut filled = 0;
        while filled < PAGE_SIZE {
            match self.file.read(&mut page[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        tracing::debug!(page = page_num, bytes = filled, "loaded page");
        Ok(page)
    }

    /// Writes the first `size` bytes of a resident page back to its slot in
    /// the file.
    pub fn flush(&mut self, page_num: usize, size: usize) -> Result<(), StorageError> {
        if size > PAGE_SIZE {
            return Err(StorageError::FlushTooLarge {
                page: page_num,
                size,
                max: PAGE_SIZE,
            });
        }
        let page = self
            .pages
            .get(page_num)
            .and_then(Option::as_deref)
            .ok_or(StorageError::FlushUnloadedPage(page_num))?;

        let offset = (page_num * PAGE_SIZE) as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&page[..size])?;
        self.file_length = self.file_length.max(offset + size as u64);
        tracing::debug!(page = page_num, bytes = size, "flushed page");
        Ok(())
    }

    /// Syncs the file and drops every resident page.
    ///
    /// Pages that were not flushed beforehand are lost.
    pub fn close(mut self) -> Result<(), StorageError> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}
