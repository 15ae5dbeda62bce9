use std::path::Path;

use crate::error::{ExecuteError, StorageError};
use crate::pager::Pager;
use crate::row::Row;
use crate::{PAGE_SIZE, ROW_SIZE, ROWS_PER_PAGE, TABLE_MAX_ROWS};

/// The single append-only table, stored as an array of pages.
pub struct Table {
    pager: Pager,
    num_rows: usize,
}

impl Table {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let pager = Pager::open(path)?;
        let file_length = pager.file_length() as usize;

        // Full pages carry unused tail bytes, so count rows page by page.
        let full_pages = file_length / PAGE_SIZE;
        let tail = file_length % PAGE_SIZE;
        if tail % ROW_SIZE != 0 {
            tracing::warn!(
                path = %path.display(),
                file_length,
                "file ends with a partial row, ignoring it"
            );
        }
        let stored_rows = full_pages * ROWS_PER_PAGE + tail / ROW_SIZE;
        if stored_rows > TABLE_MAX_ROWS {
            tracing::warn!(
                path = %path.display(),
                stored_rows,
                max_rows = TABLE_MAX_ROWS,
                "file holds more rows than the table can address, ignoring the excess"
            );
        }
        let num_rows = stored_rows.min(TABLE_MAX_ROWS);

        tracing::info!(path = %path.display(), num_rows, "opened table");
        Ok(Self { pager, num_rows })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn row_slot(&mut self, row_num: usize) -> Result<&mut [u8], StorageError> {
        let page_num = row_num / ROWS_PER_PAGE;
        let byte_offset = (row_num % ROWS_PER_PAGE) * ROW_SIZE;
        let page = self.pager.get_page(page_num)?;
        Ok(&mut page[byte_offset..byte_offset + ROW_SIZE])
    }

    /// Appends `row` after the last stored row.
    pub fn insert(&mut self, row: &Row) -> Result<(), ExecuteError> {
        if self.num_rows >= TABLE_MAX_ROWS {
            return Err(ExecuteError::TableFull);
        }
        row.serialize(self.row_slot(self.num_rows)?);
        self.num_rows += 1;
        Ok(())
    }

    /// Scans every row in insertion order.
    ///
    /// An empty table is reported as [`ExecuteError::TableEmpty`] rather than
    /// as an empty scan.
    pub fn select_all(&mut self) -> Result<Rows<'_>, ExecuteError> {
        if self.num_rows == 0 {
            return Err(ExecuteError::TableEmpty);
        }
        Ok(Rows {
            table: self,
            next: 0,
        })
    }

    /// Writes resident pages back and closes the file.
    ///
    /// Only bytes that belong to stored rows are written for the last page.
    pub fn close(mut self) -> Result<(), StorageError> {
        let num_full_pages = self.num_rows / ROWS_PER_PAGE;
        for page_num in 0..num_full_pages {
            if self.pager.is_loaded(page_num) {
                self.pager.flush(page_num, PAGE_SIZE)?;
            }
        }

        let num_additional_rows = self.num_rows % ROWS_PER_PAGE;
        if num_additional_rows > 0 && self.pager.is_loaded(num_full_pages) {
            self.pager.flush(num_full_pages, num_additional_rows * ROW_SIZE)?;
        }

        tracing::info!(num_rows = self.num_rows, "closed table");
        self.pager.close()
    }
}

/// Forward scan over a table; yields each row once.
pub struct Rows<'a> {
    table: &'a mut Table,
    next: usize,
}

impl Iterator for Rows<'_> {
    type Item = Result<Row, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.table.num_rows {
            return None;
        }
        let row_num = self.next;
        self.next += 1;
        Some(self.table.row_slot(row_num).map(|slot| Row::deserialize(slot)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.table.num_rows - self.next;
        (remaining, Some(remaining))
    }
}
