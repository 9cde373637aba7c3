use serde::{Deserialize, Serialize};

/// One page of a list, requested by 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub number: u64,
    pub size: u64,
}

impl PageRequest {
    /// `None` for page 0, an empty page size, or a page whose first row lies
    /// beyond what a SQL `OFFSET` can address.
    pub fn new(number: u64, size: u64) -> Option<Self> {
        if number == 0 || size == 0 {
            return None;
        }
        let offset = (number - 1).checked_mul(size)?;
        (offset <= i64::MAX as u64).then_some(Self { number, size })
    }

    pub fn offset(&self) -> u64 {
        (self.number - 1).saturating_mul(self.size)
    }
}

/// A page of results together with the size of the whole list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub size: u64,
    pub total_items: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            number: request.number,
            size: request.size,
            total_items,
        }
    }

    /// An empty list still has one (empty) page.
    pub fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(self.size).max(1)
    }

    pub fn is_out_of_range(&self) -> bool {
        self.number > self.total_pages()
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_items: self.total_items,
        }
    }
}
