use serde::{Deserialize, Serialize};

/// One page of a server-side list, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    pub limit: u32,
}

impl Page {
    /// Page numbers and limits below 1 are clamped to 1.
    pub fn new(number: u32, limit: u32) -> Self {
        Self {
            number: number.max(1),
            limit: limit.max(1),
        }
    }

    pub fn first(limit: u32) -> Self {
        Self::new(1, limit)
    }

    /// Saturates at `u32::MAX` for page numbers past the addressable range.
    pub fn offset(&self) -> u32 {
        self.number.saturating_sub(1).saturating_mul(self.limit)
    }

    /// A short page means the server has nothing further.
    pub fn is_last_page(&self, rows: usize) -> bool {
        rows < self.limit as usize
    }

    pub fn next(&self) -> Self {
        Self::new(self.number.saturating_add(1), self.limit)
    }

    pub fn previous(&self) -> Option<Self> {
        (self.number > 1).then(|| Self::new(self.number - 1, self.limit))
    }
}
