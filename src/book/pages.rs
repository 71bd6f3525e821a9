use serde::{Deserialize, Serialize};

use crate::error::{BookError, Result};

/// Inclusive `[first, last]` page span, serialized as a two-element array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct PageRange {
    pub first: u32,
    pub last: u32,
}

impl PageRange {
    pub fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    pub fn len(&self) -> usize {
        if self.last < self.first {
            0
        } else {
            (self.last - self.first + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, page: u32) -> bool {
        (self.first..=self.last).contains(&page)
    }
}

impl From<[u32; 2]> for PageRange {
    fn from(pair: [u32; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<PageRange> for [u32; 2] {
    fn from(range: PageRange) -> Self {
        [range.first, range.last]
    }
}

/// Convert a lowercase or uppercase roman numeral to its value
pub fn roman_to_int(numeral: &str) -> Result<u32> {
    let numeral = numeral.trim();
    if numeral.is_empty() {
        return Err(BookError::InvalidRoman(numeral.to_string()));
    }

    let mut total = 0u32;
    let mut prev = 0u32;

    for ch in numeral.chars().rev() {
        let value = match ch.to_ascii_lowercase() {
            'i' => 1,
            'v' => 5,
            'x' => 10,
            'l' => 50,
            'c' => 100,
            'd' => 500,
            'm' => 1000,
            _ => return Err(BookError::InvalidRoman(numeral.to_string())),
        };

        if value < prev {
            total = total
                .checked_sub(value)
                .ok_or_else(|| BookError::InvalidRoman(numeral.to_string()))?;
        } else {
            total += value;
            prev = value;
        }
    }

    Ok(total)
}

/// Parse a printed page label: arabic digits or a roman numeral
pub fn parse_page_label(label: &str) -> Result<u32> {
    let label = label.trim();
    if !label.is_empty() && label.chars().all(|c| c.is_ascii_digit()) {
        return label
            .parse()
            .map_err(|_| BookError::InvalidRoman(label.to_string()));
    }
    roman_to_int(label)
}

/// Spread `count` paragraphs evenly across a page range.
///
/// Used when the source carries no page markers. Each page receives
/// `max(1, count / pages)` paragraphs and the overflow lands on the last page.
pub fn distribute_pages(count: usize, range: PageRange) -> Vec<u32> {
    if range.is_empty() {
        return vec![range.first; count];
    }

    let pages = range.len();
    let per_page = (count / pages).max(1);

    (0..count)
        .map(|i| {
            let page_idx = (i / per_page).min(pages - 1);
            range.first + page_idx as u32
        })
        .collect()
}
