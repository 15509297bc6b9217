//! Width table computation.
//!
//! Width is the sole observable signal: a generated page carries one
//! container per addressable candidate, every container has a unique width,
//! and the widths cover the candidate space exactly once. One extra slot
//! beyond the alphabet (`char_idx == alphabet_size`) is the no-match
//! sentinel used to detect end of string or a non-matching probe.

use serde::Serialize;

/// One candidate container: a layout element of a unique width, bound to a
/// single character index and, on batched pages, one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WidthContainer {
    /// Container width in layout units
    pub width: usize,
    /// Candidate index this width encodes
    pub char_idx: usize,
    /// Position block on a batched page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
}

/// A page's width table plus the page width that makes it renderable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingTable {
    /// Width the page body must be laid out at
    pub html_width: usize,
    /// Containers in increasing width order
    pub containers: Vec<WidthContainer>,
}

/// Table for a page resolving one character.
///
/// A strictly decreasing bijection from width to candidate index over
/// `[0, alphabet_size]`: width 1 carries the largest index (the sentinel),
/// width `alphabet_size + 1` carries index 0.
pub fn single_step_table(alphabet_size: usize) -> EncodingTable {
    let html_width = alphabet_size + 2;

    let containers = (1..=alphabet_size + 1)
        .map(|width| WidthContainer {
            width,
            char_idx: html_width - width - 1,
            step: None,
        })
        .collect();

    EncodingTable {
        html_width,
        containers,
    }
}

/// Table packing `length` independent positions into one page.
///
/// The width axis splits into `length` contiguous blocks of
/// `alphabet_size + 1` widths, block `p` covering position `p`'s full
/// candidate range. Widths shrink as offsets shrink, so block 0 occupies
/// the smallest widths.
pub fn batched_table(alphabet_size: usize, length: usize) -> EncodingTable {
    let slots = alphabet_size + 1;
    let html_width = length * slots + 1;

    let containers = (1..html_width)
        .map(|width| {
            let offset = html_width - width - 1;
            WidthContainer {
                width,
                char_idx: offset % slots,
                step: Some(offset / slots),
            }
        })
        .collect();

    EncodingTable {
        html_width,
        containers,
    }
}
