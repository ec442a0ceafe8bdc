//! The flags field of a service reference.
//!
//! Both bouquet content lines (`#SERVICE 1:0:19:...`) and index rows
//! (`#SERVICE 1:7:1:0:0:0:0:0:0:0:FROM BOUQUET ...`) carry a decimal flags
//! integer at colon position 1. Hiding a line means setting one bit there.

use std::ops::Range;

/// `eServiceReference::isInvisible`.
pub const INVISIBLE: u32 = 0x200;

pub fn set_invisible(flags: u32) -> u32 {
    flags | INVISIBLE
}

pub fn clear_invisible(flags: u32) -> u32 {
    flags & !INVISIBLE
}

pub fn is_invisible(flags: u32) -> bool {
    flags & INVISIBLE != 0
}

/// A plain service: no flag besides the invisibility bit. Markers,
/// directories and numbered markers all carry other bits.
pub fn is_playable(flags: u32) -> bool {
    flags & !INVISIBLE == 0
}

/// Byte range of the number at colon position 1, without the whitespace
/// around it.
fn flags_span(line: &str) -> Option<Range<usize>> {
    let start = line.find(':')? + 1;
    let end = line[start..]
        .find(':')
        .map(|i| start + i)
        .unwrap_or(line.len());
    let field = &line[start..end];
    let digits = field.trim_start();
    let start = start + (field.len() - digits.len());
    Some(start..start + digits.trim_end().len())
}

/// Reads the flags field, `None` when there is none or it is not a number.
pub fn read_flags(line: &str) -> Option<u32> {
    let span = flags_span(line)?;
    line[span].parse().ok()
}

/// Replaces the flags field with `update(flags)`.
///
/// Returns `None` when the line has no numeric flags field. When the value does
/// not change the line comes back byte-identical, including any padding of the
/// original number.
pub fn update_flags(line: &str, update: impl FnOnce(u32) -> u32) -> Option<String> {
    let span = flags_span(line)?;
    let old: u32 = line[span.clone()].parse().ok()?;
    let new = update(old);
    if new == old {
        return Some(line.to_string());
    }
    let mut out = String::with_capacity(line.len() + 4);
    out.push_str(&line[..span.start]);
    out.push_str(&new.to_string());
    out.push_str(&line[span.end..]);
    Some(out)
}
