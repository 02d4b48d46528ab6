//! Address-set grammar (component C7), used by `dregion`, `delete`, and
//! similar commands that take an id set argument.
//!
//! Grammar: `[!]tok(,tok)*` where `tok` is a non-negative integer (decimal
//! or `0x`-prefixed hex) or an `n..m` inclusive range. A leading `!` inverts
//! the parsed set against the ambient universe `0..universe`. Ported from
//! `sets.c`'s `parse_uintset`, simplified from its hand-rolled character
//! state machine into a token-splitting parser — the input language is
//! small enough that `str::split` plus per-token parsing is both clearer
//! and exactly as capable.

use crate::error::SetError;

/// Parse an address-set expression into a sorted, deduplicated list of ids
/// strictly less than `universe`. Mirrors `parse_uintset`.
pub fn parse_uintset(input: &str, universe: usize) -> Result<Vec<usize>, SetError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SetError::Empty);
    }

    let (invert, body) = match input.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    if body.is_empty() {
        return Err(SetError::Empty);
    }

    let mut ids = Vec::new();
    for token in body.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(SetError::MalformedToken);
        }
        parse_token(token, universe, &mut ids)?;
    }

    ids.sort_unstable();
    for window in ids.windows(2) {
        if window[0] == window[1] {
            return Err(SetError::Duplicate);
        }
    }

    if invert {
        let mut inverted = Vec::with_capacity(universe - ids.len());
        let mut next = 0;
        for id in ids {
            while next < id {
                inverted.push(next);
                next += 1;
            }
            next = id + 1;
        }
        while next < universe {
            inverted.push(next);
            next += 1;
        }
        if inverted.is_empty() {
            return Err(SetError::Empty);
        }
        Ok(inverted)
    } else {
        Ok(ids)
    }
}

fn parse_token(token: &str, universe: usize, ids: &mut Vec<usize>) -> Result<(), SetError> {
    if let Some((low, high)) = token.split_once("..") {
        let low = if low.is_empty() { 0 } else { parse_uint(low)? };
        let high = if high.is_empty() {
            universe.checked_sub(1).ok_or(SetError::OutOfBounds)?
        } else {
            parse_uint(high)?
        };
        if high < low {
            return Err(SetError::SwappedRange);
        }
        if high >= universe {
            return Err(SetError::OutOfBounds);
        }
        ids.extend(low..=high);
        Ok(())
    } else {
        let n = parse_uint(token)?;
        if n >= universe {
            return Err(SetError::OutOfBounds);
        }
        ids.push(n);
        Ok(())
    }
}

fn parse_uint(s: &str) -> Result<usize, SetError> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).map_err(|_| SetError::MalformedToken)
    } else {
        s.parse::<usize>().map_err(|_| SetError::MalformedToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_ids() {
        assert_eq!(parse_uintset("1,3,5", 10).unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn hex_ids() {
        assert_eq!(parse_uintset("0x1,0xa", 20).unwrap(), vec![1, 10]);
    }

    #[test]
    fn range_is_inclusive() {
        assert_eq!(parse_uintset("2..4", 10).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn open_range_start() {
        assert_eq!(parse_uintset("..2", 10).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn open_range_end() {
        assert_eq!(parse_uintset("7..", 10).unwrap(), vec![7, 8, 9]);
    }

    #[test]
    fn inversion() {
        assert_eq!(parse_uintset("!0,2", 5).unwrap(), vec![1, 3, 4]);
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(parse_uintset("", 10).unwrap_err(), SetError::Empty);
        assert_eq!(parse_uintset("!", 10).unwrap_err(), SetError::Empty);
    }

    #[test]
    fn rejects_swapped_range() {
        assert_eq!(parse_uintset("5..2", 10).unwrap_err(), SetError::SwappedRange);
    }

    #[test]
    fn rejects_out_of_bounds() {
        assert_eq!(parse_uintset("15", 10).unwrap_err(), SetError::OutOfBounds);
        assert_eq!(parse_uintset("0..15", 10).unwrap_err(), SetError::OutOfBounds);
    }

    #[test]
    fn rejects_duplicate() {
        assert_eq!(parse_uintset("1,1", 10).unwrap_err(), SetError::Duplicate);
        assert_eq!(parse_uintset("0..2,1", 10).unwrap_err(), SetError::Duplicate);
    }

    #[test]
    fn rejects_malformed_token() {
        assert_eq!(parse_uintset("abc", 10).unwrap_err(), SetError::MalformedToken);
    }

    #[test]
    fn inversion_of_everything_is_empty() {
        assert_eq!(parse_uintset("!0..9", 10).unwrap_err(), SetError::Empty);
    }
}
