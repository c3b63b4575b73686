use crate::error::{Result, SimError};

/// Finds where one msgpack value ends in a growing byte buffer.
///
/// The scanner only walks markers and length headers; string, binary and
/// extension payloads are skipped without being read. Progress is kept
/// between calls, so feeding a large frame in many small reads costs one
/// pass over its headers in total, not one per read.
///
/// ```rust
/// use simlink_common::codec::FrameScanner;
///
/// // [1, "ab"]
/// let frame = [0x92, 0x01, 0xa2, b'a', b'b'];
/// let mut scanner = FrameScanner::default();
/// assert_eq!(scanner.scan(&frame[..3]).unwrap(), None);
/// assert_eq!(scanner.scan(&frame).unwrap(), Some(5));
/// ```
#[derive(Debug, Default)]
pub struct FrameScanner {
    offset: usize,
    /// Values still missing from each open array or map, innermost last.
    open: Vec<u64>,
    complete: bool,
}

/// A marker plus its length header.
struct Token {
    /// Bytes taken by the marker, header and any inline payload.
    size: usize,
    /// Values nested inside: elements of an array, keys plus values of a map.
    children: u64,
}

impl FrameScanner {
    /// Scan `buf`, which must start with the same bytes as the previous call.
    ///
    /// Returns the length of the first value once it is complete. Call
    /// [`FrameScanner::reset`] after consuming that many bytes.
    pub fn scan(&mut self, buf: &[u8]) -> Result<Option<usize>> {
        while !self.complete {
            let Some(token) = read_token(&buf[self.offset.min(buf.len())..])? else {
                return Ok(None);
            };
            self.offset += token.size;
            if token.children > 0 {
                self.open.push(token.children);
            } else {
                self.finish_value();
            }
        }
        Ok(Some(self.offset))
    }

    /// Bytes of the current value examined so far.
    pub fn scanned(&self) -> usize {
        self.offset
    }

    /// Forget the current value and start over at the front of the buffer.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.open.clear();
        self.complete = false;
    }

    fn finish_value(&mut self) {
        loop {
            match self.open.last_mut() {
                None => {
                    self.complete = true;
                    return;
                }
                Some(remaining) => {
                    *remaining -= 1;
                    if *remaining > 0 {
                        return;
                    }
                    // The container itself is now a finished value of its parent.
                    self.open.pop();
                }
            }
        }
    }
}

fn read_token(buf: &[u8]) -> Result<Option<Token>> {
    let Some(&marker) = buf.first() else {
        return Ok(None);
    };

    let fixed = |size: usize| Token { size, children: 0 };
    let header = |width: usize| -> Option<u64> {
        buf.get(1..1 + width)
            .map(|bytes| bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    };
    // Length-prefixed payload; `extra` covers the type byte of ext values.
    let sized = |width: usize, extra: usize| -> Option<Token> {
        let len = usize::try_from(header(width)?).ok()?;
        let size = (1 + width + extra).checked_add(len)?;
        (buf.len() >= size).then_some(Token { size, children: 0 })
    };
    let container = |width: usize, per_entry: u64| -> Option<Token> {
        let count = header(width)?;
        Some(Token {
            size: 1 + width,
            children: count * per_entry,
        })
    };

    let token = match marker {
        0x00..=0x7f | 0xe0..=0xff | 0xc0 | 0xc2 | 0xc3 => Some(fixed(1)),
        0x80..=0x8f => Some(Token {
            size: 1,
            children: u64::from(marker & 0x0f) * 2,
        }),
        0x90..=0x9f => Some(Token {
            size: 1,
            children: u64::from(marker & 0x0f),
        }),
        0xa0..=0xbf => {
            let size = 1 + usize::from(marker & 0x1f);
            (buf.len() >= size).then_some(fixed(size))
        }
        0xc1 => return Err(SimError::MalformedFrame("reserved marker 0xc1".into())),
        0xc4 | 0xd9 => sized(1, 0),
        0xc5 | 0xda => sized(2, 0),
        0xc6 | 0xdb => sized(4, 0),
        0xc7 => sized(1, 1),
        0xc8 => sized(2, 1),
        0xc9 => sized(4, 1),
        0xcc | 0xd0 => Some(fixed(2)),
        0xcd | 0xd1 => Some(fixed(3)),
        0xca | 0xce | 0xd2 => Some(fixed(5)),
        0xcb | 0xcf | 0xd3 => Some(fixed(9)),
        0xd4 => Some(fixed(3)),
        0xd5 => Some(fixed(4)),
        0xd6 => Some(fixed(6)),
        0xd7 => Some(fixed(10)),
        0xd8 => Some(fixed(18)),
        0xdc => container(2, 1),
        0xdd => container(4, 1),
        0xde => container(2, 2),
        0xdf => container(4, 2),
    };

    // Scalars are only complete once all of their bytes are buffered.
    Ok(token.filter(|token| token.children > 0 || buf.len() >= token.size))
}
