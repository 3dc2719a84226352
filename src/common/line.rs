// src/common/line.rs

use arrayvec::ArrayVec;

/// Capacity of the framing buffer. The longest observed line is well below this.
pub const MAX_LINE_LEN: usize = 128;

/// Outcome of feeding one byte into a [`LineBuffer`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LineStatus {
    /// Byte stored (or skipped), line not complete yet.
    Pending,
    /// A non-empty line is available through [`LineBuffer::line`].
    Ready,
    /// A line longer than the capacity just ended and was dropped.
    Overflow { capacity: usize },
}

/// Frames a byte stream into lines.
///
/// CR, LF and NUL each terminate a line, so `\r\n`, `\n`, `\r` and `\0`
/// endings all frame the same way. Empty lines are never reported.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer<const N: usize = MAX_LINE_LEN> {
    buffer: ArrayVec<u8, N>,
    ready: bool,
    overflowed: bool,
}

impl<const N: usize> LineBuffer<N> {
    pub fn new() -> Self {
        LineBuffer {
            buffer: ArrayVec::new(),
            ready: false,
            overflowed: false,
        }
    }

    #[inline]
    fn is_terminator(byte: u8) -> bool {
        matches!(byte, b'\r' | b'\n' | b'\0')
    }

    /// Feeds one byte. A previously `Ready` line is discarded first.
    pub fn push(&mut self, byte: u8) -> LineStatus {
        if self.ready {
            self.clear();
        }

        if Self::is_terminator(byte) {
            if self.overflowed {
                self.clear();
                return LineStatus::Overflow { capacity: N };
            }
            if self.buffer.is_empty() {
                return LineStatus::Pending;
            }
            self.ready = true;
            return LineStatus::Ready;
        }

        if self.overflowed {
            return LineStatus::Pending;
        }
        if self.buffer.try_push(byte).is_err() {
            // Drop everything up to the next terminator.
            self.buffer.clear();
            self.overflowed = true;
        }
        LineStatus::Pending
    }

    /// The completed line, without terminator. Empty unless the last push returned `Ready`.
    pub fn line(&self) -> &[u8] {
        if self.ready {
            &self.buffer
        } else {
            &[]
        }
    }

    /// Bytes of the line currently being assembled.
    pub fn pending_len(&self) -> usize {
        if self.ready || self.overflowed {
            0
        } else {
            self.buffer.len()
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.ready = false;
        self.overflowed = false;
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::vec;
    use std::vec::Vec;

    /// Feeds `bytes` and collects every completed line.
    fn frame<const N: usize>(buf: &mut LineBuffer<N>, bytes: &[u8]) -> Vec<Result<Vec<u8>, usize>> {
        let mut out = Vec::new();
        for b in bytes {
            match buf.push(*b) {
                LineStatus::Pending => {}
                LineStatus::Ready => out.push(Ok(buf.line().to_vec())),
                LineStatus::Overflow { capacity } => out.push(Err(capacity)),
            }
        }
        out
    }

    #[test]
    fn test_terminators_frame_identically() {
        for input in [&b"AIN 4 *8C\r\n"[..], b"AIN 4 *8C\n", b"AIN 4 *8C\r", b"AIN 4 *8C\0", b"AIN 4 *8C\r\n\0"] {
            let mut buf: LineBuffer = LineBuffer::new();
            assert_eq!(frame(&mut buf, input), vec![Ok(b"AIN 4 *8C".to_vec())]);
        }
    }

    #[test]
    fn test_multiple_lines_and_empty_lines() {
        let mut buf: LineBuffer = LineBuffer::new();
        let lines = frame(&mut buf, b"\r\nBGF 2 0 0 0 0 0 *D1\r\n\r\nAIN 4 0 0 0 0 *8C\r\n");
        assert_eq!(
            lines,
            vec![Ok(b"BGF 2 0 0 0 0 0 *D1".to_vec()), Ok(b"AIN 4 0 0 0 0 *8C".to_vec())]
        );
    }

    #[test]
    fn test_partial_line_is_kept() {
        let mut buf: LineBuffer = LineBuffer::new();
        assert!(frame(&mut buf, b"BGF 0 1").is_empty());
        assert_eq!(buf.pending_len(), 7);
        assert!(buf.line().is_empty());
        assert_eq!(frame(&mut buf, b" 2\n"), vec![Ok(b"BGF 0 1 2".to_vec())]);
    }

    #[test]
    fn test_overflow_discards_until_terminator() {
        let mut buf: LineBuffer<8> = LineBuffer::new();
        let lines = frame(&mut buf, b"0123456789ABC\nOK\n");
        assert_eq!(lines, vec![Err(8), Ok(b"OK".to_vec())]);
    }

    #[test]
    fn test_exact_capacity_fits() {
        let mut buf: LineBuffer<4> = LineBuffer::new();
        assert_eq!(frame(&mut buf, b"ABCD\n"), vec![Ok(b"ABCD".to_vec())]);
        assert_eq!(buf.capacity(), 4);
    }
}
