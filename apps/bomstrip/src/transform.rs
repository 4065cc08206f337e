//! Streaming BOM and CRLF removal.
//!
//! The BOM is dropped only when it is the very first three bytes. Every
//! `\r` immediately followed by `\n` is dropped across the whole stream, and
//! so is a run of `\r` ending in `\n`, so the output never contains CRLF. A
//! `\r` not followed by `\n` is kept, including one at end of input.

use crate::detect::BOM;
use std::io::{self, Read, Write};

const CHUNK: usize = 64 * 1024;

/// Copy `reader` into `writer`, removing a leading BOM and all CRLF pairs.
/// Returns the number of bytes written.
pub fn strip<R: Read, W: Write>(mut reader: R, mut writer: W) -> io::Result<u64> {
    let mut buf = vec![0u8; CHUNK];
    let mut out = Vec::with_capacity(CHUNK);
    let mut written = 0u64;

    let mut head = Vec::with_capacity(BOM.len());
    while head.len() < BOM.len() {
        let n = read_some(&mut reader, &mut buf[..BOM.len() - head.len()])?;
        if n == 0 {
            break;
        }
        head.extend_from_slice(&buf[..n]);
    }
    let mut pending_cr = 0usize;
    let head = if head == BOM { &[][..] } else { &head[..] };
    strip_crlf(head, &mut pending_cr, &mut out);

    loop {
        let n = read_some(&mut reader, &mut buf)?;
        if n == 0 {
            break;
        }
        strip_crlf(&buf[..n], &mut pending_cr, &mut out);
        writer.write_all(&out)?;
        written += out.len() as u64;
        out.clear();
    }
    out.resize(out.len() + pending_cr, b'\r');
    writer.write_all(&out)?;
    written += out.len() as u64;
    writer.flush()?;
    Ok(written)
}

/// In-memory form of [`strip`].
pub fn strip_bytes(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let body = input.strip_prefix(&BOM[..]).unwrap_or(input);
    let mut pending_cr = 0usize;
    strip_crlf(body, &mut pending_cr, &mut out);
    out.resize(out.len() + pending_cr, b'\r');
    out
}

/// Append `chunk` to `out` minus CRs that precede an LF. Trailing CRs are
/// counted in `pending_cr` until the next non-CR byte is known.
fn strip_crlf(chunk: &[u8], pending_cr: &mut usize, out: &mut Vec<u8>) {
    for &b in chunk {
        if b == b'\r' {
            *pending_cr += 1;
            continue;
        }
        if b != b'\n' {
            out.resize(out.len() + *pending_cr, b'\r');
        }
        *pending_cr = 0;
        out.push(b);
    }
}

fn read_some<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Reader that hands out at most `step` bytes per call.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn run(input: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        strip(input, &mut out).unwrap();
        out
    }

    #[test]
    fn php_with_bom_and_crlf() {
        let mut input = BOM.to_vec();
        input.extend_from_slice(b"<?php\r\nnamespace X;\r\n");
        assert_eq!(run(&input), b"<?php\nnamespace X;\n");
    }

    #[test]
    fn bom_not_at_start_is_kept() {
        let mut input = b"0123456789".to_vec();
        input.extend_from_slice(&BOM);
        assert_eq!(run(&input), input);
    }

    #[test]
    fn only_first_bom_removed() {
        let mut input = BOM.to_vec();
        input.extend_from_slice(&BOM);
        assert_eq!(run(&input), BOM.to_vec());
    }

    #[test]
    fn lone_cr_kept_including_trailing() {
        assert_eq!(run(b"a\rb\r\nc\r"), b"a\rb\nc\r");
        assert_eq!(run(b"\r\r\n"), b"\n");
        assert_eq!(run(b"a\r\rb"), b"a\r\rb");
    }

    #[test]
    fn short_inputs() {
        assert_eq!(run(b""), b"");
        assert_eq!(run(&[0xEF]), vec![0xEF]);
        assert_eq!(run(&BOM), b"");
        assert_eq!(run(b"\r\n"), b"\n");
    }

    #[test]
    fn crlf_split_across_reads() {
        let input = b"ab\r\ncd\r\n\r\nef";
        for step in 1..input.len() {
            let mut out = Vec::new();
            strip(Trickle { data: input, step }, &mut out).unwrap();
            assert_eq!(out, b"ab\ncd\n\nef", "step {step}");
        }
    }

    #[test]
    fn crlf_beyond_first_chunk_is_removed() {
        let mut input = vec![b'x'; CHUNK * 2 + 7];
        input.extend_from_slice(b"\r\nend\r\n");
        let out = run(&input);
        assert!(!out.windows(2).any(|w| w == b"\r\n"));
        assert!(out.ends_with(b"\nend\n"));
    }

    proptest! {
        #[test]
        fn streaming_matches_in_memory(data in proptest::collection::vec(
            prop_oneof![Just(b'\r'), Just(b'\n'), Just(0xEF), Just(0xBB), Just(0xBF), any::<u8>()],
            0..512,
        ), step in 1usize..17) {
            let mut out = Vec::new();
            strip(Trickle { data: &data, step }, &mut out).unwrap();
            prop_assert_eq!(out, strip_bytes(&data));
        }

        #[test]
        fn output_has_no_crlf_and_is_stable(data in proptest::collection::vec(
            prop_oneof![Just(b'\r'), Just(b'\n'), 0u8..0xEF],
            0..512,
        )) {
            let once = strip_bytes(&data);
            prop_assert!(!once.windows(2).any(|w| w == b"\r\n"));
            prop_assert_eq!(strip_bytes(&once), once.clone());
        }
    }
}
