//! Tests for incremental parsing over readers.
//!
//! The enumeration pulls input in chunks. Whatever the chunk size or the
//! shape of the reader's short reads, the containers handed out must be the
//! same as for a single in-memory parse.

mod common;

use std::io::{self, Read};

use common::{collect, collect_chunked, summarize};
use ldif_core::{parse_incremental, LdifDocument, LdifEnumeration, LdifError, Phase, ScannerOptions};

const SAMPLE: &str = concat!(
    "# exported\n",
    "version: 1\n",
    "\n",
    "dn: cn=alice,dc=example,dc=com\n",
    "objectClass: person\n",
    "description: a folded\n",
    "  value\n",
    "\n",
    "dn: cn=bob,dc=example,dc=com\n",
    "control: 1.2.3 true\n",
    "changetype: modify\n",
    "replace: mail\n",
    "mail: bob@example.com\n",
    "-\n",
    "\n",
    "garbage\n",
    "dn: cn=carol,dc=example,dc=com\n",
    "changetype: modrdn\n",
    "newrdn: cn=caroline\n",
    "deleteoldrdn: 1\n",
);

// =============================================================================
// Test Readers
// =============================================================================

/// Hands out at most `step` bytes per read.
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

/// Interrupts every other read.
struct Flaky<'a> {
    data: &'a [u8],
    interrupt: bool,
}

impl Read for Flaky<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt = !self.interrupt;
        if self.interrupt {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "try again"));
        }
        let n = buf.len().min(self.data.len()).min(7);
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

/// Serves `data`, then fails.
struct Broken<'a> {
    data: &'a [u8],
}

impl Read for Broken<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection lost"));
        }
        let n = buf.len().min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fn summaries<R: Read>(enumeration: LdifEnumeration<R>) -> Vec<(String, Option<String>)> {
    enumeration
        .map(|c| summarize(&c.expect("reader does not fail")))
        .collect()
}

// =============================================================================
// Chunking
// =============================================================================

mod chunking {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_chunk_size_gives_the_same_containers() {
        let expected = collect(SAMPLE);
        for chunk in 1..=SAMPLE.len() + 1 {
            assert_eq!(collect_chunked(SAMPLE, chunk), expected, "chunk size {}", chunk);
        }
    }

    #[test]
    fn short_reads() {
        let expected = summaries(parse_incremental(SAMPLE.as_bytes()));
        for step in [1, 2, 3, 5, 8, 13] {
            let reader = Trickle {
                data: SAMPLE.as_bytes(),
                step,
            };
            let options = ScannerOptions::with_chunk_size(16);
            assert_eq!(summaries(LdifEnumeration::with_options(reader, options)), expected);
        }
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let reader = Flaky {
            data: SAMPLE.as_bytes(),
            interrupt: false,
        };
        let doc = LdifDocument::from_reader(reader).expect("interrupts are retried");
        assert_eq!(doc.to_raw_string(), SAMPLE);
        assert_eq!(doc.records().count(), 3);
    }

    #[test]
    fn fold_split_across_chunks() {
        let input = "dn: cn=a\ndescription: one\n  two\n";
        for chunk in 1..input.len() {
            let containers = collect_chunked(input, chunk);
            let record = containers[0].as_record().expect("record");
            assert_eq!(
                record.attr_vals()[0].unfolded_value().as_deref(),
                Some("one two"),
                "chunk size {}",
                chunk
            );
        }
    }
}

// =============================================================================
// Pull protocol
// =============================================================================

mod protocol {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn has_next_does_not_consume() {
        let mut e = parse_incremental("dn: cn=a\ncn: a\n".as_bytes());
        for _ in 0..5 {
            assert!(e.has_next().unwrap());
        }
        assert_eq!(e.next().unwrap().unwrap().name(), "record");
        assert!(e.has_next().unwrap());
        assert_eq!(e.next().unwrap().unwrap().name(), "eof");
        assert!(!e.has_next().unwrap());
    }

    #[test]
    fn exhausted_enumeration_stays_exhausted() {
        let mut e = parse_incremental("# just a comment\n".as_bytes());
        assert_eq!(e.next().unwrap().unwrap().name(), "comment");
        assert_eq!(e.next().unwrap().unwrap().name(), "eof");
        assert_eq!(e.phase(), Phase::Done);
        for _ in 0..3 {
            assert!(e.next().is_none());
            assert!(!e.has_next().unwrap());
        }
    }

    #[test]
    fn containers_come_out_in_source_order() {
        let offsets: Vec<usize> = parse_incremental(SAMPLE.as_bytes())
            .map(|c| c.unwrap().offset())
            .collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
        assert_eq!(offsets.last(), Some(&SAMPLE.len()));
    }
}

// =============================================================================
// Reader failures
// =============================================================================

mod failures {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn failure_is_reported_once() {
        let reader = Broken {
            data: b"dn: cn=a\ncn: a\n\ndn: cn=b\n",
        };
        let mut e = LdifEnumeration::with_options(reader, ScannerOptions::with_chunk_size(4));

        let mut ok = 0;
        let err = loop {
            match e.next() {
                Some(Ok(_)) => ok += 1,
                Some(Err(err)) => break err,
                None => panic!("failure was not reported"),
            }
        };
        assert!(ok <= 1);
        match err {
            LdifError::Io { source, .. } => assert_eq!(source.kind(), io::ErrorKind::BrokenPipe),
        }
        assert_eq!(e.phase(), Phase::Done);
        assert!(e.next().is_none());
        assert!(!e.has_next().unwrap());
    }

    #[test]
    fn failure_offset_is_where_reading_stopped() {
        let data = b"garbage\n";
        let mut e = LdifEnumeration::new(Broken { data: &data[..] });
        let err = e
            .by_ref()
            .find_map(|c| c.err())
            .expect("failure is reported");
        assert!(err.offset() <= data.len());
    }

    #[test]
    fn document_from_failing_reader() {
        let result = LdifDocument::from_reader(Broken { data: b"dn: cn=a\n" });
        assert!(matches!(result, Err(LdifError::Io { .. })));
    }

    #[test]
    fn healthy_reader_builds_a_document() {
        let doc = LdifDocument::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(doc, LdifDocument::parse(SAMPLE));
        assert!(!doc.is_valid());
    }
}
