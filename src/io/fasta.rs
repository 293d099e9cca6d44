use std::io::BufRead;

use super::record::{is_blank, parse_header, Record, RecordSpan};
use crate::error::{IndexError, Result};

/// Header line already consumed while finishing the previous record.
struct PendingHeader {
    offset: u64,
    line: u64,
    text: Vec<u8>,
}

/// FASTA reader; a record runs from its `>` line to the next `>` line or EOF.
pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    offset: u64,
    line: u64,
    done: bool,
    peek_header: Option<PendingHeader>,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self::at_offset(reader, 0)
    }

    /// Offsets start at `offset`; line numbers count from the first line
    /// this reader sees.
    pub fn at_offset(reader: R, offset: u64) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            offset,
            line: 0,
            done: false,
            peek_header: None,
        }
    }

    fn fill(&mut self) -> Result<usize> {
        self.buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.buf)?;
        if n > 0 {
            self.offset += n as u64;
            self.line += 1;
        }
        Ok(n)
    }

    pub fn next_record(&mut self) -> Result<Option<Record>> {
        Ok(self.next_located()?.map(|(rec, _)| rec))
    }

    pub fn next_located(&mut self) -> Result<Option<(Record, RecordSpan)>> {
        // Find header line
        let header = if let Some(h) = self.peek_header.take() {
            h
        } else {
            if self.done {
                return Ok(None);
            }
            loop {
                let start = self.offset;
                if self.fill()? == 0 {
                    self.done = true;
                    return Ok(None);
                }
                if self.buf.starts_with(b">") {
                    break PendingHeader { offset: start, line: self.line, text: self.buf[1..].to_vec() };
                }
                if !is_blank(&self.buf) {
                    return Err(IndexError::Format {
                        offset: start,
                        line: self.line,
                        msg: "sequence data before first '>' header".to_string(),
                    });
                }
            }
        };

        let malformed = |msg: String| IndexError::Format { offset: header.offset, line: header.line, msg };
        let (id, desc) = parse_header(&header.text).map_err(malformed)?;
        if id.is_empty() {
            return Err(malformed("empty record key".to_string()));
        }

        // Read sequence lines
        let mut seq: Vec<u8> = Vec::new();
        let end = loop {
            let line_start = self.offset;
            if self.fill()? == 0 {
                self.done = true;
                break line_start;
            }
            if self.buf.starts_with(b">") {
                self.peek_header = Some(PendingHeader {
                    offset: line_start,
                    line: self.line,
                    text: self.buf[1..].to_vec(),
                });
                break line_start;
            }
            for &b in &self.buf {
                match b {
                    b'\n' | b'\r' | b' ' | b'\t' => {}
                    _ => seq.push(b),
                }
            }
        };

        let span = RecordSpan { offset: header.offset, len: end - header.offset };
        Ok(Some((Record { id, desc, seq, qual: None }, span)))
    }
}
