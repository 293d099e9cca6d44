use std::io::BufRead;

use super::record::{is_blank, parse_header, trim_line_end, Record, RecordSpan};
use crate::error::{IndexError, Result};

/// Four-line FASTQ reader that knows the byte span of every record it yields.
pub struct FastqReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    offset: u64,
    line: u64,
    done: bool,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R) -> Self {
        Self::at_offset(reader, 0)
    }

    /// Reader whose reported offsets start at `offset` (used when parsing a
    /// single record cut out of a larger file). Line numbers still count
    /// from the first line this reader sees.
    pub fn at_offset(reader: R, offset: u64) -> Self {
        Self { reader, buf: Vec::new(), offset, line: 0, done: false }
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

    fn malformed(&self, offset: u64, msg: impl Into<String>) -> IndexError {
        IndexError::Format { offset, line: self.line, msg: msg.into() }
    }

    pub fn next_record(&mut self) -> Result<Option<Record>> {
        Ok(self.next_located()?.map(|(rec, _)| rec))
    }

    pub fn next_located(&mut self) -> Result<Option<(Record, RecordSpan)>> {
        if self.done { return Ok(None); }

        // header line starting with '@', blank lines between records are skipped
        let start = loop {
            let start = self.offset;
            if self.fill()? == 0 { self.done = true; return Ok(None); }
            if !is_blank(&self.buf) { break start; }
        };
        if !self.buf.starts_with(b"@") {
            return Err(self.malformed(start, "FASTQ header not starting with '@'"));
        }
        let (id, desc) = parse_header(&self.buf[1..]).map_err(|msg| self.malformed(start, msg))?;
        if id.is_empty() {
            return Err(self.malformed(start, "empty record key"));
        }

        // sequence line
        let at = self.offset;
        if self.fill()? == 0 {
            return Err(self.malformed(at, "unexpected EOF after header"));
        }
        let seq = trim_line_end(&self.buf).to_vec();

        // plus line
        let at = self.offset;
        if self.fill()? == 0 || !self.buf.starts_with(b"+") {
            return Err(self.malformed(at, "missing '+' line"));
        }

        // quality line
        let at = self.offset;
        if self.fill()? == 0 {
            return Err(self.malformed(at, "missing quality line"));
        }
        let qual = trim_line_end(&self.buf).to_vec();
        if qual.len() != seq.len() {
            return Err(self.malformed(
                at,
                format!("seq/qual length mismatch ({} vs {})", seq.len(), qual.len()),
            ));
        }

        let span = RecordSpan { offset: start, len: self.offset - start };
        Ok(Some((Record { id, desc, seq, qual: Some(qual) }, span)))
    }
}
