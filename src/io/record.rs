use std::io::Write;

use super::format::Format;

/// One parsed sequence record. `qual` is only present for FASTQ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
    pub qual: Option<Vec<u8>>,
}

/// Byte range `[offset, offset + len)` of one serialized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSpan {
    pub offset: u64,
    pub len: u64,
}

impl RecordSpan {
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }
}

impl Record {
    /// 按给定格式写出（FASTA 不折行）
    pub fn write_to<W: Write>(&self, out: &mut W, format: Format) -> std::io::Result<()> {
        let marker = match format {
            Format::Fastq => '@',
            Format::Fasta => '>',
        };
        match &self.desc {
            Some(d) => writeln!(out, "{}{} {}", marker, self.id, d)?,
            None => writeln!(out, "{}{}", marker, self.id)?,
        }
        out.write_all(&self.seq)?;
        out.write_all(b"\n")?;
        if format == Format::Fastq {
            out.write_all(b"+\n")?;
            // FASTA 来源的记录没有质量值，用 'I' 补齐
            match &self.qual {
                Some(q) => out.write_all(q)?,
                None => out.write_all(&vec![b'I'; self.seq.len()])?,
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Split a header line (marker already removed) into key and description.
pub(crate) fn split_header(header: &str) -> (&str, Option<&str>) {
    let header = header.trim();
    let mut parts = header.splitn(2, char::is_whitespace);
    let id = parts.next().unwrap_or("");
    let desc = parts.next().map(str::trim).filter(|s| !s.is_empty());
    (id, desc)
}

/// Decode a raw header line (marker already removed). Only headers are
/// decoded; sequence and quality lines stay bytes.
pub(crate) fn parse_header(header: &[u8]) -> std::result::Result<(String, Option<String>), String> {
    let text = std::str::from_utf8(header).map_err(|e| format!("header is not valid UTF-8: {}", e))?;
    let (id, desc) = split_header(text);
    Ok((id.to_string(), desc.map(str::to_string)))
}

pub(crate) fn trim_line_end(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && line[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    &line[..end]
}

pub(crate) fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}
