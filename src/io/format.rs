use std::fmt;
use std::io::{BufRead, Cursor};
use std::path::Path;
use std::str::FromStr;

use super::fasta::FastaReader;
use super::fastq::FastqReader;
use super::record::{Record, RecordSpan};
use crate::error::{IndexError, Result};

/// 记录的分帧规则：决定记录从哪里开始、到哪里结束，以及 key 如何提取。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// 四行一组：`@key` / 序列 / `+` / 质量
    Fastq,
    /// `>key` 开头，直到下一个 `>` 或文件结尾
    Fasta,
}

impl Format {
    /// Guess the framing rule from the file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "fq" | "fastq" => Some(Format::Fastq),
            "fa" | "fasta" | "fna" | "faa" | "ffn" => Some(Format::Fasta),
            _ => None,
        }
    }

    /// Parse exactly one record out of `bytes`, which must hold a whole
    /// serialized record. `offset` is only used for error positions; the
    /// file line is unknown here, so `Format` errors carry `line: 0`.
    pub fn parse_one(self, bytes: &[u8], offset: u64) -> Result<Record> {
        let mut reader = RecordReader::at_offset(Cursor::new(bytes), self, offset);
        let parsed = reader.next_record().map_err(|e| match e {
            IndexError::Format { offset, msg, .. } => IndexError::Format { offset, line: 0, msg },
            other => other,
        })?;
        match parsed {
            Some(rec) => Ok(rec),
            None => Err(IndexError::Format {
                offset,
                line: 0,
                msg: "no record at indexed offset".to_string(),
            }),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Fastq => f.write_str("fastq"),
            Format::Fasta => f.write_str("fasta"),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fastq" | "fq" => Ok(Format::Fastq),
            "fasta" | "fa" => Ok(Format::Fasta),
            other => Err(format!("unknown format '{}' (expected fastq or fasta)", other)),
        }
    }
}

/// Reader for either framing rule, chosen at runtime.
pub enum RecordReader<R: BufRead> {
    Fastq(FastqReader<R>),
    Fasta(FastaReader<R>),
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R, format: Format) -> Self {
        Self::at_offset(reader, format, 0)
    }

    pub fn at_offset(reader: R, format: Format, offset: u64) -> Self {
        match format {
            Format::Fastq => RecordReader::Fastq(FastqReader::at_offset(reader, offset)),
            Format::Fasta => RecordReader::Fasta(FastaReader::at_offset(reader, offset)),
        }
    }

    pub fn next_located(&mut self) -> Result<Option<(Record, RecordSpan)>> {
        match self {
            RecordReader::Fastq(r) => r.next_located(),
            RecordReader::Fasta(r) => r.next_located(),
        }
    }

    pub fn next_record(&mut self) -> Result<Option<Record>> {
        match self {
            RecordReader::Fastq(r) => r.next_record(),
            RecordReader::Fasta(r) => r.next_record(),
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
