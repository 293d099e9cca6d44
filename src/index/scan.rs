use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::Result;
use crate::io::{Format, Record, RecordReader};

/// 无索引的线性查找：从头解析，遇到第一条匹配即返回。
/// 单次查询 O(n)，作为索引查找的对照基线。
pub fn scan_lookup<P: AsRef<Path>>(path: P, format: Format, key: &str) -> Result<Option<Record>> {
    let fh = File::open(path)?;
    let mut reader = RecordReader::new(BufReader::new(fh), format);
    while let Some(rec) = reader.next_record()? {
        if rec.id == key {
            return Ok(Some(rec));
        }
    }
    Ok(None)
}
