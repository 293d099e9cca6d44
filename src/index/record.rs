use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::error::{IndexError, Result};
use crate::io::{Format, Record, RecordReader, RecordSpan};

/// 重复 key 的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeys {
    /// 构建失败，返回 `IndexError::DuplicateKey`
    #[default]
    Reject,
    /// 后出现的记录覆盖先前的（key 顺序保留首次出现的位置）
    KeepLast,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOptions {
    pub duplicates: DuplicateKeys,
}

/// 构建时的元信息，仅用于展示；文件后续被修改不会被检测。
#[derive(Debug, Clone)]
pub struct IndexMeta {
    pub source: PathBuf,
    pub format: Format,
    pub source_len: u64,
    pub built_at: String,
}

/// 记录索引：key -> 文件内字节区间。
///
/// - 构建：对文件做一次顺序扫描，逐条校验分帧并记下每条记录的 `[offset, offset+len)`。
/// - 查找：哈希定位区间，seek 后只解析这一条记录，代价与文件大小无关。
/// - 索引持有一个只读文件句柄，随索引一起释放。
#[derive(Debug)]
pub struct RecordIndex {
    entries: HashMap<String, RecordSpan>,
    /// key 按文件中出现的顺序
    order: Vec<String>,
    meta: IndexMeta,
    file: BufReader<File>,
}

impl RecordIndex {
    pub fn build<P: AsRef<Path>>(path: P, format: Format) -> Result<Self> {
        Self::build_with(path, format, &IndexOptions::default())
    }

    pub fn build_with<P: AsRef<Path>>(path: P, format: Format, opts: &IndexOptions) -> Result<Self> {
        let path = path.as_ref();
        debug!("indexing {} as {} ({:?})", path.display(), format, opts.duplicates);

        let mut file = BufReader::new(File::open(path)?);
        let mut entries: HashMap<String, RecordSpan> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut source_len = 0u64;

        {
            let mut reader = RecordReader::new(&mut file, format);
            while let Some((rec, span)) = reader.next_located()? {
                source_len = span.end();
                match entries.entry(rec.id) {
                    Entry::Vacant(slot) => {
                        order.push(slot.key().clone());
                        slot.insert(span);
                    }
                    Entry::Occupied(mut slot) => match opts.duplicates {
                        DuplicateKeys::Reject => {
                            return Err(IndexError::DuplicateKey {
                                key: slot.key().clone(),
                                first: slot.get().offset,
                                second: span.offset,
                            });
                        }
                        DuplicateKeys::KeepLast => {
                            warn!(
                                "duplicate key '{}' at byte {}, replacing record at byte {}",
                                slot.key(),
                                span.offset,
                                slot.get().offset
                            );
                            slot.insert(span);
                        }
                    },
                }
            }
        }

        // 尾部空行等不属于任何记录的字节也计入文件长度
        source_len = source_len.max(file.get_ref().metadata()?.len());
        file.seek(SeekFrom::Start(0))?;

        info!("indexed {} records ({} bytes) from {}", entries.len(), source_len, path.display());

        Ok(Self {
            entries,
            order,
            meta: IndexMeta {
                source: path.to_path_buf(),
                format,
                source_len,
                built_at: chrono::Utc::now().to_rfc3339(),
            },
            file,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn span(&self, key: &str) -> Option<RecordSpan> {
        self.entries.get(key).copied()
    }

    /// Keys in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    pub fn format(&self) -> Format {
        self.meta.format
    }

    pub fn path(&self) -> &Path {
        &self.meta.source
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    fn span_or_missing(&self, key: &str) -> Result<RecordSpan> {
        self.span(key).ok_or_else(|| IndexError::KeyNotFound { key: key.to_string() })
    }

    /// Serialized bytes of the record stored under `key`.
    pub fn get_raw(&mut self, key: &str) -> Result<Vec<u8>> {
        let span = self.span_or_missing(key)?;
        read_span(&mut self.file, span)
    }

    /// 查找单条记录：一次 seek + 一次有界解析。
    pub fn lookup(&mut self, key: &str) -> Result<Record> {
        let span = self.span_or_missing(key)?;
        debug!("lookup '{}' -> [{}, {})", key, span.offset, span.end());
        let raw = read_span(&mut self.file, span)?;
        parse_span(self.meta.format, &raw, span, key)
    }

    /// Look up many keys on `threads` workers, results in input order.
    ///
    /// Every worker opens its own handle on the source file the first time
    /// it needs one; the first failing key aborts the batch.
    pub fn lookup_many<S: AsRef<str> + Sync>(&self, keys: &[S], threads: usize) -> Result<Vec<Record>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .build()
            .map_err(|e| IndexError::ThreadPool(e.to_string()))?;

        pool.install(|| {
            keys.par_iter()
                .map_init(
                    || None::<BufReader<File>>,
                    |slot, key| {
                        let key = key.as_ref();
                        let span = self.span_or_missing(key)?;
                        // 每个 worker 在第一次需要时才打开自己的句柄
                        let fh = match slot.take() {
                            Some(fh) => fh,
                            None => BufReader::new(File::open(&self.meta.source)?),
                        };
                        let fh = slot.insert(fh);
                        let raw = read_span(fh, span)?;
                        parse_span(self.meta.format, &raw, span, key)
                    },
                )
                .collect()
        })
    }
}

fn read_span<R: Read + Seek>(file: &mut R, span: RecordSpan) -> Result<Vec<u8>> {
    file.seek(SeekFrom::Start(span.offset))?;
    let mut raw = vec![0u8; span.len as usize];
    file.read_exact(&mut raw)?;
    Ok(raw)
}

fn parse_span(format: Format, raw: &[u8], span: RecordSpan, key: &str) -> Result<Record> {
    let rec = format.parse_one(raw, span.offset)?;
    // 文件在建索引后被改写时才会发生
    if rec.id != key {
        return Err(IndexError::Format {
            offset: span.offset,
            line: 0,
            msg: format!("expected record '{}' at indexed offset, found '{}'", key, rec.id),
        });
    }
    Ok(rec)
}
