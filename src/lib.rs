//! # seqindex
//!
//! 对 FASTQ / FASTA 平面文件建立内存索引（记录 key → 文件字节区间），
//! 实现按 key 的随机读取，而无需把整个文件载入内存。
//!
//! - **索引构建**：一次顺序扫描，逐条校验记录分帧，记录每条记录的偏移与长度
//! - **按 key 查找**：哈希定位 + 一次 seek + 只解析一条记录，代价与文件大小无关
//! - **线性扫描**：无索引的逐条比较，作为性能对照基线
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use seqindex::index::RecordIndex;
//! use seqindex::io::Format;
//!
//! # fn main() -> seqindex::Result<()> {
//! let mut idx = RecordIndex::build("reads.fq", Format::Fastq)?;
//! println!("{} records", idx.len());
//!
//! let rec = idx.lookup("r2")?;
//! println!("{}: {}", rec.id, String::from_utf8_lossy(&rec.seq));
//!
//! match idx.lookup("missing") {
//!     Err(e) if e.is_not_found() => println!("not found"),
//!     other => { other?; }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## 模块说明
//!
//! - [`io`] — FASTQ / FASTA 分帧规则与解析
//! - [`index`] — 记录索引构建、查找，以及线性扫描基线
//! - [`error`] — 错误类型
//!
//! 已知限制：索引建立后若源文件被修改，索引不会自动失效。

pub mod error;
pub mod index;
pub mod io;

pub use error::{IndexError, Result};
