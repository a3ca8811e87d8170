use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use crate::engine::{EngineError, Result};

mod compression;

/// Compression detection and zstd decoding.
pub use compression::{Compression, ZSTD_MAGIC, decode_bytes};

/// Byte order used for multi-byte reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
	/// Most significant byte first.
	#[default]
	Big,
	/// Least significant byte first.
	Little,
}

impl Endianness {
	/// Render endianness as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Big => "big",
			Self::Little => "little",
		}
	}

	/// Parse `big` / `little`.
	pub fn parse(text: &str) -> Option<Self> {
		match text {
			"big" => Some(Self::Big),
			"little" => Some(Self::Little),
			_ => None,
		}
	}
}

/// Bit-addressable seekable cursor over an in-memory file.
pub struct SourceFile {
	path: Option<PathBuf>,
	bytes: Vec<u8>,
	pos: u64,
	compression: Compression,
}

impl SourceFile {
	/// Read a file from disk, transparently decompressing zstd frames.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let raw = fs::read(path)?;
		let (compression, bytes) = decode_bytes(raw)?;
		Ok(Self {
			path: Some(path.to_path_buf()),
			bytes,
			pos: 0,
			compression,
		})
	}

	/// Wrap bytes that did not come from disk.
	pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
		Self {
			path: None,
			bytes: bytes.into(),
			pos: 0,
			compression: Compression::None,
		}
	}

	/// Attach a path, used by extension-based detection.
	pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.path = Some(path.into());
		self
	}

	/// Source path, if any.
	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	/// Lowercased file extension, if any.
	///
	/// For zstd inputs a trailing `.zst` is skipped, so `x.chk.zst` reports `chk`.
	pub fn extension(&self) -> Option<String> {
		let path = self.path.as_deref()?;
		let mut ext = path.extension()?.to_str()?.to_ascii_lowercase();
		if self.compression == Compression::Zstd && ext == "zst" {
			ext = Path::new(path.file_stem()?).extension()?.to_str()?.to_ascii_lowercase();
		}
		Some(ext)
	}

	/// Decoded bytes.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Compression detected on open.
	pub fn compression(&self) -> Compression {
		self.compression
	}

	/// Total length in bits.
	pub fn len_bits(&self) -> u64 {
		self.bytes.len() as u64 * 8
	}

	/// Current position in bits.
	pub fn tell(&self) -> u64 {
		self.pos
	}

	/// Move to an absolute bit position; positions past the end make later reads fail.
	pub fn seek(&mut self, pos: u64) {
		self.pos = pos;
	}

	/// Bits left before the end of the file.
	pub fn remaining_bits(&self) -> u64 {
		self.len_bits().saturating_sub(self.pos)
	}

	/// Save the position and restore it when the returned guard drops.
	pub fn anchor(&mut self) -> FileAnchor<'_> {
		let saved = self.pos;
		FileAnchor { file: self, saved }
	}

	/// Read up to 64 bits MSB-first as a big-endian number.
	pub fn read_bits(&mut self, count: u64) -> Result<u64> {
		self.ensure(count)?;
		let mut out = 0_u64;
		let mut left = count;
		while left > 0 {
			let byte = self.bytes[(self.pos / 8) as usize];
			let offset = self.pos % 8;
			let take = (8 - offset).min(left);
			let chunk = (u64::from(byte) >> (8 - offset - take)) & ((1_u64 << take) - 1);
			out = (out << take) | chunk;
			self.pos += take;
			left -= take;
		}
		Ok(out)
	}

	/// Read `size` bits (at most 64) honouring `endianness`.
	///
	/// Little-endian values are assembled in 8-bit chunks with the first chunk least
	/// significant; a trailing partial chunk holds the top bits.
	pub fn read_uint(&mut self, size: u64, endianness: Endianness) -> Result<u64> {
		if self.pos % 8 == 0 && matches!(size, 8 | 16 | 32 | 64) {
			return self.read_aligned(size, endianness);
		}
		match endianness {
			Endianness::Big => self.read_bits(size),
			Endianness::Little => {
				self.ensure(size)?;
				let mut out = 0_u64;
				let mut shift = 0;
				while shift < size {
					let take = (size - shift).min(8);
					out |= self.read_bits(take)? << shift;
					shift += take;
				}
				Ok(out)
			}
		}
	}

	/// Read `count` whole bytes.
	pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
		let bits = u64::try_from(count).ok().and_then(|count| count.checked_mul(8)).unwrap_or(u64::MAX);
		self.ensure(bits)?;
		if self.pos % 8 == 0 {
			let start = (self.pos / 8) as usize;
			self.pos += bits;
			return Ok(self.bytes[start..start + count].to_vec());
		}
		(0..count).map(|_| self.read_bits(8).map(|byte| byte as u8)).collect()
	}

	fn read_aligned(&mut self, size: u64, endianness: Endianness) -> Result<u64> {
		let raw = self.read_bytes((size / 8) as usize)?;
		let mut buf = [0_u8; 8];
		Ok(match endianness {
			Endianness::Big => {
				buf[8 - raw.len()..].copy_from_slice(&raw);
				u64::from_be_bytes(buf)
			}
			Endianness::Little => {
				buf[..raw.len()].copy_from_slice(&raw);
				u64::from_le_bytes(buf)
			}
		})
	}

	fn ensure(&self, need: u64) -> Result<()> {
		if need > self.remaining_bits() {
			return Err(EngineError::UnexpectedEof {
				at: self.pos,
				need,
				rem: self.remaining_bits(),
			});
		}
		Ok(())
	}
}

/// Scoped cursor guard; the saved position is restored on drop.
pub struct FileAnchor<'a> {
	file: &'a mut SourceFile,
	saved: u64,
}

impl FileAnchor<'_> {
	/// Position captured when the anchor was created.
	pub fn saved(&self) -> u64 {
		self.saved
	}
}

impl Deref for FileAnchor<'_> {
	type Target = SourceFile;

	fn deref(&self) -> &SourceFile {
		self.file
	}
}

impl DerefMut for FileAnchor<'_> {
	fn deref_mut(&mut self) -> &mut SourceFile {
		self.file
	}
}

impl Drop for FileAnchor<'_> {
	fn drop(&mut self) {
		self.file.pos = self.saved;
	}
}
