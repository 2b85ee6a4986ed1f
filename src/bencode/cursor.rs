use super::error::BencodeError;

/// Sequential reader over a borrowed buffer with a single byte of lookahead.
///
/// Only `unread` moves backwards, and only by one byte after a successful `next`.
#[derive(Debug)]
pub struct Cursor<'a> {
	buf: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	pub fn new(buf: &'a [u8]) -> Self {
		Cursor { buf, pos: 0 }
	}

	pub fn position(&self) -> usize {
		self.pos
	}

	/// Returns the byte under the cursor and advances past it.
	pub fn next(&mut self) -> Result<u8, BencodeError> {
		let byte = *self
			.buf
			.get(self.pos)
			.ok_or(BencodeError::Bounds { position: self.pos })?;
		self.pos += 1;
		Ok(byte)
	}

	/// Steps back over the byte returned by the last `next`.
	pub fn unread(&mut self) {
		debug_assert!(self.pos > 0, "unread before any read");
		self.pos = self.pos.saturating_sub(1);
	}

	pub fn peek(&mut self) -> Result<u8, BencodeError> {
		let byte = self.next()?;
		self.unread();
		Ok(byte)
	}

	/// Consumes exactly `len` bytes. The cursor does not move on failure.
	pub fn take(&mut self, len: usize) -> Result<&'a [u8], BencodeError> {
		let end = self
			.pos
			.checked_add(len)
			.filter(|&end| end <= self.buf.len())
			.ok_or(BencodeError::Bounds { position: self.buf.len() })?;
		let slice = &self.buf[self.pos..end];
		self.pos = end;
		Ok(slice)
	}
}
