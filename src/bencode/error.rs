use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BencodeError {
	/// A read was requested past the end of the buffer.
	#[error("Unexpected end of input at byte {position}")]
	Bounds { position: usize },

	#[error("Syntax error at byte {position}: {message}")]
	Syntax { position: usize, message: String },

	#[error("Nesting deeper than {0} levels")]
	TooDeep(usize),
}

impl BencodeError {
	pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
		BencodeError::Syntax {
			position,
			message: message.into(),
		}
	}

	pub fn is_bounds(&self) -> bool {
		matches!(self, BencodeError::Bounds { .. })
	}

	pub fn is_syntax(&self) -> bool {
		matches!(self, BencodeError::Syntax { .. })
	}
}
