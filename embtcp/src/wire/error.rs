use core::fmt;

/// The error type for parsing segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// An incoming segment could not be parsed because it was shorter than assumed.
    ///
    /// The buffer may be shorter than the minimum header, or the data offset may point beyond the
    /// end of the received data.
    Truncated,

    /// An incoming segment was recognized but was self-contradictory.
    ///
    /// Example: a TCP header whose data offset claims fewer than five header words, or an option
    /// whose length byte does not fit its kind.
    Malformed,
}

/// The result type for the wire module.
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Truncated => write!(f, "truncated segment"),
            Error::Malformed => write!(f, "malformed segment"),
        }
    }
}
