use core::alloc::Layout;
use core::fmt;

/// Represents errors that can occur while allocating or seeding a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested bucket count cannot be represented by the allocator.
    CapacityOverflow,

    /// The allocator returned an error for the given layout.
    Alloc {
        /// Layout of the bucket array that failed to allocate.
        layout: Layout,
    },

    /// The operating system random number generator was unavailable, so no
    /// seed could be drawn.
    Entropy,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CapacityOverflow => write!(f, "bucket array capacity overflow"),
            Error::Alloc { layout } => write!(
                f,
                "bucket array allocation of {} bytes failed",
                layout.size()
            ),
            Error::Entropy => write!(f, "os random number generator unavailable"),
        }
    }
}

impl core::error::Error for Error {}

impl Error {
    /// Diverges on the error, the way infallible collection methods do.
    ///
    /// Allocation failures go through [`handle_alloc_error`], everything else
    /// panics with the error's message.
    ///
    /// [`handle_alloc_error`]: alloc::alloc::handle_alloc_error
    #[cold]
    #[inline(never)]
    pub(crate) fn raise(self) -> ! {
        match self {
            Error::Alloc { layout } => alloc::alloc::handle_alloc_error(layout),
            other => panic!("{other}"),
        }
    }
}

/// Table result
pub type Result<T> = core::result::Result<T, Error>;
