//! The error type shared by [`List`](crate::List) and [`Registry`](crate::Registry).

/// Why a list operation was rejected.
///
/// Every rejected operation leaves the list exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ListError {
    /// The null [`ListHandle`](crate::ListHandle) was passed where a list was required.
    #[error("null list handle")]
    NullArgument,

    /// The handle refers to a destroyed or never-created list,
    /// or the chain no longer agrees with the recorded length.
    #[error("corrupted or destroyed list handle")]
    CorruptedHandle,

    /// The allocator refused a request.
    #[error("failed to allocate {bytes} bytes")]
    AllocationError {
        /// Size of the refused request.
        bytes: usize,
    },

    /// The index was not in `0..len`.
    #[error("index {index} is out of bounds for a list of length {len}")]
    IndexError {
        /// The rejected index.
        index: usize,
        /// The length of the list at the time of the call.
        len: usize,
    },
}

/// Emit the diagnostic line for a rejected `op` and evaluate to the error.
///
/// Expanded at the call site so the record's file and line name the operation.
macro_rules! reject {
    ($op:expr, $err:expr) => {{
        let err: $crate::ListError = $err;
        log::warn!("{}: {}", $op, err);
        err
    }};
}
