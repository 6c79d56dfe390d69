//! Track allocation and traversal statistics for a [`List`](crate::List).

use allocator_api2::alloc::Allocator;

/// Statistics struct for [`List`](crate::List).
///
/// # Example
///
/// ```
/// # use ::knitlist::List;
/// let mut list = List::new();
/// list.push(b"abc").unwrap();
/// list.remove(0).unwrap();
///
/// let counters = list.counters();
/// assert_eq!(counters.node_count, 0);
/// assert_eq!(counters.total_payload_bytes, 3);
/// eprintln!("{}", counters);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Counters {
    /// Number of live nodes.
    pub node_count: usize,
    /// Total number of nodes ever allocated.
    pub total_node_count: u64,

    /// Sum of live payloads' sizes.
    pub payload_bytes: usize,
    /// Sum of all payloads' sizes ever copied in.
    pub total_payload_bytes: u64,

    /// Number of successful repositions, no-ops included.
    pub reposition_count: u64,
    /// Number of links followed by pushes, removals and repositions.
    pub traversed_links: u64,
}

impl Counters {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self {
            node_count: 0,
            total_node_count: 0,
            payload_bytes: 0,
            total_payload_bytes: 0,
            reposition_count: 0,
            traversed_links: 0,
        }
    }

    /// Returns the total number of nodes that have been released.
    #[inline]
    pub const fn total_released_nodes(&self) -> u64 {
        self.total_node_count - self.node_count as u64
    }

    /// Returns the total number of payload bytes that have been released.
    #[inline]
    pub const fn total_released_bytes(&self) -> u64 {
        self.total_payload_bytes - self.payload_bytes as u64
    }

    #[inline]
    pub(crate) fn account_alloc(&mut self, payload_size: usize) {
        self.node_count += 1;
        self.payload_bytes += payload_size;

        self.total_node_count += 1;
        self.total_payload_bytes += payload_size as u64;
    }

    #[inline]
    pub(crate) fn account_dealloc(&mut self, payload_size: usize) {
        self.node_count -= 1;
        self.payload_bytes -= payload_size;
    }

    #[inline]
    pub(crate) fn account_clear(&mut self) {
        self.node_count = 0;
        self.payload_bytes = 0;
    }

    #[inline]
    pub(crate) fn account_reposition(&mut self) {
        self.reposition_count += 1;
    }

    #[inline]
    pub(crate) fn account_traverse(&mut self, links: usize) {
        self.traversed_links += links as u64;
    }
}

impl core::fmt::Display for Counters {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            r#"Stat                 | Current Total       | Accumulative Total
---------------------|---------------------|--------------------
# of Nodes           | {:>19} | {:>19}
# of Payload Bytes   | {:>19} | {:>19}
# of Repositions     |                 N/A | {:>19}
# of Links Traversed |                 N/A | {:>19}"#,
            self.node_count,
            self.total_node_count,
            self.payload_bytes,
            self.total_payload_bytes,
            self.reposition_count,
            self.traversed_links,
        )
    }
}

impl<A: Allocator> crate::List<A> {
    /// Obtain a reference to the list's statistics.
    pub fn counters(&self) -> &Counters {
        &self.counters
    }
}
