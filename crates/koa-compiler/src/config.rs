//! Compiler configuration.

use crate::lexer::DEFAULT_QUEUE_CAPACITY;

/// Configuration for a compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Capacity of the queue between the lexer thread and the parser.
    /// Zero makes every token a rendezvous.
    pub queue_capacity: usize,

    /// Compile functions on the rayon pool. Ignored without the `parallel`
    /// feature.
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            parallel: cfg!(feature = "parallel"),
        }
    }
}

impl Config {
    /// Sets the token queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Turns parallel function compilation on or off.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
