/// Controls buffer allocation for a top-level builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Bytes to reserve up front. A hint only; growth is automatic.
    pub initial_capacity: usize,
    /// Hard cap on the total output length. `None` means unbounded.
    pub max_len: Option<usize>,
}

impl BuilderConfig {
    /// Configuration with the given capacity hint and no length cap.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            ..Self::default()
        }
    }
}
