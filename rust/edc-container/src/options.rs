use edc_format::ContainerLimits;

/// Options for the mesh read path.
#[derive(Debug, Clone)]
pub struct MeshReadOptions {
    pub limits: ContainerLimits,
    /// Reject content with bytes left over after the index data.
    pub require_exact_length: bool,
}

impl MeshReadOptions {
    pub fn new() -> MeshReadOptions {
        MeshReadOptions {
            limits: ContainerLimits::default(),
            require_exact_length: true,
        }
    }

    pub fn with_limits(mut self, limits: ContainerLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_require_exact_length(mut self, require_exact_length: bool) -> Self {
        self.require_exact_length = require_exact_length;
        self
    }
}

impl Default for MeshReadOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for the mesh write path.
#[derive(Debug, Clone, Default)]
pub struct MeshWriteOptions {
    pub limits: ContainerLimits,
}

impl MeshWriteOptions {
    pub fn new() -> MeshWriteOptions {
        Default::default()
    }

    pub fn with_limits(mut self, limits: ContainerLimits) -> Self {
        self.limits = limits;
        self
    }
}
