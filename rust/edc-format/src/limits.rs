use edc_common::{Result, error::Error, verify_arg};

/// Size ceilings enforced when reading and writing containers.
///
/// The header stores 64-bit sizes, but every container is handled as a single
/// native allocation, so the ceiling can never exceed `isize::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerLimits {
    max_content_size: u64,
}

impl ContainerLimits {
    /// Default ceiling: `2^31 - 1` bytes.
    pub const DEFAULT_MAX_CONTENT_SIZE: u64 = i32::MAX as u64;

    /// Largest ceiling that can be configured.
    pub const MAX_CONTENT_SIZE_LIMIT: u64 = isize::MAX as u64;

    pub const fn new() -> ContainerLimits {
        ContainerLimits {
            max_content_size: Self::DEFAULT_MAX_CONTENT_SIZE,
        }
    }

    /// Returns limits with the given content size ceiling.
    ///
    /// Fails with `InvalidArgument` if `max_content_size` exceeds
    /// [`MAX_CONTENT_SIZE_LIMIT`](Self::MAX_CONTENT_SIZE_LIMIT).
    pub fn with_max_content_size(self, max_content_size: u64) -> Result<ContainerLimits> {
        verify_arg!(
            max_content_size,
            max_content_size <= Self::MAX_CONTENT_SIZE_LIMIT
        );
        Ok(ContainerLimits { max_content_size })
    }

    #[inline]
    pub fn max_content_size(&self) -> u64 {
        self.max_content_size
    }

    /// Fails with `Unsupported` if `size` bytes of `what` exceed the ceiling.
    pub fn check_size(&self, size: u64, what: &str) -> Result<()> {
        if size > self.max_content_size {
            return Err(Error::unsupported(format!(
                "{what} of {size} bytes exceeds the supported maximum of {} bytes",
                self.max_content_size
            )));
        }
        Ok(())
    }
}

impl Default for ContainerLimits {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::ContainerLimits;
    use edc_common::error::ErrorKind;

    #[test]
    fn test_default_ceiling() {
        let limits = ContainerLimits::default();
        assert_eq!(limits.max_content_size(), 2147483647);
        assert!(limits.check_size(2147483647, "content").is_ok());
        let e = limits.check_size(2147483648, "content").unwrap_err();
        assert!(e.is_unsupported());
    }

    #[test]
    fn test_configured_ceiling() {
        let limits = ContainerLimits::new().with_max_content_size(1 << 40).unwrap();
        assert!(limits.check_size(1 << 40, "content").is_ok());
        assert!(limits.check_size((1 << 40) + 1, "content").is_err());

        let limits = ContainerLimits::new().with_max_content_size(100).unwrap();
        assert!(limits.check_size(101, "content").unwrap_err().is_unsupported());

        let e = ContainerLimits::new()
            .with_max_content_size(u64::MAX)
            .unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::InvalidArgument { .. }));
    }
}
