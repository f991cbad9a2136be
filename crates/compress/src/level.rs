//! Compression levels accepted by the DEFLATE engine.

use std::num::NonZeroU8;

use thiserror::Error;

use flate2::Compression;

/// Compression levels recognised by the DEFLATE compressor.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CompressionLevel {
    /// Favour speed over compression ratio.
    Fast,
    /// Use the engine's default balance between speed and ratio.
    #[default]
    Default,
    /// Favour the best possible compression ratio.
    Best,
    /// Use an explicit level in the range `1..=9`.
    Precise(NonZeroU8),
}

impl CompressionLevel {
    /// Creates a [`CompressionLevel::Precise`] value from an explicit numeric
    /// level.
    ///
    /// # Errors
    ///
    /// Returns [`CompressionLevelError`] when `level` falls outside the
    /// inclusive range `1..=9`.
    pub fn from_numeric(level: u32) -> Result<Self, CompressionLevelError> {
        let as_u8 = u8::try_from(level).map_err(|_| CompressionLevelError { level })?;
        match NonZeroU8::new(as_u8) {
            Some(precise) if (1..=9).contains(&level) => Ok(Self::Precise(precise)),
            _ => Err(CompressionLevelError { level }),
        }
    }
}

impl From<CompressionLevel> for Compression {
    fn from(level: CompressionLevel) -> Self {
        match level {
            CompressionLevel::Fast => Compression::fast(),
            CompressionLevel::Default => Compression::default(),
            CompressionLevel::Best => Compression::best(),
            CompressionLevel::Precise(value) => Compression::new(u32::from(value.get())),
        }
    }
}

/// Error returned when a requested compression level falls outside the
/// permissible range.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("compression level {level} is outside the supported range 1-9")]
pub struct CompressionLevelError {
    level: u32,
}

impl CompressionLevelError {
    /// Returns the invalid compression level that triggered the error.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::CompressionLevel;

    #[test]
    fn numeric_levels_round_trip() {
        let level = CompressionLevel::from_numeric(7).expect("level in range");
        assert!(matches!(level, CompressionLevel::Precise(v) if v.get() == 7));
    }

    #[test]
    fn out_of_range_levels_are_rejected() {
        assert!(CompressionLevel::from_numeric(0).is_err());
        assert!(CompressionLevel::from_numeric(10).is_err());
        assert_eq!(
            CompressionLevel::from_numeric(12).unwrap_err().level(),
            12
        );
    }
}
