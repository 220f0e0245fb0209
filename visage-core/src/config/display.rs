//! Panel geometry and render settings

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Panel width in pixels
pub const PANEL_WIDTH: u16 = 320;

/// Panel height in pixels
pub const PANEL_HEIGHT: u16 = 240;

/// Border baked around every face asset, in pixels
pub const IMAGE_MARGIN: u16 = 8;

/// Rows rendered and sent per band
pub const BAND_ROWS: u16 = 16;

/// Default bound on one band transfer
///
/// A band at 10 MHz takes roughly 10 ms, so hitting this means the bus is
/// stuck rather than slow.
pub const WAIT_TIMEOUT_MS: u32 = 1_000;

/// Fixed geometry of the panel and of the decoded canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayGeometry {
    /// Visible width (W)
    pub width: u16,
    /// Visible height (H)
    pub height: u16,
    /// Border on every side of the decoded canvas
    pub margin: u16,
    /// Rows per band
    pub band_rows: u16,
}

impl Default for DisplayGeometry {
    fn default() -> Self {
        Self {
            width: PANEL_WIDTH,
            height: PANEL_HEIGHT,
            margin: IMAGE_MARGIN,
            band_rows: BAND_ROWS,
        }
    }
}

impl DisplayGeometry {
    /// Width of the decoded canvas, margins included
    pub const fn canvas_width(&self) -> usize {
        self.width as usize + 2 * self.margin as usize
    }

    /// Height of the decoded canvas, margins included
    pub const fn canvas_height(&self) -> usize {
        self.height as usize + 2 * self.margin as usize
    }

    /// Words in one full band slot
    pub const fn band_words(&self) -> usize {
        self.band_rows as usize * self.width as usize
    }

    /// Number of bands covering the panel
    pub fn band_count(&self) -> u16 {
        if self.band_rows == 0 {
            return 0;
        }
        self.height.div_ceil(self.band_rows)
    }

    /// Bands in ascending row order; the last one may be short
    pub fn bands(&self) -> Bands {
        Bands {
            next_top: 0,
            height: self.height,
            band_rows: self.band_rows,
        }
    }

    /// Check the geometry is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyPanel);
        }
        if self.band_rows == 0 || self.band_rows > self.height {
            return Err(ConfigError::InvalidBandRows);
        }
        if self.canvas_width() > u16::MAX as usize || self.canvas_height() > u16::MAX as usize {
            return Err(ConfigError::CanvasTooLarge);
        }
        Ok(())
    }
}

/// One horizontal strip of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Band {
    /// First panel row of the band
    pub top: u16,
    /// Rows in the band
    pub rows: u16,
}

/// Iterator over the bands of a [`DisplayGeometry`]
#[derive(Debug, Clone)]
pub struct Bands {
    next_top: u16,
    height: u16,
    band_rows: u16,
}

impl Iterator for Bands {
    type Item = Band;

    fn next(&mut self) -> Option<Band> {
        if self.band_rows == 0 || self.next_top >= self.height {
            return None;
        }
        let top = self.next_top;
        let rows = self.band_rows.min(self.height - top);
        self.next_top = top + rows;
        Some(Band { top, rows })
    }
}

/// Settings for one render pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RenderConfig {
    /// Panel and canvas geometry
    pub geometry: DisplayGeometry,
    /// Bound on waiting for one band transfer; expiry is fatal
    pub wait_timeout_ms: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            geometry: DisplayGeometry::default(),
            wait_timeout_ms: WAIT_TIMEOUT_MS,
        }
    }
}

impl RenderConfig {
    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.geometry.validate()?;
        if self.wait_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    #[test]
    fn test_default_geometry() {
        let g = DisplayGeometry::default();
        assert_eq!(g.canvas_width(), 336);
        assert_eq!(g.canvas_height(), 256);
        assert_eq!(g.band_words(), 320 * 16);
        assert_eq!(g.band_count(), 15);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn test_bands_ascending_and_contiguous() {
        let g = DisplayGeometry::default();
        let bands: Vec<Band, 32> = g.bands().collect();
        assert_eq!(bands.len(), 15);
        for (i, band) in bands.iter().enumerate() {
            assert_eq!(band.top, i as u16 * 16);
            assert_eq!(band.rows, 16);
        }
    }

    #[test]
    fn test_short_last_band() {
        let g = DisplayGeometry {
            width: 8,
            height: 20,
            margin: 2,
            band_rows: 8,
        };
        let bands: Vec<Band, 8> = g.bands().collect();
        assert_eq!(
            bands.as_slice(),
            &[
                Band { top: 0, rows: 8 },
                Band { top: 8, rows: 8 },
                Band { top: 16, rows: 4 },
            ]
        );
        assert_eq!(g.band_count(), 3);
    }

    #[test]
    fn test_geometry_validation() {
        let mut g = DisplayGeometry::default();
        g.band_rows = 0;
        assert_eq!(g.validate(), Err(ConfigError::InvalidBandRows));

        let mut g = DisplayGeometry::default();
        g.band_rows = 241;
        assert_eq!(g.validate(), Err(ConfigError::InvalidBandRows));

        let mut g = DisplayGeometry::default();
        g.width = 0;
        assert_eq!(g.validate(), Err(ConfigError::EmptyPanel));

        let mut g = DisplayGeometry::default();
        g.margin = u16::MAX;
        assert_eq!(g.validate(), Err(ConfigError::CanvasTooLarge));
    }

    #[test]
    fn test_render_config_timeout() {
        let config = RenderConfig {
            wait_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTimeout));
        assert!(RenderConfig::default().validate().is_ok());
    }
}
