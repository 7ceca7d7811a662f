//! Configuration for an analysis run
//!
//! All tunables of the analysis and the chart cosmetics live here as named
//! fields with documented defaults. Call [`AnalysisSettings::validate`] before
//! handing the settings to the engine.

use thiserror::Error;

/// Default highest quality level
pub const DEFAULT_MAX_QUALITY: u32 = 5;

/// Default number of logarithmic bins per power of ten
pub const DEFAULT_INTERVALS_PER_DECADE: u32 = 4;

/// The highest quality level the user is allowed to specify
pub const MAX_QUALITY_LEVEL: u32 = 100;

/// The largest number of logarithmic bins per decade the user is allowed to specify
pub const MAX_INTERVALS_PER_DECADE: u32 = 100;

/// Errors raised by settings validation
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("intervals per decade must be between 1 and {max}, got {value}")]
    IntervalsPerDecade { value: u32, max: u32 },

    #[error("maximum quality must be at most {max}, got {value}")]
    MaxQuality { value: u32, max: u32 },

    #[error("plot dimensions must be non-zero, got {width}x{height}")]
    PlotDimensions { width: u32, height: u32 },

    #[error("bar width factor must be within (0, 1], got {0}")]
    BarWidthFactor(f64),

    #[error("plot margin {margin} leaves no drawing area in a {width}x{height} plot")]
    PlotMargin { margin: u32, width: u32, height: u32 },

    #[error("plot palette must contain at least one colour")]
    EmptyPalette,
}

type Result<T> = core::result::Result<T, ConfigError>;

/// Controls how answers are grouped and binned.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    /// Highest quality level. Levels `0..=max_quality` are aggregated.
    pub max_quality: u32,

    /// Number of logarithmic bins per power of ten.
    ///
    /// # Range
    ///
    /// 1 - [`MAX_INTERVALS_PER_DECADE`].
    pub intervals_per_decade: u32,

    /// Chart cosmetics.
    pub plot: PlotSettings,
}

impl AnalysisSettings {
    /// Creates new settings with default values.
    pub fn new() -> Self {
        Self {
            max_quality: DEFAULT_MAX_QUALITY,
            intervals_per_decade: DEFAULT_INTERVALS_PER_DECADE,
            plot: PlotSettings::new(),
        }
    }

    /// Checks that every field is within its accepted range.
    pub fn validate(&self) -> Result<()> {
        if self.intervals_per_decade == 0 || self.intervals_per_decade > MAX_INTERVALS_PER_DECADE {
            return Err(ConfigError::IntervalsPerDecade {
                value: self.intervals_per_decade,
                max: MAX_INTERVALS_PER_DECADE,
            });
        }

        if self.max_quality > MAX_QUALITY_LEVEL {
            return Err(ConfigError::MaxQuality {
                value: self.max_quality,
                max: MAX_QUALITY_LEVEL,
            });
        }

        self.plot.validate()
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Cosmetic settings shared by all generated charts.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSettings {
    /// Image width in pixels.
    pub width: u32,

    /// Image height in pixels.
    pub height: u32,

    /// Blank space around the chart, in pixels.
    pub margin: u32,

    /// Font size of the chart title.
    pub caption_font_size: u32,

    /// Font size of axis labels and tick labels.
    pub label_font_size: u32,

    /// Fraction of a histogram bin's width covered by bars.
    /// The remainder is the gap between neighbouring bins.
    pub bar_width_factor: f64,

    /// Colours assigned to quality levels, as RGB triples.
    /// Levels beyond the palette's length wrap around.
    pub palette: Vec<(u8, u8, u8)>,
}

impl PlotSettings {
    /// Creates new plot settings with default values (1200x800 PNG).
    pub fn new() -> Self {
        Self {
            width: 1200,
            height: 800,
            margin: 20,
            caption_font_size: 40,
            label_font_size: 25,
            bar_width_factor: 0.8,
            palette: vec![
                (213, 62, 79),
                (252, 141, 89),
                (230, 196, 60),
                (153, 213, 148),
                (50, 136, 189),
                (94, 79, 162),
            ],
        }
    }

    /// Returns the palette colour for the given quality level.
    pub fn colour_for(&self, level: u32) -> (u8, u8, u8) {
        // validate() guarantees a non-empty palette; fall back to black otherwise
        if self.palette.is_empty() {
            return (0, 0, 0);
        }

        self.palette[level as usize % self.palette.len()]
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::PlotDimensions {
                width: self.width,
                height: self.height,
            });
        }

        if self.margin.saturating_mul(2) >= self.width.min(self.height) {
            return Err(ConfigError::PlotMargin {
                margin: self.margin,
                width: self.width,
                height: self.height,
            });
        }

        if !(self.bar_width_factor > 0.0 && self.bar_width_factor <= 1.0) {
            return Err(ConfigError::BarWidthFactor(self.bar_width_factor));
        }

        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        Ok(())
    }
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_are_valid() {
        let settings = AnalysisSettings::new();
        assert_eq!(settings.max_quality, 5);
        assert_eq!(settings.intervals_per_decade, 4);
        assert_eq!(settings.validate(), Ok(()));
    }

    #[rstest(intervals_per_decade, valid,
        case(0, false),  // Would divide by zero when computing edges
        case(1, true),
        case(MAX_INTERVALS_PER_DECADE, true),
        case(MAX_INTERVALS_PER_DECADE + 1, false)
    )]
    fn validates_intervals_per_decade(intervals_per_decade: u32, valid: bool) {
        let settings = AnalysisSettings {
            intervals_per_decade,
            ..AnalysisSettings::new()
        };
        assert_eq!(settings.validate().is_ok(), valid);
    }

    #[test]
    fn rejects_excessive_max_quality() {
        let settings = AnalysisSettings {
            max_quality: MAX_QUALITY_LEVEL + 1,
            ..AnalysisSettings::new()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::MaxQuality { .. })
        ));
    }

    #[rstest]
    #[case::zero_width(PlotSettings { width: 0, ..PlotSettings::new() })]
    #[case::zero_height(PlotSettings { height: 0, ..PlotSettings::new() })]
    #[case::margin_too_large(PlotSettings { margin: 400, ..PlotSettings::new() })]
    #[case::zero_bar_width(PlotSettings { bar_width_factor: 0.0, ..PlotSettings::new() })]
    #[case::oversized_bar_width(PlotSettings { bar_width_factor: 1.5, ..PlotSettings::new() })]
    #[case::nan_bar_width(PlotSettings { bar_width_factor: f64::NAN, ..PlotSettings::new() })]
    #[case::empty_palette(PlotSettings { palette: vec![], ..PlotSettings::new() })]
    fn rejects_invalid_plot_settings(#[case] plot: PlotSettings) {
        let settings = AnalysisSettings {
            plot,
            ..AnalysisSettings::new()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn palette_wraps_around() {
        let plot = PlotSettings::new();
        assert_eq!(plot.colour_for(0), plot.colour_for(plot.palette.len() as u32));
    }
}
