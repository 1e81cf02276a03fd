//! Color palettes for bars, pie slices and the like in chart.js charts.

/// Translucent fills.
pub const FILL_COLORS: [&str; 7] = [
	"rgba(255, 99, 132, 0.2)",
	"rgba(255, 159, 64, 0.2)",
	"rgba(255, 205, 86, 0.2)",
	"rgba(75, 192, 192, 0.2)",
	"rgba(54, 162, 235, 0.2)",
	"rgba(153, 102, 255, 0.2)",
	"rgba(201, 203, 207, 0.2)",
];

/// Opaque borders matching [`FILL_COLORS`] by position.
pub const BORDER_COLORS: [&str; 7] = [
	"rgb(255, 99, 132)",
	"rgb(255, 159, 64)",
	"rgb(255, 205, 86)",
	"rgb(75, 192, 192)",
	"rgb(54, 162, 235)",
	"rgb(153, 102, 255)",
	"rgb(201, 203, 207)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorKind {
	Fill,
	Border,
}

impl ColorKind {
	/// `"border"` selects borders, anything else fills.
	#[must_use]
	pub fn from_name(name: &str) -> Self {
		if name == "border" {
			ColorKind::Border
		} else {
			ColorKind::Fill
		}
	}

	#[must_use]
	pub fn palette(self) -> &'static [&'static str] {
		match self {
			ColorKind::Fill => &FILL_COLORS,
			ColorKind::Border => &BORDER_COLORS,
		}
	}
}

/// The most colors handed out per call from script.
pub const MAX_COLORS: usize = 1024;

/// Converts a count passed in from script. Non-finite and negative values yield zero, fractions are truncated, and the result is capped at [`MAX_COLORS`].
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn count_from_script(count: f64) -> usize {
	if count.is_finite() && count > 0. {
		(count.min(MAX_COLORS as f64)) as usize
	} else {
		0
	}
}

/// Returns `count` colors of `kind`, cycling through the palette.
#[must_use]
pub fn chart_colors(kind: ColorKind, count: usize) -> Vec<&'static str> {
	let palette = kind.palette();
	(0..count).map(|i| palette[i % palette.len()]).collect()
}
