//! Process-wide default interpolator configured from the environment.

use once_cell::sync::OnceCell;

use crate::config::PdfConfig;
use crate::error::Result;
use crate::interpolator::Interpolator;
use crate::loader::TextGridLoader;

static DEFAULT: OnceCell<Interpolator<TextGridLoader>> = OnceCell::new();

/// The shared interpolator behind [`ar39_pdf`].
///
/// Built on first use from [`PdfConfig::from_env`]. A configuration error is
/// returned to the caller and retried on the next call.
pub fn default_interpolator() -> Result<&'static Interpolator<TextGridLoader>> {
    DEFAULT.get_or_try_init(|| {
        let config = PdfConfig::from_env()?;
        tracing::info!(data_dir = %config.data_dir.display(), "Initialising default Ar-39 PDF");
        Interpolator::new(TextGridLoader::from_config(&config), config.axes)
    })
}

/// Ar-39 PDF for `channel` at `energy_kev`, `fccd_mm` and `dlf`, using the
/// process-wide lookup tables.
pub fn ar39_pdf(channel: i32, energy_kev: f64, fccd_mm: f64, dlf: f64) -> Result<f64> {
    default_interpolator()?.density(channel, energy_kev, fccd_mm, dlf)
}

/// [`ar39_pdf`] with diagnostics emitted for the query.
pub fn ar39_pdf_with(
    channel: i32,
    energy_kev: f64,
    fccd_mm: f64,
    dlf: f64,
    diagnostics: bool,
) -> Result<f64> {
    default_interpolator()?.density_with(channel, energy_kev, fccd_mm, dlf, diagnostics)
}
