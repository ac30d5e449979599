//! Checks against the production GERDA lookup tables.
//!
//! Skipped unless `AR39_PDF_DATA_DIR` or `<workspace>/lookup` holds them.

use std::path::Path;

use ar39_pdf::{AxisConfiguration, ChannelRange, GridAxis, Interpolator, TextGridLoader};
use test_utils::{gerda, require_lookup_dir, AxisSpec};

fn axis((min, step, max): AxisSpec) -> GridAxis {
    GridAxis::new(min, step, max).expect("valid axis")
}

fn gerda_axes() -> AxisConfiguration {
    AxisConfiguration {
        energy: axis(gerda::ENERGY),
        fccd: axis(gerda::FCCD),
        dlf: axis(gerda::DLF),
        channels: ChannelRange::new(gerda::CHANNELS.0, gerda::CHANNELS.1).unwrap(),
    }
}

fn open(dir: &Path) -> Interpolator<TextGridLoader> {
    Interpolator::new(TextGridLoader::new(dir), gerda_axes()).expect("valid configuration")
}

#[test]
fn test_gerda_fixture_matches_default_axes() {
    assert_eq!(gerda_axes(), AxisConfiguration::default());
}

#[test]
fn test_real_tables_load_and_interpolate() {
    let dir = require_lookup_dir!();
    test_utils::init_tracing();

    let pdf = open(&dir);

    let value = pdf.density(0, 100.0, 1.0, 0.5).unwrap();
    assert!(value.is_finite());
    assert!(value >= 0.0, "negative density {}", value);

    let grid = pdf.store().get(0).unwrap();
    assert_eq!(grid.get(1000, 7, 5), Some(value));
}

#[test]
fn test_real_tables_deployed_channels() {
    let dir = require_lookup_dir!();

    let pdf = open(&dir);
    let loader = TextGridLoader::new(&dir);
    let present: Vec<i32> = gerda::DEPLOYED_CHANNELS
        .iter()
        .copied()
        .filter(|&ch| loader.resource_path(ch).exists())
        .collect();

    pdf.store().preload(&present).unwrap();
    assert_eq!(pdf.store().len(), present.len());

    for &channel in &present {
        let value = pdf.density(channel, 250.0, 1.2, 0.3).unwrap();
        assert!(value.is_finite() && value >= 0.0);
    }
}
