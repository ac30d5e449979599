//! The process-wide interpolator configured from the environment.
//!
//! Kept in its own test binary: the default interpolator is built once per
//! process from whatever the environment holds at first use.

use ar39_pdf::{ar39_pdf, ar39_pdf_with, default_interpolator, PdfError};
use test_utils::{
    assert_approx_eq, create_grid, linear_density, small, temp_test_dir, write_grid_file,
};

#[test]
fn test_global_lookup_from_env_config() {
    test_utils::init_tracing();
    let dir = temp_test_dir();
    let values = create_grid(small::ENERGY, small::FCCD, small::DLF, linear_density);
    write_grid_file(dir.path(), "bkg-", 3, &values).unwrap();

    let config = dir.path().join("ar39.yaml");
    std::fs::write(
        &config,
        format!(
            r#"
data_dir: {}
file_prefix: bkg-
axes:
  energy: {{ min: {}, step: {}, max: {} }}
  fccd: {{ min: {}, step: {}, max: {} }}
  dlf: {{ min: {}, step: {}, max: {} }}
  channels: {{ min: {}, max: {} }}
"#,
            dir.path().display(),
            small::ENERGY.0,
            small::ENERGY.1,
            small::ENERGY.2,
            small::FCCD.0,
            small::FCCD.1,
            small::FCCD.2,
            small::DLF.0,
            small::DLF.1,
            small::DLF.2,
            small::CHANNELS.0,
            small::CHANNELS.1,
        ),
    )
    .unwrap();
    std::env::set_var("AR39_PDF_CONFIG", &config);

    let value = ar39_pdf(3, 2.5, 0.8, 0.4).unwrap();
    assert_approx_eq!(value, linear_density(2.5, 0.8, 0.4), 1e-9);

    let value = ar39_pdf_with(3, 2.5, 0.8, 0.4, true).unwrap();
    assert_approx_eq!(value, linear_density(2.5, 0.8, 0.4), 1e-9);

    assert!(matches!(
        ar39_pdf(6, 2.5, 0.8, 0.4).unwrap_err(),
        PdfError::ChannelOutOfRange { channel: 6, .. }
    ));

    // Same instance on every call.
    let a = default_interpolator().unwrap();
    let b = default_interpolator().unwrap();
    assert!(std::ptr::eq(a, b));
    assert_eq!(a.store().loaded_channels(), vec![3]);
}
