#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the pothole admin tools.
//!
//! Provides `indicatif`-backed progress bars behind the geocoder's
//! [`ProgressCallback`] trait, small `dialoguer` prompt helpers, and
//! [`init_logger`], which routes `log` output through
//! `indicatif-log-bridge` so log lines and progress bars never fight for
//! the terminal.

use std::sync::Arc;
use std::time::Duration;

use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use pothole_admin_geocoder::progress::ProgressCallback;

pub use indicatif::MultiProgress;

/// An `indicatif` [`ProgressBar`] that implements [`ProgressCallback`].
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Style to switch to once `set_total()` provides a known length.
    bar_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Progress for road-name lookups. Starts as a spinner and becomes a
    /// bar with ETA once [`ProgressCallback::set_total()`] says how many
    /// coordinates need resolving.
    #[must_use]
    pub fn lookups_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let bar_style = ProgressStyle::with_template(
            "  {msg} {wide_bar:.cyan/dim} {pos}/{len} {percent}% [{eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Arc::new(Self { bar, bar_style })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }

    fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Prompts for free text; blank input becomes `None`.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn prompt_optional(prompt: &str) -> Result<Option<String>, dialoguer::Error> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    let input = input.trim();
    Ok((!input.is_empty()).then(|| input.to_string()))
}

/// Prompts for a positive number, re-asking until one is given. Blank
/// input returns `default`.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn prompt_number(prompt: &str, default: usize) -> Result<usize, dialoguer::Error> {
    Input::new()
        .with_prompt(prompt)
        .default(default)
        .validate_with(|n: &usize| {
            if *n == 0 {
                Err("Enter a number greater than zero")
            } else {
                Ok(())
            }
        })
        .interact_text()
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while progress bars redraw.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    // Already set in tests.
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}
