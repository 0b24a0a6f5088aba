//! Nice CASGen output formatting.

use std::fmt;

use itertools::Itertools;
use log;

const CASGEN_BANNER_LENGTH: usize = 87;

/// Logs an error to both the diagnostic log and the `casgen-output` logger.
macro_rules! casgen_error {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        log::error!($fmt, $($($arg)*)?);
        log::error!(target: "casgen-output", $fmt, $($($arg)*)?);
    }
}

/// Logs a warning to the `casgen-output` logger.
macro_rules! casgen_warn {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        log::warn!($fmt, $($($arg)*)?);
        log::warn!(target: "casgen-output", $fmt, $($($arg)*)?);
    }
}

/// Logs a main output line to the `casgen-output` logger.
macro_rules! casgen_output {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::info!(target: "casgen-output", $fmt, $($($arg)*)?); }
}

pub(crate) use {casgen_error, casgen_output, casgen_warn};

/// Logs a nicely formatted section title to the `casgen-output` logger.
pub(crate) fn log_title(title: &str) {
    let length = title.chars().count().max(CASGEN_BANNER_LENGTH - 6);
    let bar = "─".repeat(length);
    casgen_output!("┌──{bar}──┐");
    casgen_output!("│§ {title:^length$} §│");
    casgen_output!("└──{bar}──┘");
}

/// Writes a nicely formatted subtitle.
pub(crate) fn write_subtitle(f: &mut fmt::Formatter<'_>, subtitle: &str) -> fmt::Result {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    writeln!(f, "{subtitle}")?;
    writeln!(f, "{bar}")?;
    Ok(())
}

/// Logs a nicely formatted subtitle to the `casgen-output` logger.
pub(crate) fn log_subtitle(subtitle: &str) {
    let length = subtitle.chars().count();
    let bar = "═".repeat(length);
    casgen_output!("{}", subtitle);
    casgen_output!("{}", bar);
}

/// Logs a nicely formatted macro-section beginning to the `casgen-output` logger.
pub(crate) fn log_macsec_begin(sectitle: &str) {
    let width = CASGEN_BANNER_LENGTH - 14;
    let sectitle_space = sectitle.to_string() + " ";
    casgen_output!("❬❬❬❬❬ [Begin] {sectitle_space:❬<width$}");
}

/// Logs a nicely formatted macro-section ending to the `casgen-output` logger.
pub(crate) fn log_macsec_end(sectitle: &str) {
    let width = CASGEN_BANNER_LENGTH - 14;
    let sectitle_space = sectitle.to_string() + " ";
    casgen_output!("❭❭❭❭❭ [ End ] {sectitle_space:❭<width$}");
}

/// Turns a boolean into a string of `yes` or `no`.
pub(crate) fn nice_bool(b: bool) -> String {
    if b {
        "yes".to_string()
    } else {
        "no".to_string()
    }
}

/// Joins per-symmetry counts into a single space-separated line, *e.g.* `3 1 1 0`.
pub(crate) fn join_counts(counts: &[usize]) -> String {
    counts.iter().map(|count| count.to_string()).join(" ")
}

/// A trait for logging `CASGen` outputs nicely.
pub(crate) trait CasGenOutput: fmt::Debug + fmt::Display {
    /// Logs display output nicely.
    fn log_output_display(&self) {
        let lines = self.to_string();
        lines.lines().for_each(|line| {
            casgen_output!("{line}");
        })
    }
}

// Blanket implementation
impl<T> CasGenOutput for T where T: fmt::Debug + fmt::Display {}
