use crate::cli::ColorMode;
use crate::color::{self, MaybePaint};

pub const DEFAULT_EXIT_CODE: i32 = 1;

pub(crate) fn error_internal(text: &str) {
    match color::color_mode() {
        ColorMode::On => {
            eprintln!(
                "{} {}",
                color::ERROR.maybe_paint("error:"),
                color::EMPHASIS.maybe_paint(text)
            );
        }
        ColorMode::Off => {
            eprintln!("error: {}", text);
        }
    }
}

pub(crate) fn warn_internal(text: &str) {
    match color::color_mode() {
        ColorMode::On => {
            eprintln!(
                "{} {}",
                color::WARNING.maybe_paint("warning:"),
                color::EMPHASIS.maybe_paint(text)
            );
        }
        ColorMode::Off => {
            eprintln!("warning: {}", text);
        }
    }
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => ({
        let formatted = format!($($arg)*);
        $crate::utils::errors::warn_internal(&formatted);
    })
}

#[macro_export]
macro_rules! die {
    ($($arg:tt)*) => ({
        let formatted = format!($($arg)*);
        $crate::utils::errors::error_internal(&formatted);
        ::std::process::exit($crate::utils::errors::DEFAULT_EXIT_CODE);
    })
}
