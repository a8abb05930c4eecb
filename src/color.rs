use crate::cli::ColorMode;
use lazy_static::lazy_static;
use nu_ansi_term::{AnsiGenericString, Color, Style};
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::probe::Status;

lazy_static! {
    pub(crate) static ref SUCCESS: Style = Color::Green.bold();
    pub(crate) static ref WARNING: Style = Color::Yellow.bold();
    pub(crate) static ref ERROR: Style = Color::Red.bold();
    pub(crate) static ref SKIPPED: Style = Style::new().dimmed();
    pub(crate) static ref EMPHASIS: Style = Color::Default.bold();
    pub(crate) static ref SUGGESTION: Style = Color::Cyan.normal();
}

static USE_COLOR: AtomicBool = AtomicBool::new(true);

pub(crate) fn configure_color(cmode: ColorMode) {
    USE_COLOR.store(matches!(cmode, ColorMode::On), Ordering::Relaxed);
}

pub(crate) fn color_mode() -> ColorMode {
    match USE_COLOR.load(Ordering::Relaxed) {
        true => ColorMode::On,
        false => ColorMode::Off,
    }
}

pub(crate) fn status_style(status: Status) -> Style {
    match status {
        Status::Success => *SUCCESS,
        Status::Warning => *WARNING,
        Status::Error => *ERROR,
        Status::Skipped => *SKIPPED,
    }
}

pub(crate) trait MaybePaint {
    #[must_use]
    fn maybe_paint<'a, I, S: 'a + ToOwned + ?Sized>(self, input: I) -> AnsiGenericString<'a, S>
    where
        I: Into<Cow<'a, S>>,
        <S as ToOwned>::Owned: fmt::Debug;
}

impl MaybePaint for Style {
    fn maybe_paint<'a, I, S: 'a + ToOwned + ?Sized>(self, input: I) -> AnsiGenericString<'a, S>
    where
        I: Into<Cow<'a, S>>,
        <S as ToOwned>::Owned: fmt::Debug,
    {
        match color_mode() {
            ColorMode::On => self.paint(input),
            ColorMode::Off => {
                let cow: Cow<'a, S> = input.into();

                cow.into()
            }
        }
    }
}
