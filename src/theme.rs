//! Light/dark palettes for the terminal view.

use std::fmt;
use std::str::FromStr;

use colored::{Color, ColoredString, Colorize};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Colors used by the view for each kind of element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub heading: Color,
    pub body: Color,
    pub notice: Color,
    pub error: Color,
}

impl Theme {
    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                heading: Color::Magenta,
                body: Color::Blue,
                notice: Color::Green,
                error: Color::Red,
            },
            Theme::Dark => Palette {
                heading: Color::BrightMagenta,
                body: Color::BrightWhite,
                notice: Color::BrightGreen,
                error: Color::BrightRed,
            },
        }
    }

    pub fn heading(self, text: &str) -> ColoredString {
        text.color(self.palette().heading).bold()
    }

    pub fn body(self, text: &str) -> ColoredString {
        text.color(self.palette().body)
    }

    pub fn notice(self, text: &str) -> ColoredString {
        text.color(self.palette().notice)
    }

    pub fn error(self, text: &str) -> ColoredString {
        text.color(self.palette().error)
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {other} (expected light or dark)")),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}
