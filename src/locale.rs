//! Localized user-visible notices.
//!
//! Strings are resolved by key per locale. Unknown locale codes fall back
//! to English so a misconfigured locale never hides a notice.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Locale {
    #[default]
    En,
    Es,
    Fr,
}

/// Keys of every notice the client view can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    EmptyInput,
    ServiceUnavailable,
    UnsupportedFile,
    Copied,
    Saved,
    ResultHeading,
    Checking,
}

impl Locale {
    /// Parse a locale code such as `es` or `fr-CA`, falling back to English
    pub fn from_code(code: &str) -> Self {
        let primary = code
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match primary.as_str() {
            "es" => Locale::Es,
            "fr" => Locale::Fr,
            _ => Locale::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
            Locale::Fr => "fr",
        }
    }

    pub fn text(self, notice: Notice) -> &'static str {
        match self {
            Locale::En => match notice {
                Notice::EmptyInput => "Please enter text",
                Notice::ServiceUnavailable => "The correction service is unavailable, please try again",
                Notice::UnsupportedFile => "Only .txt and .html files can be loaded",
                Notice::Copied => "Copied",
                Notice::Saved => "Saved",
                Notice::ResultHeading => "Grammatically Corrected Text",
                Notice::Checking => "Fixing grammatical errors...",
            },
            Locale::Es => match notice {
                Notice::EmptyInput => "Por favor, introduce un texto",
                Notice::ServiceUnavailable => "El servicio de corrección no está disponible, inténtalo de nuevo",
                Notice::UnsupportedFile => "Solo se pueden cargar archivos .txt y .html",
                Notice::Copied => "Copiado",
                Notice::Saved => "Guardado",
                Notice::ResultHeading => "Texto corregido gramaticalmente",
                Notice::Checking => "Corrigiendo errores gramaticales...",
            },
            Locale::Fr => match notice {
                Notice::EmptyInput => "Veuillez saisir un texte",
                Notice::ServiceUnavailable => "Le service de correction est indisponible, veuillez réessayer",
                Notice::UnsupportedFile => "Seuls les fichiers .txt et .html peuvent être chargés",
                Notice::Copied => "Copié",
                Notice::Saved => "Enregistré",
                Notice::ResultHeading => "Texte corrigé grammaticalement",
                Notice::Checking => "Correction des erreurs grammaticales...",
            },
        }
    }
}

impl FromStr for Locale {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Locale::from_code(s))
    }
}

impl From<String> for Locale {
    fn from(code: String) -> Self {
        Locale::from_code(&code)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
