//! Browser bindings for the favicon progress loader.
//!
//! On `wasm32` this crate exports a `FaviconLoading` class backed by the real
//! DOM and an offscreen canvas. Option parsing lives outside the wasm module so
//! it can be exercised by native tests.

use renderer::{Color, LoaderError, LoaderOptions, Palette, Shape};
use serde::Deserialize;

pub mod installed;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{CanvasSurface, DomHost, FaviconLoading};

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("invalid loader options: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Loader(#[from] LoaderError),
}

/// Options object accepted by the JS constructor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WebOptions {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub palette: Option<Vec<String>>,
}

impl WebOptions {
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// A missing or empty `type` selects the pie.
    pub fn shape(&self) -> Result<Shape, LoaderError> {
        match self.kind.as_deref().map(str::trim) {
            None | Some("") => Ok(Shape::Pie),
            Some(kind) => kind.parse(),
        }
    }

    pub fn into_loader_options(self) -> Result<LoaderOptions, OptionsError> {
        let shape = self.shape()?;
        let palette = self.palette.map(parse_palette).transpose()?;
        Ok(LoaderOptions {
            shape,
            message: self.message,
            max: self.max,
            palette,
        })
    }
}

/// Parses CSS color strings coming from JS into a non-empty palette.
pub fn parse_palette(entries: Vec<String>) -> Result<Vec<Color>, LoaderError> {
    Palette::parse(entries).map(Palette::into_colors)
}

/// Palette rendered back into CSS color strings for JS callers.
pub fn palette_strings(colors: &[Color]) -> Vec<String> {
    colors.iter().map(Color::to_string).collect()
}

/// Parses the options object the way the JS constructor receives it; a
/// missing object means defaults.
pub fn loader_options_from_json(json: Option<&str>) -> Result<LoaderOptions, OptionsError> {
    match json {
        None => Ok(LoaderOptions::default()),
        Some(json) => WebOptions::from_json(json)?.into_loader_options(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_selects_shape() {
        let options = loader_options_from_json(Some(r#"{"type":"donut"}"#)).unwrap();
        assert_eq!(options.shape, Shape::Donut);
        assert_eq!(options.message, None);
    }

    #[test]
    fn missing_type_falls_back_to_pie() {
        for json in [r#"{}"#, r#"{"type":""}"#, r#"{"type":null}"#] {
            let options = loader_options_from_json(Some(json)).unwrap();
            assert_eq!(options.shape, Shape::Pie, "{json}");
        }
        assert_eq!(loader_options_from_json(None).unwrap().shape, Shape::Pie);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = loader_options_from_json(Some(r#"{"type":"star"}"#)).unwrap_err();
        assert!(matches!(err, OptionsError::Loader(LoaderError::InvalidShape(_))));
    }

    #[test]
    fn empty_message_is_kept() {
        let options = loader_options_from_json(Some(r#"{"type":"pie","message":""}"#)).unwrap();
        assert_eq!(options.message.as_deref(), Some(""));
    }

    #[test]
    fn max_and_palette_are_carried() {
        let options = loader_options_from_json(Some(
            r##"{"max": 40, "palette": ["#c20000", "rgba(0, 0, 0, 0.5)"]}"##,
        ))
        .unwrap();
        assert_eq!(options.max, Some(40.0));
        assert_eq!(
            options.palette,
            Some(vec![Color::rgb(0xc2, 0, 0), Color::rgba(0, 0, 0, 128)])
        );
    }

    #[test]
    fn bad_palette_entries_are_rejected() {
        assert!(matches!(
            loader_options_from_json(Some(r#"{"palette": []}"#)),
            Err(OptionsError::Loader(LoaderError::EmptyPalette))
        ));
        assert!(matches!(
            loader_options_from_json(Some(r#"{"palette": ["nope"]}"#)),
            Err(OptionsError::Loader(LoaderError::InvalidColor(_)))
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            loader_options_from_json(Some("{type: pie}")),
            Err(OptionsError::Json(_))
        ));
    }

    #[test]
    fn palette_strings_use_css_hex() {
        let colors = vec![Color::rgb(0xc2, 0x10, 0), Color::rgba(0, 0, 0, 128)];
        assert_eq!(palette_strings(&colors), vec!["#c21000", "#00000080"]);
    }
}
