//! Access to the page-wide loader for callers that never held the instance.
//!
//! Every function is generic over the host and surface so the same paths run
//! against the DOM in the browser and against [`renderer::MemoryDocument`] in
//! tests.

use renderer::{registry, DocumentHost, FaviconLoader, LoaderError, Surface};

use crate::{palette_strings, parse_palette};

#[derive(Debug, thiserror::Error)]
pub enum InstalledError {
    #[error("no favicon loader installed")]
    NotInstalled,
    #[error(transparent)]
    Loader(#[from] LoaderError),
}

fn with<H, S, R>(f: impl FnOnce(&mut FaviconLoader<H, S>) -> R) -> Result<R, InstalledError>
where
    H: DocumentHost + 'static,
    S: Surface + 'static,
{
    registry::with_installed::<FaviconLoader<H, S>, _>(f).ok_or(InstalledError::NotInstalled)
}

pub fn progress<H, S>() -> Result<f64, InstalledError>
where
    H: DocumentHost + 'static,
    S: Surface + 'static,
{
    with::<H, S, _>(|loader| loader.progress())
}

pub fn set_progress<H, S>(progress: f64) -> Result<(), InstalledError>
where
    H: DocumentHost + 'static,
    S: Surface + 'static,
{
    Ok(with::<H, S, _>(|loader| loader.set_progress(progress))??)
}

pub fn max<H, S>() -> Result<f64, InstalledError>
where
    H: DocumentHost + 'static,
    S: Surface + 'static,
{
    with::<H, S, _>(|loader| loader.max())
}

pub fn set_max<H, S>(max: f64) -> Result<(), InstalledError>
where
    H: DocumentHost + 'static,
    S: Surface + 'static,
{
    Ok(with::<H, S, _>(|loader| loader.set_max(max))??)
}

/// Palette as CSS color strings.
pub fn palette<H, S>() -> Result<Vec<String>, InstalledError>
where
    H: DocumentHost + 'static,
    S: Surface + 'static,
{
    with::<H, S, _>(|loader| palette_strings(loader.palette()))
}

/// Parses every entry before touching the loader; a bad entry leaves the
/// current palette in place.
pub fn set_palette<H, S>(palette: Vec<String>) -> Result<(), InstalledError>
where
    H: DocumentHost + 'static,
    S: Surface + 'static,
{
    let colors = parse_palette(palette)?;
    Ok(with::<H, S, _>(|loader| loader.set_palette(colors))??)
}

pub fn message<H, S>() -> Result<String, InstalledError>
where
    H: DocumentHost + 'static,
    S: Surface + 'static,
{
    with::<H, S, _>(|loader| loader.message().to_string())
}

pub fn set_message<H, S>(message: String) -> Result<(), InstalledError>
where
    H: DocumentHost + 'static,
    S: Surface + 'static,
{
    Ok(with::<H, S, _>(|loader| loader.set_message(message))??)
}

pub fn switch_loader<H, S>(active: bool) -> Result<(), InstalledError>
where
    H: DocumentHost + 'static,
    S: Surface + 'static,
{
    with::<H, S, _>(|loader| loader.switch_loader(active))
}

/// Empties the slot and restores the page icons. Returns `false` when no
/// loader of this type was installed.
pub fn teardown<H, S>() -> bool
where
    H: DocumentHost + 'static,
    S: Surface + 'static,
{
    match registry::teardown::<FaviconLoader<H, S>>() {
        Some(mut loader) => {
            loader.switch_loader(false);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::{LoaderOptions, MemoryDocument, RasterSurface, Shape};

    type Doc = MemoryDocument;
    type Raster = RasterSurface;

    // Tests run on separate threads, so each one sees its own empty slot.
    fn install() {
        FaviconLoader::install(
            MemoryDocument::new("Inbox").with_link("icon", "/favicon.ico"),
            RasterSurface::icon().unwrap(),
            LoaderOptions::new(Shape::Pie),
        )
        .unwrap();
    }

    fn title() -> String {
        with::<Doc, Raster, _>(|loader| loader.host().title()).unwrap()
    }

    #[test]
    fn everything_fails_before_init() {
        assert!(matches!(progress::<Doc, Raster>(), Err(InstalledError::NotInstalled)));
        assert!(matches!(
            set_message::<Doc, Raster>("x".into()),
            Err(InstalledError::NotInstalled)
        ));
        assert!(!teardown::<Doc, Raster>());
    }

    #[test]
    fn installed_loader_is_fully_reachable() {
        install();

        set_max::<Doc, Raster>(8.0).unwrap();
        set_message::<Doc, Raster>("{{progress}} of {{max}}".into()).unwrap();
        set_progress::<Doc, Raster>(2.0).unwrap();
        assert_eq!(title(), "2 of 8");

        set_palette::<Doc, Raster>(vec!["#000".into(), "#fff".into()]).unwrap();
        assert_eq!(progress::<Doc, Raster>().unwrap(), 2.0);
        assert_eq!(max::<Doc, Raster>().unwrap(), 8.0);
        assert_eq!(message::<Doc, Raster>().unwrap(), "{{progress}} of {{max}}");
        assert_eq!(
            palette::<Doc, Raster>().unwrap(),
            vec!["#000000".to_string(), "#ffffff".to_string()]
        );
    }

    #[test]
    fn invalid_values_are_reported_and_state_kept() {
        install();

        assert!(matches!(
            set_max::<Doc, Raster>(0.0),
            Err(InstalledError::Loader(LoaderError::InvalidMax(_)))
        ));
        assert!(matches!(
            set_palette::<Doc, Raster>(vec!["#c20000".into(), "nope".into()]),
            Err(InstalledError::Loader(LoaderError::InvalidColor(_)))
        ));
        assert!(matches!(
            set_progress::<Doc, Raster>(f64::NAN),
            Err(InstalledError::Loader(LoaderError::InvalidProgress(_)))
        ));
        assert_eq!(max::<Doc, Raster>().unwrap(), 100.0);
        assert_eq!(palette::<Doc, Raster>().unwrap().len(), 20);
        assert_eq!(progress::<Doc, Raster>().unwrap(), 0.0);
    }

    #[test]
    fn teardown_empties_the_slot() {
        install();
        switch_loader::<Doc, Raster>(false).unwrap();
        switch_loader::<Doc, Raster>(true).unwrap();
        assert!(teardown::<Doc, Raster>());
        assert!(!registry::is_installed());
        assert!(!teardown::<Doc, Raster>());
    }
}
