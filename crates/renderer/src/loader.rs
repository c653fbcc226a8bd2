use crate::error::LoaderError;
use crate::geometry::{self, pie_radius, Point, RingMetrics, Sweep};
use crate::host::DocumentHost;
use crate::registry;
use crate::surface::{RasterSurface, Surface};
use crate::template::{self, TemplateValues};
use crate::types::{
    ActivationState, Color, LoaderOptions, Palette, Shape, DEFAULT_MAX, DEFAULT_MESSAGE,
    TRACK_COLOR,
};

/// Draws progress into the favicon and mirrors it into the document title.
///
/// The loader owns its drawing surface and its own `<link rel="icon">`. The
/// icon links that were in the head at construction are borrowed: activation
/// detaches them and [`switch_loader(false)`](Self::switch_loader) puts them
/// back, but they are never destroyed.
///
/// Every `set_*` mutator validates its input, then runs a full synchronous
/// redraw and repaint. There is no batching; rapid updates each pay for a
/// complete render.
pub struct FaviconLoader<H: DocumentHost, S: Surface> {
    host: H,
    surface: S,
    shape: Shape,
    progress: f64,
    max: f64,
    palette: Palette,
    message: String,
    prior_icons: Vec<H::Link>,
    own_link: H::Link,
    original_title: String,
    state: ActivationState,
}

impl<H: DocumentHost, S: Surface> FaviconLoader<H, S> {
    /// Captures the current icons and title, installs the loader's own icon
    /// link and renders the initial 0% frame.
    pub fn new(mut host: H, surface: S, options: LoaderOptions) -> Result<Self, LoaderError> {
        if surface.width() == 0 || surface.height() == 0 {
            return Err(LoaderError::MissingContext);
        }
        let max = options.max.unwrap_or(DEFAULT_MAX);
        validate_max(max)?;
        let palette = match options.palette {
            Some(colors) => Palette::new(colors)?,
            None => Palette::default(),
        };

        let prior_icons = host.icon_links();
        let own_link = host.create_icon_link()?;
        let original_title = host.title();

        let mut loader = Self {
            host,
            surface,
            shape: options.shape,
            progress: 0.0,
            max,
            palette,
            message: options
                .message
                .unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            prior_icons,
            own_link,
            original_title,
            state: ActivationState::Inactive,
        };
        tracing::debug!(
            shape = %loader.shape,
            prior_icons = loader.prior_icons.len(),
            title = %loader.original_title,
            "captured favicon state"
        );
        loader.switch_loader(true);
        loader.redraw()?;
        Ok(loader)
    }

    /// Swaps between the loader's icon (`true`) and the captured originals
    /// (`false`).
    ///
    /// Originals are re-appended in capture order; their positions relative
    /// to other head elements are not restored. Repeating a call with the same
    /// argument causes no further structural change.
    pub fn switch_loader(&mut self, active: bool) {
        if active {
            for link in &self.prior_icons {
                self.host.detach(link);
            }
            self.host.attach(&self.own_link);
            self.state = ActivationState::Active;
        } else {
            for link in &self.prior_icons {
                self.host.attach(link);
            }
            self.host.detach(&self.own_link);
            self.state = ActivationState::Inactive;
        }
        tracing::info!(active, "favicon loader switched");
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Last value passed to [`set_progress`](Self::set_progress); not clamped.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn palette(&self) -> &[Color] {
        self.palette.colors()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Progress used for drawing: `progress` capped at `max`.
    pub fn effective_progress(&self) -> f64 {
        geometry::effective_progress(self.progress, self.max)
    }

    /// Center of the drawing surface.
    pub fn center(&self) -> Point {
        geometry::center(self.surface.width(), self.surface.height())
    }

    /// Sets progress and redraws. Values above `max` are kept as given and
    /// only clamped when drawing; non-finite values are rejected.
    pub fn set_progress(&mut self, progress: f64) -> Result<(), LoaderError> {
        if !progress.is_finite() {
            tracing::warn!(progress, "rejected non-finite progress");
            return Err(LoaderError::InvalidProgress(progress));
        }
        self.progress = progress;
        self.redraw()
    }

    /// Sets max and redraws. `max` must be finite and greater than zero.
    pub fn set_max(&mut self, max: f64) -> Result<(), LoaderError> {
        if let Err(err) = validate_max(max) {
            tracing::warn!(max, "rejected invalid max");
            return Err(err);
        }
        self.max = max;
        self.redraw()
    }

    /// Replaces the palette and redraws. Empty palettes are rejected.
    pub fn set_palette(&mut self, colors: Vec<Color>) -> Result<(), LoaderError> {
        let palette = Palette::new(colors).inspect_err(|_| {
            tracing::warn!("rejected empty palette");
        })?;
        self.palette = palette;
        self.redraw()
    }

    /// Replaces the title template and redraws. An empty template hands the
    /// title back to the value captured at construction.
    pub fn set_message(&mut self, message: impl Into<String>) -> Result<(), LoaderError> {
        self.message = message.into();
        self.redraw()
    }

    /// Switches geometry and redraws.
    pub fn set_shape(&mut self, shape: Shape) -> Result<(), LoaderError> {
        self.shape = shape;
        self.redraw()
    }

    /// Color the palette assigns to `progress`.
    pub fn resolve_color(&self, progress: f64) -> Color {
        self.palette.resolve(progress, self.max)
    }

    /// Repaints the surface for the current state, then publishes it.
    pub fn redraw(&mut self) -> Result<(), LoaderError> {
        let effective = self.effective_progress();
        let sweep = Sweep::for_progress(effective, self.max);
        let color = self.resolve_color(effective);
        let center = self.center();
        let (width, height) = (self.surface.width(), self.surface.height());

        self.surface.clear();
        match self.shape {
            Shape::Pie => {
                self.surface
                    .fill_wedge(center, pie_radius(width, height), sweep, color);
            }
            Shape::Donut => {
                let ring = RingMetrics::donut(width, height);
                self.surface.stroke_arc(
                    center,
                    ring.radius,
                    ring.line_width,
                    Sweep::full(),
                    TRACK_COLOR,
                );
                self.surface
                    .stroke_arc(center, ring.radius, ring.line_width, sweep, color);
            }
        }
        tracing::debug!(
            shape = %self.shape,
            progress = self.progress,
            effective,
            max = self.max,
            sweep = sweep.angle(),
            %color,
            "redrew favicon"
        );
        self.repaint()
    }

    /// Publishes the surface as the favicon and refreshes the title.
    fn repaint(&mut self) -> Result<(), LoaderError> {
        let href = self.surface.to_image_ref()?;
        self.host.set_href(&self.own_link, &href);

        if self.message.is_empty() {
            if self.host.title() != self.original_title {
                self.host.set_title(&self.original_title);
            }
        } else {
            let values = TemplateValues::new(self.progress, self.max);
            let title = template::expand(&self.message, &values);
            self.host.set_title(&title);
        }
        Ok(())
    }

    /// Title captured at construction.
    pub fn original_title(&self) -> &str {
        &self.original_title
    }

    /// Icon links captured at construction, in capture order.
    pub fn prior_icons(&self) -> &[H::Link] {
        &self.prior_icons
    }

    pub fn own_link(&self) -> &H::Link {
        &self.own_link
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Direct access to the document; changes made here bypass the loader.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_parts(self) -> (H, S) {
        (self.host, self.surface)
    }
}

impl<H: DocumentHost + 'static, S: Surface + 'static> FaviconLoader<H, S> {
    /// Builds a loader and publishes it in this context's registry slot, for
    /// callers that cannot hold the instance themselves.
    ///
    /// Fails with [`LoaderError::AlreadyInstalled`] while a loader is
    /// installed; call [`registry::teardown`] first to replace it.
    pub fn install(host: H, surface: S, options: LoaderOptions) -> Result<(), LoaderError> {
        if registry::is_installed() {
            return Err(LoaderError::AlreadyInstalled);
        }
        let loader = Self::new(host, surface, options)?;
        registry::install(loader)
    }
}

impl<H: DocumentHost> FaviconLoader<H, RasterSurface> {
    /// Loader drawing into a fresh 32x32 raster surface.
    pub fn with_raster(host: H, options: LoaderOptions) -> Result<Self, LoaderError> {
        Self::new(host, RasterSurface::icon()?, options)
    }
}

fn validate_max(max: f64) -> Result<(), LoaderError> {
    if max.is_finite() && max > 0.0 {
        Ok(())
    } else {
        Err(LoaderError::InvalidMax(max))
    }
}
