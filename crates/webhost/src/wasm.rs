use js_sys::JSON;
use renderer::{
    is_icon_relation, Color, DocumentHost, FaviconLoader, LoaderError, LoaderOptions,
    Point, Surface, Sweep, ICON_SIZE,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlLinkElement};

use crate::installed;
use crate::{loader_options_from_json, palette_strings, parse_palette};

type DomLoader = FaviconLoader<DomHost, CanvasSurface>;

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn document() -> Result<Document, LoaderError> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or(LoaderError::MissingContext)
}

/// [`DocumentHost`] over `document.head` and `document.title`.
#[derive(Debug, Clone)]
pub struct DomHost {
    document: Document,
}

impl DomHost {
    pub fn new() -> Result<Self, LoaderError> {
        let document = document()?;
        if document.head().is_none() {
            return Err(LoaderError::MissingContext);
        }
        Ok(Self { document })
    }
}

impl DocumentHost for DomHost {
    type Link = HtmlLinkElement;

    fn icon_links(&self) -> Vec<HtmlLinkElement> {
        let Some(head) = self.document.head() else {
            return Vec::new();
        };
        let links = head.get_elements_by_tag_name("link");
        (0..links.length())
            .filter_map(|index| links.item(index))
            .filter(|link| is_icon_relation(&link.get_attribute("rel").unwrap_or_default()))
            .filter_map(|link| link.dyn_into::<HtmlLinkElement>().ok())
            .collect()
    }

    fn create_icon_link(&mut self) -> Result<HtmlLinkElement, LoaderError> {
        let link: HtmlLinkElement = self
            .document
            .create_element("link")
            .map_err(|_| LoaderError::MissingContext)?
            .dyn_into()
            .map_err(|_| LoaderError::MissingContext)?;
        link.set_rel("icon");
        Ok(link)
    }

    fn attach(&mut self, link: &HtmlLinkElement) {
        let Some(head) = self.document.head() else {
            return;
        };
        if let Err(err) = head.append_child(link) {
            tracing::warn!(?err, "failed to append icon link");
        }
    }

    fn detach(&mut self, link: &HtmlLinkElement) {
        link.remove();
    }

    fn set_href(&mut self, link: &HtmlLinkElement, href: &str) {
        link.set_href(href);
    }

    fn title(&self) -> String {
        self.document.title()
    }

    fn set_title(&mut self, title: &str) {
        self.document.set_title(title);
    }
}

/// [`Surface`] over an offscreen `<canvas>` and its 2D context.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, LoaderError> {
        let canvas: HtmlCanvasElement = document()?
            .create_element("canvas")
            .map_err(|_| LoaderError::MissingContext)?
            .dyn_into()
            .map_err(|_| LoaderError::MissingContext)?;
        canvas.set_width(width);
        canvas.set_height(height);
        let context = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|context| context.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or(LoaderError::MissingContext)?;
        Ok(Self { canvas, context })
    }

    pub fn icon() -> Result<Self, LoaderError> {
        Self::new(ICON_SIZE, ICON_SIZE)
    }

    fn trace_arc(&self, center: Point, radius: f32, sweep: Sweep) {
        if let Err(err) = self.context.arc(
            f64::from(center.x),
            f64::from(center.y),
            f64::from(radius),
            f64::from(sweep.start),
            f64::from(sweep.end),
        ) {
            tracing::warn!(?err, "canvas rejected arc");
        }
    }
}

impl Surface for CanvasSurface {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn clear(&mut self) {
        self.context.clear_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        );
    }

    fn fill_wedge(&mut self, center: Point, radius: f32, sweep: Sweep, color: Color) {
        if sweep.is_empty() {
            return;
        }
        self.context.set_fill_style_str(&color.to_string());
        self.context.begin_path();
        self.trace_arc(center, radius, sweep);
        self.context
            .line_to(f64::from(center.x), f64::from(center.y));
        self.context.fill();
    }

    fn stroke_arc(
        &mut self,
        center: Point,
        radius: f32,
        line_width: f32,
        sweep: Sweep,
        color: Color,
    ) {
        if sweep.is_empty() {
            return;
        }
        self.context.set_line_width(f64::from(line_width));
        self.context.set_stroke_style_str(&color.to_string());
        self.context.begin_path();
        self.trace_arc(center, radius, sweep);
        self.context.stroke();
    }

    fn to_image_ref(&self) -> Result<String, LoaderError> {
        self.canvas
            .to_data_url_with_type("image/png")
            .map_err(|_| LoaderError::MissingContext)
    }
}

fn options_from_js(options: &JsValue) -> Result<LoaderOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return loader_options_from_json(None).map_err(js_error);
    }
    let json: String = JSON::stringify(options)?.into();
    loader_options_from_json(Some(&json)).map_err(js_error)
}

fn build(options: &JsValue) -> Result<(DomHost, CanvasSurface, LoaderOptions), JsValue> {
    let options = options_from_js(options)?;
    let host = DomHost::new().map_err(js_error)?;
    let surface = CanvasSurface::icon().map_err(js_error)?;
    Ok((host, surface, options))
}

/// Favicon progress loader bound to the current page.
#[wasm_bindgen]
pub struct FaviconLoading {
    inner: DomLoader,
}

#[wasm_bindgen]
impl FaviconLoading {
    /// Takes over the page favicon; `options` is `{ type, message, max, palette }`.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<FaviconLoading, JsValue> {
        let (host, surface, options) = build(&options)?;
        let inner = FaviconLoader::new(host, surface, options).map_err(js_error)?;
        Ok(Self { inner })
    }

    /// Creates a loader owned by the page-wide slot.
    pub fn init(options: JsValue) -> Result<(), JsValue> {
        let (host, surface, options) = build(&options)?;
        FaviconLoader::install(host, surface, options).map_err(js_error)
    }

    #[wasm_bindgen(js_name = installedProgress)]
    pub fn installed_progress() -> Result<f64, JsValue> {
        installed::progress::<DomHost, CanvasSurface>().map_err(js_error)
    }

    #[wasm_bindgen(js_name = installedSetProgress)]
    pub fn installed_set_progress(progress: f64) -> Result<(), JsValue> {
        installed::set_progress::<DomHost, CanvasSurface>(progress).map_err(js_error)
    }

    #[wasm_bindgen(js_name = installedMax)]
    pub fn installed_max() -> Result<f64, JsValue> {
        installed::max::<DomHost, CanvasSurface>().map_err(js_error)
    }

    #[wasm_bindgen(js_name = installedSetMax)]
    pub fn installed_set_max(max: f64) -> Result<(), JsValue> {
        installed::set_max::<DomHost, CanvasSurface>(max).map_err(js_error)
    }

    #[wasm_bindgen(js_name = installedPalette)]
    pub fn installed_palette() -> Result<Vec<String>, JsValue> {
        installed::palette::<DomHost, CanvasSurface>().map_err(js_error)
    }

    #[wasm_bindgen(js_name = installedSetPalette)]
    pub fn installed_set_palette(palette: Vec<String>) -> Result<(), JsValue> {
        installed::set_palette::<DomHost, CanvasSurface>(palette).map_err(js_error)
    }

    #[wasm_bindgen(js_name = installedMessage)]
    pub fn installed_message() -> Result<String, JsValue> {
        installed::message::<DomHost, CanvasSurface>().map_err(js_error)
    }

    #[wasm_bindgen(js_name = installedSetMessage)]
    pub fn installed_set_message(message: String) -> Result<(), JsValue> {
        installed::set_message::<DomHost, CanvasSurface>(message).map_err(js_error)
    }

    #[wasm_bindgen(js_name = installedSwitchLoader)]
    pub fn installed_switch_loader(active: bool) -> Result<(), JsValue> {
        installed::switch_loader::<DomHost, CanvasSurface>(active).map_err(js_error)
    }

    /// Removes the installed loader and gives the page its icons back.
    /// Returns `false` when nothing was installed.
    #[wasm_bindgen(js_name = teardownInstalled)]
    pub fn teardown_installed() -> bool {
        installed::teardown::<DomHost, CanvasSurface>()
    }

    #[wasm_bindgen(js_name = switchLoader)]
    pub fn switch_loader(&mut self, active: bool) {
        self.inner.switch_loader(active);
    }

    pub fn redraw(&mut self) -> Result<(), JsValue> {
        self.inner.redraw().map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn progress(&self) -> f64 {
        self.inner.progress()
    }

    #[wasm_bindgen(setter)]
    pub fn set_progress(&mut self, progress: f64) -> Result<(), JsValue> {
        self.inner.set_progress(progress).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn max(&self) -> f64 {
        self.inner.max()
    }

    #[wasm_bindgen(setter)]
    pub fn set_max(&mut self, max: f64) -> Result<(), JsValue> {
        self.inner.set_max(max).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn palette(&self) -> Vec<String> {
        palette_strings(self.inner.palette())
    }

    #[wasm_bindgen(setter)]
    pub fn set_palette(&mut self, palette: Vec<String>) -> Result<(), JsValue> {
        let colors = parse_palette(palette).map_err(js_error)?;
        self.inner.set_palette(colors).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.inner.message().to_string()
    }

    #[wasm_bindgen(setter)]
    pub fn set_message(&mut self, message: String) -> Result<(), JsValue> {
        self.inner.set_message(message).map_err(js_error)
    }

    #[wasm_bindgen(getter, js_name = "type")]
    pub fn shape(&self) -> String {
        self.inner.shape().to_string()
    }
}
