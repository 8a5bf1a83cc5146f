#![forbid(unsafe_code)]

//! `prismaflow` builds PRISMA 2020 flow diagrams from the standard CSV data template.
//!
//! The core crate (re-exported at the root) reads and validates the template. Layout is delegated
//! to Graphviz: the diagram is emitted as pinned DOT, rendered by an external `dot -Kneato`, and
//! the resulting SVG is decorated with hyperlinks and rotated phase labels.
//!
//! # Features
//!
//! - `render`: DOT building, Graphviz invocation and SVG/HTML output (`prismaflow::render`)
//! - `raster`: PNG/JPG/PDF output via pure-Rust SVG rasterization/conversion

pub use prismaflow_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use prismaflow_render::{
        BoxId, DecorateOptions, Decoration, FlowDiagram, Graphviz, NodeIdEntry, NodeIdMap, Phase,
        apply_decorations, build_flow_diagram, decorate_svg, decoration_plan,
        render_widget_html,
    };

    #[cfg(feature = "raster")]
    pub mod raster;

    use prismaflow_core::{DiagramOptions, FlowData, ReadOptions};
    use std::path::Path;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Data(#[from] prismaflow_core::Error),
        #[error(transparent)]
        Render(#[from] prismaflow_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Default title of the standalone HTML page.
    pub const DEFAULT_TITLE: &str = "PRISMA 2020 flow diagram";

    /// Reads a template; with `read.strict`, required counts follow the wings `options` requests.
    pub fn load_template(
        path: impl AsRef<Path>,
        read: ReadOptions,
        options: &DiagramOptions,
    ) -> Result<FlowData> {
        options.validate()?;
        let read = ReadOptions {
            previous: options.previous,
            other: options.other,
            ..read
        };
        Ok(prismaflow_core::read_template_path(path, read)?)
    }

    /// DOT text for `data`.
    pub fn render_dot(data: &FlowData, options: &DiagramOptions) -> String {
        build_flow_diagram(data, options).to_dot()
    }

    /// Builds, lays out with Graphviz and decorates.
    pub fn render_svg_sync(
        data: &FlowData,
        options: &DiagramOptions,
        graphviz: &Graphviz,
    ) -> Result<String> {
        Ok(prismaflow_render::render_flow_svg(data, options, graphviz)?)
    }

    /// Like [`render_svg_sync`], wrapped in a self-contained HTML page.
    pub fn render_html_sync(
        data: &FlowData,
        options: &DiagramOptions,
        graphviz: &Graphviz,
        title: &str,
    ) -> Result<String> {
        let svg = render_svg_sync(data, options, graphviz)?;
        Ok(render_widget_html(&svg, title))
    }

    /// Synchronous convenience wrapper bundling options and a Graphviz runner.
    #[derive(Debug, Clone, Default)]
    pub struct HeadlessRenderer {
        pub options: DiagramOptions,
        pub graphviz: Graphviz,
    }

    impl HeadlessRenderer {
        pub fn new(options: DiagramOptions) -> Self {
            Self {
                options,
                graphviz: Graphviz::default(),
            }
        }

        pub fn with_graphviz(mut self, graphviz: Graphviz) -> Self {
            self.graphviz = graphviz;
            self
        }

        pub fn build(&self, data: &FlowData) -> FlowDiagram {
            build_flow_diagram(data, &self.options)
        }

        pub fn render_dot(&self, data: &FlowData) -> String {
            render_dot(data, &self.options)
        }

        pub fn render_svg_sync(&self, data: &FlowData) -> Result<String> {
            render_svg_sync(data, &self.options, &self.graphviz)
        }

        pub fn render_html_sync(&self, data: &FlowData, title: &str) -> Result<String> {
            render_html_sync(data, &self.options, &self.graphviz, title)
        }

        #[cfg(feature = "raster")]
        pub fn render_png_sync(
            &self,
            data: &FlowData,
            raster: &raster::RasterOptions,
        ) -> raster::Result<Vec<u8>> {
            raster::svg_to_png(&self.render_svg_sync(data)?, raster)
        }

        #[cfg(feature = "raster")]
        pub fn render_jpeg_sync(
            &self,
            data: &FlowData,
            raster: &raster::RasterOptions,
        ) -> raster::Result<Vec<u8>> {
            raster::svg_to_jpeg(&self.render_svg_sync(data)?, raster)
        }

        #[cfg(feature = "raster")]
        pub fn render_pdf_sync(
            &self,
            data: &FlowData,
            raster: &raster::RasterOptions,
        ) -> raster::Result<Vec<u8>> {
            raster::svg_to_pdf(&self.render_svg_sync(data)?, raster)
        }
    }

}
