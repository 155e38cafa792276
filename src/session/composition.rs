use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::assets::color::ColorDef;
use crate::assets::table::AssetTable;
use crate::foundation::core::Viewport;
use crate::foundation::diagnostics::Diagnostics;
use crate::foundation::error::{VcsError, VcsResult};
use crate::reconcile::diff::{Element, Reconciler};
use crate::reconcile::host::{Host, InsertMode};
use crate::reconcile::op::{HostOp, OpLog};
use crate::render::display_list::DisplayList;
use crate::render::encoder::{EncodeCtx, encode_split};
use crate::render::video_scene::{VideoLayer, encode_video_layers};
use crate::scene::graph::{IntrinsicSizer, SceneGraph};

/// Session configuration, loadable from JSON. Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionOpts {
    pub viewport: Viewport,
    /// Grid unit size; `min(width, height) / 36` when unset.
    pub pixels_per_grid_unit: Option<f64>,
    /// Fill for image and web frame nodes whose source is missing.
    pub placeholder_color: ColorDef,
    pub insert_mode: InsertMode,
}

impl Default for CompositionOpts {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            pixels_per_grid_unit: None,
            placeholder_color: ColorDef::rgba8(0x8f, 0x8f, 0x8f, 0xff),
            insert_mode: InsertMode::Positional,
        }
    }
}

impl CompositionOpts {
    pub fn from_reader<R: std::io::Read>(r: R) -> VcsResult<Self> {
        let opts: Self = serde_json::from_reader(r)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn from_path(path: impl AsRef<Path>) -> VcsResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open composition options '{}'", path.display()))?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> VcsResult<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(VcsError::config("viewport width/height must be > 0"));
        }
        if let Some(ppgu) = self.pixels_per_grid_unit
            && !(ppgu.is_finite() && ppgu > 0.0)
        {
            return Err(VcsError::config(format!(
                "pixels_per_grid_unit must be finite and > 0, got {ppgu}"
            )));
        }
        Ok(())
    }

    /// Effective grid unit size in pixels.
    pub fn resolved_pixels_per_grid_unit(&self) -> f64 {
        self.pixels_per_grid_unit
            .unwrap_or_else(|| self.viewport.default_pixels_per_grid_unit())
    }
}

/// Everything a consumer needs to present one committed state.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FrameOutput {
    pub video_layers: Vec<VideoLayer>,
    /// Drawn above the videos.
    pub foreground: DisplayList,
    /// Drawn below the videos, already clipped around them.
    pub background: DisplayList,
}

/// A retained scene plus the machinery to mutate and encode it.
///
/// Feed it either declarative trees ([`Composition::render`]) or recorded operations
/// ([`Composition::apply_ops`]), not both: the two producers allocate keys independently.
#[derive(Debug)]
pub struct Composition {
    opts: CompositionOpts,
    host: Host,
    reconciler: Reconciler,
}

impl Composition {
    pub fn new(opts: CompositionOpts) -> VcsResult<Self> {
        opts.validate()?;
        let host = Host::new(opts.viewport.rect(), opts.resolved_pixels_per_grid_unit())
            .with_insert_mode(opts.insert_mode);
        Ok(Self {
            opts,
            host,
            reconciler: Reconciler::new(),
        })
    }

    pub fn opts(&self) -> &CompositionOpts {
        &self.opts
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut Host {
        &mut self.host
    }

    pub fn graph(&self) -> &SceneGraph {
        self.host.graph()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        self.host.diagnostics()
    }

    pub fn commit_count(&self) -> u64 {
        self.host.commit_count()
    }

    pub fn set_sizer(&mut self, sizer: Option<Box<dyn IntrinsicSizer>>) {
        self.host.set_sizer(sizer);
    }

    /// Run `f` after every outermost commit, once layout is done.
    pub fn subscribe(&mut self, f: impl FnMut(&SceneGraph) + Send + 'static) {
        self.host.subscribe(f);
    }

    /// Reconcile the retained tree against `tree`; `None` unmounts everything.
    pub fn render(&mut self, tree: Option<&Element>) -> VcsResult<()> {
        self.reconciler.render_into(&mut self.host, tree)
    }

    pub fn apply_ops(&mut self, ops: &[HostOp]) -> VcsResult<()> {
        self.host.apply_all(ops)
    }

    pub fn replay(&mut self, log: &OpLog) -> VcsResult<()> {
        self.apply_ops(&log.ops)
    }

    /// Change the output size. The grid unit follows unless it was pinned in the options.
    pub fn resize(&mut self, viewport: Viewport) -> VcsResult<()> {
        let opts = CompositionOpts {
            viewport,
            ..self.opts.clone()
        };
        opts.validate()?;
        self.host
            .resize(viewport.rect(), opts.resolved_pixels_per_grid_unit())?;
        self.opts = opts;
        Ok(())
    }

    /// Encode the committed tree against this frame's asset table.
    #[tracing::instrument(skip_all)]
    pub fn encode(&mut self, assets: &AssetTable) -> VcsResult<FrameOutput> {
        if self.host.in_commit() {
            return Err(VcsError::protocol("encode called inside an open commit"));
        }
        let viewport = self.host.viewport();
        let pixels_per_grid_unit = self.host.pixels_per_grid_unit();
        let placeholder = self.opts.placeholder_color;
        let (graph, diagnostics) = self.host.graph_and_diagnostics();

        let video_layers = encode_video_layers(graph, assets, diagnostics);
        let ctx = EncodeCtx {
            graph,
            assets,
            viewport,
            pixels_per_grid_unit,
            placeholder,
        };
        let split = encode_split(&ctx, &video_layers, diagnostics)?;
        tracing::debug!(
            videos = video_layers.len(),
            foreground = split.foreground.len(),
            background = split.background.len(),
            "encoded frame"
        );
        Ok(FrameOutput {
            video_layers,
            foreground: split.foreground,
            background: split.background,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/composition.rs"]
mod tests;
