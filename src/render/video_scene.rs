use serde::Serialize;

use crate::assets::table::{AssetTable, SourceType};
use crate::foundation::core::RectPx;
use crate::foundation::diagnostics::{DiagnosticKind, Diagnostics};
use crate::scene::graph::SceneGraph;
use crate::scene::node::NodeId;
use crate::scene::props::{NodeProps, ScaleMode};

/// Placement hints for the video compositor. Serialized in camelCase.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius_px: Option<f64>,
    pub scale_mode: ScaleMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
}

/// One video placement record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VideoLayer {
    #[serde(rename = "type")]
    pub kind: SourceType,
    /// Backend id of the resolved video source.
    pub id: String,
    /// Integer-rounded layout rectangle.
    pub frame: RectPx,
    pub attrs: VideoAttrs,
    #[serde(skip)]
    pub node: NodeId,
}

/// One record per attached video node, in pre-order.
///
/// Videos whose source is not in `assets` are left out and reported once per source.
#[tracing::instrument(skip_all)]
pub fn encode_video_layers(
    graph: &SceneGraph,
    assets: &AssetTable,
    diagnostics: &mut Diagnostics,
) -> Vec<VideoLayer> {
    let mut out = Vec::new();
    for id in graph.preorder() {
        let Some(node) = graph.get(id) else {
            continue;
        };
        let NodeProps::Video(video) = node.props() else {
            continue;
        };
        let Some(entry) = assets.resolve(SourceType::Video, &video.src) else {
            diagnostics.warn_once(
                DiagnosticKind::MissingAsset,
                &format!("video:{}", video.src),
                "video source missing from asset table; layer skipped",
            );
            continue;
        };

        let radius = video.common.style.corner_radius_px;
        out.push(VideoLayer {
            kind: SourceType::Video,
            id: entry.backend_id.clone(),
            frame: node.rect().rounded(),
            attrs: VideoAttrs {
                corner_radius_px: (radius > 0.0).then_some(radius),
                scale_mode: video.scale_mode,
                zoom: (video.zoom != 1.0).then_some(video.zoom),
            },
            node: id,
        });
    }
    tracing::debug!(layers = out.len(), "video layers");
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/video_scene.rs"]
mod tests;
