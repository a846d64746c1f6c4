//! Source patching for host-compiled shaders and the uniform sink the
//! reveal effects write into.

use super::math::Vec3;
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vec3),
}

/// Anything that can receive named uniforms: a GL program, a material's
/// uniform table, or a test recorder.
pub trait UniformSink {
    fn set_uniform(&mut self, name: &str, value: UniformValue);
}

impl UniformSink for Vec<(String, UniformValue)> {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        match self.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.push((name.to_string(), value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

/// Named insertion points in the host's shader chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionPoint {
    VertexCommon,
    VertexWorldPos,
    FragmentCommon,
    FragmentOutput,
}

impl ExtensionPoint {
    pub fn stage(self) -> Stage {
        match self {
            ExtensionPoint::VertexCommon | ExtensionPoint::VertexWorldPos => Stage::Vertex,
            ExtensionPoint::FragmentCommon | ExtensionPoint::FragmentOutput => Stage::Fragment,
        }
    }

    pub fn anchor(self) -> &'static str {
        match self {
            ExtensionPoint::VertexCommon | ExtensionPoint::FragmentCommon => "#include <common>",
            ExtensionPoint::VertexWorldPos => "#include <worldpos_vertex>",
            ExtensionPoint::FragmentOutput => "#include <dithering_fragment>",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShaderPatch {
    pub uniforms: Vec<(&'static str, &'static str)>,
    pub snippets: Vec<(ExtensionPoint, String)>,
}

impl ShaderPatch {
    /// Splices uniform declarations and snippets into one stage's source.
    /// Every snippet is inserted right after its anchor; a missing anchor is
    /// an error so the caller can fall back to the unpatched material.
    pub fn apply(&self, stage: Stage, source: &str) -> Result<String> {
        let mut out = source.to_string();

        for (point, snippet) in self.snippets.iter().filter(|(p, _)| p.stage() == stage) {
            let anchor = point.anchor();
            let Some(at) = out.find(anchor) else {
                anyhow::bail!("Shader source has no '{}' to patch ({:?})", anchor, point);
            };
            let end = at + anchor.len();
            let mut block = String::from("\n");
            if matches!(point, ExtensionPoint::VertexCommon | ExtensionPoint::FragmentCommon) {
                for (name, ty) in &self.uniforms {
                    block.push_str(&format!("uniform {} {};\n", ty, name));
                }
            }
            block.push_str(snippet);
            out.insert_str(end, &block);
        }

        Ok(out)
    }
}

pub const U_PROGRESS: &str = "uSplashProgress";
pub const U_ORIGIN: &str = "uSplashOrigin";
pub const U_TIME: &str = "uTime";
pub const U_FADE: &str = "uOverlayFade";

const VERTEX_VARYING: &str = "varying vec3 vSplashWorld;\n";
const VERTEX_WORLD: &str = "vSplashWorld = (modelMatrix * vec4(transformed, 1.0)).xyz;\n";

fn common_uniforms() -> Vec<(&'static str, &'static str)> {
    vec![
        (U_PROGRESS, "float"),
        (U_ORIGIN, "vec3"),
        (U_TIME, "float"),
        (U_FADE, "float"),
    ]
}

fn field_fragment(sweep_radius: f32, edge_width: f32, discard_below: f32, two_phase: bool) -> String {
    let alpha = if two_phase {
        format!(
            "float rIn = smoothstep(0.0, 1.0, uSplashProgress + 1.0) * {sweep:.4};\n\
             float rOut = smoothstep(0.0, 1.0, uSplashProgress) * ({sweep:.4} + {edge:.4});\n\
             float fadeIn = 1.0 - smoothstep(rIn - {edge:.4}, rIn, d);\n\
             float fadeOut = smoothstep(rOut - {edge:.4}, rOut, d);\n\
             float splashAlpha = min(fadeIn, fadeOut);\n\
             float band = step(rIn - {edge:.4}, d) * step(d, rIn);\n",
            sweep = sweep_radius,
            edge = edge_width,
        )
    } else {
        format!(
            "float r = smoothstep(0.0, 1.0, uSplashProgress) * {sweep:.4};\n\
             float splashAlpha = 1.0 - smoothstep(r - {edge:.4}, r, d);\n\
             float band = step(r - {edge:.4}, d) * step(d, r);\n",
            sweep = sweep_radius,
            edge = edge_width,
        )
    };
    format!(
        "{{\n\
         float d = distance(vSplashWorld, uSplashOrigin);\n\
         {alpha}\
         float ripple = 0.5 + 0.5 * sin(2.0 * d - 4.0 * uTime);\n\
         splashAlpha *= mix(1.0, ripple, band) * uOverlayFade;\n\
         if (splashAlpha < {discard:.4}) discard;\n\
         gl_FragColor.a *= splashAlpha;\n\
         }}\n",
        alpha = alpha,
        discard = discard_below,
    )
}

/// Patch driving the solid mesh reveal.
pub fn mesh_splash_patch(sweep_radius: f32, edge_width: f32, discard_below: f32) -> ShaderPatch {
    splash_patch(field_fragment(sweep_radius, edge_width, discard_below, false))
}

/// Patch for the wireframe overlay, which sweeps in and then out again.
pub fn wireframe_splash_patch(sweep_radius: f32, edge_width: f32, discard_below: f32) -> ShaderPatch {
    splash_patch(field_fragment(sweep_radius, edge_width, discard_below, true))
}

fn splash_patch(fragment: String) -> ShaderPatch {
    ShaderPatch {
        uniforms: common_uniforms(),
        snippets: vec![
            (ExtensionPoint::VertexCommon, VERTEX_VARYING.to_string()),
            (ExtensionPoint::VertexWorldPos, VERTEX_WORLD.to_string()),
            (ExtensionPoint::FragmentCommon, VERTEX_VARYING.to_string()),
            (ExtensionPoint::FragmentOutput, fragment),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERT: &str = "#include <common>\nvoid main() {\n#include <worldpos_vertex>\n}\n";
    const FRAG: &str = "#include <common>\nvoid main() {\ngl_FragColor = vec4(1.0);\n#include <dithering_fragment>\n}\n";

    #[test]
    fn patches_both_stages() {
        let patch = mesh_splash_patch(15.0, 2.0, 0.01);
        let vert = patch.apply(Stage::Vertex, VERT).unwrap();
        let frag = patch.apply(Stage::Fragment, FRAG).unwrap();

        assert!(vert.contains("uniform float uSplashProgress;"));
        assert!(vert.contains("vSplashWorld = (modelMatrix"));
        assert!(frag.contains("uniform vec3 uSplashOrigin;"));
        assert!(frag.contains("discard"));
        // Snippet lands after its anchor.
        let anchor = frag.find("#include <dithering_fragment>").unwrap();
        assert!(frag.find("splashAlpha").unwrap() > anchor);
    }

    #[test]
    fn wireframe_patch_has_both_phases() {
        let frag = wireframe_splash_patch(15.0, 3.0, 0.01).apply(Stage::Fragment, FRAG).unwrap();
        assert!(frag.contains("fadeIn"));
        assert!(frag.contains("fadeOut"));
        assert!(frag.contains("min(fadeIn, fadeOut)"));
    }

    #[test]
    fn missing_anchor_is_an_error() {
        let patch = mesh_splash_patch(15.0, 2.0, 0.01);
        assert!(patch.apply(Stage::Fragment, "void main() {}").is_err());
    }

    #[test]
    fn recorder_overwrites_existing_names() {
        let mut sink: Vec<(String, UniformValue)> = Vec::new();
        sink.set_uniform(U_TIME, UniformValue::Float(1.0));
        sink.set_uniform(U_TIME, UniformValue::Float(2.0));
        assert_eq!(sink, vec![(U_TIME.to_string(), UniformValue::Float(2.0))]);
    }
}
