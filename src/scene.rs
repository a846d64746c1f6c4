//! Minimal scene graph handed over by the host once assets are loaded, and
//! the visitors that prepare it for the intro.

use crate::features::reveal::RevealField;
use crate::gfx::math::{Color, Vec3};
use crate::gfx::shader::ShaderPatch;
use log::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub wireframe: bool,
    pub transparent: bool,
    pub opacity: f32,
    pub patch: Option<ShaderPatch>,
}

impl Material {
    pub fn standard(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
            wireframe: false,
            transparent: false,
            opacity: 1.0,
            patch: None,
        }
    }

    pub fn with_emissive(mut self, emissive: Color, intensity: f32) -> Self {
        self.emissive = emissive;
        self.emissive_intensity = intensity;
        self
    }

    pub fn is_emissive(&self) -> bool {
        !self.emissive.is_black() && self.emissive_intensity > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    /// Material the mesh arrived with, kept while a splash patch is installed.
    pub original_material: Option<Material>,
    /// Wireframe copy drawn on top during the intro.
    pub overlay: Option<Material>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, material: Material) -> Self {
        Self {
            name: name.into(),
            material,
            cast_shadow: false,
            receive_shadow: false,
            original_material: None,
            overlay: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub name: String,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Mesh(Mesh),
    Light(Light),
    Group(Group),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Mesh(m) => &m.name,
            Node::Light(l) => &l.name,
            Node::Group(g) => &g.name,
        }
    }

    /// Depth-first walk, parents before children.
    pub fn walk_mut(&mut self, visitor: &mut dyn NodeVisitor) {
        match self {
            Node::Mesh(mesh) => visitor.visit_mesh(mesh),
            Node::Light(light) => visitor.visit_light(light),
            Node::Group(group) => {
                visitor.visit_group(group);
                for child in &mut group.children {
                    child.walk_mut(visitor);
                }
            }
        }
    }

    pub fn walk(&self, visit: &mut dyn FnMut(&Node)) {
        visit(self);
        if let Node::Group(group) = self {
            for child in &group.children {
                child.walk(visit);
            }
        }
    }
}

pub trait NodeVisitor {
    fn visit_mesh(&mut self, _mesh: &mut Mesh) {}
    fn visit_light(&mut self, _light: &mut Light) {}
    fn visit_group(&mut self, _group: &mut Group) {}
}

/// Installs the splash patches on every mesh and records bloom targets.
pub struct SplashInstaller {
    mesh_patch: ShaderPatch,
    wire_patch: ShaderPatch,
    pub glow_targets: Vec<String>,
    pub meshes: usize,
}

impl SplashInstaller {
    pub fn new(mesh_field: &RevealField, wire_field: &RevealField) -> Self {
        Self {
            mesh_patch: mesh_field.patch(),
            wire_patch: wire_field.patch(),
            glow_targets: Vec::new(),
            meshes: 0,
        }
    }
}

impl NodeVisitor for SplashInstaller {
    fn visit_mesh(&mut self, mesh: &mut Mesh) {
        mesh.cast_shadow = true;
        mesh.receive_shadow = true;

        if mesh.original_material.is_none() {
            mesh.original_material = Some(mesh.material.clone());
        }
        mesh.material.transparent = true;
        mesh.material.patch = Some(self.mesh_patch.clone());

        let mut overlay = Material::standard(format!("{}-wire", mesh.material.name), Color::WHITE);
        overlay.wireframe = true;
        overlay.transparent = true;
        overlay.patch = Some(self.wire_patch.clone());
        mesh.overlay = Some(overlay);

        if mesh.material.is_emissive() {
            self.glow_targets.push(mesh.name.clone());
        }
        self.meshes += 1;
    }

    fn visit_light(&mut self, light: &mut Light) {
        if light.kind != LightKind::Ambient {
            self.glow_targets.push(light.name.clone());
        }
    }
}

/// Puts original materials back and drops the overlays.
#[derive(Default)]
pub struct SplashRemover {
    pub restored: usize,
}

impl NodeVisitor for SplashRemover {
    fn visit_mesh(&mut self, mesh: &mut Mesh) {
        if let Some(original) = mesh.original_material.take() {
            mesh.material = original;
            self.restored += 1;
        }
        mesh.overlay = None;
    }
}

pub fn install_splash(root: &mut Node, mesh_field: &RevealField, wire_field: &RevealField) -> Vec<String> {
    let mut installer = SplashInstaller::new(mesh_field, wire_field);
    root.walk_mut(&mut installer);
    info!(
        "Installed splash on {} meshes, {} glow targets",
        installer.meshes,
        installer.glow_targets.len()
    );
    installer.glow_targets
}

pub fn remove_splash(root: &mut Node) {
    let mut remover = SplashRemover::default();
    root.walk_mut(&mut remover);
    debug!("Restored {} original materials", remover.restored);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RevealConfig;

    fn station() -> Node {
        Node::Group(Group {
            name: "station".into(),
            children: vec![
                Node::Mesh(Mesh::new("hull", Material::standard("hull", Color::new(0.4, 0.4, 0.4)))),
                Node::Group(Group {
                    name: "ring".into(),
                    children: vec![Node::Mesh(Mesh::new(
                        "beacon",
                        Material::standard("beacon", Color::WHITE).with_emissive(Color::new(0.0, 1.0, 1.0), 2.0),
                    ))],
                }),
                Node::Light(Light {
                    name: "fill".into(),
                    kind: LightKind::Ambient,
                    color: Color::WHITE,
                    intensity: 0.5,
                    position: Vec3::ZERO,
                }),
                Node::Light(Light {
                    name: "key".into(),
                    kind: LightKind::Directional,
                    color: Color::WHITE,
                    intensity: 1.0,
                    position: Vec3::new(10.0, 10.0, 5.0),
                }),
            ],
        })
    }

    fn fields() -> (RevealField, RevealField) {
        let cfg = RevealConfig::default();
        (RevealField::mesh_splash(&cfg), RevealField::wireframe_splash(&cfg))
    }

    #[test]
    fn installs_on_nested_meshes() {
        let (mesh, wire) = fields();
        let mut root = station();
        let glow = install_splash(&mut root, &mesh, &wire);
        assert_eq!(glow, vec!["beacon".to_string(), "key".to_string()]);

        let mut patched = 0;
        root.walk(&mut |node| {
            if let Node::Mesh(m) = node {
                assert!(m.cast_shadow && m.receive_shadow);
                assert!(m.material.patch.is_some());
                assert!(m.overlay.as_ref().is_some_and(|o| o.wireframe));
                patched += 1;
            }
        });
        assert_eq!(patched, 2);
    }

    #[test]
    fn remove_restores_originals() {
        let (mesh, wire) = fields();
        let pristine = station();
        let mut root = station();
        install_splash(&mut root, &mesh, &wire);
        // Installing twice keeps the first original.
        install_splash(&mut root, &mesh, &wire);
        remove_splash(&mut root);

        root.walk(&mut |node| {
            if let Node::Mesh(m) = node {
                assert!(m.material.patch.is_none());
                assert!(m.overlay.is_none());
                assert!(m.original_material.is_none());
            }
        });
        // Shadow flags stay on; materials match what was loaded.
        let mut materials = Vec::new();
        pristine.walk(&mut |n| {
            if let Node::Mesh(m) = n {
                materials.push(m.material.clone());
            }
        });
        let mut restored = Vec::new();
        root.walk(&mut |n| {
            if let Node::Mesh(m) = n {
                restored.push(m.material.clone());
            }
        });
        assert_eq!(materials, restored);
    }
}
