//! WGSL program reflection.
//!
//! Programs are validated with naga before they reach wgpu so that compile
//! errors surface as `Err` instead of device validation panics, and so uniform
//! and attribute names can be resolved the way a GL program would.

use anyhow::{anyhow, bail, Result};
use naga::{AddressSpace, Binding, Scalar, ScalarKind, ShaderStage, TypeInner, VectorSize};

/// Bindings and entry points of a vertex/fragment pair.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct ProgramLayout {
    pub vertex_entry: String,
    pub fragment_entry: String,
    /// Vertex inputs: `(name, location)`.
    pub attributes: Vec<(String, u32)>,
    /// `vec2<f32>` uniforms in group 0: `(name, binding)`.
    pub uniforms: Vec<(String, u32)>,
    /// 2D textures in group 0: `(name, binding)`.
    pub textures: Vec<(String, u32)>,
    /// Sampler bindings in group 0.
    pub samplers: Vec<u32>,
}

impl ProgramLayout {
    pub fn uniform_binding(&self, name: &str) -> Option<u32> {
        self.uniforms.iter().find(|(n, _)| n == name).map(|(_, b)| *b)
    }

    pub fn texture_binding(&self, name: &str) -> Option<u32> {
        self.textures.iter().find(|(n, _)| n == name).map(|(_, b)| *b)
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes.iter().find(|(n, _)| n == name).map(|(_, l)| *l)
    }
}

fn parse(stage: &str, src: &str) -> Result<naga::Module> {
    let module = naga::front::wgsl::parse_str(src)
        .map_err(|e| anyhow!("{stage} shader failed to parse:\n{}", e.emit_to_string(src)))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    )
    .validate(&module)
    .map_err(|e| anyhow!("{stage} shader failed validation: {e}"))?;

    Ok(module)
}

fn entry_point(module: &naga::Module, stage: ShaderStage, label: &str) -> Result<usize> {
    module
        .entry_points
        .iter()
        .position(|ep| ep.stage == stage)
        .ok_or_else(|| anyhow!("{label} shader has no {label} entry point"))
}

fn collect_globals(module: &naga::Module, layout: &mut ProgramLayout) -> Result<()> {
    for (_, var) in module.global_variables.iter() {
        let Some(rb) = var.binding.as_ref() else { continue };
        let name = var.name.clone().unwrap_or_default();
        if rb.group != 0 {
            bail!("binding `{name}` uses group {}; only group 0 is supported", rb.group);
        }

        match (&var.space, &module.types[var.ty].inner) {
            (
                AddressSpace::Uniform,
                TypeInner::Vector {
                    size: VectorSize::Bi,
                    scalar: Scalar { kind: ScalarKind::Float, width: 4 },
                },
            ) => {
                push_unique(&mut layout.uniforms, name, rb.binding)?;
            }
            (AddressSpace::Uniform, _) => {
                bail!("uniform `{name}` must be a vec2<f32>");
            }
            (AddressSpace::Handle, TypeInner::Image { .. }) => {
                push_unique(&mut layout.textures, name, rb.binding)?;
            }
            (AddressSpace::Handle, TypeInner::Sampler { .. }) => {
                if !layout.samplers.contains(&rb.binding) {
                    layout.samplers.push(rb.binding);
                }
            }
            _ => bail!("binding `{name}` has an unsupported resource type"),
        }
    }
    Ok(())
}

fn push_unique(list: &mut Vec<(String, u32)>, name: String, binding: u32) -> Result<()> {
    match list.iter().find(|(_, b)| *b == binding) {
        Some((existing, _)) if *existing != name => {
            bail!("binding {binding} is declared as both `{existing}` and `{name}`")
        }
        Some(_) => Ok(()),
        None => {
            list.push((name, binding));
            Ok(())
        }
    }
}

fn collect_attributes(module: &naga::Module, ep: usize, layout: &mut ProgramLayout) {
    let function = &module.entry_points[ep].function;
    for arg in &function.arguments {
        match (&arg.binding, &module.types[arg.ty].inner) {
            (Some(Binding::Location { location, .. }), _) => {
                layout.attributes.push((arg.name.clone().unwrap_or_default(), *location));
            }
            (None, TypeInner::Struct { members, .. }) => {
                for m in members {
                    if let Some(Binding::Location { location, .. }) = &m.binding {
                        layout.attributes.push((m.name.clone().unwrap_or_default(), *location));
                    }
                }
            }
            _ => {}
        }
    }
}

/// Parses, validates and reflects a vertex/fragment WGSL pair.
pub(crate) fn reflect_program(vertex_src: &str, fragment_src: &str) -> Result<ProgramLayout> {
    let vs = parse("vertex", vertex_src)?;
    let fs = parse("fragment", fragment_src)?;

    let vs_ep = entry_point(&vs, ShaderStage::Vertex, "vertex")?;
    let fs_ep = entry_point(&fs, ShaderStage::Fragment, "fragment")?;

    let mut layout = ProgramLayout {
        vertex_entry: vs.entry_points[vs_ep].name.clone(),
        fragment_entry: fs.entry_points[fs_ep].name.clone(),
        ..ProgramLayout::default()
    };

    collect_globals(&vs, &mut layout)?;
    collect_globals(&fs, &mut layout)?;
    collect_attributes(&vs, vs_ep, &mut layout);

    if let Some((name, loc)) = layout.attributes.iter().find(|(_, l)| *l != 0) {
        bail!("vertex input `{name}` at location {loc}; only location 0 (vec2<f32>) is supplied");
    }

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ShaderSet;

    #[test]
    fn magnifier_shaders_reflect() {
        let shaders = ShaderSet::magnifying_glass();
        let layout = reflect_program(&shaders.vertex, &shaders.fragment).unwrap();

        assert_eq!(layout.vertex_entry, "vs_main");
        assert_eq!(layout.fragment_entry, "fs_main");
        assert_eq!(layout.attribute_location("aPosition"), Some(0));
        assert!(layout.uniform_binding("iResolution").is_some());
        assert!(layout.uniform_binding("iMouse").is_some());
        assert!(layout.texture_binding("iChannel0").is_some());
        assert_eq!(layout.samplers.len(), 1);
    }

    #[test]
    fn syntax_error_is_reported() {
        let shaders = ShaderSet::magnifying_glass();
        let err = reflect_program(&shaders.vertex, "@fragment fn fs_main( {").unwrap_err();
        assert!(err.to_string().contains("fragment shader failed to parse"));
    }

    #[test]
    fn missing_entry_point_is_reported() {
        let shaders = ShaderSet::magnifying_glass();
        let err = reflect_program(&shaders.fragment, &shaders.fragment).unwrap_err();
        assert!(err.to_string().contains("no vertex entry point"));
    }

    #[test]
    fn integer_vec2_uniform_is_rejected() {
        let shaders = ShaderSet::magnifying_glass();
        let fs = "@group(0) @binding(0) var<uniform> iMouse: vec2<i32>;
        @fragment fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(f32(iMouse.x), 0.0, 0.0, 1.0);
        }";
        let err = reflect_program(&shaders.vertex, fs).unwrap_err();
        assert!(err.to_string().contains("must be a vec2<f32>"), "{err:#}");
    }

    #[test]
    fn unused_uniform_does_not_resolve() {
        let vs = "@vertex fn vs_main(@location(0) aPosition: vec2<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(aPosition, 0.0, 1.0);
        }";
        let fs = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";
        let layout = reflect_program(vs, fs).unwrap();
        assert!(layout.uniform_binding("iMouse").is_none());
        assert!(layout.texture_binding("iChannel0").is_none());
    }
}
