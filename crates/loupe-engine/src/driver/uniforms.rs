use std::collections::HashMap;

use crate::gpu::{GpuContext, ProgramId, UniformLocation};

pub const I_RESOLUTION: &str = "iResolution";
pub const I_MOUSE: &str = "iMouse";
pub const I_CHANNEL0: &str = "iChannel0";

/// Uniform locations resolved once after the program links.
///
/// Names the program does not declare are simply absent; writes to them are skipped.
#[derive(Debug, Clone, Default)]
pub struct UniformCache {
    locations: HashMap<&'static str, UniformLocation>,
}

impl UniformCache {
    pub const NAMES: [&'static str; 3] = [I_RESOLUTION, I_MOUSE, I_CHANNEL0];

    pub fn resolve(gpu: &mut dyn GpuContext, program: ProgramId) -> Self {
        let locations = Self::NAMES
            .iter()
            .filter_map(|name| gpu.uniform_location(program, name).map(|loc| (*name, loc)))
            .collect();
        Self { locations }
    }

    pub fn get(&self, name: &str) -> Option<UniformLocation> {
        self.locations.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
