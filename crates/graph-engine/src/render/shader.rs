//! WGSL checking ahead of pipeline creation.
//!
//! wgpu reports shader problems through its uncaptured-error handler, which
//! by default panics with little context. Running naga (the same front-end
//! wgpu uses) first turns a bad shader into an ordinary error carrying the
//! full diagnostic.

use naga::ShaderStage;

/// A shader module failed to compile or is missing a required entry point.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to parse shader `{label}`:\n{diagnostic}")]
    Parse { label: String, diagnostic: String },

    #[error("shader `{label}` failed validation:\n{diagnostic}")]
    Validation { label: String, diagnostic: String },

    #[error("shader `{label}` has no {stage:?} entry point named `{name}`")]
    MissingEntryPoint {
        label: String,
        stage: ShaderStage,
        name: String,
    },
}

/// WGSL source plus a label used in diagnostics and GPU object names.
#[derive(Debug, Clone, Copy)]
pub struct WgslSource<'a> {
    pub label: &'a str,
    pub code: &'a str,
}

impl<'a> WgslSource<'a> {
    pub const fn new(label: &'a str, code: &'a str) -> Self {
        Self { label, code }
    }

    /// Parses and validates the module and checks that each `(stage, name)`
    /// entry point exists.
    pub fn check(&self, entry_points: &[(ShaderStage, &str)]) -> Result<naga::Module, ShaderError> {
        let module = naga::front::wgsl::parse_str(self.code).map_err(|e| ShaderError::Parse {
            label: self.label.to_owned(),
            diagnostic: e.emit_to_string(self.code),
        })?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|e| ShaderError::Validation {
            label: self.label.to_owned(),
            diagnostic: e.emit_to_string(self.code),
        })?;

        for &(stage, name) in entry_points {
            let found = module
                .entry_points
                .iter()
                .any(|ep| ep.stage == stage && ep.name == name);
            if !found {
                return Err(ShaderError::MissingEntryPoint {
                    label: self.label.to_owned(),
                    stage,
                    name: name.to_owned(),
                });
            }
        }

        Ok(module)
    }

    /// Checks the source, then creates the wgpu shader module.
    pub fn create_module(
        &self,
        device: &wgpu::Device,
        entry_points: &[(ShaderStage, &str)],
    ) -> Result<wgpu::ShaderModule, ShaderError> {
        self.check(entry_points)?;

        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.label),
            source: wgpu::ShaderSource::Wgsl(self.code.into()),
        }))
    }
}
