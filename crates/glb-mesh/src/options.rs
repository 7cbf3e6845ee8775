/// How a semantic slot treats an accessor whose stored layout disagrees with
/// the slot's convention (e.g. `indices` stored as `UNSIGNED_BYTE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComponentPolicy {
    /// Surface the mismatch as `ComponentTypeMismatch` / `ElementTypeMismatch`.
    #[default]
    Strict,
    /// Decode with the accessor's declared layout instead of the convention.
    Coerce,
}

/// Options controlling a decode pass.
///
/// ```ignore
/// let options = DecodeOptions::new()
///     .with_component_policy(ComponentPolicy::Coerce)
///     .with_parallel(false);
/// let meshes = glb_mesh::parse_with_options(&bytes, &options)?;
/// ```
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    component_policy: ComponentPolicy,
    parallel: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            component_policy: ComponentPolicy::Strict,
            parallel: true,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component_policy(mut self, policy: ComponentPolicy) -> Self {
        self.component_policy = policy;
        self
    }

    /// Resolve meshes on the rayon pool. Ignored without the `parallel` feature.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn component_policy(&self) -> ComponentPolicy {
        self.component_policy
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }
}
