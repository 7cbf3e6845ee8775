//! Vertex attribute extraction for the first primitive of a mesh.

use serde::Serialize;

use crate::accessor::{AccessorData, AccessorResolver, AccessorView, ComponentType, ElementType};
use crate::error::{DecodeError, Result};
use crate::options::ComponentPolicy;

const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

/// The attribute slots a mesh record carries, each with a fixed storage
/// convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Semantic {
    Position,
    Normal,
    Tangent,
    TexCoord0,
    Weights0,
    Joints0,
    Indices,
}

impl Semantic {
    pub const ALL: [Semantic; 7] = [
        Semantic::Position,
        Semantic::Normal,
        Semantic::Tangent,
        Semantic::TexCoord0,
        Semantic::Weights0,
        Semantic::Joints0,
        Semantic::Indices,
    ];

    /// Key in `primitive.attributes`, or `indices` for the index slot.
    pub fn name(self) -> &'static str {
        match self {
            Semantic::Position => "POSITION",
            Semantic::Normal => "NORMAL",
            Semantic::Tangent => "TANGENT",
            Semantic::TexCoord0 => "TEXCOORD_0",
            Semantic::Weights0 => "WEIGHTS_0",
            Semantic::Joints0 => "JOINTS_0",
            Semantic::Indices => "indices",
        }
    }

    pub fn component_type(self) -> ComponentType {
        match self {
            Semantic::Joints0 => ComponentType::UnsignedByte,
            Semantic::Indices => ComponentType::UnsignedShort,
            _ => ComponentType::Float,
        }
    }

    pub fn element_type(self) -> ElementType {
        match self {
            Semantic::Position | Semantic::Normal => ElementType::Vec3,
            Semantic::Tangent | Semantic::Weights0 | Semantic::Joints0 => ElementType::Vec4,
            Semantic::TexCoord0 => ElementType::Vec2,
            Semantic::Indices => ElementType::Scalar,
        }
    }
}

/// Decoded attribute sequences of one primitive. Absent slots are empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attributes {
    pub position: AccessorData,
    pub normal: AccessorData,
    pub tangent: AccessorData,
    pub texcoord_0: AccessorData,
    pub weights_0: AccessorData,
    pub joints_0: AccessorData,
    pub indices: AccessorData,
}

impl Default for Attributes {
    fn default() -> Self {
        let empty = |s: Semantic| AccessorData::empty(s.component_type());
        Self {
            position: empty(Semantic::Position),
            normal: empty(Semantic::Normal),
            tangent: empty(Semantic::Tangent),
            texcoord_0: empty(Semantic::TexCoord0),
            weights_0: empty(Semantic::Weights0),
            joints_0: empty(Semantic::Joints0),
            indices: empty(Semantic::Indices),
        }
    }
}

impl Attributes {
    pub fn get(&self, semantic: Semantic) -> &AccessorData {
        match semantic {
            Semantic::Position => &self.position,
            Semantic::Normal => &self.normal,
            Semantic::Tangent => &self.tangent,
            Semantic::TexCoord0 => &self.texcoord_0,
            Semantic::Weights0 => &self.weights_0,
            Semantic::Joints0 => &self.joints_0,
            Semantic::Indices => &self.indices,
        }
    }

    fn get_mut(&mut self, semantic: Semantic) -> &mut AccessorData {
        match semantic {
            Semantic::Position => &mut self.position,
            Semantic::Normal => &mut self.normal,
            Semantic::Tangent => &mut self.tangent,
            Semantic::TexCoord0 => &mut self.texcoord_0,
            Semantic::Weights0 => &mut self.weights_0,
            Semantic::Joints0 => &mut self.joints_0,
            Semantic::Indices => &mut self.indices,
        }
    }
}

/// Resolves the semantic slots of `mesh.primitives[0]`.
///
/// Later primitives are not read.
#[derive(Debug, Clone, Copy)]
pub struct AttributeExtractor<'a> {
    resolver: AccessorResolver<'a>,
    policy: ComponentPolicy,
}

impl<'a> AttributeExtractor<'a> {
    pub fn new(resolver: AccessorResolver<'a>, policy: ComponentPolicy) -> Self {
        Self { resolver, policy }
    }

    pub fn extract(&self, mesh_index: usize) -> Result<Attributes> {
        let mesh = self.resolver.document().mesh(mesh_index)?;
        let mut attributes = Attributes::default();

        let Some(primitive) = mesh.primitives.first() else {
            return Ok(attributes);
        };
        if mesh.primitives.len() > 1 {
            tracing::debug!(
                mesh = mesh_index,
                ignored = mesh.primitives.len() - 1,
                "only the first primitive is decoded"
            );
        }
        if primitive.extensions.contains_key(DRACO_EXTENSION) {
            return Err(DecodeError::Unsupported(format!(
                "{} primitive in mesh {}",
                DRACO_EXTENSION, mesh_index
            )));
        }
        if !primitive.targets.is_empty() {
            tracing::debug!(
                mesh = mesh_index,
                targets = primitive.targets.len(),
                "morph targets are not decoded"
            );
        }

        for semantic in Semantic::ALL {
            let accessor = match semantic {
                Semantic::Indices => primitive.indices,
                other => primitive.attributes.get(other.name()).copied(),
            };
            if let Some(accessor) = accessor {
                *attributes.get_mut(semantic) = self.resolve_slot(semantic, accessor)?;
            }
        }

        Ok(attributes)
    }

    /// Decode one accessor under the storage convention of `semantic`.
    pub fn resolve_slot(&self, semantic: Semantic, accessor_index: usize) -> Result<AccessorData> {
        let view = self.resolver.view(accessor_index)?;
        check_layout(
            semantic.name(),
            &view,
            semantic.component_type(),
            semantic.element_type(),
            self.policy,
        )?;
        Ok(view.decode())
    }
}

/// Compare a view's stored layout with the layout a slot expects.
pub(crate) fn check_layout(
    slot: &'static str,
    view: &AccessorView<'_>,
    component_type: ComponentType,
    element_type: ElementType,
    policy: ComponentPolicy,
) -> Result<()> {
    let component_ok = view.component_type() == component_type;
    let element_ok = view.element_type() == element_type;
    if component_ok && element_ok {
        return Ok(());
    }

    if policy == ComponentPolicy::Coerce {
        tracing::debug!(
            slot,
            accessor = view.index(),
            component_type = %view.component_type(),
            element_type = %view.element_type(),
            "decoding with the accessor's declared layout"
        );
        return Ok(());
    }

    if !component_ok {
        return Err(DecodeError::ComponentTypeMismatch {
            slot,
            expected: component_type,
            found: view.component_type(),
        });
    }
    Err(DecodeError::ElementTypeMismatch {
        slot,
        expected: element_type,
        found: view.element_type(),
    })
}
