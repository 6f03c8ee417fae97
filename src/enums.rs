use std::fmt;
use std::str::FromStr;

/// Encoding of a single sample (one component of one pixel) on disk or in
/// memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
}

impl ComponentType {
    pub const ALL: [ComponentType; 10] = [
        ComponentType::UInt8,
        ComponentType::Int8,
        ComponentType::UInt16,
        ComponentType::Int16,
        ComponentType::UInt32,
        ComponentType::Int32,
        ComponentType::UInt64,
        ComponentType::Int64,
        ComponentType::Float32,
        ComponentType::Float64,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            ComponentType::UInt8 => "8-bit unsigned integer",
            ComponentType::Int8 => "8-bit signed integer",
            ComponentType::UInt16 => "16-bit unsigned integer",
            ComponentType::Int16 => "16-bit signed integer",
            ComponentType::UInt32 => "32-bit unsigned integer",
            ComponentType::Int32 => "32-bit signed integer",
            ComponentType::UInt64 => "64-bit unsigned integer",
            ComponentType::Int64 => "64-bit signed integer",
            ComponentType::Float32 => "32-bit float",
            ComponentType::Float64 => "64-bit float",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pixel type of an image: a component type, either scalar or as a vector
/// of components.
///
/// `Unknown` is the "infer from data" selector: a reader asked for an
/// `Unknown` output type uses whatever the first file of the series declares.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PixelId {
    #[default]
    Unknown,
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
    VectorUInt8,
    VectorInt8,
    VectorUInt16,
    VectorInt16,
    VectorUInt32,
    VectorInt32,
    VectorUInt64,
    VectorInt64,
    VectorFloat32,
    VectorFloat64,
}

impl PixelId {
    pub const fn scalar(component: ComponentType) -> PixelId {
        match component {
            ComponentType::UInt8 => PixelId::UInt8,
            ComponentType::Int8 => PixelId::Int8,
            ComponentType::UInt16 => PixelId::UInt16,
            ComponentType::Int16 => PixelId::Int16,
            ComponentType::UInt32 => PixelId::UInt32,
            ComponentType::Int32 => PixelId::Int32,
            ComponentType::UInt64 => PixelId::UInt64,
            ComponentType::Int64 => PixelId::Int64,
            ComponentType::Float32 => PixelId::Float32,
            ComponentType::Float64 => PixelId::Float64,
        }
    }

    pub const fn vector(component: ComponentType) -> PixelId {
        match component {
            ComponentType::UInt8 => PixelId::VectorUInt8,
            ComponentType::Int8 => PixelId::VectorInt8,
            ComponentType::UInt16 => PixelId::VectorUInt16,
            ComponentType::Int16 => PixelId::VectorInt16,
            ComponentType::UInt32 => PixelId::VectorUInt32,
            ComponentType::Int32 => PixelId::VectorInt32,
            ComponentType::UInt64 => PixelId::VectorUInt64,
            ComponentType::Int64 => PixelId::VectorInt64,
            ComponentType::Float32 => PixelId::VectorFloat32,
            ComponentType::Float64 => PixelId::VectorFloat64,
        }
    }

    /// Pixel id for a file declaring `number_of_components` samples of
    /// `component` per pixel. Single-component files are scalar.
    pub const fn from_components(component: ComponentType, number_of_components: usize) -> PixelId {
        if number_of_components == 1 {
            PixelId::scalar(component)
        } else {
            PixelId::vector(component)
        }
    }

    pub const fn component_type(&self) -> Option<ComponentType> {
        let component = match self {
            PixelId::Unknown => return None,
            PixelId::UInt8 | PixelId::VectorUInt8 => ComponentType::UInt8,
            PixelId::Int8 | PixelId::VectorInt8 => ComponentType::Int8,
            PixelId::UInt16 | PixelId::VectorUInt16 => ComponentType::UInt16,
            PixelId::Int16 | PixelId::VectorInt16 => ComponentType::Int16,
            PixelId::UInt32 | PixelId::VectorUInt32 => ComponentType::UInt32,
            PixelId::Int32 | PixelId::VectorInt32 => ComponentType::Int32,
            PixelId::UInt64 | PixelId::VectorUInt64 => ComponentType::UInt64,
            PixelId::Int64 | PixelId::VectorInt64 => ComponentType::Int64,
            PixelId::Float32 | PixelId::VectorFloat32 => ComponentType::Float32,
            PixelId::Float64 | PixelId::VectorFloat64 => ComponentType::Float64,
        };
        Some(component)
    }

    pub const fn is_vector(&self) -> bool {
        matches!(
            self,
            PixelId::VectorUInt8
                | PixelId::VectorInt8
                | PixelId::VectorUInt16
                | PixelId::VectorInt16
                | PixelId::VectorUInt32
                | PixelId::VectorInt32
                | PixelId::VectorUInt64
                | PixelId::VectorInt64
                | PixelId::VectorFloat32
                | PixelId::VectorFloat64
        )
    }

    /// Every known pixel id except `Unknown`.
    pub fn all() -> impl Iterator<Item = PixelId> {
        ComponentType::ALL
            .into_iter()
            .map(PixelId::scalar)
            .chain(ComponentType::ALL.into_iter().map(PixelId::vector))
    }

    /// Human readable rendering, e.g. "vector of 16-bit unsigned integer".
    pub fn name(&self) -> String {
        match self.component_type() {
            None => "Unknown pixel id".to_string(),
            Some(component) if self.is_vector() => format!("vector of {}", component.name()),
            Some(component) => component.name().to_string(),
        }
    }
}

impl fmt::Display for PixelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown pixel type \"{0}\"")]
pub struct ParsePixelIdError(pub String);

impl FromStr for PixelId {
    type Err = ParsePixelIdError;

    /// Accepts the variant identifiers case-insensitively ("UInt16",
    /// "vectorfloat32"), plus "unknown"/"infer" for the inference selector.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "unknown" || wanted == "infer" {
            return Ok(PixelId::Unknown);
        }
        PixelId::all()
            .find(|pixel_id| format!("{pixel_id:?}").to_ascii_lowercase() == wanted)
            .ok_or_else(|| ParsePixelIdError(s.to_string()))
    }
}
