//! Typed vertex arrays and draw indices.

use std::borrow::Cow;

/// Converted attribute data in an engine-native layout.
///
/// All attributes end up as 32-bit floats, which is what the PBR shader sets
/// consume.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
    Vec2(Vec<[f32; 2]>),
    Vec3(Vec<[f32; 3]>),
    Vec4(Vec<[f32; 4]>),
}

impl ArrayData {
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Vec2(values) => values.len(),
            ArrayData::Vec3(values) => values.len(),
            ArrayData::Vec4(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn format(&self) -> wgpu::VertexFormat {
        match self {
            ArrayData::Vec2(_) => wgpu::VertexFormat::Float32x2,
            ArrayData::Vec3(_) => wgpu::VertexFormat::Float32x3,
            ArrayData::Vec4(_) => wgpu::VertexFormat::Float32x4,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ArrayData::Vec2(values) => bytemuck::cast_slice(values),
            ArrayData::Vec3(values) => bytemuck::cast_slice(values),
            ArrayData::Vec4(values) => bytemuck::cast_slice(values),
        }
    }

    pub fn as_vec3(&self) -> Option<&[[f32; 3]]> {
        match self {
            ArrayData::Vec3(values) => Some(values),
            _ => None,
        }
    }
}

/// An array assigned to one shader attribute of a draw command.
///
/// Arrays stepped per instance hold a single value shared by every vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexArray {
    pub name: String,
    pub location: u32,
    pub rate: wgpu::VertexStepMode,
    pub data: ArrayData,
}

/// Draw indices, copied through from the source accessor unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Indices {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Indices {
    pub fn len(&self) -> usize {
        match self {
            Indices::U8(values) => values.len(),
            Indices::U16(values) => values.len(),
            Indices::U32(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            Indices::U8(values) => values.get(i).map(|&v| v as u32),
            Indices::U16(values) => values.get(i).map(|&v| v as u32),
            Indices::U32(values) => values.get(i).copied(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }

    /// The GPU index format, `None` for 8-bit indices which WebGPU cannot
    /// draw directly (see [`Indices::widened`]).
    pub fn index_format(&self) -> Option<wgpu::IndexFormat> {
        match self {
            Indices::U8(_) => None,
            Indices::U16(_) => Some(wgpu::IndexFormat::Uint16),
            Indices::U32(_) => Some(wgpu::IndexFormat::Uint32),
        }
    }

    /// 8-bit indices widened to 16 bit, everything else borrowed as is.
    pub fn widened(&self) -> Cow<'_, Indices> {
        match self {
            Indices::U8(values) => {
                Cow::Owned(Indices::U16(values.iter().map(|&v| v as u16).collect()))
            }
            _ => Cow::Borrowed(self),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Indices::U8(values) => values,
            Indices::U16(values) => bytemuck::cast_slice(values),
            Indices::U32(values) => bytemuck::cast_slice(values),
        }
    }
}
