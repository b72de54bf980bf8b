//! Typed reads through glTF accessors.
//!
//! An [`AccessorView`] resolves an accessor to its bytes, stride and
//! (component, element) type pair. The processors on top of it convert to
//! the engine's float arrays for one attribute kind each and return `None` for
//! any type combination the attribute does not allow, or when the accessor
//! points outside its buffer.
//!
//! Every processor optionally takes an index list. With one, the output has
//! one element per index (gathered through it) instead of one per source
//! element, which turns shared vertices into per-corner vertices.

use crate::{data_structures::vertex::Indices, resources::Model};

/// Largest element count an accessor without a buffer view may declare. Such
/// accessors read as zeroes, so nothing else bounds their size.
pub const MAX_ZERO_FILLED_COUNT: usize = 1 << 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

impl ComponentType {
    pub fn from_gl(code: u32) -> Option<Self> {
        match code {
            5120 => Some(ComponentType::I8),
            5121 => Some(ComponentType::U8),
            5122 => Some(ComponentType::I16),
            5123 => Some(ComponentType::U16),
            5125 => Some(ComponentType::U32),
            5126 => Some(ComponentType::F32),
            _ => None,
        }
    }

    pub fn size(self) -> usize {
        match self {
            ComponentType::I8 | ComponentType::U8 => 1,
            ComponentType::I16 | ComponentType::U16 => 2,
            ComponentType::U32 | ComponentType::F32 => 4,
        }
    }

    fn read(self, bytes: &[u8]) -> Option<f64> {
        Some(match self {
            ComponentType::I8 => i8::from_le_bytes([*bytes.first()?]) as f64,
            ComponentType::U8 => *bytes.first()? as f64,
            ComponentType::I16 => i16::from_le_bytes(bytes.get(..2)?.try_into().ok()?) as f64,
            ComponentType::U16 => u16::from_le_bytes(bytes.get(..2)?.try_into().ok()?) as f64,
            ComponentType::U32 => u32::from_le_bytes(bytes.get(..4)?.try_into().ok()?) as f64,
            ComponentType::F32 => f32::from_le_bytes(bytes.get(..4)?.try_into().ok()?) as f64,
        })
    }

    /// Maps an integer component to [0, 1] (unsigned) or [-1, 1] (signed).
    fn normalize(self, value: f64) -> f32 {
        let normalized = match self {
            ComponentType::I8 => (value / 127.0).max(-1.0),
            ComponentType::U8 => value / 255.0,
            ComponentType::I16 => (value / 32767.0).max(-1.0),
            ComponentType::U16 => value / 65535.0,
            ComponentType::U32 => value / u32::MAX as f64,
            ComponentType::F32 => value,
        };
        normalized as f32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ElementType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SCALAR" => Some(ElementType::Scalar),
            "VEC2" => Some(ElementType::Vec2),
            "VEC3" => Some(ElementType::Vec3),
            "VEC4" => Some(ElementType::Vec4),
            "MAT2" => Some(ElementType::Mat2),
            "MAT3" => Some(ElementType::Mat3),
            "MAT4" => Some(ElementType::Mat4),
            _ => None,
        }
    }

    pub fn components(self) -> usize {
        match self {
            ElementType::Scalar => 1,
            ElementType::Vec2 => 2,
            ElementType::Vec3 => 3,
            ElementType::Vec4 | ElementType::Mat2 => 4,
            ElementType::Mat3 => 9,
            ElementType::Mat4 => 16,
        }
    }
}

/// An accessor resolved against the model's buffers.
#[derive(Clone, Copy, Debug)]
pub struct AccessorView<'a> {
    /// `None` for accessors without a buffer view, which read as zeroes.
    data: Option<&'a [u8]>,
    stride: usize,
    pub count: usize,
    pub component: ComponentType,
    pub element: ElementType,
    pub normalized: bool,
}

impl<'a> AccessorView<'a> {
    pub fn new(model: &'a Model, index: usize) -> Option<Self> {
        let accessor = model.document.accessors.get(index)?;
        let component = ComponentType::from_gl(accessor.component_type)?;
        let element = ElementType::from_name(&accessor.type_)?;
        let element_size = component.size() * element.components();

        let (data, stride) = match accessor.buffer_view {
            Some(view_index) => {
                let view = model.document.buffer_views.get(view_index)?;
                let bytes = model.buffer_view_bytes(view_index)?;
                let stride = view
                    .byte_stride
                    .filter(|&stride| stride > 0)
                    .unwrap_or(element_size);
                let data = bytes.get(accessor.byte_offset..)?;
                if accessor.count > 0 {
                    let last = stride
                        .checked_mul(accessor.count - 1)?
                        .checked_add(element_size)?;
                    if last > data.len() {
                        return None;
                    }
                }
                (Some(data), stride)
            }
            None if accessor.count > MAX_ZERO_FILLED_COUNT => {
                log::warn!(
                    "accessor {} has no buffer view but declares {} elements",
                    index,
                    accessor.count
                );
                return None;
            }
            None => (None, element_size),
        };

        Some(Self {
            data,
            stride,
            count: accessor.count,
            component,
            element,
            normalized: accessor.normalized,
        })
    }

    fn read<const N: usize>(&self, i: usize, normalize: bool) -> Option<[f32; N]> {
        let mut out = [0.0; N];
        let Some(data) = self.data else {
            return Some(out);
        };
        let start = i * self.stride;
        for (c, value) in out.iter_mut().enumerate() {
            let offset = start + c * self.component.size();
            let raw = self.component.read(data.get(offset..)?)?;
            *value = if normalize {
                self.component.normalize(raw)
            } else {
                raw as f32
            };
        }
        Some(out)
    }

    /// An unsigned integer scalar, read without going through floats.
    fn read_index(&self, i: usize) -> Option<u32> {
        let Some(data) = self.data else {
            return Some(0);
        };
        let bytes = data.get(i * self.stride..)?;
        match self.component {
            ComponentType::U8 => bytes.first().map(|&v| v as u32),
            ComponentType::U16 => Some(u16::from_le_bytes(bytes.get(..2)?.try_into().ok()?) as u32),
            ComponentType::U32 => Some(u32::from_le_bytes(bytes.get(..4)?.try_into().ok()?)),
            _ => None,
        }
    }

    fn read_all<const N: usize>(&self, normalize: bool) -> Option<Vec<[f32; N]>> {
        (0..self.count).map(|i| self.read(i, normalize)).collect()
    }
}

/// Gathers `values` through `indices`; `None` if an index is out of range.
pub fn expand<T: Copy>(values: &[T], indices: &Indices) -> Option<Vec<T>> {
    indices
        .iter()
        .map(|index| values.get(index as usize).copied())
        .collect()
}

fn gathered<T: Copy>(values: Vec<T>, expansion: Option<&Indices>) -> Option<Vec<T>> {
    match expansion {
        Some(indices) => expand(&values, indices),
        None => Some(values),
    }
}

/// Float vectors, or integer vectors flagged as normalized.
fn float_vectors<const N: usize>(view: &AccessorView) -> Option<Vec<[f32; N]>> {
    match view.component {
        ComponentType::F32 => view.read_all(false),
        _ if view.normalized => view.read_all(true),
        _ => None,
    }
}

/// Float or unsigned byte/short vectors; integers are always normalized.
fn unorm_vectors<const N: usize>(view: &AccessorView) -> Option<Vec<[f32; N]>> {
    match view.component {
        ComponentType::F32 => view.read_all(false),
        ComponentType::U8 | ComponentType::U16 => view.read_all(true),
        _ => None,
    }
}

pub fn positions(model: &Model, accessor: usize, expansion: Option<&Indices>) -> Option<Vec<[f32; 3]>> {
    let view = AccessorView::new(model, accessor)?;
    if view.element != ElementType::Vec3 {
        return None;
    }
    gathered(float_vectors(&view)?, expansion)
}

pub fn normals(model: &Model, accessor: usize, expansion: Option<&Indices>) -> Option<Vec<[f32; 3]>> {
    let view = AccessorView::new(model, accessor)?;
    if view.element != ElementType::Vec3 {
        return None;
    }
    gathered(float_vectors(&view)?, expansion)
}

/// RGB or RGBA colors, always returned as RGBA with alpha 1 for RGB.
pub fn colors(model: &Model, accessor: usize, expansion: Option<&Indices>) -> Option<Vec<[f32; 4]>> {
    let view = AccessorView::new(model, accessor)?;
    let colors = match view.element {
        ElementType::Vec3 => unorm_vectors::<3>(&view)?
            .into_iter()
            .map(|[r, g, b]| [r, g, b, 1.0])
            .collect(),
        ElementType::Vec4 => unorm_vectors::<4>(&view)?,
        _ => return None,
    };
    gathered(colors, expansion)
}

pub fn tex_coords(model: &Model, accessor: usize, expansion: Option<&Indices>) -> Option<Vec<[f32; 2]>> {
    let view = AccessorView::new(model, accessor)?;
    if view.element != ElementType::Vec2 {
        return None;
    }
    gathered(unorm_vectors(&view)?, expansion)
}

/// Draw indices, kept in their source width.
pub fn draw_indices(model: &Model, accessor: usize) -> Option<Indices> {
    let view = AccessorView::new(model, accessor)?;
    if view.element != ElementType::Scalar {
        return None;
    }
    let values = (0..view.count).map(|i| view.read_index(i));
    match view.component {
        ComponentType::U8 => values.map(|v| v.map(|v| v as u8)).collect::<Option<_>>().map(Indices::U8),
        ComponentType::U16 => values
            .map(|v| v.map(|v| v as u16))
            .collect::<Option<_>>()
            .map(Indices::U16),
        ComponentType::U32 => values.collect::<Option<_>>().map(Indices::U32),
        _ => None,
    }
}
