//! GPU upload of built draw commands.
//!
//! [`GpuDraw`] owns the vertex and index buffers of one [`DrawCommand`] and
//! records it into a render pass. Vertex buffers are bound in the order the
//! arrays were assigned, which is the order of the pipeline's vertex inputs.

use wgpu::util::DeviceExt;

use crate::data_structures::scene_graph::{Draw, DrawCommand};

pub struct GpuDraw {
    /// Shader location and buffer of every vertex array.
    pub vertex_buffers: Vec<(u32, wgpu::Buffer)>,
    pub index_buffer: Option<(wgpu::Buffer, wgpu::IndexFormat, u32)>,
    pub vertex_count: u32,
    pub instance_count: u32,
}

impl GpuDraw {
    pub fn new(device: &wgpu::Device, command: &DrawCommand) -> Self {
        let vertex_buffers = command
            .arrays
            .iter()
            .map(|array| {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} {}", command.name, array.name)),
                    contents: array.data.as_bytes(),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                (array.location, buffer)
            })
            .collect();

        let (index_buffer, vertex_count) = match &command.draw {
            Draw::Indexed { indices } => {
                // 8-bit indices have no GPU index format
                let indices = indices.widened();
                let format = indices
                    .index_format()
                    .unwrap_or(wgpu::IndexFormat::Uint16);
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} indices", command.name)),
                    contents: indices.as_bytes(),
                    usage: wgpu::BufferUsages::INDEX,
                });
                (Some((buffer, format, indices.len() as u32)), 0)
            }
            Draw::Vertices { vertex_count } => (None, *vertex_count),
        };

        Self {
            vertex_buffers,
            index_buffer,
            vertex_count,
            instance_count: command.instance_count,
        }
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        for (slot, (_, buffer)) in self.vertex_buffers.iter().enumerate() {
            render_pass.set_vertex_buffer(slot as u32, buffer.slice(..));
        }
        match &self.index_buffer {
            Some((buffer, format, count)) => {
                render_pass.set_index_buffer(buffer.slice(..), *format);
                render_pass.draw_indexed(0..*count, 0, 0..self.instance_count);
            }
            None => render_pass.draw(0..self.vertex_count, 0..self.instance_count),
        }
    }
}
