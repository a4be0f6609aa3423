mod pixel_buffer;

pub use pixel_buffer::PixelBuffer;

use crate::error::{PondError, PondResult};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
    backend: Backend,
}

/// Which SDL renderer the canvas ended up on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Accelerated,
    Software,
}

pub struct RenderTarget<'a> {
    texture: Texture<'a>,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
}

impl Display {
    /// Open a centred window. Tries the accelerated renderer first and
    /// falls back to the software one.
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> PondResult<(Self, TextureCreator<WindowContext>)> {
        let sdl_context = sdl2::init().map_err(PondError::Sdl)?;
        let video_subsystem = sdl_context.video().map_err(PondError::Sdl)?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| PondError::Window(e.to_string()))?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let (canvas, backend) = match canvas_builder.build() {
            Ok(canvas) => (canvas, Backend::Accelerated),
            Err(err) => {
                tracing::warn!(%err, "accelerated renderer unavailable, falling back to software");
                // The failed builder consumed the window, so open a fresh one
                let window = video_subsystem
                    .window(title, width, height)
                    .position_centered()
                    .build()
                    .map_err(|e| PondError::Window(e.to_string()))?;
                let canvas = window
                    .into_canvas()
                    .software()
                    .build()
                    .map_err(|e| PondError::Renderer(e.to_string()))?;
                (canvas, Backend::Software)
            },
        };

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump().map_err(PondError::Sdl)?;

        Ok((
            Self {
                canvas,
                event_pump,
                width,
                height,
                backend,
            },
            texture_creator,
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Upload the finished frame and flip. A failed upload drops the frame.
    pub fn present(&mut self, target: &mut RenderTarget, buffer: &PixelBuffer) {
        if let Err(err) =
            target
                .texture
                .update(None, buffer.as_bytes(), (buffer.width() * 4) as usize)
        {
            tracing::warn!(%err, "frame upload failed");
            return;
        }

        if let Err(err) = self.canvas.copy(&target.texture, None, None) {
            tracing::warn!(%err, "frame copy failed");
            return;
        }
        self.canvas.present();
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                _ => {},
            }
        }

        events
    }
}

impl<'a> RenderTarget<'a> {
    /// Streaming texture matching the pixel buffer size
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> PondResult<Self> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA8888, width, height)
            .map_err(|e| PondError::Texture(e.to_string()))?;
        Ok(Self { texture })
    }
}
