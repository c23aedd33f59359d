//! Window management using GLFW
//!
//! Creates a window without a client API (the frame reaches it through a
//! Vulkan swapchain) and turns GLFW events into [`InputEvent`]s.

use crate::config::WindowConfig;
use crate::input::{InputEvent, Key, MouseButton};
use thiserror::Error;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialised
    #[error("GLFW initialization failed")]
    InitializationFailed,

    /// The window could not be created
    #[error("Window creation failed")]
    CreationFailed,

    /// Any other GLFW failure
    #[error("GLFW error: {0}")]
    GlfwError(String),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// GLFW window wrapper
pub struct Window {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

impl Window {
    /// Open a window as described by `config`
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|_| WindowError::InitializationFailed)?;

        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(config.resizable));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        window.set_key_polling(true);
        window.set_char_polling(true);
        window.set_mouse_button_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_scroll_polling(true);
        window.set_framebuffer_size_polling(true);
        window.set_close_polling(true);

        log::info!("Created window '{}' ({}x{})", config.title, config.width, config.height);
        Ok(Self { glfw, window, events })
    }

    /// Whether the user asked to close the window
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Flag the window for closing
    pub fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    /// Pump GLFW and collect the translated events, cursor positions in framebuffer pixels
    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        self.glfw.poll_events();
        let scale = self.cursor_scale();
        glfw::flush_messages(&self.events)
            .filter_map(|(_, event)| translate_event(&event, scale))
            .collect()
    }

    /// Framebuffer size in pixels
    pub fn get_framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    /// Required Vulkan instance extensions
    pub fn get_required_instance_extensions(&self) -> WindowResult<Vec<String>> {
        self.glfw
            .get_required_instance_extensions()
            .ok_or_else(|| WindowError::GlfwError("Failed to get required extensions".to_string()))
    }

    /// Create a Vulkan surface for this window
    pub fn create_vulkan_surface(&mut self, instance: ash::vk::Instance) -> WindowResult<ash::vk::SurfaceKHR> {
        let mut surface = ash::vk::SurfaceKHR::null();
        let result = self.window.create_window_surface(instance, std::ptr::null(), &mut surface);

        if result == ash::vk::Result::SUCCESS {
            Ok(surface)
        } else {
            Err(WindowError::GlfwError(format!("Failed to create Vulkan surface: {:?}", result)))
        }
    }

    /// Ratio of framebuffer pixels to window coordinates, per axis
    fn cursor_scale(&self) -> (f64, f64) {
        let (fw, fh) = self.window.get_framebuffer_size();
        let (ww, wh) = self.window.get_size();
        let ratio = |f: i32, w: i32| if w > 0 { f64::from(f) / f64::from(w) } else { 1.0 };
        (ratio(fw, ww), ratio(fh, wh))
    }
}

/// Translate one GLFW event; events the application ignores yield `None`
pub fn translate_event(event: &glfw::WindowEvent, cursor_scale: (f64, f64)) -> Option<InputEvent> {
    match *event {
        glfw::WindowEvent::CursorPos(x, y) => Some(InputEvent::CursorMoved {
            x: (x * cursor_scale.0) as f32,
            y: (y * cursor_scale.1) as f32,
        }),
        glfw::WindowEvent::MouseButton(button, action, _) => {
            let button = translate_button(button)?;
            match action {
                glfw::Action::Press => Some(InputEvent::MouseDown(button)),
                glfw::Action::Release => Some(InputEvent::MouseUp(button)),
                glfw::Action::Repeat => None,
            }
        }
        glfw::WindowEvent::Scroll(_, dy) => Some(InputEvent::Scroll { dy: dy as f32 }),
        glfw::WindowEvent::Char(c) => Some(InputEvent::Char(c)),
        glfw::WindowEvent::Key(key, _, glfw::Action::Press | glfw::Action::Repeat, _) => {
            translate_key(key).map(InputEvent::KeyPressed)
        }
        glfw::WindowEvent::FramebufferSize(width, height) => Some(InputEvent::Resized {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
        }),
        glfw::WindowEvent::Close => Some(InputEvent::CloseRequested),
        _ => None,
    }
}

/// Keys the application listens to
pub fn translate_key(key: glfw::Key) -> Option<Key> {
    match key {
        glfw::Key::Tab => Some(Key::Tab),
        glfw::Key::Enter | glfw::Key::KpEnter => Some(Key::Enter),
        glfw::Key::Backspace => Some(Key::Backspace),
        glfw::Key::Space => Some(Key::Space),
        glfw::Key::Escape => Some(Key::Escape),
        glfw::Key::Left => Some(Key::Left),
        glfw::Key::Right => Some(Key::Right),
        glfw::Key::Up => Some(Key::Up),
        glfw::Key::Down => Some(Key::Down),
        _ => None,
    }
}

fn translate_button(button: glfw::MouseButton) -> Option<MouseButton> {
    match button {
        glfw::MouseButton::Button1 => Some(MouseButton::Left),
        glfw::MouseButton::Button2 => Some(MouseButton::Right),
        glfw::MouseButton::Button3 => Some(MouseButton::Middle),
        _ => None,
    }
}
