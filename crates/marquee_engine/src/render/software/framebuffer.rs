//! Colour and depth targets
//!
//! The colour target is the canvas: RGBA8, row-major, row 0 at the top. After
//! presentation its contents are either kept (`preserve_drawing_buffer`) or
//! discarded, in which case reading it back is refused until the next frame
//! is drawn.

/// Lifecycle of the colour target's contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// Nothing drawn since creation or resize
    Empty,
    /// A frame has been drawn and not yet presented
    Drawn,
    /// The frame was presented and its contents retained
    Presented,
    /// The frame was presented and its contents thrown away
    Discarded,
}

/// RGBA8 colour target
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
    preserve: bool,
    state: BufferState,
}

impl Framebuffer {
    /// Black target of the given size
    pub fn new(width: u32, height: u32, preserve: bool) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 255]; (width as usize) * (height as usize)],
            preserve,
            state: BufferState::Empty,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether contents survive presentation
    pub fn preserves_contents(&self) -> bool {
        self.preserve
    }

    /// Current lifecycle state
    pub fn state(&self) -> BufferState {
        self.state
    }

    /// Reallocate for a new size; contents are lost
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        log::debug!("Framebuffer resized {}x{} -> {}x{}", self.width, self.height, width, height);
        *self = Self::new(width, height, self.preserve);
    }

    /// Fill with a colour and start a new frame
    pub fn clear(&mut self, rgba: [u8; 4]) {
        self.pixels.fill(rgba);
        self.state = BufferState::Drawn;
    }

    /// Mutable pixel access for drawing
    pub fn pixels_mut(&mut self) -> &mut [[u8; 4]] {
        self.state = BufferState::Drawn;
        &mut self.pixels
    }

    /// Start a new frame holding a copy of `source`, resizing to match
    pub fn copy_from(&mut self, source: &Framebuffer) {
        if (self.width, self.height) != (source.width, source.height) {
            *self = Self::new(source.width, source.height, self.preserve);
        }
        self.pixels.copy_from_slice(&source.pixels);
        self.state = BufferState::Drawn;
    }

    /// Pixel at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Raw bytes for presentation, regardless of retention
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Record that the frame reached the screen
    pub fn mark_presented(&mut self) {
        if self.state != BufferState::Drawn {
            return;
        }
        if self.preserve {
            self.state = BufferState::Presented;
        } else {
            self.pixels.fill([0, 0, 0, 0]);
            self.state = BufferState::Discarded;
        }
        log::trace!("Framebuffer presented, state {:?}", self.state);
    }

    /// Bytes of the last frame, unless they were discarded
    pub fn readback(&self) -> Option<&[u8]> {
        match self.state {
            BufferState::Discarded => None,
            _ => Some(self.as_bytes()),
        }
    }
}

/// Floating point depth target, cleared to the far plane
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl DepthBuffer {
    /// Depth target of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![1.0; (width as usize) * (height as usize)],
        }
    }

    /// Width in texels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocate for a new size
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            *self = Self::new(width, height);
        }
    }

    /// Reset every texel to the far plane
    pub fn clear(&mut self) {
        self.data.fill(1.0);
    }

    /// Depth at a linear index
    pub fn get(&self, index: usize) -> f32 {
        self.data[index]
    }

    /// Store depth at a linear index
    pub fn set(&mut self, index: usize, depth: f32) {
        self.data[index] = depth;
    }

    /// Depth at texel coordinates, clamped to the edges
    pub fn sample_clamped(&self, x: i64, y: i64) -> f32 {
        let x = x.clamp(0, i64::from(self.width) - 1) as usize;
        let y = y.clamp(0, i64::from(self.height) - 1) as usize;
        self.data[y * self.width as usize + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserved_contents_survive_presentation() {
        let mut fb = Framebuffer::new(4, 2, true);
        fb.clear([10, 20, 30, 255]);
        fb.mark_presented();
        assert_eq!(fb.state(), BufferState::Presented);
        assert_eq!(&fb.readback().unwrap()[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_discarded_contents_are_unreadable() {
        let mut fb = Framebuffer::new(4, 2, false);
        fb.clear([10, 20, 30, 255]);
        assert!(fb.readback().is_some());
        fb.mark_presented();
        assert_eq!(fb.state(), BufferState::Discarded);
        assert!(fb.readback().is_none());

        // Drawing the next frame makes it readable again
        fb.clear([0, 0, 0, 255]);
        assert!(fb.readback().is_some());
    }

    #[test]
    fn test_byte_view_is_rgba() {
        let mut fb = Framebuffer::new(2, 2, true);
        fb.pixels_mut()[3] = [1, 2, 3, 4];
        assert_eq!(fb.as_bytes().len(), 16);
        assert_eq!(&fb.as_bytes()[12..], &[1, 2, 3, 4]);
        assert_eq!(fb.pixel(1, 1), Some([1, 2, 3, 4]));
        assert_eq!(fb.pixel(2, 0), None);
    }

    #[test]
    fn test_depth_clamped_sampling() {
        let mut depth = DepthBuffer::new(2, 2);
        depth.set(3, 0.25);
        assert_eq!(depth.sample_clamped(5, 5), 0.25);
        assert_eq!(depth.sample_clamped(-1, -1), 1.0);
    }
}
