//! Slider widget

/// Horizontal slider over a closed range
#[derive(Debug, Clone, PartialEq)]
pub struct UISlider {
    min: f32,
    max: f32,
    value: f32,
    /// Keyboard step
    pub step: f32,
}

impl UISlider {
    /// Slider over `[min, max]`, starting at `value` (clamped)
    pub fn new(min: f32, max: f32, value: f32) -> Self {
        let mut slider = Self { min, max, value: min, step: 1.0 };
        slider.set_value(value);
        slider
    }

    /// Current value
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Lower bound
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Set the value; returns true when it changed
    pub fn set_value(&mut self, value: f32) -> bool {
        let value = if value.is_nan() { self.min } else { value.clamp(self.min, self.max) };
        let changed = (value - self.value).abs() > f32::EPSILON;
        self.value = value;
        changed
    }

    /// Position of the value along the track, in `[0, 1]`
    pub fn fraction(&self) -> f32 {
        if self.max <= self.min {
            return 0.0;
        }
        (self.value - self.min) / (self.max - self.min)
    }

    /// Set from a track position, snapped to whole steps
    pub fn set_fraction(&mut self, fraction: f32) -> bool {
        let raw = self.min + fraction.clamp(0.0, 1.0) * (self.max - self.min);
        let snapped = if self.step > 0.0 { (raw / self.step).round() * self.step } else { raw };
        self.set_value(snapped)
    }

    /// Move by `steps` keyboard steps
    pub fn nudge(&mut self, steps: i32) -> bool {
        self.set_value(self.value + steps as f32 * self.step)
    }
}
