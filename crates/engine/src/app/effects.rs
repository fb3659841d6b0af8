use super::Vec2;

/// A number that moves toward `upper` while a condition holds and toward
/// `lower` otherwise, at `speed` units per reference frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Expansion {
    pub number: f32,
    pub lower: f32,
    pub upper: f32,
    pub speed: f32,
}

impl Expansion {
    pub fn new(number: f32, lower: f32, upper: f32, speed: f32) -> Self {
        Self {
            number: number.clamp(lower, upper),
            lower,
            upper,
            speed,
        }
    }

    pub fn update(&mut self, grow: bool, dt: f32) {
        let step = self.speed * dt;
        self.number = if grow {
            (self.number + step).min(self.upper)
        } else {
            (self.number - step).max(self.lower)
        };
    }

    pub fn alpha(&self) -> u8 {
        self.number.clamp(0.0, 255.0) as u8
    }
}

/// Full-screen fade. Fading in clears the overlay from opaque; fading out
/// fills it back and raises `event` once fully opaque.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeTransition {
    pub fade_in: bool,
    pub fade_speed: f32,
    alpha: f32,
    event: bool,
}

impl FadeTransition {
    pub fn new(fade_in: bool, fade_speed: f32) -> Self {
        Self {
            fade_in,
            fade_speed,
            alpha: if fade_in { 255.0 } else { 0.0 },
            event: false,
        }
    }

    pub fn update(&mut self, dt: f32) {
        let step = self.fade_speed * dt;
        if self.fade_in {
            self.alpha = (self.alpha - step).max(0.0);
            self.event = false;
        } else {
            self.alpha = (self.alpha + step).min(255.0);
            self.event = self.alpha >= 255.0;
        }
    }

    /// True on every update that ends with the fade-out complete.
    pub fn event(&self) -> bool {
        self.event
    }

    pub fn alpha(&self) -> u8 {
        self.alpha.clamp(0.0, 255.0) as u8
    }
}

/// Notification text that fades out and then dies.
#[derive(Debug, Clone, PartialEq)]
pub struct FadingText {
    pub text: String,
    pub position: Vec2,
    pub speed: f32,
    alpha: f32,
}

impl FadingText {
    pub fn new(text: impl Into<String>, position: Vec2, speed: f32, start_alpha: f32) -> Self {
        Self {
            text: text.into(),
            position,
            speed,
            alpha: start_alpha.clamp(0.0, 255.0),
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.alpha = (self.alpha - self.speed * dt).max(0.0);
    }

    pub fn alive(&self) -> bool {
        self.alpha > 0.0
    }

    pub fn alpha(&self) -> u8 {
        self.alpha as u8
    }
}
