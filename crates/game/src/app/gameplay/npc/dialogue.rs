use engine::Expansion;

pub(crate) const DEFAULT_PROMPT: &str = "Press E to talk";
pub(crate) const BACKDROP_ALPHA_MAX: u8 = 175;
const ALPHA_SPEED: f32 = 25.0;

/// Lines in a script are separated by a blank line.
pub(crate) fn split_script(script: &str) -> Vec<String> {
    script
        .split("\n\n")
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Conversation state shared by every talking NPC. Line 0 is always the
/// prompt; each interact edge while in range moves one line forward and
/// stops on the last one.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Dialogue {
    lines: Vec<String>,
    line_index: usize,
    talking: bool,
    interacting: bool,
    alpha: Expansion,
}

impl Dialogue {
    pub(crate) fn new(script: &str) -> Self {
        let mut dialogue = Self {
            lines: Vec::new(),
            line_index: 0,
            talking: false,
            interacting: false,
            alpha: Expansion::new(0.0, 0.0, 255.0, ALPHA_SPEED),
        };
        dialogue.swap_script(script);
        dialogue
    }

    /// Replaces the script and rewinds to the prompt. Talking state is kept.
    pub(crate) fn swap_script(&mut self, script: &str) {
        self.lines = std::iter::once(DEFAULT_PROMPT.to_string())
            .chain(split_script(script))
            .collect();
        self.line_index = 0;
    }

    pub(crate) fn update(&mut self, overlapping: bool, interact_edges: u8, dt: f32) {
        self.interacting = overlapping;
        if overlapping {
            for _ in 0..interact_edges {
                self.advance();
            }
        } else {
            self.talking = false;
        }
        self.alpha.update(overlapping, dt);
    }

    pub(crate) fn advance(&mut self) {
        self.talking = true;
        if self.line_index + 1 < self.lines.len() {
            self.line_index += 1;
        }
    }

    #[cfg(test)]
    pub(crate) fn lines(&self) -> &[String] {
        &self.lines
    }

    #[cfg(test)]
    pub(crate) fn line_index(&self) -> usize {
        self.line_index
    }

    pub(crate) fn current_line(&self) -> &str {
        self.lines
            .get(self.line_index)
            .map(String::as_str)
            .unwrap_or(DEFAULT_PROMPT)
    }

    pub(crate) fn talking(&self) -> bool {
        self.talking
    }

    pub(crate) fn interacting(&self) -> bool {
        self.interacting
    }

    pub(crate) fn text_alpha(&self) -> u8 {
        self.alpha.alpha()
    }

    pub(crate) fn backdrop_alpha(&self) -> u8 {
        self.text_alpha().min(BACKDROP_ALPHA_MAX)
    }
}
