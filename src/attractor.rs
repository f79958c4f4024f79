//! Point sources of attraction driven by pointer, touch or tracking input.

/// A point that pulls particles toward itself while `power > 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attractor {
    pub position: cgmath::Vector2<f32>,
    power: f32,
}

impl Attractor {
    pub fn inactive() -> Self {
        Self {
            position: cgmath::vec2(0.0, 0.0),
            power: 0.0,
        }
    }

    pub fn new(position: cgmath::Vector2<f32>, power: f32) -> Self {
        let mut attractor = Self { position, power: 0.0 };
        attractor.set_power(power);
        attractor
    }

    pub fn power(&self) -> f32 {
        self.power
    }

    /// Negative and non-finite powers are stored as zero.
    pub fn set_power(&mut self, power: f32) {
        self.power = if power.is_finite() { power.max(0.0) } else { 0.0 };
    }

    pub fn is_active(&self) -> bool {
        self.power > 0.0
    }
}

impl Default for Attractor {
    fn default() -> Self {
        Self::inactive()
    }
}

/// The interaction source owning an attractor slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttractorSource {
    Mouse,
    Touch,
    /// One point of an external tracking driver (e.g. a tracked hand).
    Tracker(usize),
}

/// One attractor per interaction source, allocated once when the sketch is built.
///
/// Slot layout is `[mouse, touch, tracker 0, tracker 1, ...]`.
#[derive(Clone, Debug)]
pub struct AttractorSet {
    slots: Vec<Attractor>,
}

impl AttractorSet {
    const TRACKER_OFFSET: usize = 2;

    pub fn new(tracker_slots: usize) -> Self {
        Self {
            slots: vec![Attractor::inactive(); Self::TRACKER_OFFSET + tracker_slots],
        }
    }

    pub fn tracker_slots(&self) -> usize {
        self.slots.len() - Self::TRACKER_OFFSET
    }

    fn slot_index(&self, source: AttractorSource) -> Option<usize> {
        match source {
            AttractorSource::Mouse => Some(0),
            AttractorSource::Touch => Some(1),
            AttractorSource::Tracker(i) if i < self.tracker_slots() => Some(Self::TRACKER_OFFSET + i),
            AttractorSource::Tracker(_) => None,
        }
    }

    pub fn get(&self, source: AttractorSource) -> Option<&Attractor> {
        self.slot_index(source).map(|i| &self.slots[i])
    }

    pub fn get_mut(&mut self, source: AttractorSource) -> Option<&mut Attractor> {
        self.slot_index(source).map(move |i| &mut self.slots[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attractor> {
        self.slots.iter()
    }

    pub fn active(&self) -> impl Iterator<Item = &Attractor> {
        self.slots.iter().filter(|a| a.is_active())
    }

    pub fn any_active(&self) -> bool {
        self.slots.iter().any(Attractor::is_active)
    }

    /// Zero the power of every slot.
    pub fn release_all(&mut self) {
        for slot in &mut self.slots {
            slot.set_power(0.0);
        }
    }
}

impl Default for AttractorSet {
    fn default() -> Self {
        Self::new(0)
    }
}
