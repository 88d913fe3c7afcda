use ahash::AHashSet;

/// Logical keys the simulation understands. Physical key bindings live in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// Momentary flash.
    Identify,
    /// Held to hug/connect.
    Connect,
}

/// Key table owned by the host: held keys plus keys pressed since the last frame.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    held: AHashSet<Key>,
    pressed: AHashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        if self.held.insert(key) {
            self.pressed.insert(key);
        }
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Replace the held set wholesale, marking newly held keys as pressed.
    pub fn sync_held(&mut self, keys: impl IntoIterator<Item = Key>) {
        let next: AHashSet<Key> = keys.into_iter().collect();
        for key in next.difference(&self.held) {
            self.pressed.insert(*key);
        }
        self.held = next;
    }

    /// Record a press the host saw this frame, even if the key was already
    /// released again before the held set was sampled.
    pub fn mark_pressed(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    pub fn snapshot(&self) -> InputSnapshot<'_> {
        InputSnapshot { state: self }
    }

    /// Forget edge-triggered presses once a frame has consumed them.
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }
}

/// Read-only view of [`InputState`] handed to the simulation each frame.
#[derive(Debug, Clone, Copy)]
pub struct InputSnapshot<'a> {
    state: &'a InputState,
}

impl InputSnapshot<'_> {
    pub fn held(&self, key: Key) -> bool {
        self.state.held.contains(&key)
    }

    pub fn pressed(&self, key: Key) -> bool {
        self.state.pressed.contains(&key)
    }

    /// Net -1/0/1 along an axis from a pair of opposing keys.
    pub fn axis(&self, negative: Key, positive: Key) -> f32 {
        let mut value = 0.0;
        if self.held(negative) {
            value -= 1.0;
        }
        if self.held(positive) {
            value += 1.0;
        }
        value
    }
}
