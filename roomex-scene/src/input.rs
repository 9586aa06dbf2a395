use roomex_core::MotionIntent;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Keyboard edge as seen by the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput<'a> {
    /// Logical key text, e.g. `"w"`.
    Pressed(&'a str),
    Released,
}

/// The movement intent of one scene. Single-valued: the latest key wins.
#[derive(Debug, Clone, Default)]
pub struct MotionInput {
    intent: Rc<Cell<MotionIntent>>,
}

impl MotionInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self, event: KeyInput<'_>) {
        let intent = match event {
            KeyInput::Pressed(key) => MotionIntent::from_key(key),
            KeyInput::Released => MotionIntent::None,
        };
        self.intent.set(intent);
    }

    pub fn intent(&self) -> MotionIntent {
        self.intent.get()
    }

    pub fn clear(&self) {
        self.intent.set(MotionIntent::None);
    }
}

type Listeners = RefCell<Vec<(u64, MotionInput)>>;

/// Routes window key events to the scenes currently mounted.
#[derive(Debug, Clone, Default)]
pub struct KeyboardHub {
    listeners: Rc<Listeners>,
    next_id: Rc<Cell<u64>>,
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `input`; it receives events until the returned listener is
    /// dropped.
    pub fn register(&self, input: MotionInput) -> KeyboardListener {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, input));
        tracing::debug!(id, "keyboard listener registered");
        KeyboardListener {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    pub fn dispatch(&self, event: KeyInput<'_>) {
        for (_, input) in self.listeners.borrow().iter() {
            input.handle(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

/// Registration guard; deregisters on drop.
#[derive(Debug)]
pub struct KeyboardListener {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Drop for KeyboardListener {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().retain(|(id, input)| {
                if *id == self.id {
                    input.clear();
                }
                *id != self.id
            });
            tracing::debug!(id = self.id, "keyboard listener removed");
        }
    }
}
