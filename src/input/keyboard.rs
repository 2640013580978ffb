use std::fmt;
use std::hash::Hash;

use indexmap::IndexSet;

/*
Keyboard Tracker
================

Keeps the set of keys currently held down. Auto-repeat presses reach the
callbacks like any other press but never re-add a key that is already held.

  press a        press a (repeat)   press s        release a
  ──────────→    ──────────────→    ──────────→    ──────────→
  held {a}       held {a}           held {a, s}    held {s}
  on_key_down    on_key_down        on_key_down    on_key_up

Callbacks run first, before the held set changes. Held keys keep press
order.

Example usage:
  let mut keys = KeyboardTracker::new().on_key_down(|ev| println!("{:?}", ev.key));
  keys.handle(KeyEvent::press('a'));
  assert!(keys.is_held(&'a'));
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent<K> {
    pub key: K,
    pub kind: KeyEventKind,
    /// Set on auto-repeat presses while the key stays down.
    pub repeat: bool,
}

impl<K> KeyEvent<K> {
    pub fn press(key: K) -> Self {
        Self {
            key,
            kind: KeyEventKind::Down,
            repeat: false,
        }
    }

    pub fn repeat(key: K) -> Self {
        Self {
            key,
            kind: KeyEventKind::Down,
            repeat: true,
        }
    }

    pub fn release(key: K) -> Self {
        Self {
            key,
            kind: KeyEventKind::Up,
            repeat: false,
        }
    }
}

type Callback<K> = Box<dyn FnMut(&KeyEvent<K>) + Send>;

pub struct KeyboardTracker<K> {
    held: IndexSet<K>,
    on_key_down: Option<Callback<K>>,
    on_key_up: Option<Callback<K>>,
}

impl<K: Eq + Hash + Clone> KeyboardTracker<K> {
    pub fn new() -> Self {
        Self {
            held: IndexSet::new(),
            on_key_down: None,
            on_key_up: None,
        }
    }

    /// Called for every press, repeats included.
    pub fn on_key_down(mut self, callback: impl FnMut(&KeyEvent<K>) + Send + 'static) -> Self {
        self.on_key_down = Some(Box::new(callback));
        self
    }

    pub fn on_key_up(mut self, callback: impl FnMut(&KeyEvent<K>) + Send + 'static) -> Self {
        self.on_key_up = Some(Box::new(callback));
        self
    }

    /// Feed one event. Returns `true` when the held set changed.
    pub fn handle(&mut self, event: KeyEvent<K>) -> bool {
        match event.kind {
            KeyEventKind::Down => {
                if let Some(cb) = &mut self.on_key_down {
                    cb(&event);
                }
                if event.repeat {
                    return false;
                }
                self.held.insert(event.key)
            }
            KeyEventKind::Up => {
                if let Some(cb) = &mut self.on_key_up {
                    cb(&event);
                }
                self.held.shift_remove(&event.key)
            }
        }
    }

    pub fn is_held(&self, key: &K) -> bool {
        self.held.contains(key)
    }

    /// Held keys, oldest press first.
    pub fn held(&self) -> impl Iterator<Item = &K> + '_ {
        self.held.iter()
    }

    /// Forget every held key without firing callbacks, e.g. on focus loss.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

impl<K: Eq + Hash + Clone> Default for KeyboardTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for KeyboardTracker<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardTracker")
            .field("held", &self.held)
            .finish_non_exhaustive()
    }
}
