//! Round counter
//!
//! Owned by the table and handed in at construction; listeners are told about
//! every change so presentation can animate the round banner.

use std::fmt;

pub type RoundListener = Box<dyn FnMut(u32)>;

pub struct RoundTracker {
    current: u32,
    listeners: Vec<RoundListener>,
}

impl fmt::Debug for RoundTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundTracker")
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for RoundTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundTracker {
    /// Starts at round 1
    pub fn new() -> Self {
        Self {
            current: 1,
            listeners: Vec::new(),
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn subscribe(&mut self, listener: impl FnMut(u32) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Advance to the next round
    pub fn count_up(&mut self) -> u32 {
        self.current += 1;
        log::info!("Round {}", self.current);
        self.notify();
        self.current
    }

    /// Back to round 1 (new session)
    pub fn reset(&mut self) {
        self.current = 1;
        self.notify();
    }

    fn notify(&mut self) {
        let round = self.current;
        for listener in &mut self.listeners {
            listener(round);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_count_up_notifies() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut rounds = RoundTracker::new();
        rounds.subscribe(move |r| sink.borrow_mut().push(r));

        assert_eq!(rounds.current(), 1);
        assert_eq!(rounds.count_up(), 2);
        assert_eq!(rounds.count_up(), 3);
        rounds.reset();

        assert_eq!(rounds.current(), 1);
        assert_eq!(seen.borrow().as_slice(), &[2, 3, 1]);
    }
}
