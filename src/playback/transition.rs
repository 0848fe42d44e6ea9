//! Repeat/shuffle policy: which track plays after the current one.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Stop after the last track.
    Off,
    /// Wrap around to the start of the playlist.
    #[default]
    All,
    /// Replay the current track when it ends.
    One,
}

impl RepeatMode {
    /// Cycle `Off -> All -> One -> Off`.
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }
}

/// What to do when a track reaches its natural end.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EndAction {
    Replay(usize),
    Advance(usize),
    StopAtEnd,
}

pub struct TransitionController {
    repeat: RepeatMode,
    shuffle: bool,
    /// Play order: identity, or a permutation of `0..len` while shuffling.
    order: Vec<usize>,
    /// Position of the current track within `order`.
    cursor: usize,
    rng: StdRng,
}

impl TransitionController {
    pub fn new(repeat: RepeatMode, shuffle: bool) -> Self {
        Self::with_rng(repeat, shuffle, StdRng::from_rng(&mut rand::rng()))
    }

    pub fn with_rng(repeat: RepeatMode, shuffle: bool, rng: StdRng) -> Self {
        Self {
            repeat,
            shuffle,
            order: Vec::new(),
            cursor: 0,
            rng,
        }
    }

    #[cfg(test)]
    pub fn seeded(repeat: RepeatMode, shuffle: bool, seed: u64) -> Self {
        Self::with_rng(repeat, shuffle, StdRng::seed_from_u64(seed))
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        self.repeat = repeat;
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    #[cfg(test)]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    /// Rebuild the play order for a playlist of `len` tracks.
    pub fn reset(&mut self, len: usize, current: Option<usize>) {
        self.order = (0..len).collect();
        self.cursor = 0;
        if self.shuffle {
            self.order.shuffle(&mut self.rng);
            if let Some(pos) = current.and_then(|c| self.order.iter().position(|&i| i == c)) {
                let cur = self.order.remove(pos);
                self.order.insert(0, cur);
            }
        } else if let Some(c) = current.filter(|&c| c < len) {
            self.cursor = c;
        }
    }

    /// Turn shuffle on or off. Turning it on draws a new permutation with
    /// `current` placed first.
    pub fn set_shuffle(&mut self, on: bool, current: Option<usize>) {
        self.shuffle = on;
        let len = self.len();
        self.reset(len, current);
    }

    /// Re-seat the cursor on `current` after a load.
    pub fn sync(&mut self, current: usize) {
        if let Some(pos) = self.order.iter().position(|&i| i == current) {
            self.cursor = pos;
        }
    }

    /// Index to play on a manual "next".
    pub fn next_index(&mut self, current: usize) -> Option<usize> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        if self.repeat == RepeatMode::One {
            return Some(current.min(n - 1));
        }
        if self.shuffle {
            self.sync(current);
            self.cursor = (self.cursor + 1) % n;
            Some(self.order[self.cursor])
        } else {
            Some((current + 1) % n)
        }
    }

    /// Index to play on a manual "previous". Repeat-one does not pin it.
    pub fn previous_index(&mut self, current: usize) -> Option<usize> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        if self.shuffle {
            self.sync(current);
            self.cursor = (self.cursor + n - 1) % n;
            Some(self.order[self.cursor])
        } else {
            Some((current.min(n - 1) + n - 1) % n)
        }
    }

    /// Whether `current` is the last playlist entry. Shuffle does not move
    /// the end: repeat Off stops after the last index, wherever it falls in
    /// the shuffled order.
    pub fn is_last(&self, current: usize) -> bool {
        current + 1 >= self.len()
    }

    /// End-of-track policy, distinct from a manual "next".
    pub fn on_track_end(&mut self, current: usize) -> EndAction {
        if self.len() == 0 {
            return EndAction::StopAtEnd;
        }
        match self.repeat {
            RepeatMode::One => EndAction::Replay(current),
            RepeatMode::All => self
                .next_index(current)
                .map_or(EndAction::StopAtEnd, EndAction::Advance),
            RepeatMode::Off => {
                if self.is_last(current) {
                    EndAction::StopAtEnd
                } else {
                    self.next_index(current)
                        .map_or(EndAction::StopAtEnd, EndAction::Advance)
                }
            }
        }
    }

    /// Whether the end of `current` hands over to another track, which is
    /// when a crossfade makes sense.
    pub fn advances_at_end(&mut self, current: usize) -> bool {
        match self.repeat {
            RepeatMode::One => false,
            RepeatMode::All => self.len() > 0,
            RepeatMode::Off => !self.is_last(current),
        }
    }
}
