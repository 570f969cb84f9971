//! Instrumented line controller for unit tests

use core::time::Duration;
use std::collections::VecDeque;
use std::vec::Vec;

use crate::line::{Direction, Line, LineController};

/// One recorded call on the line controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Level(Line, bool),
    Direction(Line, Direction),
    Read(Line),
    Hold(Duration),
}

/// What `DD_I` reads back
pub(crate) enum InputMode {
    /// Always low (target ready, all-zero data)
    Low,
    /// Always high (target never ready)
    High,
    /// Scripted levels, low once exhausted
    Bits(VecDeque<bool>),
    /// Bits clocked out on `DD_O` are replayed on `DD_I`
    Loopback,
}

impl InputMode {
    /// Scripted bits of `bytes`, MSB first
    pub(crate) fn bits_of(bytes: &[u8]) -> Self {
        InputMode::Bits(byte_bits(bytes).collect())
    }

    /// A ready target answering with `bytes`
    pub(crate) fn response(bytes: &[u8]) -> Self {
        InputMode::Bits(core::iter::once(false).chain(byte_bits(bytes)).collect())
    }
}

fn byte_bits(bytes: &[u8]) -> impl Iterator<Item = bool> + '_ {
    bytes
        .iter()
        .flat_map(|&b| (0..8).rev().map(move |i| (b >> i) & 1 != 0))
}

pub(crate) struct MockLines {
    mode: InputMode,
    indicators: bool,
    levels: [bool; Line::COUNT],
    directions: [Direction; Line::COUNT],
    loopback: VecDeque<bool>,
    events: Vec<Event>,
    start_levels: [bool; Line::COUNT],
    start_directions: [Direction; Line::COUNT],
}

impl MockLines {
    pub(crate) fn new(mode: InputMode) -> Self {
        Self {
            mode,
            indicators: false,
            levels: [false; Line::COUNT],
            directions: [Direction::Input; Line::COUNT],
            loopback: VecDeque::new(),
            events: Vec::new(),
            start_levels: [false; Line::COUNT],
            start_directions: [Direction::Input; Line::COUNT],
        }
    }

    pub(crate) fn enable_indicators(&mut self) {
        self.indicators = true;
    }

    pub(crate) fn set_mode(&mut self, mode: InputMode) {
        self.mode = mode;
    }

    /// Forget recorded events, keeping the current line state
    pub(crate) fn clear(&mut self) {
        self.events.clear();
        self.start_levels = self.levels;
        self.start_directions = self.directions;
    }

    pub(crate) fn events(&self) -> &[Event] {
        &self.events
    }

    pub(crate) fn direction(&self, line: Line) -> Direction {
        self.directions[line.index()]
    }

    pub(crate) fn output_level(&self, line: Line) -> bool {
        self.levels[line.index()]
    }

    pub(crate) fn rising_edges(&self, line: Line) -> usize {
        let mut level = self.start_levels[line.index()];
        let mut count = 0;
        for event in &self.events {
            if let Event::Level(l, high) = *event {
                if l == line {
                    if high && !level {
                        count += 1;
                    }
                    level = high;
                }
            }
        }
        count
    }

    /// Decode the bytes the host clocked out on `DD_O`
    pub(crate) fn written_bytes(&self) -> Vec<u8> {
        let mut levels = self.start_levels;
        let mut directions = self.start_directions;
        let mut bits = Vec::new();

        for event in &self.events {
            match *event {
                Event::Level(line, high) => {
                    let rising = line == Line::Clock && high && !levels[line.index()];
                    if rising && directions[Line::DataOut.index()] == Direction::Output {
                        bits.push(levels[Line::DataOut.index()]);
                    }
                    levels[line.index()] = high;
                }
                Event::Direction(line, dir) => directions[line.index()] = dir,
                _ => {}
            }
        }

        bits.chunks(8)
            .filter(|chunk| chunk.len() == 8)
            .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
            .collect()
    }

    /// Position of the first event matching `pred`
    pub(crate) fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.events.iter().position(pred)
    }
}

impl LineController for MockLines {
    fn set_level(&mut self, line: Line, high: bool) {
        let rising = line == Line::Clock && high && !self.levels[line.index()];
        if rising && self.directions[Line::DataOut.index()] == Direction::Output {
            self.loopback.push_back(self.levels[Line::DataOut.index()]);
        }
        self.levels[line.index()] = high;
        self.events.push(Event::Level(line, high));
    }

    fn level(&mut self, line: Line) -> bool {
        self.events.push(Event::Read(line));
        if line != Line::DataIn {
            return self.levels[line.index()];
        }
        match &mut self.mode {
            InputMode::Low => false,
            InputMode::High => true,
            InputMode::Bits(bits) => bits.pop_front().unwrap_or(false),
            InputMode::Loopback => {
                if self.directions[Line::DataOut.index()] == Direction::Output {
                    self.levels[Line::DataOut.index()]
                } else {
                    self.loopback.pop_front().unwrap_or(false)
                }
            }
        }
    }

    fn set_direction(&mut self, line: Line, direction: Direction) {
        self.directions[line.index()] = direction;
        self.events.push(Event::Direction(line, direction));
    }

    fn has_line(&self, line: Line) -> bool {
        !line.is_indicator() || self.indicators
    }

    fn hold(&mut self, duration: Duration) {
        self.events.push(Event::Hold(duration));
    }
}
