//! Frame stack driven by tokenizer events

use std::collections::VecDeque;

use serde_json::Value;

use super::types::{Frame, FrameKind};
use crate::jsonpath::pattern::{FrameKey, PathPattern};
use crate::jsonpath::stats::ExtractorStats;
use crate::jsonpath::tokenizer::JsonEvent;

/// Subtree found at a location selected by one of the extractor's patterns
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedMatch {
    /// Index of the matching pattern, in construction order
    pub pattern: usize,
    /// The fully built subtree
    pub value: Value,
}

/// Stack of open frames plus the queue of matches ready for the consumer
#[derive(Debug)]
pub struct FrameStack {
    patterns: Vec<PathPattern>,
    frames: Vec<Frame>,
    ready: VecDeque<ExtractedMatch>,
    live_slots: usize,
    pub(crate) stats: ExtractorStats,
}

impl FrameStack {
    #[must_use]
    pub fn new(patterns: Vec<PathPattern>) -> Self {
        Self {
            patterns,
            frames: Vec::new(),
            ready: VecDeque::new(),
            live_slots: 0,
            stats: ExtractorStats::default(),
        }
    }

    #[must_use]
    pub fn patterns(&self) -> &[PathPattern] {
        &self.patterns
    }

    /// Current nesting depth
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Kind of the innermost open frame, if any
    #[must_use]
    pub fn open_kind(&self) -> Option<&'static str> {
        self.frames.last().map(Frame::kind_name)
    }

    pub(crate) fn pop_ready(&mut self) -> Option<ExtractedMatch> {
        self.ready.pop_front()
    }

    pub(crate) fn ready_len(&self) -> usize {
        self.ready.len()
    }

    /// Apply one tokenizer event
    pub fn on_event(&mut self, event: JsonEvent) {
        self.stats.events += 1;
        match event {
            JsonEvent::OpenObject => {
                self.open(Frame::object);
            }
            JsonEvent::OpenArray => {
                self.open(Frame::array);
            }
            JsonEvent::Key(key) => {
                if let Some(Frame {
                    kind: FrameKind::Object { pending_key, .. },
                    ..
                }) = self.frames.last_mut()
                {
                    *pending_key = Some(key);
                }
            }
            JsonEvent::CloseObject | JsonEvent::CloseArray => self.close(),
            JsonEvent::Value(value) => {
                let retained = self.open(|key, matches, retain| {
                    Frame::scalar(value, key, matches, retain)
                });
                if !retained {
                    self.stats.scalars_discarded += 1;
                }
                self.close();
            }
        }
    }

    /// Push a frame built by `build(key, matches, retain)`; returns its `retain`
    fn open<F>(&mut self, build: F) -> bool
    where
        F: FnOnce(Option<FrameKey>, Option<usize>, bool) -> Frame,
    {
        let key = self.frames.last_mut().map(Frame::next_child_key);
        let matches = self.match_pattern(key.as_ref());
        let retain = matches.is_some() || self.frames.last().is_some_and(|parent| parent.retain);

        if let (Some(parent), Some(key)) = (self.frames.last_mut(), key.as_ref()) {
            if parent.open_slot(key) {
                self.live_slots += 1;
                self.stats.peak_live_slots = self.stats.peak_live_slots.max(self.live_slots);
            }
        }

        self.frames.push(build(key, matches, retain));
        self.stats.peak_depth = self.stats.peak_depth.max(self.frames.len());
        retain
    }

    fn close(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let key = frame.key.clone();
        let matches = frame.matches;
        let value = frame.into_value();
        let parent_retains = self.frames.last().is_some_and(|parent| parent.retain);

        let value = match (matches, value) {
            (Some(pattern), Some(value)) if parent_retains => {
                self.emit(pattern, value.clone());
                Some(value)
            }
            (Some(pattern), Some(value)) => {
                self.emit(pattern, value);
                None
            }
            (_, value) => value,
        };

        if let (Some(parent), Some(key)) = (self.frames.last_mut(), key) {
            if parent.attach(key, value) {
                self.live_slots -= 1;
            }
        }
    }

    /// First pattern matching a new frame stored under `key` on top of the stack
    fn match_pattern(&self, key: Option<&FrameKey>) -> Option<usize> {
        // pattern length equals the new frame's depth minus one
        let depth = self.frames.len() + 1;
        self.patterns.iter().position(|pattern| {
            pattern.len() + 1 == depth
                && pattern.matches_keys(
                    self.frames
                        .iter()
                        .filter_map(|frame| frame.key.as_ref())
                        .chain(key),
                )
        })
    }

    fn emit(&mut self, pattern: usize, value: Value) {
        self.stats.matches_emitted += 1;
        self.ready.push_back(ExtractedMatch { pattern, value });
    }
}
