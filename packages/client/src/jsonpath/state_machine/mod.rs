//! Frame stack for path-driven subtree extraction
//!
//! # Architecture
//!
//! - `types`: frames as a tagged union over object, array and scalar state
//! - `engine`: applies tokenizer events to the stack and queues matches
//!
//! Retention is monotone down the tree: a frame keeps its children iff it
//! or one of its ancestors matches a pattern. A frame that is not retained
//! stores nothing but the slot of its in-flight child, released the moment
//! that child closes.

mod engine;
mod types;

pub use engine::{ExtractedMatch, FrameStack};
