//! # Events Module
//!
//! Progress reporting for the comparison engine.
//!
//! ## Design
//! The engine emits events through a channel so the CLI (or a test) can
//! display progress without the engine knowing who is listening.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Merge(MergeEvent::Progress(p)) = event {
//!             println!("{:.2}% [{}/{}] {}", p.percent(), p.completed, p.total, p.current_key);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&table, sink, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender, null_sender};
pub use types::*;
