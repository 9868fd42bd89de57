//! Headless testing tools: fake effects, a screen harness, snapshot helpers.
//!
//! Use [`Harness`] to mount a document against [`FakeEffects`] and drive it
//! by element id. Use [`element_to_string`] to capture a rendered tree as
//! plain text for snapshot assertions.

pub mod fakes;
pub mod harness;
pub mod snapshot;

pub use fakes::{
    CountingObserver, FakeAuth, FakeEffects, FakeNetwork, RecordedRequest, RecordingNavigator,
    StaticValidator,
};
pub use harness::Harness;
pub use snapshot::element_to_string;
