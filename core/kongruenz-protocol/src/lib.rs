#![no_std] // Shared with the wasm front-end

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod ids;
pub mod morphology;
pub mod reading;
pub mod report;
pub mod traits;

pub use ids::{LemmaId, ParadigmId};
pub use morphology::*;
pub use reading::*;
pub use report::*;
pub use traits::{Chunker, Synthesizer, Tagger};

pub mod model;
pub use model::*;
