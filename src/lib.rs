//! # Speliuk
//!
//! Spelling correction for Ukrainian text.
//!
//! Misspelled tokens are detected against a lexicon, candidate corrections are
//! generated with the SymSpell symmetric delete algorithm, and each candidate is
//! placed back into the surrounding words and re-ranked by an n-gram language
//! model. Named entities and person names are left untouched.
//!
//! ```no_run
//! use speliuk::config::SpeliukConfig;
//! use speliuk::corrector::Speliuk;
//!
//! let mut config = SpeliukConfig::default();
//! config.model_dir = Some("models".into());
//!
//! let speliuk = Speliuk::from_config(&config)?;
//! let correction = speliuk.correct("Я живк в Кеєві.")?;
//! println!("{}", correction.corrected_text);
//! # Ok::<(), speliuk::error::SpeliukError>(())
//! ```

pub mod analysis;
pub mod annotated;
pub mod cli;
pub mod config;
pub mod corrector;
pub mod detection;
pub mod error;
pub mod evaluate;
pub mod lm;
pub mod morph;
pub mod ner;
pub mod spelling;

pub mod prelude {
    pub use crate::annotated::{AnnotatedText, Annotation};
    pub use crate::config::{CorrectionSettings, SpeliukConfig};
    pub use crate::corrector::{Correction, CorrectionPipe, Speliuk};
    pub use crate::error::{Result, SpeliukError};
    pub use crate::lm::NgramModel;
    pub use crate::spelling::{Suggestion, SymSpell, Verbosity};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
