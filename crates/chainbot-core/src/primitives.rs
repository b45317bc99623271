//! # Model Primitives
//!
//! Fixed constants of the chain model. They are compiled in and never
//! change at runtime; collaborators pass their own lengths to `generate`.

/// Returned by `generate` when `Start` has learned nothing yet.
pub const EMPTY_MODEL_FALLBACK: &str = "Unable to generate a chain at this time";

/// Default minimum number of words in a generated chain.
pub const DEFAULT_MIN_LENGTH: usize = 10;

/// Default maximum number of words in a generated chain.
pub const DEFAULT_MAX_LENGTH: usize = 50;

/// Default separator placed between generated words.
pub const DEFAULT_SEPARATOR: &str = " ";

/// Upper bound on consecutive resamples from `Start` during one early stop.
///
/// `Start` never links straight to `Stop` (empty sequences are not learned),
/// so a resample normally succeeds on the first draw.
pub const MAX_RESAMPLE_ATTEMPTS: usize = 64;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum byte length of one ingested line.
pub const MAX_LINE_LENGTH: usize = 2048;

/// Maximum number of tokens in one ingested line.
pub const MAX_SEQUENCE_LENGTH: usize = 512;

// =============================================================================
// DIAGNOSTIC LABELS
// =============================================================================

/// Rendering of `Token::Start` in model dumps.
pub const START_LABEL: &str = "<START>";

/// Rendering of `Token::Stop` in model dumps.
pub const STOP_LABEL: &str = "<STOP>";
