//! # Formentry Core
//!
//! Encounter detail section of a clinical data-entry form.
//!
//! This crate builds, renders, validates and applies the encounter's own details:
//! - Encounter date, with an optional time of day
//! - Provider and location pickers, as dropdowns or autocompletes
//! - The void toggle shown when editing an existing encounter
//!
//! **No host concerns**: the surrounding form engine, persistence and authentication stay
//! with the caller. Lookups go through the traits in [`services`]; [`in_memory`] provides a
//! YAML-backed implementation for tools and tests.

pub mod config;
pub mod constants;
pub mod context;
pub mod domain;
pub mod element;
pub mod error;
pub mod in_memory;
pub mod options;
pub mod parameters;
pub mod providers;
pub mod services;
pub mod widgets;

pub use config::{FormEntryConfig, ProviderCapability};
pub use context::{FormEntryContext, FormEntrySession, FormMode, Submission};
pub use element::{EncounterDetailElement, FieldError, FormElement};
pub use error::{FormError, FormResult};
pub use parameters::EncounterDetailParameters;
pub use services::FormEntryServices;
