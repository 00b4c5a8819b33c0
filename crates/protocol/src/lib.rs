//! Action-surface and host data model for the guildbeat connector.
//!
//! Shapes exchanged with the SOAR host: action requests and results,
//! artifacts and containers, and the persisted poll checkpoint. The
//! connector core and any embedding host both speak these types; no
//! Discord SDK types leak through here.

pub mod action;
pub mod artifact;
pub mod result;
pub mod state;

pub use {
    action::{Action, ActionRequest, ParamError},
    artifact::{Artifact, Cef, Container, Sensitivity},
    result::ActionResult,
    state::{ConnectorState, StateError, format_poll_date, parse_poll_date},
};
