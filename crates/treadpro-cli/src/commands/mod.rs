pub mod config;
pub mod run;
pub mod sessions;
pub mod simulate;

use treadpro_core::{Catalog, CoreError, Limits, SegmentSpec, Session, SessionEditor, ValidationError};

/// Id that selects the custom-session template instead of the catalog.
pub const CUSTOM_ID: &str = "custom";

/// Turn a session id plus optional `--segment`/`--name` flags into a session
/// that is ready to run.
pub fn resolve_session(
    id: &str,
    segments: &[SegmentSpec],
    name: Option<&str>,
    limits: Limits,
) -> Result<Session, CoreError> {
    if id == CUSTOM_ID {
        let mut editor = SessionEditor::custom(limits);
        if !segments.is_empty() {
            editor.replace_segments(segments)?;
        }
        if let Some(name) = name {
            editor.set_name(name);
        }
        return Ok(editor.finish()?);
    }

    let custom_only = |flag: &str| ValidationError::InvalidValue {
        field: flag.trim_start_matches('-').into(),
        message: format!("{flag} only applies to '{CUSTOM_ID}' sessions"),
    };
    if !segments.is_empty() {
        return Err(custom_only("--segment").into());
    }
    if name.is_some() {
        return Err(custom_only("--name").into());
    }
    Ok(Catalog::builtin().get(id)?.clone())
}

/// `m:ss`, or `h:mm:ss` past an hour.
pub fn clock(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, secs / 60 % 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}
