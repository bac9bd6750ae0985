//! Structured logging integration for events
//!
//! Library crates never print; they emit `AppEvent`s. This module turns each
//! event into a tracing record with structured fields.

use cpkg_events::{AppEvent, BuildEvent, GeneralEvent};
use tracing::{debug, error, info, warn};

/// Log an `AppEvent` through tracing
pub fn log_event_with_tracing(event: &AppEvent) {
    match event {
        AppEvent::General(general) => log_general_event(general),
        AppEvent::Build(build) => log_build_event(build),
    }
}

fn log_general_event(event: &GeneralEvent) {
    match event {
        GeneralEvent::Warning { message } => {
            warn!(target: "cpkg::events::general", "{message}");
        }
    }
}

fn log_build_event(event: &BuildEvent) {
    match event {
        BuildEvent::SessionStarted {
            session_id,
            package,
            package_id,
        } => {
            info!(
                target: "cpkg::events::build",
                session_id = %session_id,
                package = %package,
                package_id = %package_id,
                "Build started"
            );
        }
        BuildEvent::PhaseStarted { session_id, phase } => {
            info!(
                target: "cpkg::events::build",
                session_id = %session_id,
                phase = %phase,
                "Phase started"
            );
        }
        BuildEvent::PhaseCompleted {
            session_id,
            phase,
            duration,
        } => {
            info!(
                target: "cpkg::events::build",
                session_id = %session_id,
                phase = %phase,
                duration = ?duration,
                "Phase completed"
            );
        }
        BuildEvent::CommandStarted {
            session_id,
            command,
            working_dir,
        } => {
            debug!(
                target: "cpkg::events::build",
                session_id = %session_id,
                command = %command,
                working_dir = %working_dir.display(),
                "Command started"
            );
        }
        BuildEvent::CommandCompleted {
            session_id,
            command,
            exit_code,
            duration,
        } => {
            debug!(
                target: "cpkg::events::build",
                session_id = %session_id,
                command = %command,
                exit_code = ?exit_code,
                duration = ?duration,
                "Command completed"
            );
        }
        BuildEvent::SourceFetched {
            session_id,
            url,
            path,
        } => {
            info!(
                target: "cpkg::events::build",
                session_id = %session_id,
                url = %url,
                path = %path.display(),
                "Source fetched"
            );
        }
        BuildEvent::PatchApplied {
            session_id,
            file,
            anchor,
            occurrences,
        } => {
            info!(
                target: "cpkg::events::build",
                session_id = %session_id,
                file = %file.display(),
                anchor = %anchor,
                occurrences = occurrences,
                "Patch applied"
            );
        }
        BuildEvent::GeneratorWritten { session_id, path } => {
            debug!(
                target: "cpkg::events::build",
                session_id = %session_id,
                path = %path.display(),
                "Generator written"
            );
        }
        BuildEvent::FileCollision {
            session_id,
            destination,
            replaced,
            winner,
        } => {
            warn!(
                target: "cpkg::events::build",
                session_id = %session_id,
                destination = %destination.display(),
                replaced = %replaced.display(),
                winner = %winner.display(),
                "Packaged file overwritten"
            );
        }
        BuildEvent::ArtifactsCollected {
            session_id,
            headers,
            archives,
        } => {
            info!(
                target: "cpkg::events::build",
                session_id = %session_id,
                headers = headers,
                archives = archives,
                "Artifacts collected"
            );
        }
        BuildEvent::Completed {
            session_id,
            package,
            package_dir,
            duration,
        } => {
            info!(
                target: "cpkg::events::build",
                session_id = %session_id,
                package = %package,
                package_dir = %package_dir.display(),
                duration = ?duration,
                "Build completed"
            );
        }
        BuildEvent::Failed {
            session_id,
            package,
            phase,
            failure,
        } => {
            error!(
                target: "cpkg::events::build",
                session_id = %session_id,
                package = %package,
                phase = ?phase,
                retryable = failure.retryable,
                code = ?failure.code,
                error = %failure.message,
                hint = ?failure.hint,
                "Build failed"
            );
        }
    }
}
