// assign.rs — Folder icon assignment
//
// One `assign` call walks
//
//   Idle → Validating → Updating → Refreshing → Restoring → Done
//
// and stops in Aborted when validation or the desktop.ini write fails.
// Nothing on disk changes before Updating.  Failures after the write are
// logged, collected in the outcome, and never undo the write.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::attributes::{AttributeGuard, AttributeSnapshot, AttributeSpec};
use crate::config_file::{self, config_path, validate_icon_source};
use crate::ehm::{exit_codes, AppError};
use crate::environment_provider::EnvironmentProvider;
use crate::icon_resource::IconReference;
use crate::path_resolver::{resolve_relative, IconSourceKind};
use crate::platform::{FileAttributes, IndexPrompter, ShellNotifier};





#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignState {
    Idle,
    Validating,
    Updating,
    Refreshing,
    Restoring,
    Done,
    Aborted,
}





impl fmt::Display for AssignState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssignState::Idle       => "Idle",
            AssignState::Validating => "Validating",
            AssignState::Updating   => "Updating",
            AssignState::Refreshing => "Refreshing",
            AssignState::Restoring  => "Restoring",
            AssignState::Done       => "Done",
            AssignState::Aborted    => "Aborted",
        };

        f.write_str(name)
    }
}





/// What to do to one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignRequest {
    pub folder:     PathBuf,

    /// New icon source; `None` re-applies the entry already in desktop.ini.
    /// A relative path is taken relative to the folder.
    pub icon:       Option<PathBuf>,

    /// Only meaningful together with `icon`.
    pub index:      Option<i32>,

    /// Overlay for desktop.ini and the icon file; `None` restores
    /// desktop.ini's prior attributes instead.
    pub attributes: Option<AttributeSpec>,
}





impl AssignRequest {
    pub fn refresh(folder: impl Into<PathBuf>) -> Self {
        AssignRequest { folder: folder.into(), icon: None, index: None, attributes: None }
    }
}





/// Result of a completed run.  `warnings` holds the failures that happened
/// after desktop.ini was written.
#[derive(Debug)]
pub struct AssignOutcome {
    /// Absolute reference handed to the shell.
    pub reference: IconReference,

    /// Line value written to desktop.ini.
    pub written:   IconReference,

    pub warnings:  Vec<AppError>,
}





impl AssignOutcome {
    pub fn exit_code(&self) -> i32 {
        let fallback_failed = self
            .warnings
            .iter()
            .any(|w| matches!(w, AppError::FallbackLaunchFailed { .. }));

        if fallback_failed {
            exit_codes::FALLBACK_LAUNCH_FAILURE
        } else {
            exit_codes::SUCCESS
        }
    }
}





/// The written and resolved forms of the icon for one run.
struct EffectiveIcon {
    written:  IconReference,
    resolved: IconReference,
}





/// Orchestrates validation, the desktop.ini update, the shell refresh and
/// attribute handling for one folder at a time.
pub struct IconAssignmentService<'a> {
    attributes: &'a dyn FileAttributes,
    shell:      &'a dyn ShellNotifier,
    prompter:   &'a dyn IndexPrompter,
    env:        &'a dyn EnvironmentProvider,
}





////////////////////////////////////////////////////////////////////////////////
//
//  impl IconAssignmentService
//
////////////////////////////////////////////////////////////////////////////////

impl<'a> IconAssignmentService<'a> {
    pub fn new(
        attributes: &'a dyn FileAttributes,
        shell:      &'a dyn ShellNotifier,
        prompter:   &'a dyn IndexPrompter,
        env:        &'a dyn EnvironmentProvider,
    ) -> Self {
        IconAssignmentService { attributes, shell, prompter, env }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  assign
    //
    //  Runs the full sequence for `request.folder`.
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn assign(&self, request: &AssignRequest) -> Result<AssignOutcome, AppError> {
        let mut state = AssignState::Idle;

        let result = self.run(request, &mut state);

        if let Err(e) = &result {
            debug!(folder = %request.folder.display(), from = %state, error = %e, "Aborted");
        }

        result
    }





    fn run(&self, request: &AssignRequest, state: &mut AssignState) -> Result<AssignOutcome, AppError> {
        let folder = request.folder.as_path();
        let guard  = AttributeGuard::new(self.attributes);
        let ini    = config_path(folder);

        let mut warnings = Vec::new();

        advance(state, AssignState::Validating, folder);

        if !folder.is_dir() {
            return Err(AppError::PathNotFound(folder.to_path_buf()));
        }

        let new_icon = match &request.icon {
            Some(icon) => Some(self.validate_new_icon(folder, icon, request.index)?),
            None if request.index.is_some() => {
                return Err(AppError::InvalidArg("Error:   an icon index requires an icon source".into()));
            }
            None => None,
        };

        advance(state, AssignState::Updating, folder);

        let snapshot = self.capture_config(&guard, &ini, &mut warnings);

        let effective = match new_icon {
            Some(icon) => icon,
            None       => self.configured_icon(folder)?,
        };

        if let Some(snapshot) = &snapshot {
            guard.clear_for_write(snapshot)?;
        }

        if let Err(e) = config_file::write_icon_entry(folder, &effective.written) {
            if let Some(snapshot) = &snapshot {
                if let Err(restore_error) = guard.restore(snapshot) {
                    warn!(error = %restore_error, "could not restore desktop.ini attributes after failed write");
                }
            }

            return Err(e);
        }

        info!(folder = %folder.display(), entry = %effective.written, "desktop.ini updated");

        advance(state, AssignState::Refreshing, folder);

        self.refresh(folder, &effective.resolved, &mut warnings);

        advance(state, AssignState::Restoring, folder);

        self.finish_attributes(&guard, &ini, snapshot.as_ref(), &effective.resolved, request.attributes, &mut warnings);

        advance(state, AssignState::Done, folder);

        Ok(AssignOutcome {
            reference: effective.resolved,
            written:   effective.written,
            warnings,
        })
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  validate_new_icon
    //
    //  Resolves the source against the folder, checks it, and settles the
    //  index: explicit wins, .ico defaults to 0, .dll asks the prompter.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn validate_new_icon(&self, folder: &Path, icon: &Path, index: Option<i32>) -> Result<EffectiveIcon, AppError> {
        let resolved = resolve_relative(&config_path(folder), icon);
        let kind     = validate_icon_source(&resolved)?;

        let index = match (index, kind) {
            (Some(index), _)              => index,
            (None, IconSourceKind::Ico)   => 0,
            (None, IconSourceKind::Dll)   => self.prompter.prompt_for_index(&resolved)?,
        };

        Ok(EffectiveIcon {
            written:  IconReference::new(icon, index),
            resolved: IconReference::new(resolved, index),
        })
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  configured_icon
    //
    //  The entry already in desktop.ini.  A missing or invalid entry is
    //  NoIconConfigured; a missing desktop.ini stays ConfigNotFound.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn configured_icon(&self, folder: &Path) -> Result<EffectiveIcon, AppError> {
        let no_icon = |problem| AppError::NoIconConfigured { folder: folder.to_path_buf(), problem };

        match config_file::read_icon_entry(folder, self.env) {
            Ok(Some(entry)) => Ok(EffectiveIcon { written: entry.stored, resolved: entry.resolved }),
            Ok(None)        => Err(no_icon(None)),
            Err(AppError::InvalidIconFile { problem, .. }) => Err(no_icon(Some(problem))),
            Err(e)          => Err(e),
        }
    }





    fn capture_config(
        &self,
        guard:    &AttributeGuard<'_>,
        ini:      &Path,
        warnings: &mut Vec<AppError>,
    ) -> Option<AttributeSnapshot> {
        if !ini.exists() {
            return None;
        }

        match guard.capture(ini) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "desktop.ini attributes will not be restored");
                warnings.push(e);
                None
            }
        }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  refresh
    //
    //  Shell refresh, then the icon cache refresher if the shell refused.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn refresh(&self, folder: &Path, icon: &IconReference, warnings: &mut Vec<AppError>) {
        let Err(e) = self.shell.refresh_folder_icon(folder, icon) else {
            return;
        };

        warn!(error = %e, "shell refresh failed; falling back to icon cache refresh");
        warnings.push(e);

        if let Err(e) = self.shell.launch_fallback_refresh() {
            warn!(error = %e, "icon cache refresh could not be started");
            warnings.push(e);
        }
    }





    ////////////////////////////////////////////////////////////////////////////
    //
    //  finish_attributes
    //
    //  An explicit overlay goes on desktop.ini and the icon file.  Without
    //  one, desktop.ini gets its captured bits back and the icon file is
    //  left alone.
    //
    ////////////////////////////////////////////////////////////////////////////

    fn finish_attributes(
        &self,
        guard:    &AttributeGuard<'_>,
        ini:      &Path,
        snapshot: Option<&AttributeSnapshot>,
        icon:     &IconReference,
        spec:     Option<AttributeSpec>,
        warnings: &mut Vec<AppError>,
    ) {
        let results = match spec {
            Some(spec) => {
                let ini_result = match snapshot {
                    Some(snapshot) => guard.overlay_snapshot(snapshot, &spec),
                    None           => guard.apply_overlay(ini, &spec),
                };

                vec![ini_result.map(|_| ()), guard.apply_overlay(&icon.path, &spec).map(|_| ())]
            }
            None => match snapshot {
                Some(snapshot) => vec![guard.restore(snapshot)],
                None           => Vec::new(),
            },
        };

        for e in results.into_iter().filter_map(Result::err) {
            warn!(error = %e, "attribute update failed");
            warnings.push(e);
        }
    }
}





fn advance(state: &mut AssignState, next: AssignState, folder: &Path) {
    debug!(folder = %folder.display(), from = %state, to = %next, "state transition");
    *state = next;
}
