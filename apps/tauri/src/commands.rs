//! Tauri commands - API between the overlay frontend and the void
//!
//! These commands are called from the frontend over IPC.
//! User-facing problems are shown as native dialogs, mirroring what the
//! overlay can't express inside a single text field.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tauri::{AppHandle, State};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use tracing::{error, info, warn};
use voider_core::{
    keep_selection as keep_selected_text, Commit, Config, Indexer, OverlayLayout, Recall,
    Selection, Void, VoidWatch,
};

/// State shared by all commands.
pub struct AppState {
    pub config: Config,
    pub void: Void,
    pub indexer: Indexer,
    /// Held so the watch thread lives as long as the app; taken on exit
    pub watch: Mutex<Option<VoidWatch>>,
}

impl AppState {
    /// Open the void, start indexing, and start watching for archive changes.
    pub fn start(config: Config) -> voider_core::Result<Self> {
        let void = Void::from_config(&config)?;
        let indexer = Indexer::start(void.clone())?;
        let watch = VoidWatch::spawn(indexer.clone())?;

        info!("Void ready at {:?}", void.dir());
        Ok(Self {
            config,
            void,
            indexer,
            watch: Mutex::new(Some(watch)),
        })
    }

    /// Stop the watch thread.
    pub fn shutdown(&self) {
        if let Some(mut watch) = self.watch.lock().take() {
            watch.stop();
        }
    }
}

/// Layout and appearance for the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutResponse {
    pub layout: OverlayLayout,
    pub opacity: f64,
    pub font_family: String,
    pub font_size: u32,
}

/// Result of committing the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitResponse {
    pub status: String,
    pub segments: usize,
    pub path: Option<String>,
}

impl From<Commit> for CommitResponse {
    fn from(commit: Commit) -> Self {
        match commit {
            Commit::Nothing => Self {
                status: "nothing".to_string(),
                segments: 0,
                path: None,
            },
            Commit::Appended { segments } => Self {
                status: "appended".to_string(),
                segments,
                path: None,
            },
            Commit::Archived { path } => Self {
                status: "archived".to_string(),
                segments: 0,
                path: Some(path.to_string_lossy().to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub void_dir: String,
    pub archives: usize,
    pub recallable: usize,
    pub indexing: bool,
}

fn show_message(app: &AppHandle, kind: MessageDialogKind, title: &str, message: &str) {
    app.dialog()
        .message(message)
        .kind(kind)
        .title(title)
        .show(|_| {});
}

// ============ LAYOUT COMMANDS ============

/// Compute ring and entry geometry for the current screen
#[tauri::command]
pub fn get_layout(
    screen_width: u32,
    screen_height: u32,
    char_width: u32,
    state: State<'_, AppState>,
) -> LayoutResponse {
    let overlay = &state.config.overlay;
    LayoutResponse {
        layout: OverlayLayout::compute(screen_width, screen_height, char_width, overlay),
        opacity: overlay.opacity,
        font_family: overlay.font_family.clone(),
        font_size: overlay.font_size,
    }
}

// ============ VOID COMMANDS ============

/// Commit the field: append fragments or run a `0` archive command
#[tauri::command]
pub async fn void_line(
    text: String,
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<CommitResponse, String> {
    let void = state.void.clone();

    let committed = tokio::task::spawn_blocking(move || void.commit(&text))
        .await
        .map_err(|e| e.to_string())?;

    match committed {
        Ok(commit) => Ok(CommitResponse::from(commit)),
        Err(e) => {
            error!("[void_line] {}", e);
            show_message(&app, MessageDialogKind::Error, "Voider", &e.to_string());
            Err(e.to_string())
        }
    }
}

/// Pull a random archived line, or tell the user why there is none
#[tauri::command]
pub fn recall_line(app: AppHandle, state: State<'_, AppState>) -> Option<String> {
    match state.indexer.recall() {
        Recall::Line(line) => Some(line),
        Recall::Busy => {
            show_message(
                &app,
                MessageDialogKind::Info,
                "Indexing",
                "Please wait, indexing lines...",
            );
            None
        }
        Recall::Empty => {
            show_message(
                &app,
                MessageDialogKind::Info,
                "nothing found",
                "nothing found in the void",
            );
            None
        }
    }
}

/// Keep only the selected part of the field
#[tauri::command]
pub fn keep_selection(text: String, start: usize, end: usize, app: AppHandle) -> Option<Selection> {
    match keep_selected_text(&text, start, end) {
        Ok(selection) => Some(selection),
        Err(e) => {
            warn!("[keep_selection] {}", e);
            show_message(
                &app,
                MessageDialogKind::Warning,
                "Warning",
                "No text is selected to keep.",
            );
            None
        }
    }
}

/// Counts for the frontend
#[tauri::command]
pub fn void_status(state: State<'_, AppState>) -> Result<StatusResponse, String> {
    let stats = state.void.stats().map_err(|e| e.to_string())?;
    Ok(StatusResponse {
        void_dir: state.void.dir().to_string_lossy().to_string(),
        archives: stats.archives,
        recallable: state.indexer.len(),
        indexing: state.indexer.is_indexing(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_commit_response_shapes() {
        let nothing = CommitResponse::from(Commit::Nothing);
        assert_eq!(nothing.status, "nothing");

        let appended = CommitResponse::from(Commit::Appended { segments: 3 });
        assert_eq!(appended.status, "appended");
        assert_eq!(appended.segments, 3);

        let archived = CommitResponse::from(Commit::Archived {
            path: PathBuf::from("void/monday.txt"),
        });
        assert_eq!(archived.status, "archived");
        assert_eq!(archived.path.as_deref(), Some("void/monday.txt"));
    }
}
