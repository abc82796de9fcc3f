// SolSleuth - gui.rs
//
// Top-level eframe::App implementation.
// Wires together the UI panels and manages the scan lifecycle.

use crate::app::scan::{ScanManager, ScanRequest};
use crate::app::state::{AppState, FileOutcome};
use crate::core::discovery::{DiscoveryConfig, SearchRoot};
use crate::core::model::ScanProgress;
use crate::platform::config::AppConfig;
use crate::ui;
use crate::util::constants;
use std::path::PathBuf;

/// The SolSleuth application.
pub struct SolSleuthApp {
    pub state: AppState,
    pub scan_manager: ScanManager,

    /// Validated configuration (config.toml + CLI overrides).
    config: AppConfig,

    /// Platform-convention Flash save directories, searched when the
    /// user has not chosen a directory explicitly.
    flash_dirs: Vec<PathBuf>,

    /// Set once the automatic startup scan has been kicked off.
    started: bool,
}

impl SolSleuthApp {
    pub fn new(state: AppState, config: AppConfig, flash_dirs: Vec<PathBuf>) -> Self {
        Self {
            state,
            scan_manager: ScanManager::new(),
            config,
            flash_dirs,
            started: false,
        }
    }

    /// Assemble a scan request from config and current UI state.
    ///
    /// When the user has chosen a directory it is the single required
    /// root; otherwise the platform Flash dirs plus any configured
    /// extra dirs are searched as optional roots.
    fn build_request(&self) -> ScanRequest {
        let roots: Vec<SearchRoot> = match self.state.chosen_dir {
            Some(ref dir) => vec![SearchRoot::required(dir.clone())],
            None => self
                .flash_dirs
                .iter()
                .chain(self.config.extra_dirs.iter())
                .cloned()
                .map(SearchRoot::optional)
                .collect(),
        };

        ScanRequest {
            roots,
            discovery: DiscoveryConfig {
                max_depth: self.config.max_depth,
                max_files: self.config.max_files,
                include_patterns: self.config.include_patterns.clone(),
                exclude_patterns: self.config.exclude_patterns.clone(),
                name_filter: self.config.name_filter.clone(),
                cancel_flag: None, // Installed by the scan thread.
            },
            labels: constants::DEFAULT_LABELS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            deadline: self.config.deadline,
            max_parse_bytes: self.config.max_parse_bytes,
        }
    }

    fn start_scan(&mut self) {
        self.state.clear();
        self.state.scan_in_progress = true;
        self.scan_manager.start_scan(self.build_request());
    }

    fn handle_progress(&mut self, msg: ScanProgress) {
        match msg {
            ScanProgress::DiscoveryStarted => {
                self.state.status_message = "Searching for save files...".to_string();
                self.state.scan_in_progress = true;
            }
            ScanProgress::FileDiscovered { files_found, .. } => {
                self.state.files_found = files_found;
                self.state.status_message =
                    format!("Searching for save files... ({files_found} found)");
            }
            ScanProgress::DiscoveryCompleted { files } => {
                self.state.status_message = format!("Found {} save file(s).", files.len());
                self.state.discovered_files = files;
            }
            ScanProgress::ExtractionStarted { total_files } => {
                self.state.extraction_progress = Some((0, total_files));
                self.state.status_message = format!("Examining {total_files} file(s)...");
            }
            ScanProgress::FileExtracted {
                path,
                result,
                files_completed,
                total_files,
            } => {
                let outcome = match result {
                    Ok(extraction) => FileOutcome::Extracted(extraction),
                    Err(message) => FileOutcome::Error(message),
                };
                self.state.outcomes.insert(path, outcome);
                self.state.extraction_progress = Some((files_completed, total_files));
                self.state.status_message =
                    format!("Examining files ({files_completed}/{total_files})...");
            }
            ScanProgress::ExtractionCompleted { summary } => {
                self.state.status_message = format!(
                    "Done: {} credential(s) in {} of {} file(s) in {:.2}s",
                    summary.total_pairs,
                    summary.files_with_credentials,
                    summary.files_discovered,
                    summary.duration.as_secs_f64()
                );
                self.state.scan_summary = Some(summary);
                self.state.scan_in_progress = false;
                self.state.select_first_hit();
            }
            ScanProgress::Warning { message } => {
                self.state.push_warning(message);
            }
            ScanProgress::Failed { error } => {
                self.state.status_message = format!("Scan failed: {error}");
                self.state.scan_in_progress = false;
            }
            ScanProgress::Cancelled => {
                self.state.status_message = "Scan cancelled.".to_string();
                self.state.scan_in_progress = false;
            }
        }
    }
}

impl eframe::App for SolSleuthApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Kick off the automatic scan of the platform save directories
        // (or the CLI-supplied directory) on the first frame.
        if !self.started {
            self.started = true;
            self.start_scan();
        }

        // Poll for scan progress, bounded per frame.
        let messages = self
            .scan_manager
            .poll_progress(constants::MAX_SCAN_MESSAGES_PER_FRAME);
        let had_messages = !messages.is_empty();
        for msg in messages {
            self.handle_progress(msg);
        }
        // Repaint while a scan is active so progress updates appear promptly.
        if had_messages || self.state.scan_in_progress {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Directory\u{2026}").clicked() {
                        if let Some(path) = rfd::FileDialog::new().pick_folder() {
                            self.state.chosen_dir = Some(path);
                            self.start_scan();
                        }
                        ui.close_menu();
                    }
                    if ui.button("Rescan").clicked() {
                        self.start_scan();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("View", |ui| {
                    let warning_count = self.state.warnings.len();
                    ui.add_enabled_ui(warning_count > 0, |ui| {
                        if ui
                            .button(format!("Warnings ({warning_count})\u{2026}"))
                            .clicked()
                        {
                            self.state.show_warnings = true;
                            ui.close_menu();
                        }
                    });
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.state.status_message);
                if self.state.scan_in_progress {
                    if let Some((done, total)) = self.state.extraction_progress {
                        if total > 0 {
                            ui.add(
                                egui::ProgressBar::new(done as f32 / total as f32)
                                    .desired_width(120.0),
                            );
                        }
                    }
                    // Cancel button visible only while a scan is running.
                    if ui.small_button("Cancel").clicked() {
                        self.scan_manager.cancel_scan();
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(summary) = &self.state.scan_summary {
                        if summary.files_with_errors > 0 || summary.files_incomplete > 0 {
                            ui.label(format!(
                                "{} unreadable, {} incomplete",
                                summary.files_with_errors, summary.files_incomplete
                            ));
                        }
                    }
                });
            });
        });

        // Left sidebar: file list.
        egui::SidePanel::left("file_list")
            .default_width(ui::theme::SIDEBAR_WIDTH)
            .resizable(true)
            .show(ctx, |ui| {
                ui::panels::files::render(ui, &mut self.state);
            });

        // Central panel: credentials for the selected file.
        egui::CentralPanel::default().show(ctx, |ui| {
            ui::panels::credentials::render(ui, &mut self.state);
        });

        // Warnings window.
        let mut show_warnings = self.state.show_warnings;
        egui::Window::new("Warnings")
            .open(&mut show_warnings)
            .default_width(500.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .max_height(300.0)
                    .show(ui, |ui| {
                        for warning in &self.state.warnings {
                            ui.label(warning);
                        }
                    });
            });
        self.state.show_warnings = show_warnings;
    }
}
