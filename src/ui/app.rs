//! Terminal dashboard for `import --tui`

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::path::Path;
use std::time::Duration;

use super::board::{Board, KindState};
use super::{components, Level, Phase, Ui};
use crate::error::ImportError;
use crate::import::ImportReport;
use crate::metadata::MapMetadata;
use crate::schema::FeatureKind;
use crate::writer::WorldHandle;

pub struct UiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    board: Board,
}

impl UiApp {
    /// Enter the alternate screen with one row per selected kind
    pub fn new(world: &str, kinds: &[FeatureKind]) -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            board: Board::new(world, kinds),
        })
    }

    fn draw(&mut self) {
        let board = &self.board;
        let kind_rows = board.kinds.len() as u16 + 3;

        // A failed draw only loses one frame.
        let _ = self.terminal.draw(|frame| {
            let [status, kinds, gauge, activity] = Layout::vertical([
                Constraint::Length(5),
                Constraint::Length(kind_rows),
                Constraint::Length(3),
                Constraint::Min(5),
            ])
            .areas(frame.area());

            components::render_status(frame, status, board);
            components::render_kinds(frame, kinds, board);
            components::render_file_gauge(frame, gauge, board);
            components::render_activity(frame, activity, board);
        });
    }

    /// Show how the run ended and wait for a key before leaving the screen
    pub fn finish(mut self, outcome: std::result::Result<&ImportReport, &ImportError>) -> Result<()> {
        match outcome {
            Ok(report) if report.world_id.is_none() => {
                self.board.phase = Phase::Complete;
                self.board
                    .push_log(Level::Warn, format!("Nothing to import for world '{}'", report.world));
            }
            Ok(report) => {
                self.board.phase = Phase::Complete;
                self.board.push_log(
                    Level::Info,
                    format!(
                        "Imported {} features in {:.1}s",
                        report.total(),
                        report.elapsed.as_secs_f64()
                    ),
                );
            }
            Err(e) => {
                self.board.phase = Phase::Failed;
                self.board.push_log(Level::Warn, format!("Import failed: {e}"));
            }
        }
        self.board
            .push_log(Level::Info, "Press any key to exit...".into());
        self.draw();

        loop {
            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    return Ok(());
                }
            }
        }
    }
}

impl Ui for UiApp {
    fn set_phase(&mut self, phase: Phase) {
        self.board.phase = phase;
        self.draw();
    }

    fn log(&mut self, level: Level, message: impl Into<String>) {
        self.board.push_log(level, message.into());
        self.draw();
    }

    fn kind_found(&mut self, kind: FeatureKind, _path: &Path) {
        self.board.set_state(kind, KindState::Found);
        self.draw();
    }

    fn kind_missing(&mut self, kind: FeatureKind, expected: &Path) {
        self.board.set_state(kind, KindState::Missing);
        self.warn(format!("No {} file at {}", kind, expected.display()));
    }

    fn metadata_ready(&mut self, metadata: &MapMetadata) {
        self.board.canvas = Some((
            metadata.width_pixels,
            metadata.height_pixels,
            metadata.meters_per_pixel,
        ));
        self.info(format!("Wrote {}", metadata.artifact_path().display()));
    }

    fn world_resolved(&mut self, world: &WorldHandle) {
        self.board.world_id = Some(world.id.clone());
        self.draw();
    }

    fn file_started(&mut self, kind: FeatureKind, path: &Path, features: usize) {
        self.board.start_file(kind, path, features);
        self.draw();
    }

    fn rows_written(&mut self, kind: FeatureKind, written: u64, total: u64) {
        self.board
            .set_state(kind, KindState::Ingesting { written, total });
        self.draw();
    }

    fn file_finished(&mut self, kind: FeatureKind, rows: u64) {
        self.board.finish_file(kind, KindState::Done { rows });
        self.draw();
    }

    fn file_failed(&mut self, kind: FeatureKind, error: &ImportError) {
        self.board.finish_file(kind, KindState::Failed);
        self.warn(format!("{kind}: {error}"));
    }
}

impl Drop for UiApp {
    fn drop(&mut self) {
        terminal::disable_raw_mode().ok();
        self.terminal
            .backend_mut()
            .execute(LeaveAlternateScreen)
            .ok();
        self.terminal.show_cursor().ok();
    }
}
