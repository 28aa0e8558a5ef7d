use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use super::{Level, Phase};
use crate::schema::FeatureKind;

const MAX_LOG_ENTRIES: usize = 200;

/// Where one feature kind stands in the current run
#[derive(Debug, Clone, PartialEq)]
pub enum KindState {
    Pending,
    Missing,
    Found,
    Ingesting { written: u64, total: u64 },
    Done { rows: u64 },
    Failed,
}

impl KindState {
    pub fn label(&self) -> String {
        match self {
            KindState::Pending => "pending".into(),
            KindState::Missing => "no file".into(),
            KindState::Found => "queued".into(),
            KindState::Ingesting { written, total } => format!("{written}/{total}"),
            KindState::Done { .. } => "done".into(),
            KindState::Failed => "rolled back".into(),
        }
    }
}

/// Dashboard state for one world import
#[derive(Debug, Clone)]
pub struct Board {
    pub phase: Phase,
    pub world: String,
    pub world_id: Option<String>,
    /// Canvas width, height and meters per pixel once reconciled
    pub canvas: Option<(u32, u32, f64)>,
    pub kinds: Vec<(FeatureKind, KindState)>,
    pub current_file: Option<(FeatureKind, PathBuf)>,
    pub log: VecDeque<(Level, String)>,
}

impl Board {
    pub fn new(world: &str, kinds: &[FeatureKind]) -> Self {
        Self {
            phase: Phase::Discovering,
            world: world.to_string(),
            world_id: None,
            canvas: None,
            kinds: kinds.iter().map(|&k| (k, KindState::Pending)).collect(),
            current_file: None,
            log: VecDeque::new(),
        }
    }

    pub fn state(&self, kind: FeatureKind) -> Option<&KindState> {
        self.kinds.iter().find(|(k, _)| *k == kind).map(|(_, s)| s)
    }

    pub fn set_state(&mut self, kind: FeatureKind, state: KindState) {
        if let Some(slot) = self.kinds.iter_mut().find(|(k, _)| *k == kind) {
            slot.1 = state;
        }
    }

    pub fn start_file(&mut self, kind: FeatureKind, path: &Path, features: usize) {
        self.current_file = Some((kind, path.to_path_buf()));
        self.set_state(
            kind,
            KindState::Ingesting {
                written: 0,
                total: features as u64,
            },
        );
    }

    pub fn finish_file(&mut self, kind: FeatureKind, state: KindState) {
        if matches!(&self.current_file, Some((k, _)) if *k == kind) {
            self.current_file = None;
        }
        self.set_state(kind, state);
    }

    /// Rows committed so far across all kinds
    pub fn committed_rows(&self) -> u64 {
        self.kinds
            .iter()
            .map(|(_, s)| match s {
                KindState::Done { rows } => *rows,
                _ => 0,
            })
            .sum()
    }

    pub fn push_log(&mut self, level: Level, message: String) {
        self.log.push_back((level, message));
        while self.log.len() > MAX_LOG_ENTRIES {
            self.log.pop_front();
        }
    }
}
