//! The acceptance gate: one fetch outcome moves it out of `Loading`, the
//! checkbox arms the accept control, and the accept control fires the host
//! callback.

use super::blocks::{BlockRules, RenderedSection};
use super::error::TouError;
use super::model::TouRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTou {
    pub version: Option<i64>,
    pub sections: Vec<RenderedSection>,
    pub agreement_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Loading,
    Loaded(LoadedTou),
    /// Holds the one-line message shown above the continue-anyway control.
    Failed(String),
}

pub struct TouGate {
    state: GateState,
    agreed: bool,
    rules: BlockRules,
    default_agreement: String,
    on_accept: Box<dyn FnMut()>,
}

impl TouGate {
    pub fn new(
        rules: BlockRules,
        default_agreement: impl Into<String>,
        on_accept: impl FnMut() + 'static,
    ) -> Self {
        Self {
            state: GateState::Loading,
            agreed: false,
            rules,
            default_agreement: default_agreement.into(),
            on_accept: Box::new(on_accept),
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn agreed(&self) -> bool {
        self.agreed
    }

    /// Version of the loaded document, if the backend reported one.
    pub fn document_version(&self) -> Option<i64> {
        match &self.state {
            GateState::Loaded(loaded) => loaded.version,
            _ => None,
        }
    }

    /// Applies the fetch outcome. Only the first call while `Loading` has an
    /// effect; later outcomes are ignored and `false` is returned.
    pub fn resolve(&mut self, outcome: Result<TouRecord, TouError>) -> bool {
        if !matches!(self.state, GateState::Loading) {
            log::warn!("[Gate] Ignoring fetch outcome, gate already resolved");
            return false;
        }

        self.state = match outcome {
            Ok(record) => {
                let sections = self.rules.render_document(&record.content);
                let agreement_text = record
                    .content
                    .agreement_text_or(&self.default_agreement)
                    .to_string();
                log::info!(
                    "[Gate] Loaded TOU version {:?} with {} sections",
                    record.version,
                    sections.len()
                );
                GateState::Loaded(LoadedTou {
                    version: record.version,
                    sections,
                    agreement_text,
                })
            }
            Err(err) => {
                log::error!("[Gate] Failed to load TOU: {}", err);
                GateState::Failed(err.to_string())
            }
        };
        true
    }

    /// Checkbox change. Only the loaded document has a checkbox.
    pub fn set_agreed(&mut self, agreed: bool) {
        if matches!(self.state, GateState::Loaded(_)) {
            self.agreed = agreed;
        }
    }

    pub fn can_accept(&self) -> bool {
        match self.state {
            GateState::Loading => false,
            GateState::Loaded(_) => self.agreed,
            GateState::Failed(_) => true,
        }
    }

    /// One click on the accept control. Fires the callback once when the
    /// control is enabled and reports whether it fired.
    pub fn accept(&mut self) -> bool {
        if !self.can_accept() {
            log::debug!("[Gate] Accept ignored in current state");
            return false;
        }
        if let GateState::Failed(_) = self.state {
            log::warn!("[Gate] Continuing without a loaded TOU");
        }
        (self.on_accept)();
        true
    }
}
