//! Which screen is showing and which sheets are open.
//!
//! Pure state: no I/O, no clocks. The controller feeds it user intents and
//! session outcomes; anything not legal from the current state is refused
//! with a [`TransitionError`] and leaves the state untouched.

use crate::models::view_types::{LoadingKind, Notice, ViewStep};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {intent} while {state}")]
pub struct TransitionError {
    pub intent: &'static str,
    pub state: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub step: ViewStep,
    pub upload_options_open: bool,
    pub alternatives_open: bool,
    pub custom_input: String,
    pub notices: Vec<Notice>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            step: ViewStep::Upload,
            upload_options_open: false,
            alternatives_open: false,
            custom_input: String::new(),
            notices: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ViewStateMachine {
    state: ViewState,
}

impl ViewStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn step(&self) -> ViewStep {
        self.state.step
    }

    fn describe(&self) -> &'static str {
        match self.state.step {
            ViewStep::Upload if self.state.upload_options_open => "choosing an upload option",
            ViewStep::Upload => "on the upload screen",
            ViewStep::Loading(LoadingKind::Analyzing) => "analyzing an image",
            ViewStep::Loading(LoadingKind::Updating) => "updating the product",
            ViewStep::Result if self.state.alternatives_open => "choosing an alternative",
            ViewStep::Result => "showing a result",
        }
    }

    fn refuse(&self, intent: &'static str) -> TransitionError {
        let err = TransitionError {
            intent,
            state: self.describe(),
        };
        tracing::debug!(%err, "Rejected view intent");
        err
    }

    pub fn open_upload_options(&mut self) -> Result<(), TransitionError> {
        if self.state.step != ViewStep::Upload {
            return Err(self.refuse("open upload options"));
        }
        self.state.upload_options_open = true;
        Ok(())
    }

    pub fn close_upload_options(&mut self) -> Result<(), TransitionError> {
        if self.state.step != ViewStep::Upload {
            return Err(self.refuse("close upload options"));
        }
        self.state.upload_options_open = false;
        Ok(())
    }

    /// Checks a selection may be made right now, without changing anything.
    pub fn can_begin_submit(&self) -> Result<(), TransitionError> {
        if self.state.step == ViewStep::Upload && self.state.upload_options_open {
            Ok(())
        } else {
            Err(self.refuse("submit an image"))
        }
    }

    /// A capture or file pick produced an image.
    pub fn begin_submit(&mut self) -> Result<(), TransitionError> {
        self.can_begin_submit()?;
        self.state.upload_options_open = false;
        self.state.step = ViewStep::Loading(LoadingKind::Analyzing);
        Ok(())
    }

    /// The selection could not be used; the sheet stays open for another try.
    pub fn selection_rejected(&mut self, notice: Notice) -> Result<(), TransitionError> {
        self.can_begin_submit()?;
        self.state.notices.push(notice);
        Ok(())
    }

    pub fn submit_succeeded(&mut self) -> Result<(), TransitionError> {
        if self.state.step != ViewStep::Loading(LoadingKind::Analyzing) {
            return Err(self.refuse("show a fresh result"));
        }
        self.state.step = ViewStep::Result;
        self.state.alternatives_open = false;
        Ok(())
    }

    pub fn submit_failed(&mut self) -> Result<(), TransitionError> {
        if self.state.step != ViewStep::Loading(LoadingKind::Analyzing) {
            return Err(self.refuse("report a failed analysis"));
        }
        self.state.step = ViewStep::Upload;
        self.state.notices.push(Notice::submit_failed());
        Ok(())
    }

    pub fn open_alternatives(&mut self) -> Result<(), TransitionError> {
        if self.state.step != ViewStep::Result {
            return Err(self.refuse("open alternatives"));
        }
        self.state.alternatives_open = true;
        Ok(())
    }

    pub fn close_alternatives(&mut self) -> Result<(), TransitionError> {
        if self.state.step != ViewStep::Result {
            return Err(self.refuse("close alternatives"));
        }
        self.state.alternatives_open = false;
        Ok(())
    }

    pub fn set_custom_input(&mut self, text: String) -> Result<(), TransitionError> {
        if self.state.step != ViewStep::Result {
            return Err(self.refuse("edit the product name"));
        }
        self.state.custom_input = text;
        Ok(())
    }

    pub fn begin_correction(&mut self) -> Result<(), TransitionError> {
        if self.state.step != ViewStep::Result || !self.state.alternatives_open {
            return Err(self.refuse("correct the product"));
        }
        self.state.alternatives_open = false;
        self.state.step = ViewStep::Loading(LoadingKind::Updating);
        Ok(())
    }

    pub fn correction_succeeded(&mut self) -> Result<(), TransitionError> {
        if self.state.step != ViewStep::Loading(LoadingKind::Updating) {
            return Err(self.refuse("show a corrected result"));
        }
        self.state.step = ViewStep::Result;
        self.state.alternatives_open = false;
        Ok(())
    }

    /// Back to the result with the alternatives sheet reopened, so the user
    /// can pick again without losing context.
    pub fn correction_failed(&mut self) -> Result<(), TransitionError> {
        if self.state.step != ViewStep::Loading(LoadingKind::Updating) {
            return Err(self.refuse("report a failed correction"));
        }
        self.state.step = ViewStep::Result;
        self.state.alternatives_open = true;
        self.state.notices.push(Notice::correction_failed());
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), TransitionError> {
        if self.state.step != ViewStep::Result {
            return Err(self.refuse("start over"));
        }
        self.state = ViewState {
            notices: std::mem::take(&mut self.state.notices),
            ..ViewState::default()
        };
        Ok(())
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.state.notices)
    }
}
