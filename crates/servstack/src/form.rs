use crate::modal::{FocusId, Openable};
use strum::{Display as StrumDisplay, EnumIter, IntoEnumIterator};

pub const STATUS_INVALID: &str = "Please complete all required fields.";
pub const STATUS_SENDING: &str = "Sending request...";
pub const STATUS_SENT: &str = "Project request sent! We will reach out shortly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Message,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusKind {
    #[default]
    Neutral,
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormStatus {
    pub message: String,
    pub kind: StatusKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Invalid,
    /// Accepted; the host completes it after its send delay.
    Pending,
    /// A submission is already in flight.
    Busy,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectForm {
    name: String,
    email: String,
    message: String,
    status: FormStatus,
    pending: bool,
    close_requested: bool,
}

impl ProjectForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Message => self.message = value,
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Message => &self.message,
        }
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn invalid_fields(&self) -> Vec<Field> {
        Field::iter().filter(|&f| !self.is_valid(f)).collect()
    }

    fn is_valid(&self, field: Field) -> bool {
        let value = self.value(field).trim();
        match field {
            Field::Email => value
                .split_once('@')
                .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.')),
            _ => !value.is_empty(),
        }
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        if self.pending {
            return SubmitOutcome::Busy;
        }
        if !self.invalid_fields().is_empty() {
            self.set_status(STATUS_INVALID, StatusKind::Error);
            return SubmitOutcome::Invalid;
        }
        self.set_status(STATUS_SENDING, StatusKind::Neutral);
        self.pending = true;
        SubmitOutcome::Pending
    }

    /// Finishes a pending submission: confirms, clears the fields and asks
    /// the host to close.
    pub fn complete_submission(&mut self) {
        if !self.pending {
            return;
        }
        self.pending = false;
        self.set_status(STATUS_SENT, StatusKind::Success);
        self.name.clear();
        self.email.clear();
        self.message.clear();
        self.close_requested = true;
        log::info!("project request submitted");
    }

    fn set_status(&mut self, message: &str, kind: StatusKind) {
        self.status = FormStatus {
            message: message.to_string(),
            kind,
        };
    }
}

impl Openable for ProjectForm {
    fn after_close(&mut self) {
        self.status = FormStatus::default();
    }

    fn initial_focus(&self) -> Option<FocusId> {
        Some(FocusId::new(Field::Name.to_string()))
    }

    fn take_close_request(&mut self) -> bool {
        std::mem::take(&mut self.close_requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::{ModalShell, ScrollLock, ShellAction};

    fn filled() -> ProjectForm {
        let mut form = ProjectForm::new();
        form.set(Field::Name, "Ada");
        form.set(Field::Email, "ada@example.com");
        form.set(Field::Message, "A new site");
        form
    }

    #[test]
    fn test_missing_fields_set_error_status() {
        let mut form = ProjectForm::new();
        form.set(Field::Email, "not-an-email");
        assert_eq!(form.submit(), SubmitOutcome::Invalid);
        assert_eq!(form.status().message, STATUS_INVALID);
        assert_eq!(form.status().kind, StatusKind::Error);
        assert_eq!(form.invalid_fields(), vec![Field::Name, Field::Email, Field::Message]);
    }

    #[test]
    fn test_submission_lifecycle() {
        let mut form = filled();
        assert_eq!(form.submit(), SubmitOutcome::Pending);
        assert_eq!(form.status().message, STATUS_SENDING);
        assert_eq!(form.submit(), SubmitOutcome::Busy);

        form.complete_submission();
        assert_eq!(form.status().kind, StatusKind::Success);
        assert_eq!(form.value(Field::Name), "");
        assert!(form.take_close_request());
        assert!(!form.take_close_request());
    }

    #[test]
    fn test_shell_closes_after_submission_and_clears_status() {
        let mut shell = ModalShell::new(filled(), ScrollLock::default());
        assert_eq!(shell.open(None), Some(FocusId::from("name")));
        shell.content_mut().submit();
        assert_eq!(shell.poll_close_request(), ShellAction::None);

        shell.content_mut().complete_submission();
        assert_eq!(shell.poll_close_request(), ShellAction::Closed { restore: None });
        assert_eq!(shell.content().status(), &FormStatus::default());
    }
}
