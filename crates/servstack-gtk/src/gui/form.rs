use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use servstack::form::{Field, ProjectForm, StatusKind, SubmitOutcome};
use servstack::gesture::NavKey;
use servstack::modal::{FocusId, ModalShell, ScrollLock, ShellAction};
use std::time::{Duration, Instant};
use strum::IntoEnumIterator;

// simulated send before the confirmation
const SEND_DELAY: Duration = Duration::from_millis(600);

fn field_for(target: &FocusId) -> Option<Field> {
    Field::iter().find(|field| field.to_string() == target.as_str())
}

pub struct ProjectFormModel {
    shell: ModalShell<ProjectForm>,
    visible: bool,
    entries: Vec<(Field, gtk::Entry)>,
}

#[derive(Debug)]
pub enum FormMsg {
    Open,
    Close,
    Edit(Field, String),
    Submit,
    Sent,
    Key(NavKey),
}

impl ProjectFormModel {
    fn status_classes(&self) -> &'static [&'static str] {
        match self.shell.content().status().kind {
            StatusKind::Neutral => &["form-status"],
            StatusKind::Error => &["form-status", "error"],
            StatusKind::Success => &["form-status", "success"],
        }
    }

    fn focus(&self, target: &FocusId) {
        let Some(field) = field_for(target) else {
            return;
        };
        if let Some((_, entry)) = self.entries.iter().find(|(f, _)| *f == field) {
            entry.grab_focus();
        }
    }

    fn apply(&mut self, action: ShellAction) {
        if let ShellAction::Closed { .. } = action {
            self.visible = false;
            log::debug!("project form closed");
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for ProjectFormModel {
    type Init = ();
    type Input = FormMsg;
    type Output = ();

    view! {
        #[root]
        gtk::Window {
            set_title: Some("Start a project"),
            set_default_width: 420,
            set_modal: true,
            #[watch]
            set_visible: model.visible,

            connect_close_request[sender] => move |_| {
                sender.input(FormMsg::Close);
                glib::Propagation::Stop
            },

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(FormMsg::Key(NavKey::Escape));
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_spacing: 12,
                set_margin_top: 24,
                set_margin_bottom: 24,
                set_margin_start: 24,
                set_margin_end: 24,

                #[name = "name_entry"]
                gtk::Entry {
                    set_placeholder_text: Some("Name"),
                    connect_changed[sender] => move |entry| {
                        sender.input(FormMsg::Edit(Field::Name, entry.text().to_string()));
                    }
                },

                #[name = "email_entry"]
                gtk::Entry {
                    set_placeholder_text: Some("Email"),
                    set_input_purpose: gtk::InputPurpose::Email,
                    connect_changed[sender] => move |entry| {
                        sender.input(FormMsg::Edit(Field::Email, entry.text().to_string()));
                    }
                },

                #[name = "message_entry"]
                gtk::Entry {
                    set_placeholder_text: Some("Tell us about your project"),
                    connect_changed[sender] => move |entry| {
                        sender.input(FormMsg::Edit(Field::Message, entry.text().to_string()));
                    }
                },

                gtk::Label {
                    set_xalign: 0.0,
                    set_wrap: true,
                    #[watch]
                    set_label: &model.shell.content().status().message,
                    #[watch]
                    set_css_classes: model.status_classes(),
                },

                gtk::Button {
                    set_label: "Send request",
                    #[watch]
                    set_sensitive: !model.shell.content().is_pending(),
                    connect_clicked => FormMsg::Submit,
                }
            }
        }
    }

    fn init(
        _init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let model = ProjectFormModel {
            shell: ModalShell::new(ProjectForm::new(), ScrollLock::global()),
            visible: false,
            entries: Vec::new(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.entries = vec![
            (Field::Name, widgets.name_entry.clone()),
            (Field::Email, widgets.email_entry.clone()),
            (Field::Message, widgets.message_entry.clone()),
        ];

        root.set_visible(false);

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            FormMsg::Open => {
                if let Some(target) = self.shell.open(None) {
                    self.visible = true;
                    self.focus(&target);
                }
            }
            FormMsg::Close => {
                if self.shell.close().is_some() {
                    self.visible = false;
                }
            }
            FormMsg::Edit(field, value) => self.shell.content_mut().set(field, value),
            FormMsg::Submit => match self.shell.content_mut().submit() {
                SubmitOutcome::Pending => {
                    relm4::spawn_local(async move {
                        glib::timeout_future(SEND_DELAY).await;
                        sender.input(FormMsg::Sent);
                    });
                }
                SubmitOutcome::Invalid => {
                    let first = self.shell.content().invalid_fields().first().copied();
                    if let Some(field) = first {
                        self.focus(&FocusId::new(field.to_string()));
                    }
                }
                SubmitOutcome::Busy => {}
            },
            FormMsg::Sent => {
                self.shell.content_mut().complete_submission();
                for (_, entry) in &self.entries {
                    entry.set_text("");
                }
                let action = self.shell.poll_close_request();
                self.apply(action);
            }
            FormMsg::Key(key) => {
                let action = self.shell.handle_key(key, false, None, Instant::now());
                self.apply(action);
            }
        }
    }
}
