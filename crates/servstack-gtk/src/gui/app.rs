use crate::config::{self, Config};
use crate::events::AppEvent;
use crate::gui::form::{FormMsg, ProjectFormModel};
use crate::gui::stack::{self, CairoSurface, DetailHit};
use crate::gui::theme::{self, ThemeColors};
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use relm4::{ComponentController, Controller};
use servstack::gesture::{NavKey, PointerId};
use servstack::modal::{FocusId, ModalShell, ScrollLock, ShellAction};
use servstack::render::Surface;
use servstack::{InputEvent, LoopingStackSelector};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub type StackModal = ModalShell<LoopingStackSelector<CairoSurface>>;

const MOUSE: PointerId = PointerId(0);
const STACK_FOCUS: &str = "services-stack";
const CLOSE_FOCUS: &str = "detail-close";

pub struct AppModel {
    pub shell: Rc<RefCell<StackModal>>,
    pub visible: bool,
    pub drawing_area: gtk::DrawingArea,
    form: Controller<ProjectFormModel>,
    focus: Option<FocusId>,
}

#[derive(Debug)]
pub enum AppMsg {
    Open,
    Close,
    Toggle,
    OpenProject,
    Key(NavKey, bool),
    Wheel(f64),
    DragBegin(f64),
    DragUpdate(f64),
    DragEnd(f64),
    DragCancel,
    Click(f64, f64),
    Resized(f64, f64),
    Settled,
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Open => AppMsg::Open,
            AppEvent::Close => AppMsg::Close,
            AppEvent::Toggle => AppMsg::Toggle,
            AppEvent::OpenProject => AppMsg::OpenProject,
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (Config, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Services"),
            set_default_width: 960,
            set_default_height: 640,
            #[watch]
            set_visible: model.visible,
            add_css_class: "servstack-window",

            connect_close_request[sender] => move |_| {
                sender.input(AppMsg::Close);
                glib::Propagation::Stop
            },

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, modifiers| {
                    let Some(nav) = key.name().and_then(|name| name.as_str().parse::<NavKey>().ok()) else {
                        return glib::Propagation::Proceed;
                    };
                    let shift = modifiers.contains(gtk::gdk::ModifierType::SHIFT_MASK);
                    sender.input(AppMsg::Key(nav, shift));
                    glib::Propagation::Stop
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                set_focusable: true,
                add_css_class: "servstack-drawing-area",

                connect_resize[sender] => move |_, width, height| {
                    sender.input(AppMsg::Resized(width as f64, height as f64));
                },

                add_controller = gtk::EventControllerScroll::new(gtk::EventControllerScrollFlags::VERTICAL) {
                    connect_scroll[sender] => move |_, _, dy| {
                        sender.input(AppMsg::Wheel(dy));
                        glib::Propagation::Stop
                    }
                },

                add_controller = gtk::GestureDrag::new() {
                    connect_drag_begin[sender] => move |_, _, y| {
                        sender.input(AppMsg::DragBegin(y));
                    },
                    connect_drag_update[sender] => move |gesture, _, dy| {
                        if let Some((_, y)) = gesture.start_point() {
                            sender.input(AppMsg::DragUpdate(y + dy));
                        }
                    },
                    connect_drag_end[sender] => move |gesture, _, dy| {
                        if let Some((_, y)) = gesture.start_point() {
                            sender.input(AppMsg::DragEnd(y + dy));
                        }
                    },
                    connect_cancel[sender] => move |_, _| {
                        sender.input(AppMsg::DragCancel);
                    }
                },

                add_controller = gtk::GestureClick {
                    connect_released[sender] => move |_, _, x, y| {
                        sender.input(AppMsg::Click(x, y));
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (config, rx) = init;

        theme::load_css();

        let selector = LoopingStackSelector::new(
            CairoSurface::new(config.stack.transition()),
            servstack::catalogue(&config.services),
            config.stack.clone(),
        );
        let mut shell = ModalShell::new(selector, ScrollLock::global());
        shell.set_focusables(vec![FocusId::from(STACK_FOCUS), FocusId::from(CLOSE_FOCUS)]);

        let model = AppModel {
            shell: Rc::new(RefCell::new(shell)),
            visible: false,
            drawing_area: gtk::DrawingArea::default(),
            form: ProjectFormModel::builder().launch(()).detach(),
            focus: None,
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let shell_draw = model.shell.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, _, _| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                if let Err(e) = stack::draw(cr, shell_draw.borrow().content(), &colors, Instant::now()) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let shell_tick = model.shell.clone();
        let tick_sender = sender.clone();
        widgets
            .drawing_area
            .add_tick_callback(move |drawing_area, _| {
                let frame = shell_tick
                    .borrow_mut()
                    .content_mut()
                    .surface_mut()
                    .advance(Instant::now());
                if frame.redraw {
                    drawing_area.queue_draw();
                }
                if frame.settled {
                    tick_sender.input(AppMsg::Settled);
                }
                glib::ControlFlow::Continue
            });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        root.set_visible(false);

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        let now = Instant::now();
        match msg {
            AppMsg::Open => self.open(),
            AppMsg::Close => self.close(),
            AppMsg::Toggle => {
                if self.visible {
                    self.close();
                } else {
                    self.open();
                }
            }
            AppMsg::OpenProject => self.form.emit(FormMsg::Open),
            AppMsg::Key(key, shift) => self.key(key, shift, now),
            AppMsg::Wheel(dy) => self.dispatch(
                InputEvent::Wheel {
                    delta_y: dy * stack::WHEEL_STEP_PIXELS,
                },
                now,
            ),
            AppMsg::DragBegin(y) => self.dispatch(InputEvent::PointerDown { pointer: MOUSE, y }, now),
            AppMsg::DragUpdate(y) => self.dispatch(InputEvent::PointerMove { pointer: MOUSE, y }, now),
            AppMsg::DragEnd(y) => self.dispatch(InputEvent::PointerUp { pointer: MOUSE, y }, now),
            AppMsg::DragCancel => self.dispatch(InputEvent::PointerCancel { pointer: MOUSE }, now),
            AppMsg::Click(x, y) => self.click(x, y, now),
            AppMsg::Resized(width, height) => {
                self.shell
                    .borrow_mut()
                    .content_mut()
                    .surface_mut()
                    .set_viewport(width, height);
                self.dispatch(InputEvent::Resized, now);
            }
            AppMsg::Settled => self.shell.borrow_mut().content_mut().transition_end(),
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    let mut shell = self.shell.borrow_mut();
                    let stack = shell.content_mut();
                    stack
                        .surface_mut()
                        .set_transition(new_config.stack.transition());
                    stack.rebuild(servstack::catalogue(&new_config.services), new_config.stack);
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
        self.drawing_area.queue_draw();
    }
}

impl AppModel {
    fn open(&mut self) {
        let target = self.shell.borrow_mut().open(self.focus.clone());
        if let Some(target) = target {
            self.visible = true;
            self.focus = Some(target);
            self.drawing_area.grab_focus();
            log::info!("services stack opened");
        }
    }

    fn close(&mut self) {
        let restore = self.shell.borrow_mut().close();
        if let Some(restore) = restore {
            self.visible = false;
            self.focus = restore;
            log::info!("services stack closed");
        }
    }

    fn current_focus(&self) -> FocusId {
        if self.shell.borrow().content().surface().close_focused() {
            FocusId::from(CLOSE_FOCUS)
        } else {
            FocusId::from(STACK_FOCUS)
        }
    }

    fn key(&mut self, key: NavKey, shift: bool, now: Instant) {
        let current = self.current_focus();
        if current.as_str() == CLOSE_FOCUS && matches!(key, NavKey::Enter | NavKey::Space) {
            self.dispatch(InputEvent::DetailCloseClicked, now);
            return;
        }
        let action = self
            .shell
            .borrow_mut()
            .handle_key(key, shift, Some(&current), now);
        self.apply(action);
    }

    fn dispatch(&mut self, event: InputEvent, now: Instant) {
        let action = {
            let mut shell = self.shell.borrow_mut();
            shell.content_mut().handle(event, now);
            shell.poll_close_request()
        };
        self.apply(action);
    }

    fn click(&mut self, x: f64, y: f64, now: Instant) {
        let event = {
            let shell = self.shell.borrow();
            let stack = shell.content();
            let surface = stack.surface();
            match surface.detail_hit(x, y) {
                Some(DetailHit::CloseButton) => Some(InputEvent::DetailCloseClicked),
                Some(DetailHit::Backdrop) => Some(InputEvent::DetailBackdropClicked),
                Some(DetailHit::Card) => return,
                None if surface.track_column().contains(x, y) => {
                    match stack.hit_test_at(surface.to_track_y(y), surface.translation()) {
                        Some(virtual_index) => Some(InputEvent::ItemActivated(virtual_index)),
                        None => return,
                    }
                }
                None => None,
            }
        };

        match event {
            Some(event) => self.dispatch(event, now),
            None => {
                let action = self.shell.borrow_mut().backdrop_click();
                self.apply(action);
            }
        }
    }

    fn apply(&mut self, action: ShellAction) {
        match action {
            ShellAction::Closed { restore } => {
                self.visible = false;
                self.focus = restore;
                log::info!("services stack closed");
            }
            ShellAction::MoveFocus(target) => {
                let mut shell = self.shell.borrow_mut();
                let stack = shell.content_mut();
                if target.as_str() == CLOSE_FOCUS && stack.detail_open() {
                    stack.surface_mut().focus_detail_close(Duration::ZERO);
                } else if let Some(current) = stack.current_virtual_index() {
                    stack.surface_mut().focus_item(current);
                }
            }
            ShellAction::Consumed | ShellAction::None => {}
        }
    }
}
