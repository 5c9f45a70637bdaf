#[derive(Debug, Clone)]
pub enum AppEvent {
    Open,
    Close,
    Toggle,
    OpenProject,
    ConfigReload,
}
