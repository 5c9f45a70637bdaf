use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

pub struct ThemeColors {
    pub backdrop: Srgba<f64>,
    pub item: Srgba<f64>,
    pub active: Srgba<f64>,
    pub focus: Srgba<f64>,
    pub text: Srgba<f64>,
    pub rail: Srgba<f64>,
    pub card: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        let lookup = |name, fallback, alpha| Self::lookup_color(context, name, fallback, alpha);
        Self {
            backdrop: lookup("theme_bg_color", Srgba::new(0.06, 0.06, 0.08, 0.92), Some(0.92)),
            item: lookup("theme_base_color", Srgba::new(0.16, 0.16, 0.2, 0.9), Some(0.9)),
            active: lookup("accent_bg_color", Srgba::new(0.35, 0.4, 0.95, 1.0), None),
            focus: lookup("accent_color", Srgba::new(0.6, 0.7, 1.0, 1.0), None),
            text: lookup("theme_fg_color", Srgba::new(0.95, 0.95, 0.97, 1.0), None),
            rail: lookup("borders", Srgba::new(1.0, 1.0, 1.0, 0.12), Some(0.25)),
            card: lookup("card_bg_color", Srgba::new(0.12, 0.12, 0.15, 0.98), Some(0.98)),
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                Srgba::new(
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    alpha_override.unwrap_or(c.alpha() as f64),
                )
            })
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    provider.load_from_data(
        "
.servstack-window, .servstack-drawing-area {
    background: none;
    background-color: transparent;
}
",
    );

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
