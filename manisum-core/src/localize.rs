use fluent_bundle::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use unic_langid::LanguageIdentifier;

/// Turns a message id plus named arguments into user-facing text.
pub trait Localizer {
    fn msg(&self, code: &str, args: &[(&str, &str)]) -> String;
}

/// Simple Fluent-based localizer with built-in resources.
pub struct FluentLoc {
    bundle: FluentBundle<FluentResource>,
}

impl FluentLoc {
    /// Create a localizer using built-in `.ftl` strings (see ../i18n).
    pub fn builtin(lang: &str) -> Self {
        // Unparseable tags fall back to the undetermined language.
        let langid: LanguageIdentifier = lang.parse().unwrap_or_default();

        let ftl_src = match lang {
            "en-GB" | "en" => include_str!("../i18n/en-GB.ftl"),
            _ => include_str!("../i18n/en-GB.ftl"),
        };

        let res =
            FluentResource::try_new(ftl_src.to_owned()).expect("invalid FTL resource (en-GB.ftl)");

        let mut bundle = FluentBundle::new(vec![langid]);
        // Paths end up inside messages; keep them free of bidi isolation marks.
        bundle.set_use_isolating(false);
        bundle.add_resource(res).expect("failed to add FTL resource");
        Self { bundle }
    }
}

impl Default for FluentLoc {
    fn default() -> Self {
        Self::builtin("en-GB")
    }
}

impl Localizer for FluentLoc {
    /// Returns the code itself if not found.
    fn msg(&self, code: &str, args: &[(&str, &str)]) -> String {
        let Some(msg) = self.bundle.get_message(code) else {
            return code.to_string();
        };
        let Some(pattern) = msg.value() else {
            return code.to_string();
        };

        let mut fa = FluentArgs::new();
        for (k, v) in args {
            fa.set(*k, FluentValue::from(*v));
        }

        let mut errs = vec![];
        let s = self.bundle.format_pattern(pattern, Some(&fa), &mut errs).to_string();

        if errs.is_empty() {
            s
        } else {
            code.to_string()
        }
    }
}

/// A no-op localizer you can use in tests.
pub struct NoopLoc;

impl Localizer for NoopLoc {
    fn msg(&self, code: &str, _args: &[(&str, &str)]) -> String {
        code.to_string()
    }
}
