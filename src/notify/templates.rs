//! Email bodies rendered with Handlebars. Values are HTML escaped by
//! default; `nl2br` escapes first and then turns newlines into `<br>`.

use std::fmt;
use std::sync::LazyLock;

use handlebars::{Handlebars, handlebars_helper, html_escape};

handlebars_helper!(nl2br: |s: str| html_escape(s).replace("\r\n", "\n").replace('\n', "<br>"));

#[derive(Debug, Clone, Copy)]
pub enum EmailTemplate {
    Invitation,
    EventConfirmed,
    OneTimeCode,
}

impl fmt::Display for EmailTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const INVITATION_EMAIL: &str = r#"
<p>{{organizer}} has invited you to <strong>{{title}}</strong>.</p>
<p>Proposed window: {{window_start}} to {{window_end}}</p>
<p><a href="{{respond_url}}">Let us know when you are available</a>.</p>
"#;

const EVENT_CONFIRMED_EMAIL: &str = r#"
<p>The following event has been scheduled.</p>
<p><strong>{{title}}</strong><br>{{starts_at}}</p>
{{#if custom_message}}<p>{{{nl2br custom_message}}}</p>
{{/if}}<p>We look forward to seeing you there.</p>
"#;

const ONE_TIME_CODE_EMAIL: &str = r#"
<p>Welcome to Smart Event Planner!</p>
<p>Enter the code below to confirm your address. It is valid for {{expiry_minutes}} minutes.</p>
<h2>{{code}}</h2>
"#;

static REGISTRY: LazyLock<Handlebars<'static>> = LazyLock::new(|| {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_helper("nl2br", Box::new(nl2br));
    for (template, source) in [
        (EmailTemplate::Invitation, INVITATION_EMAIL),
        (EmailTemplate::EventConfirmed, EVENT_CONFIRMED_EMAIL),
        (EmailTemplate::OneTimeCode, ONE_TIME_CODE_EMAIL),
    ] {
        registry
            .register_template_string(&template.to_string(), source)
            .expect("Failed to register template");
    }
    registry
});

/// Shared registry holding every email template
pub fn templates() -> &'static Handlebars<'static> {
    &REGISTRY
}
