//! In-page execution of planned actions.
//!
//! Every action becomes one script evaluated by the driver; a script
//! returning anything but `true` counts as failure. Targets may be CSS
//! selectors or element text, the scripts try both.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use page_driver::PageDriver;
use page_model::{ActionKind, ActionPlan};

/// Click a target given as selector or text. Tries the selector, then a
/// text scan across clickable elements, then common submit controls.
const CLICK_JS: &str = r#"
(function(target) {
    function visible(el) {
        return el && el.offsetParent !== null;
    }
    function bySelector(sel) {
        try { return document.querySelector(sel); } catch (e) { return null; }
    }
    function byText(text) {
        const wanted = text.trim().toLowerCase();
        if (!wanted) return null;
        const candidates = document.querySelectorAll(
            'a, button, [role="button"], [role="link"], input[type="submit"]');
        for (const el of candidates) {
            const label = (el.textContent || el.value || '').trim().toLowerCase();
            if (visible(el) && label && (label === wanted || label.includes(wanted))) {
                return el;
            }
        }
        return null;
    }
    let element = bySelector(target);
    if (!visible(element)) element = byText(target);
    if (!visible(element)) {
        const alternatives = [
            'input[type="submit"]',
            'button[type="submit"]',
            'button[aria-label*="search" i]',
            '[role="button"]'
        ];
        for (const alt of alternatives) {
            element = bySelector(alt);
            if (visible(element)) break;
        }
    }
    if (!visible(element)) return false;

    element.scrollIntoView({behavior: 'instant', block: 'center'});
    try {
        element.click();
    } catch (e) {
        element.dispatchEvent(new MouseEvent('click', {
            view: window, bubbles: true, cancelable: true
        }));
    }
    return true;
})(%TARGET%)
"#;

/// Fill an input and submit: set the value, fire input/change, submit the
/// enclosing form or fall back to Enter key events.
const TYPE_JS: &str = r#"
(function(target, value) {
    function visible(el) {
        return el && el.offsetParent !== null;
    }
    function bySelector(sel) {
        try { return document.querySelector(sel); } catch (e) { return null; }
    }
    let element = bySelector(target);
    if (!visible(element)) {
        const fallbacks = [
            'input[name="q"]', 'textarea[name="q"]', '#APjFqb',
            'input[type="text"]', 'textarea',
            'input[aria-label*="search" i]', 'textarea[aria-label*="search" i]'
        ];
        for (const sel of fallbacks) {
            element = bySelector(sel);
            if (visible(element)) break;
        }
    }
    if (!visible(element)) return false;

    element.focus();
    element.value = '';
    element.value = value;
    element.dispatchEvent(new Event('input', { bubbles: true }));
    element.dispatchEvent(new Event('change', { bubbles: true }));

    const form = element.closest('form');
    if (form) {
        form.submit();
        return true;
    }
    for (const kind of ['keydown', 'keyup']) {
        element.dispatchEvent(new KeyboardEvent(kind, {
            key: 'Enter', code: 'Enter', keyCode: 13, which: 13, bubbles: true
        }));
    }
    return true;
})(%TARGET%, %VALUE%)
"#;

/// Scroll by direction, or bring a selector target into view.
const SCROLL_JS: &str = r#"
(function(target) {
    const dir = target.trim().toLowerCase();
    if (dir === 'down' || dir === 'up') {
        const amount = Math.round(window.innerHeight * 0.8);
        window.scrollBy({ top: dir === 'down' ? amount : -amount, behavior: 'instant' });
        return true;
    }
    let element = null;
    try { element = document.querySelector(target); } catch (e) {}
    if (!element) return false;
    element.scrollIntoView({behavior: 'instant', block: 'center'});
    return true;
})(%TARGET%)
"#;

/// Line-preserving page text for content analysis. `innerText` keeps the
/// block structure the flattened survey text loses.
pub const CONTENT_TEXT_JS: &str = r#"
(function() {
    const text = document.body ? document.body.innerText : '';
    return text
        .split('\n')
        .map(line => line.replace(/[ \t]+/g, ' ').trimEnd())
        .join('\n')
        .replace(/\n{3,}/g, '\n\n')
        .trim();
})()
"#;

fn fill(template: &str, target: &str, value: Option<&str>) -> String {
    let target_json = Value::String(target.to_string()).to_string();
    let mut script = template.replace("%TARGET%", &target_json);
    if let Some(value) = value {
        let value_json = Value::String(value.to_string()).to_string();
        script = script.replace("%VALUE%", &value_json);
    }
    script
}

/// Runs planned actions against the live page.
pub struct ActionExecutor {
    driver: Arc<dyn PageDriver>,
}

impl ActionExecutor {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self { driver }
    }

    /// Execute one page-level action. `Navigate` and `Extract` never reach
    /// the executor; they are handled a level up.
    pub async fn execute(&self, plan: &ActionPlan) -> bool {
        match plan.action {
            ActionKind::Click => self.click(&plan.target).await,
            ActionKind::Type => match plan.value.as_deref() {
                Some(value) => self.type_text(&plan.target, value).await,
                None => {
                    warn!(target = %plan.target, "type action carries no value");
                    false
                }
            },
            ActionKind::Scroll => self.scroll(&plan.target).await,
            ActionKind::Wait => true,
            ActionKind::Navigate | ActionKind::Extract => {
                warn!(action = %plan.action, "action is not page-level");
                false
            }
        }
    }

    pub async fn click(&self, target: &str) -> bool {
        debug!(%target, "clicking");
        self.run_bool(&fill(CLICK_JS, target, None)).await
    }

    pub async fn type_text(&self, target: &str, value: &str) -> bool {
        debug!(%target, chars = value.len(), "typing");
        self.run_bool(&fill(TYPE_JS, target, Some(value))).await
    }

    pub async fn scroll(&self, target: &str) -> bool {
        debug!(%target, "scrolling");
        self.run_bool(&fill(SCROLL_JS, target, None)).await
    }

    /// Structured page text for content analysis, `None` when the page is
    /// unresponsive or empty.
    pub async fn page_text(&self) -> Option<String> {
        match self.driver.run_script(CONTENT_TEXT_JS).await {
            Some(Value::String(text)) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    async fn run_bool(&self, script: &str) -> bool {
        matches!(self.driver.run_script(script).await, Some(Value::Bool(true)))
    }
}
