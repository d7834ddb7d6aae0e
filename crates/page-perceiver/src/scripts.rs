//! The in-page survey script.
//!
//! One evaluation collects everything a snapshot needs: viewport geometry,
//! interactive and navigation elements with derived visibility, the main
//! content container and the flattened visible text. The visibility
//! predicate mirrors what the agent relies on downstream: non-zero
//! rendered area, no display/visibility/opacity hiding and a rendered
//! ancestor chain (offset-parent, with an exception for fixed elements).

/// Function name inside [`PAGE_SURVEY_JS`]; doubles as the recognition
/// marker for replay drivers.
pub const SURVEY_MARKER: &str = "__pagepilotSurvey";

pub const PAGE_SURVEY_JS: &str = r#"
(function __pagepilotSurvey() {
    var INTERACTIVE = 'a, button, input, textarea, select, [role="button"], [role="link"], [role="menuitem"], [onclick], [class*="btn"]';
    var NAVIGATION = 'nav a, [role="navigation"] a, [role="menubar"] a, header nav a';
    var MAIN = 'main, article, [role="main"], #content, .content';

    function isVisible(el) {
        var rect = el.getBoundingClientRect();
        if (rect.width <= 0 || rect.height <= 0) return false;
        var style = window.getComputedStyle(el);
        if (style.display === 'none' || style.visibility === 'hidden') return false;
        if (parseFloat(style.opacity || '1') === 0) return false;
        return el.offsetParent !== null || style.position === 'fixed';
    }

    function importance(el, rect) {
        var vw = window.innerWidth || 1;
        var vh = window.innerHeight || 1;
        var cx = rect.x + rect.width / 2;
        var cy = rect.y + rect.height / 2;
        var offCenter = Math.hypot(cx - vw / 2, cy - vh / 2) / Math.hypot(vw / 2, vh / 2);
        var centerWeight = 1 - Math.min(offCenter, 1);
        var sizeWeight = Math.min((rect.width * rect.height) / (vw * vh), 1);
        var fontPx = parseFloat(window.getComputedStyle(el).fontSize || '16');
        var fontWeight = Math.min(fontPx / 32, 1);
        return (centerWeight + sizeWeight + fontWeight) / 3;
    }

    function describe(el) {
        var rect = el.getBoundingClientRect();
        var style = window.getComputedStyle(el);
        var tag = el.tagName.toLowerCase();
        var role = el.getAttribute('role');
        var clickable = tag === 'a' || tag === 'button' || role === 'button' ||
            role === 'link' || !!el.onclick || style.cursor === 'pointer';
        var classes = [];
        if (typeof el.className === 'string' && el.className.trim()) {
            classes = el.className.trim().split(/\s+/);
        }
        return {
            tag: tag,
            id: el.id || null,
            classes: classes,
            text: (el.innerText || el.value || '').trim().slice(0, 200),
            name: el.getAttribute('name'),
            input_type: el.getAttribute('type'),
            role: role,
            aria_label: el.getAttribute('aria-label'),
            href: el.getAttribute('href'),
            bounds: { x: rect.x, y: rect.y, width: rect.width, height: rect.height },
            visible: isVisible(el),
            clickable: clickable,
            interactive: true,
            visual_importance: importance(el, rect)
        };
    }

    function collect(selector, limit) {
        var nodes;
        try {
            nodes = document.querySelectorAll(selector);
        } catch (e) {
            return [];
        }
        var out = [];
        for (var i = 0; i < nodes.length && out.length < limit; i++) {
            out.push(describe(nodes[i]));
        }
        return out;
    }

    var main = document.querySelector(MAIN);
    var bodyText = document.body ? document.body.innerText : '';

    return {
        url: window.location.href,
        title: document.title || '',
        viewport: { width: window.innerWidth, height: window.innerHeight },
        interactive: collect(INTERACTIVE, 120),
        navigation: collect(NAVIGATION, 40),
        main: main ? describe(main) : null,
        text: bodyText.replace(/\s+/g, ' ').trim().slice(0, 4000)
    };
})()
"#;
