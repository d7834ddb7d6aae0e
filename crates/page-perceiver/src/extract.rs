//! Survey payload parsing into page snapshots.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use page_driver::PageDriver;
use page_model::{ElementDescriptor, PageRegion, PageState, Viewport};

use crate::regions::classify_region;
use crate::scripts::PAGE_SURVEY_JS;

/// Wire shape of the survey script's return value.
#[derive(Debug, Deserialize)]
struct SurveyPayload {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    viewport: Option<Viewport>,
    #[serde(default)]
    interactive: Vec<ElementDescriptor>,
    #[serde(default)]
    navigation: Vec<ElementDescriptor>,
    #[serde(default)]
    main: Option<ElementDescriptor>,
    #[serde(default)]
    text: String,
}

/// Extracts a fresh [`PageState`] from the live page.
pub struct PagePerceiver {
    driver: Arc<dyn PageDriver>,
}

impl PagePerceiver {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self { driver }
    }

    /// Query the page once and return its snapshot. Side-effect-free from
    /// the caller's perspective; a failed or empty survey yields an empty
    /// state rather than an error.
    pub async fn extract(&self) -> PageState {
        let url = self.driver.current_url().await;
        let Some(value) = self.driver.run_script(PAGE_SURVEY_JS).await else {
            debug!(%url, "page survey yielded nothing; returning empty state");
            return PageState::empty(url);
        };
        match parse_survey(value) {
            Some(state) if !state.url.is_empty() => state,
            Some(mut state) => {
                state.url = url;
                state
            }
            None => {
                debug!(%url, "page survey payload failed to parse; returning empty state");
                PageState::empty(url)
            }
        }
    }
}

/// Parse a survey value. Accepts both the object form and a string-encoded
/// payload, since engines differ in how they hand back script results.
fn parse_survey(value: Value) -> Option<PageState> {
    let payload: SurveyPayload = match value {
        Value::String(s) => serde_json::from_str(&s).ok()?,
        other => serde_json::from_value(other).ok()?,
    };

    let viewport = payload.viewport.unwrap_or_default();

    let interactive = classify_all(payload.interactive, &viewport);
    let mut navigation = classify_all(payload.navigation, &viewport);
    for el in &mut navigation {
        el.region = PageRegion::Navigation;
    }
    let main_content = payload.main.map(|mut el| {
        el.region = classify_region(&el, &viewport);
        el
    });

    Some(PageState {
        url: payload.url,
        title: payload.title,
        interactive_elements: interactive,
        navigation_elements: navigation,
        main_content,
        visible_text: collapse_whitespace(&payload.text),
        viewport,
    })
}

fn classify_all(mut elements: Vec<ElementDescriptor>, viewport: &Viewport) -> Vec<ElementDescriptor> {
    for el in &mut elements {
        el.region = classify_region(el, viewport);
    }
    elements
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_driver::testing::ScriptedDriver;
    use serde_json::json;

    fn survey_fixture() -> Value {
        json!({
            "url": "https://shop.test/catalog",
            "title": "Catalog",
            "viewport": { "width": 1000.0, "height": 1000.0 },
            "interactive": [
                {
                    "tag": "button",
                    "id": "buy",
                    "text": "Buy now",
                    "bounds": { "x": 100.0, "y": 480.0, "width": 120.0, "height": 40.0 },
                    "visible": true,
                    "clickable": true,
                    "interactive": true
                },
                {
                    "tag": "input",
                    "name": "q",
                    "input_type": "text",
                    "bounds": { "x": 300.0, "y": 40.0, "width": 200.0, "height": 30.0 },
                    "visible": true,
                    "clickable": false,
                    "interactive": true
                }
            ],
            "navigation": [
                {
                    "tag": "a",
                    "text": "Deals",
                    "href": "/deals",
                    "bounds": { "x": 10.0, "y": 900.0, "width": 60.0, "height": 20.0 },
                    "visible": true,
                    "clickable": true,
                    "interactive": true
                }
            ],
            "main": null,
            "text": "  Catalog \n\n Buy now   Deals "
        })
    }

    #[tokio::test]
    async fn test_extract_builds_classified_state() {
        let fixture = survey_fixture();
        let driver = Arc::new(
            ScriptedDriver::new().with_script_handler(move |_| Some(fixture.clone())),
        );
        let perceiver = PagePerceiver::new(driver);

        let state = perceiver.extract().await;
        assert_eq!(state.url, "https://shop.test/catalog");
        assert_eq!(state.interactive_elements.len(), 2);
        assert_eq!(state.interactive_elements[0].region, PageRegion::Main);
        assert_eq!(state.interactive_elements[1].region, PageRegion::Header);
        assert_eq!(state.navigation_elements[0].region, PageRegion::Navigation);
        assert_eq!(state.visible_text, "Catalog Buy now Deals");
    }

    #[tokio::test]
    async fn test_extract_is_idempotent_for_unchanged_page() {
        let fixture = survey_fixture();
        let driver = Arc::new(
            ScriptedDriver::new().with_script_handler(move |_| Some(fixture.clone())),
        );
        let perceiver = PagePerceiver::new(driver);

        let first = perceiver.extract().await;
        let second = perceiver.extract().await;
        assert_eq!(first.interactive_elements, second.interactive_elements);
        assert_eq!(first.navigation_elements, second.navigation_elements);
    }

    #[tokio::test]
    async fn test_failed_survey_yields_empty_state() {
        let driver = Arc::new(ScriptedDriver::new().with_script_handler(|_| None));
        driver.set_url("https://dead.test/");
        let perceiver = PagePerceiver::new(driver);

        let state = perceiver.extract().await;
        assert!(state.is_empty());
        assert_eq!(state.url, "https://dead.test/");
    }

    #[tokio::test]
    async fn test_string_encoded_payload_is_accepted() {
        let encoded = Value::String(survey_fixture().to_string());
        let driver = Arc::new(
            ScriptedDriver::new().with_script_handler(move |_| Some(encoded.clone())),
        );
        let perceiver = PagePerceiver::new(driver);

        let state = perceiver.extract().await;
        assert_eq!(state.title, "Catalog");
        assert_eq!(state.interactive_elements.len(), 2);
    }

    #[test]
    fn test_garbage_payload_is_rejected() {
        assert!(parse_survey(Value::String("not json".into())).is_none());
        assert!(parse_survey(json!(42)).is_none());
    }
}
