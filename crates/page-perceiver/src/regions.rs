//! Vertical region classification.

use page_model::{ElementDescriptor, PageRegion, Viewport};

const HEADER_BAND: f64 = 0.2;
const FOOTER_BAND: f64 = 0.8;

/// Bucket an element by its vertical position: top 20% of the viewport is
/// header, bottom 20% is footer, the rest is main. Navigation-role
/// elements are navigation regardless of position.
pub fn classify_region(el: &ElementDescriptor, viewport: &Viewport) -> PageRegion {
    if has_navigation_role(el) {
        return PageRegion::Navigation;
    }
    if viewport.height <= 0.0 {
        return PageRegion::Main;
    }
    if el.bounds.y < viewport.height * HEADER_BAND {
        PageRegion::Header
    } else if el.bounds.y > viewport.height * FOOTER_BAND {
        PageRegion::Footer
    } else {
        PageRegion::Main
    }
}

fn has_navigation_role(el: &ElementDescriptor) -> bool {
    if el.tag == "nav" {
        return true;
    }
    matches!(
        el.role.as_deref(),
        Some("navigation") | Some("menubar") | Some("menu") | Some("menuitem")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_model::ElementBounds;

    fn el_at(y: f64) -> ElementDescriptor {
        ElementDescriptor {
            tag: "div".into(),
            bounds: ElementBounds::new(0.0, y, 100.0, 20.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_vertical_bands() {
        let viewport = Viewport {
            width: 1000.0,
            height: 1000.0,
        };
        assert_eq!(classify_region(&el_at(50.0), &viewport), PageRegion::Header);
        assert_eq!(classify_region(&el_at(500.0), &viewport), PageRegion::Main);
        assert_eq!(classify_region(&el_at(900.0), &viewport), PageRegion::Footer);
        // Band edges fall into the middle bucket.
        assert_eq!(classify_region(&el_at(200.0), &viewport), PageRegion::Main);
        assert_eq!(classify_region(&el_at(800.0), &viewport), PageRegion::Main);
    }

    #[test]
    fn test_navigation_role_wins_over_position() {
        let viewport = Viewport {
            width: 1000.0,
            height: 1000.0,
        };
        let mut el = el_at(900.0);
        el.role = Some("navigation".into());
        assert_eq!(classify_region(&el, &viewport), PageRegion::Navigation);

        let mut el = el_at(30.0);
        el.tag = "nav".into();
        assert_eq!(classify_region(&el, &viewport), PageRegion::Navigation);
    }

    #[test]
    fn test_degenerate_viewport_defaults_to_main() {
        let viewport = Viewport {
            width: 0.0,
            height: 0.0,
        };
        assert_eq!(classify_region(&el_at(10.0), &viewport), PageRegion::Main);
    }
}
